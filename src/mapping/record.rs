// src/mapping/record.rs
use serde::Serialize;

use crate::mapping::schema::FieldId;

/// Canonical fields already assigned for the current document.
#[derive(Debug, Clone)]
pub struct FilledSet {
    filled: Vec<bool>,
}

impl FilledSet {
    fn new(len: usize) -> Self {
        Self { filled: vec![false; len] }
    }

    pub fn contains(&self, field: FieldId) -> bool {
        self.filled.get(field.index()).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.filled.iter().filter(|f| **f).count()
    }

    fn insert(&mut self, field: FieldId) {
        if let Some(slot) = self.filled.get_mut(field.index()) {
            *slot = true;
        }
    }
}

/// One value slot per schema field, write-once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputRecord {
    values: Vec<Option<String>>,
}

impl OutputRecord {
    /// Record with every field absent.
    pub fn empty(len: usize) -> Self {
        Self { values: vec![None; len] }
    }

    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.values.get(field.index()).and_then(|v| v.as_deref())
    }

    /// Values in schema order.
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    pub fn filled_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// Where a table row came from within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowLocation {
    pub page: usize,
    pub table: usize,
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyKind {
    /// The row has no cell at the value column.
    ShortRow { value_column: usize, row_len: usize },
    /// The value cell exists but is empty.
    MissingValue { value_column: usize },
}

/// A recovered extraction anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub location: RowLocation,
    pub field: String,
    #[serde(flatten)]
    pub kind: AnomalyKind,
}

/// Per-document record builder enforcing first-match-wins.
#[derive(Debug)]
pub struct RecordAssembler {
    filled: FilledSet,
    record: OutputRecord,
    diagnostics: Vec<Diagnostic>,
}

impl RecordAssembler {
    pub fn new(field_count: usize) -> Self {
        Self {
            filled: FilledSet::new(field_count),
            record: OutputRecord::empty(field_count),
            diagnostics: Vec::new(),
        }
    }

    pub fn is_filled(&self, field: FieldId) -> bool {
        self.filled.contains(field)
    }

    pub fn filled(&self) -> &FilledSet {
        &self.filled
    }

    /// Assigns `value` unless the field already holds one. Returns whether
    /// the value was taken.
    pub fn assign(&mut self, field: FieldId, value: impl Into<String>) -> bool {
        if self.filled.contains(field) {
            return false;
        }
        match self.record.values.get_mut(field.index()) {
            Some(slot) => {
                *slot = Some(value.into());
                self.filled.insert(field);
                true
            }
            None => false,
        }
    }

    pub fn record_anomaly(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(
            "Extraction anomaly at page {} table {} row {} ({}): {:?}",
            diagnostic.location.page,
            diagnostic.location.table,
            diagnostic.location.row,
            diagnostic.field,
            diagnostic.kind
        );
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the assembler. Unassigned fields stay absent.
    pub fn finalize(self) -> (OutputRecord, Vec<Diagnostic>) {
        (self.record, self.diagnostics)
    }
}
