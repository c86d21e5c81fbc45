// src/extractors/mod.rs
pub mod direct;
pub mod tables;
pub mod type_column;

use crate::mapping::record::{AnomalyKind, Diagnostic, RowLocation};
use crate::mapping::{AliasResolver, CanonicalSchema, FieldId, RecordAssembler, Zone};

// Re-export key extraction types for convenience
pub use direct::DirectKeyValueExtractor;
pub use tables::{DocumentTableSource, ExtractedTable, PageBundle, TableSource};
pub use type_column::TypeColumnExtractor;

/// A per-zone way of reading a table into the document's record.
pub trait ExtractionStrategy {
    fn zone(&self) -> Zone;

    /// Reads one table, writing matches into `assembler`.
    fn extract_table(
        &self,
        table: &ExtractedTable,
        page: usize,
        table_index: usize,
        assembler: &mut RecordAssembler,
    );
}

/// First still-open field, in schema order, that `label` resolves to.
pub(crate) fn first_open_field(
    schema: &CanonicalSchema,
    resolver: &AliasResolver,
    zone: Zone,
    label: &str,
    assembler: &RecordAssembler,
) -> Option<FieldId> {
    schema
        .iter()
        .filter(|(id, _)| !assembler.is_filled(*id))
        .find(|(_, name)| resolver.matches(zone, name, label))
        .map(|(id, _)| id)
}

/// Assigns the row's cell at `value_column` to `field`, or records why it could not.
pub(crate) fn assign_cell(
    schema: &CanonicalSchema,
    field: FieldId,
    row: &[Option<String>],
    value_column: usize,
    location: RowLocation,
    assembler: &mut RecordAssembler,
) {
    let kind = match row.get(value_column) {
        None => AnomalyKind::ShortRow { value_column, row_len: row.len() },
        Some(cell) => match cell.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let value = cell.clone().unwrap_or_default();
                tracing::debug!(
                    "Assigning '{}' = '{}' (page {}, table {}, row {})",
                    schema.name(field),
                    value,
                    location.page,
                    location.table,
                    location.row
                );
                assembler.assign(field, value);
                return;
            }
            _ => AnomalyKind::MissingValue { value_column },
        },
    };

    assembler.record_anomaly(Diagnostic {
        location,
        field: schema.name(field).to_string(),
        kind,
    });
}
