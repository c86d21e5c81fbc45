// src/source/manifest.rs
use std::io::Read;
use std::path::Path;

use crate::mapping::CanonicalSchema;
use crate::utils::error::SchemaError;

pub const DEFAULT_LINK_HEADER: &str = "Datasheet Link";
pub const DEFAULT_TYPE_HEADER: &str = "Type";

/// How to read the manifest sheet.
#[derive(Debug, Clone)]
pub struct ManifestOptions {
    /// Rows above the header row.
    pub skip_rows: usize,
    pub link_header: String,
    pub type_header: String,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            link_header: DEFAULT_LINK_HEADER.to_string(),
            type_header: DEFAULT_TYPE_HEADER.to_string(),
        }
    }
}

/// One document row of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// Position among the manifest's documents, used as the output row.
    pub index: usize,
    pub locator: String,
    pub document_type: String,
    /// The row as found in the manifest.
    pub cells: Vec<String>,
}

/// Canonical schema plus the documents to process, read from a CSV sheet.
#[derive(Debug, Clone)]
pub struct Manifest {
    preamble: Vec<Vec<String>>,
    schema: CanonicalSchema,
    documents: Vec<DocumentEntry>,
}

impl Manifest {
    pub fn load(path: &Path, options: &ManifestOptions) -> Result<Self, SchemaError> {
        let file = std::fs::File::open(path)?;
        let manifest = Self::from_reader(file, options)?;
        tracing::info!(
            "Loaded manifest {}: {} fields, {} documents",
            path.display(),
            manifest.schema.len(),
            manifest.documents.len()
        );
        Ok(manifest)
    }

    pub fn from_reader<R: Read>(reader: R, options: &ManifestOptions) -> Result<Self, SchemaError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<String>>());
        }

        if rows.len() <= options.skip_rows {
            return Err(SchemaError::NoHeaderRow(options.skip_rows));
        }
        let mut rows = rows.into_iter();
        let preamble: Vec<Vec<String>> = rows.by_ref().take(options.skip_rows).collect();
        let header = rows.next().ok_or(SchemaError::NoHeaderRow(options.skip_rows))?;
        let schema = CanonicalSchema::new(header);

        let link_column = schema
            .find(&options.link_header)
            .ok_or_else(|| SchemaError::MissingHeader(options.link_header.clone()))?
            .index();
        let type_column = schema
            .find(&options.type_header)
            .ok_or_else(|| SchemaError::MissingHeader(options.type_header.clone()))?
            .index();

        let documents = rows
            .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
            .enumerate()
            .map(|(index, cells)| DocumentEntry {
                index,
                locator: cells.get(link_column).cloned().unwrap_or_default(),
                document_type: cells.get(type_column).cloned().unwrap_or_default(),
                cells,
            })
            .collect();

        Ok(Self { preamble, schema, documents })
    }

    pub fn schema(&self) -> &CanonicalSchema {
        &self.schema
    }

    pub fn field_names(&self) -> &[String] {
        self.schema.field_names()
    }

    pub fn preamble(&self) -> &[Vec<String>] {
        &self.preamble
    }

    pub fn documents(&self) -> &[DocumentEntry] {
        &self.documents
    }

    /// Declared type of document `index`, blank when unknown.
    pub fn document_type(&self, index: usize) -> &str {
        self.documents
            .get(index)
            .map(|d| d.document_type.as_str())
            .unwrap_or_default()
    }

    pub fn locator(&self, index: usize) -> Option<&str> {
        self.documents.get(index).map(|d| d.locator.as_str())
    }
}
