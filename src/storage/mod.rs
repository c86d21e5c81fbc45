// src/storage/mod.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::mapping::OutputRecord;
use crate::pipeline::RunSummary;
use crate::source::Manifest;
use crate::utils::error::StorageError;

/// Receives exactly one record per document, in document order.
pub trait RecordSink {
    fn write_record(
        &mut self,
        document_index: usize,
        record: &OutputRecord,
    ) -> Result<(), StorageError>;
}

/// Writes records as CSV rows laid out like the manifest: preamble, header,
/// then one row per document. Cells without an extracted value keep the
/// manifest's original content.
pub struct CsvRecordSink<W: Write> {
    writer: csv::Writer<W>,
    base_rows: Vec<Vec<String>>,
    next_index: usize,
}

impl CsvRecordSink<fs::File> {
    /// Creates the output file (and its directory) at `path`.
    pub fn create(path: &Path, manifest: &Manifest) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(StorageError::IoError)?;
        }
        let file = fs::File::create(path).map_err(StorageError::IoError)?;
        tracing::info!("Writing records to {}", path.display());
        Self::new(file, manifest)
    }
}

impl<W: Write> CsvRecordSink<W> {
    pub fn new(inner: W, manifest: &Manifest) -> Result<Self, StorageError> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(inner);
        for row in manifest.preamble() {
            writer.write_record(row)?;
        }
        writer.write_record(manifest.field_names())?;

        Ok(Self {
            writer,
            base_rows: manifest.documents().iter().map(|d| d.cells.clone()).collect(),
            next_index: 0,
        })
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, StorageError> {
        // Check for error rather than implicitly flushing and ignoring
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| StorageError::IoError(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvRecordSink<W> {
    fn write_record(
        &mut self,
        document_index: usize,
        record: &OutputRecord,
    ) -> Result<(), StorageError> {
        if document_index != self.next_index {
            return Err(StorageError::OutOfOrder {
                expected: self.next_index,
                got: document_index,
            });
        }

        let base = self
            .base_rows
            .get(document_index)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let width = record.values().len().max(base.len());
        let row: Vec<&str> = (0..width)
            .map(|col| {
                record
                    .values()
                    .get(col)
                    .and_then(|v| v.as_deref())
                    .or_else(|| base.get(col).map(String::as_str))
                    .unwrap_or("")
            })
            .collect();

        self.writer.write_record(&row)?;
        self.next_index += 1;
        Ok(())
    }
}

/// Saves a JSON summary of the run next to the output file.
pub fn save_run_metadata(
    output: &Path,
    manifest_path: &Path,
    summary: &RunSummary,
) -> Result<PathBuf, StorageError> {
    let file_path = output.with_extension("meta.json");

    let metadata = serde_json::json!({
        "manifest": manifest_path.display().to_string(),
        "output": output.display().to_string(),
        "documents": summary.documents,
        "succeeded": summary.succeeded,
        "failed": summary.failed,
        "fields_filled": summary.fields_filled,
        "diagnostics": summary.diagnostics,
        "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
    });

    let metadata_str = serde_json::to_string_pretty(&metadata)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;
    fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;
    Ok(file_path)
}
