// src/utils/table_debug.rs
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::extractors::{ExtractedTable, PageBundle};
use crate::mapping::{Zone, ZonePolicy};
use crate::utils::error::AppError;

#[derive(Serialize)]
struct AnnotatedPage<'a> {
    page: usize,
    /// `None` when the page is ignored.
    zone: Option<Zone>,
    tables: &'a [ExtractedTable],
}

/// Saves a document's extracted tables as JSON, each page tagged with the
/// zone it was classified into.
pub fn save_debug_tables(
    path: &Path,
    pages: &[PageBundle],
    policy: &ZonePolicy,
) -> Result<(), AppError> {
    let annotated: Vec<AnnotatedPage> = pages
        .iter()
        .map(|page| AnnotatedPage {
            page: page.index,
            zone: policy.classify(page.index),
            tables: &page.tables,
        })
        .collect();

    let json = serde_json::to_string_pretty(&annotated)
        .map_err(|e| AppError::Processing(format!("Could not serialize debug tables: {}", e)))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;

    tracing::info!("Saved debug tables to {}", path.display());
    Ok(())
}
