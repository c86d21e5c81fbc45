// src/extractors/tables.rs

// --- Imports ---
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::ExtractError;

// Cells in extracted page text are separated by tabs or runs of 2+ spaces
static CELL_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\t+|\s{2,}").expect("Failed to compile CELL_SEPARATOR_RE"));

const SIDECAR_SUFFIX: &str = ".tables.json";

// --- Data Structures ---

/// Rows of cells as produced by a table extractor. `None` is an absent cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedTable {
    pub rows: Vec<Vec<Option<String>>>,
}

impl ExtractedTable {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor where every cell is present.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }
}

/// Text of a cell, or `None` when it is missing or empty.
pub fn cell_text(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx)
        .and_then(|cell| cell.as_deref())
        .filter(|text| !text.is_empty())
}

/// Tables found on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBundle {
    /// 0-based page index within the document.
    #[serde(rename = "page")]
    pub index: usize,
    #[serde(default)]
    pub tables: Vec<ExtractedTable>,
}

/// Supplies a document's tables, page by page in ascending order.
pub trait TableSource {
    fn pages(&self, path: &Path) -> Result<Vec<PageBundle>, ExtractError>;
}

/// Reads pre-extracted tables from a `<document>.tables.json` sidecar when
/// one exists, otherwise splits each PDF page's text into tables.
#[derive(Debug, Default)]
pub struct DocumentTableSource;

impl TableSource for DocumentTableSource {
    fn pages(&self, path: &Path) -> Result<Vec<PageBundle>, ExtractError> {
        let sidecar = sidecar_path(path);
        let mut pages = if sidecar.is_file() {
            tracing::debug!("Using table sidecar {}", sidecar.display());
            read_sidecar(&sidecar)?
        } else {
            read_pdf_tables(path)?
        };
        pages.sort_by_key(|page| page.index);
        Ok(pages)
    }
}

pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

fn read_sidecar(path: &Path) -> Result<Vec<PageBundle>, ExtractError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ExtractError::Sidecar {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

fn read_pdf_tables(path: &Path) -> Result<Vec<PageBundle>, ExtractError> {
    let document = lopdf::Document::load(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(ExtractError::NoPages(path.display().to_string()));
    }

    let mut bundles = Vec::with_capacity(pages.len());
    for &number in pages.keys() {
        // lopdf numbers pages from 1
        let text = match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "Could not extract text of page {} in {}: {}",
                    number,
                    path.display(),
                    e
                );
                String::new()
            }
        };
        bundles.push(PageBundle {
            index: number.saturating_sub(1) as usize,
            tables: split_text_tables(&text),
        });
    }

    tracing::debug!("Read {} pages from {}", bundles.len(), path.display());
    Ok(bundles)
}

/// Splits page text into tables: blank lines separate tables, each line is a
/// row, and cells are separated by tabs or runs of whitespace.
pub fn split_text_tables(text: &str) -> Vec<ExtractedTable> {
    let mut tables = Vec::new();
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !rows.is_empty() {
                tables.push(ExtractedTable::new(std::mem::take(&mut rows)));
            }
            continue;
        }
        rows.push(
            CELL_SEPARATOR_RE
                .split(line)
                .map(|cell| Some(cell.trim().to_string()))
                .collect(),
        );
    }
    if !rows.is_empty() {
        tables.push(ExtractedTable::new(rows));
    }
    tables
}
