// src/mapping/zone.rs
use std::collections::BTreeSet;

use serde::Serialize;

use crate::utils::error::ConfigError;

/// Extraction strategy a page's tables are run through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Label/value pair tables.
    Direct,
    /// Labeled rows with one value column per product type.
    TypeColumn,
}

/// Maps 0-based page indices to zones.
///
/// The defaults (pages 2-3 direct, 4-5 type-column) mirror the datasheet
/// template this tool was built against. Nothing checks that a document
/// actually follows that template.
#[derive(Debug, Clone)]
pub struct ZonePolicy {
    direct_pages: BTreeSet<usize>,
    type_pages: BTreeSet<usize>,
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self {
            direct_pages: [2, 3].into_iter().collect(),
            type_pages: [4, 5].into_iter().collect(),
        }
    }
}

impl ZonePolicy {
    /// Builds a policy from explicit page lists. A page may belong to one zone only.
    pub fn new(direct_pages: &[usize], type_pages: &[usize]) -> Result<Self, ConfigError> {
        let direct_pages: BTreeSet<usize> = direct_pages.iter().copied().collect();
        let type_pages: BTreeSet<usize> = type_pages.iter().copied().collect();

        if let Some(page) = direct_pages.intersection(&type_pages).next() {
            return Err(ConfigError::OverlappingZone(*page));
        }
        Ok(Self { direct_pages, type_pages })
    }

    /// Returns the zone for a page, or `None` when the page is ignored.
    pub fn classify(&self, page_index: usize) -> Option<Zone> {
        if self.direct_pages.contains(&page_index) {
            Some(Zone::Direct)
        } else if self.type_pages.contains(&page_index) {
            Some(Zone::TypeColumn)
        } else {
            None
        }
    }
}
