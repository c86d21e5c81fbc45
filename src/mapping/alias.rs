// src/mapping/alias.rs
//
// Canonical field <-> raw label equivalence. The synonym table is plain data;
// extending it never touches the matching rules below.

use std::path::Path;

use serde::Deserialize;

use crate::mapping::zone::Zone;
use crate::utils::error::SchemaError;

/// Which extraction zones a synonym pair is valid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    Direct,
    TypeColumn,
    Both,
}

impl Applicability {
    pub fn covers(self, zone: Zone) -> bool {
        matches!(
            (self, zone),
            (Applicability::Both, _)
                | (Applicability::Direct, Zone::Direct)
                | (Applicability::TypeColumn, Zone::TypeColumn)
        )
    }
}

/// A known historical label substitution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Synonym {
    pub canonical: String,
    pub raw: String,
    pub applies: Applicability,
}

// Label revisions seen across datasheet templates.
const BUILTIN_SYNONYMS: &[(&str, &str, Applicability)] = &[
    ("Rise time 10% - 90% CC", "Rise time 10 - 90% CC", Applicability::Both),
    ("AC input to DC output", "AC-Input to DC-Output", Applicability::Both),
    ("AC input to case (PE)", "AC-Input to case (PE)", Applicability::Both),
    ("DC output to case (PE)", "DC-Output to case (PE)", Applicability::Both),
    ("DC output to interfaces", "DC-Output to Interfaces", Applicability::Both),
    ("Dimensions (W x H x D)", "Dimensions (B x H x T)", Applicability::Both),
    ("Ripple in CV (rms)", "Ripple rms CV", Applicability::TypeColumn),
    ("Ripple in CV (pp)", "Ripple and noise p-p CV", Applicability::TypeColumn),
    ("Output capacitance", "Output capacity", Applicability::TypeColumn),
    ("Efficiency (up to)", "Efficiency up to", Applicability::TypeColumn),
    ("Negative DC pole <-> PE", "Negative DC-Pol <-> PE", Applicability::TypeColumn),
    ("Positive DC pole <-> PE", "Positive DC-Pol <-> PE", Applicability::TypeColumn),
    ("Standard", "Article number", Applicability::TypeColumn),
];

/// Decides whether a raw table label denotes a canonical field.
///
/// Rules, first success wins:
/// 1. exact equality (case-sensitive, untrimmed)
/// 2. a synonym pair applicable to the zone
/// 3. type-column zone only: the canonical name is a substring of the label
#[derive(Debug, Clone)]
pub struct AliasResolver {
    synonyms: Vec<Synonym>,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new(
            BUILTIN_SYNONYMS
                .iter()
                .map(|(canonical, raw, applies)| Synonym {
                    canonical: canonical.to_string(),
                    raw: raw.to_string(),
                    applies: *applies,
                })
                .collect(),
        )
    }
}

impl AliasResolver {
    pub fn new(synonyms: Vec<Synonym>) -> Self {
        Self { synonyms }
    }

    /// Built-in table plus the rules found in a JSON file
    /// (`[{"canonical": ..., "raw": ..., "applies": "direct"|"type_column"|"both"}]`).
    pub fn with_rules_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        let extra: Vec<Synonym> =
            serde_json::from_str(&content).map_err(|e| SchemaError::Aliases {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        tracing::info!("Loaded {} extra alias rules from {}", extra.len(), path.display());

        let mut resolver = Self::default();
        resolver.synonyms.extend(extra);
        Ok(resolver)
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    pub fn matches(&self, zone: Zone, canonical: &str, raw_label: &str) -> bool {
        if canonical.is_empty() {
            return false;
        }
        if canonical == raw_label {
            return true;
        }
        let synonym_hit = self.synonyms.iter().any(|s| {
            s.applies.covers(zone) && s.canonical == canonical && s.raw == raw_label
        });
        if synonym_hit {
            return true;
        }
        zone == Zone::TypeColumn && raw_label.contains(canonical)
    }
}
