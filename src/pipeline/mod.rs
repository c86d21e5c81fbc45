// src/pipeline/mod.rs
use std::path::PathBuf;

use serde::Serialize;

use crate::extractors::{
    DirectKeyValueExtractor, ExtractionStrategy, PageBundle, TableSource, TypeColumnExtractor,
};
use crate::mapping::{
    AliasResolver, CanonicalSchema, Diagnostic, OutputRecord, RecordAssembler, Zone, ZonePolicy,
};
use crate::source::{DocumentEntry, DocumentResolver};
use crate::storage::RecordSink;
use crate::utils::error::AppError;
use crate::utils::table_debug;

/// Result of assembling one document.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub record: OutputRecord,
    pub diagnostics: Vec<Diagnostic>,
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub documents: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fields_filled: usize,
    pub diagnostics: usize,
}

/// Drives documents, one at a time, from locator to emitted record.
pub struct DocumentPipeline<R, T> {
    schema: CanonicalSchema,
    aliases: AliasResolver,
    policy: ZonePolicy,
    resolver: R,
    tables: T,
    debug_dir: Option<PathBuf>,
}

impl<R: DocumentResolver, T: TableSource> DocumentPipeline<R, T> {
    pub fn new(
        schema: CanonicalSchema,
        aliases: AliasResolver,
        policy: ZonePolicy,
        resolver: R,
        tables: T,
    ) -> Self {
        Self {
            schema,
            aliases,
            policy,
            resolver,
            tables,
            debug_dir: None,
        }
    }

    /// Dump each document's classified tables as JSON into `dir`.
    pub fn with_debug_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_dir = Some(dir.into());
        self
    }

    /// Builds the record for one document from its pages.
    ///
    /// Pages are visited in ascending index order, then tables, then rows,
    /// so the first match for a field is reproducible.
    pub fn assemble(&self, document_type: &str, pages: &[PageBundle]) -> DocumentOutcome {
        let mut assembler = RecordAssembler::new(self.schema.len());
        let direct = DirectKeyValueExtractor::new(&self.schema, &self.aliases);
        let typed = TypeColumnExtractor::new(&self.schema, &self.aliases, document_type);

        let mut ordered: Vec<&PageBundle> = pages.iter().collect();
        ordered.sort_by_key(|page| page.index);

        for page in ordered {
            let strategy: &dyn ExtractionStrategy = match self.policy.classify(page.index) {
                Some(Zone::Direct) => &direct,
                Some(Zone::TypeColumn) => &typed,
                None => {
                    tracing::trace!("Page {} outside extraction zones", page.index);
                    continue;
                }
            };
            tracing::debug!(
                "Page {}: {} tables as {:?}",
                page.index,
                page.tables.len(),
                strategy.zone()
            );
            for (table_index, table) in page.tables.iter().enumerate() {
                strategy.extract_table(table, page.index, table_index, &mut assembler);
            }
        }

        let (record, diagnostics) = assembler.finalize();
        DocumentOutcome { record, diagnostics }
    }

    /// Resolves, reads and assembles one document.
    pub async fn process_document(
        &self,
        entry: &DocumentEntry,
    ) -> Result<DocumentOutcome, AppError> {
        let path = self.resolver.resolve(&entry.locator).await?;
        let pages = self.tables.pages(&path)?;
        tracing::debug!(
            "Document {}: {} pages from {}",
            entry.index,
            pages.len(),
            path.display()
        );

        if let Some(dir) = &self.debug_dir {
            let debug_path = dir.join(format!("document_{:04}_tables.json", entry.index));
            if let Err(e) = table_debug::save_debug_tables(&debug_path, &pages, &self.policy) {
                tracing::warn!("Failed to write debug tables for document {}: {}", entry.index, e);
            }
        }

        Ok(self.assemble(&entry.document_type, &pages))
    }

    /// Processes every document in order, writing exactly one record each.
    /// A document that cannot be resolved or read gets an empty record;
    /// sink failures abort the run.
    pub async fn run<S: RecordSink>(
        &self,
        documents: &[DocumentEntry],
        sink: &mut S,
    ) -> Result<RunSummary, AppError> {
        let mut summary = RunSummary::default();

        for entry in documents {
            tracing::info!(
                "Processing document {} ({}): {}",
                entry.index,
                entry.document_type,
                entry.locator
            );
            summary.documents += 1;

            let outcome = match self.process_document(entry).await {
                Ok(outcome) => {
                    summary.succeeded += 1;
                    tracing::info!(
                        "Document {}: {} of {} fields filled, {} diagnostics",
                        entry.index,
                        outcome.record.filled_count(),
                        self.schema.len(),
                        outcome.diagnostics.len()
                    );
                    outcome
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("Skipping document {} ({}): {}", entry.index, entry.locator, e);
                    DocumentOutcome {
                        record: OutputRecord::empty(self.schema.len()),
                        diagnostics: Vec::new(),
                    }
                }
            };

            summary.fields_filled += outcome.record.filled_count();
            summary.diagnostics += outcome.diagnostics.len();
            sink.write_record(entry.index, &outcome.record)?;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ExtractedTable;
    use crate::utils::error::{ExtractError, ResolveError, StorageError};
    use std::collections::HashMap;
    use std::path::Path;

    // Locators are resolved to themselves; unknown ones fail.
    struct FakeResolver;

    impl DocumentResolver for FakeResolver {
        async fn resolve(&self, locator: &str) -> Result<PathBuf, ResolveError> {
            if locator.starts_with("missing") {
                return Err(ResolveError::NotFound(locator.to_string()));
            }
            Ok(PathBuf::from(locator))
        }
    }

    struct FakeTables(HashMap<PathBuf, Vec<PageBundle>>);

    impl TableSource for FakeTables {
        fn pages(&self, path: &Path) -> Result<Vec<PageBundle>, ExtractError> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| ExtractError::NoPages(path.display().to_string()))
        }
    }

    #[derive(Default)]
    struct MemorySink(Vec<(usize, OutputRecord)>);

    impl RecordSink for MemorySink {
        fn write_record(
            &mut self,
            document_index: usize,
            record: &OutputRecord,
        ) -> Result<(), StorageError> {
            self.0.push((document_index, record.clone()));
            Ok(())
        }
    }

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new([
            "Datasheet Link",
            "Type",
            "Efficiency (up to)",
            "Dimensions (W x H x D)",
        ])
    }

    fn page(index: usize, tables: Vec<ExtractedTable>) -> PageBundle {
        PageBundle { index, tables }
    }

    fn pipeline(
        tables: HashMap<PathBuf, Vec<PageBundle>>,
    ) -> DocumentPipeline<FakeResolver, FakeTables> {
        DocumentPipeline::new(
            schema(),
            AliasResolver::default(),
            ZonePolicy::default(),
            FakeResolver,
            FakeTables(tables),
        )
    }

    fn entry(index: usize, locator: &str, document_type: &str) -> DocumentEntry {
        DocumentEntry {
            index,
            locator: locator.to_string(),
            document_type: document_type.to_string(),
            cells: Vec::new(),
        }
    }

    #[test]
    fn test_direct_zone_wins_over_later_type_zone() {
        let pipeline = pipeline(HashMap::new());
        let pages = vec![
            page(2, vec![ExtractedTable::from_rows([["Efficiency (up to)", "A"]])]),
            page(
                4,
                vec![ExtractedTable::from_rows([
                    ["Label", "AC1000"],
                    ["Efficiency up to", "B"],
                ])],
            ),
        ];

        let outcome = pipeline.assemble("AC1000", &pages);
        let field = schema().find("Efficiency (up to)").unwrap();
        assert_eq!(outcome.record.get(field), Some("A"));
    }

    #[test]
    fn test_pages_are_visited_in_ascending_order() {
        let pipeline = pipeline(HashMap::new());
        let pages = vec![
            page(3, vec![ExtractedTable::from_rows([["Type", "from page 3"]])]),
            page(2, vec![ExtractedTable::from_rows([["Type", "from page 2"]])]),
        ];

        let outcome = pipeline.assemble("AC1000", &pages);
        assert_eq!(outcome.record.get(schema().find("Type").unwrap()), Some("from page 2"));
    }

    #[test]
    fn test_pages_outside_zones_never_contribute() {
        let pipeline = pipeline(HashMap::new());
        let rows = ExtractedTable::from_rows([["Type", "AC1000"], ["Efficiency (up to)", "95%"]]);
        let pages = vec![
            page(0, vec![rows.clone()]),
            page(1, vec![rows.clone()]),
            page(6, vec![rows.clone()]),
            page(9, vec![rows]),
        ];

        let outcome = pipeline.assemble("AC1000", &pages);
        assert_eq!(outcome.record.filled_count(), 0);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_full_scenario() {
        let pipeline = pipeline(HashMap::new());
        let pages = vec![
            page(2, vec![ExtractedTable::from_rows([["Dimensions (B x H x T)", "100x50x30mm"]])]),
            page(
                5,
                vec![
                    ExtractedTable::from_rows([
                        ["Label", "DC9", "X"],
                        ["Efficiency up to", "1%", "2%"],
                    ]),
                    ExtractedTable::from_rows([
                        ["Label", "AC1000", "AC2000"],
                        ["Efficiency up to", "92%", "90%"],
                    ]),
                ],
            ),
        ];

        let outcome = pipeline.assemble("AC1000", &pages);
        let schema = schema();
        assert_eq!(
            outcome.record.get(schema.find("Dimensions (W x H x D)").unwrap()),
            Some("100x50x30mm")
        );
        assert_eq!(outcome.record.get(schema.find("Efficiency (up to)").unwrap()), Some("92%"));
        assert_eq!(outcome.record.filled_count(), 2);
    }

    #[test]
    fn test_run_emits_one_record_per_document() {
        let mut tables = HashMap::new();
        tables.insert(
            PathBuf::from("a.pdf"),
            vec![page(2, vec![ExtractedTable::from_rows([["Type", "AC1000"]])])],
        );
        let pipeline = pipeline(tables);
        let documents = vec![
            entry(0, "a.pdf", "AC1000"),
            entry(1, "missing.pdf", "AC2000"),
            entry(2, "unreadable.pdf", "AC3000"),
        ];

        let mut sink = MemorySink::default();
        let summary = tokio_test::block_on(pipeline.run(&documents, &mut sink)).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                documents: 3,
                succeeded: 1,
                failed: 2,
                fields_filled: 1,
                diagnostics: 0,
            }
        );
        let indices: Vec<usize> = sink.0.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(sink.0[0].1.get(schema().find("Type").unwrap()), Some("AC1000"));
        assert_eq!(sink.0[1].1, OutputRecord::empty(4));
    }

    #[test]
    fn test_no_state_crosses_documents() {
        let mut tables = HashMap::new();
        tables.insert(
            PathBuf::from("a.pdf"),
            vec![page(2, vec![ExtractedTable::from_rows([["Type", "first"]])])],
        );
        tables.insert(
            PathBuf::from("b.pdf"),
            vec![page(2, vec![ExtractedTable::from_rows([["Type", "second"]])])],
        );
        let pipeline = pipeline(tables);
        let documents = vec![entry(0, "a.pdf", "AC1000"), entry(1, "b.pdf", "AC1000")];

        let mut sink = MemorySink::default();
        tokio_test::block_on(pipeline.run(&documents, &mut sink)).unwrap();

        let type_field = schema().find("Type").unwrap();
        assert_eq!(sink.0[0].1.get(type_field), Some("first"));
        assert_eq!(sink.0[1].1.get(type_field), Some("second"));
    }

    #[test]
    fn test_debug_tables_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut tables = HashMap::new();
        tables.insert(
            PathBuf::from("a.pdf"),
            vec![page(4, vec![ExtractedTable::from_rows([["Label", "AC1000"]])])],
        );
        let pipeline = pipeline(tables).with_debug_dir(dir.path());

        tokio_test::block_on(pipeline.process_document(&entry(7, "a.pdf", "AC1000"))).unwrap();

        let dump = std::fs::read_to_string(dir.path().join("document_0007_tables.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&dump).unwrap();
        assert_eq!(json[0]["page"], 4);
        assert_eq!(json[0]["zone"], "type_column");
    }
}
