// src/extractors/type_column.rs
use crate::extractors::tables::{cell_text, ExtractedTable};
use crate::extractors::{assign_cell, first_open_field, ExtractionStrategy};
use crate::mapping::record::RowLocation;
use crate::mapping::{AliasResolver, CanonicalSchema, RecordAssembler, Zone};

const LABEL_COLUMN: usize = 0;
// Header cells this short ("V", "W", "A") are units, not product types
const MIN_TYPE_HEADER_CHARS: usize = 3;

/// Tables with labeled rows and one value column per product type. The
/// document's declared type picks the column.
pub struct TypeColumnExtractor<'a> {
    schema: &'a CanonicalSchema,
    resolver: &'a AliasResolver,
    document_type: &'a str,
}

impl<'a> TypeColumnExtractor<'a> {
    pub fn new(
        schema: &'a CanonicalSchema,
        resolver: &'a AliasResolver,
        document_type: &'a str,
    ) -> Self {
        Self {
            schema,
            resolver,
            document_type,
        }
    }
}

/// Index of the first header cell longer than two characters that occurs
/// within `document_type`. Column 0 holds the labels, so a hit there means
/// the table has no value column for this type.
pub fn locate_value_column(header: &[Option<String>], document_type: &str) -> Option<usize> {
    header
        .iter()
        .position(|cell| match cell.as_deref() {
            Some(text) => {
                text.chars().count() >= MIN_TYPE_HEADER_CHARS && document_type.contains(text)
            }
            None => false,
        })
        .filter(|&idx| idx != LABEL_COLUMN)
}

impl ExtractionStrategy for TypeColumnExtractor<'_> {
    fn zone(&self) -> Zone {
        Zone::TypeColumn
    }

    fn extract_table(
        &self,
        table: &ExtractedTable,
        page: usize,
        table_index: usize,
        assembler: &mut RecordAssembler,
    ) {
        let Some((header, body)) = table.rows.split_first() else {
            return;
        };
        let Some(value_column) = locate_value_column(header, self.document_type) else {
            tracing::debug!(
                "Skipping table {} on page {}: no column for type '{}'",
                table_index,
                page,
                self.document_type
            );
            return;
        };
        tracing::debug!(
            "Page {} table {}: value column {}",
            page,
            table_index,
            value_column
        );

        for (offset, row) in body.iter().enumerate() {
            let Some(label) = cell_text(row, LABEL_COLUMN) else {
                continue;
            };
            let Some(field) =
                first_open_field(self.schema, self.resolver, Zone::TypeColumn, label, assembler)
            else {
                continue;
            };
            let location = RowLocation {
                page,
                table: table_index,
                row: offset + 1,
            };
            assign_cell(self.schema, field, row, value_column, location, assembler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::record::AnomalyKind;

    fn schema() -> CanonicalSchema {
        CanonicalSchema::new([
            "Datasheet Link",
            "Type",
            "Efficiency (up to)",
            "Dimensions (W x H x D)",
        ])
    }

    fn header(cells: &[&str]) -> Vec<Option<String>> {
        cells.iter().map(|c| Some(c.to_string())).collect()
    }

    #[test]
    fn test_locate_value_column() {
        let both = header(&["Label", "AC1000", "AC2000"]);
        assert_eq!(locate_value_column(&both, "AC1000"), Some(1));
        assert_eq!(locate_value_column(&both, "AC2000"), Some(2));
        // header text must be contained in the type, not the reverse
        assert_eq!(locate_value_column(&header(&["Label", "AC1000-X"]), "AC1000"), None);
        assert_eq!(locate_value_column(&header(&["Label", "AC"]), "AC1000"), None);
        assert_eq!(
            locate_value_column(&[None, Some("AC1".to_string())], "AC1000"),
            Some(1)
        );
        // first qualifying cell wins, even when it is the label column
        assert_eq!(locate_value_column(&header(&["AC1000", "AC1000"]), "AC1000"), None);
    }

    #[test]
    fn test_synonym_row_uses_type_column() {
        let schema = schema();
        let resolver = AliasResolver::default();
        let extractor = TypeColumnExtractor::new(&schema, &resolver, "AC1000");
        let mut assembler = RecordAssembler::new(schema.len());

        let table = ExtractedTable::from_rows([
            ["Label", "AC1000", "AC2000"],
            ["Efficiency up to", "92%", "90%"],
        ]);
        extractor.extract_table(&table, 4, 0, &mut assembler);

        let (record, _) = assembler.finalize();
        let efficiency = schema.find("Efficiency (up to)").unwrap();
        assert_eq!(record.get(efficiency), Some("92%"));
        assert_eq!(record.filled_count(), 1);
    }

    #[test]
    fn test_containment_matches_longer_label() {
        let schema = schema();
        let resolver = AliasResolver::default();
        let extractor = TypeColumnExtractor::new(&schema, &resolver, "AC2000");
        let mut assembler = RecordAssembler::new(schema.len());

        let table = ExtractedTable::from_rows([
            ["Label", "AC1000", "AC2000"],
            ["Type designation", "AC1000", "AC2000"],
        ]);
        extractor.extract_table(&table, 5, 0, &mut assembler);

        let (record, _) = assembler.finalize();
        assert_eq!(record.get(schema.find("Type").unwrap()), Some("AC2000"));
    }

    #[test]
    fn test_table_without_type_column_is_skipped() {
        let schema = schema();
        let resolver = AliasResolver::default();
        let extractor = TypeColumnExtractor::new(&schema, &resolver, "AC1000");
        let mut assembler = RecordAssembler::new(schema.len());

        let table = ExtractedTable::from_rows([
            ["Label", "V", "DC3000"],
            ["Efficiency up to", "92%", "90%"],
        ]);
        extractor.extract_table(&table, 4, 0, &mut assembler);
        extractor.extract_table(&ExtractedTable::default(), 4, 1, &mut assembler);

        let (record, diagnostics) = assembler.finalize();
        assert_eq!(record.filled_count(), 0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_header_row_is_not_matched() {
        let schema = CanonicalSchema::new(["Label"]);
        let resolver = AliasResolver::default();
        let extractor = TypeColumnExtractor::new(&schema, &resolver, "AC1000");
        let mut assembler = RecordAssembler::new(schema.len());

        let table = ExtractedTable::from_rows([["Label", "AC1000"]]);
        extractor.extract_table(&table, 4, 0, &mut assembler);

        assert_eq!(assembler.filled().len(), 0);
    }

    #[test]
    fn test_short_row_is_diagnosed_and_field_stays_open() {
        let schema = schema();
        let resolver = AliasResolver::default();
        let extractor = TypeColumnExtractor::new(&schema, &resolver, "AC2000");
        let mut assembler = RecordAssembler::new(schema.len());

        let table = ExtractedTable::from_rows(vec![
            vec!["Label", "AC1000", "AC2000"],
            vec!["Efficiency up to", "92%"],
            vec!["Efficiency (up to) at 230 V", "93%", "91%"],
        ]);
        extractor.extract_table(&table, 4, 2, &mut assembler);

        let (record, diagnostics) = assembler.finalize();
        let efficiency = schema.find("Efficiency (up to)").unwrap();
        assert_eq!(record.get(efficiency), Some("91%"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].location,
            RowLocation {
                page: 4,
                table: 2,
                row: 1
            }
        );
        assert_eq!(
            diagnostics[0].kind,
            AnomalyKind::ShortRow {
                value_column: 2,
                row_len: 2
            }
        );
    }
}
