// src/extractors/direct.rs
use crate::extractors::tables::{cell_text, ExtractedTable};
use crate::extractors::{assign_cell, first_open_field, ExtractionStrategy};
use crate::mapping::record::RowLocation;
use crate::mapping::{AliasResolver, CanonicalSchema, RecordAssembler, Zone};

const LABEL_COLUMN: usize = 0;
const VALUE_COLUMN: usize = 1;

/// Label/value pair tables: cell 0 is the label, cell 1 the value.
pub struct DirectKeyValueExtractor<'a> {
    schema: &'a CanonicalSchema,
    resolver: &'a AliasResolver,
}

impl<'a> DirectKeyValueExtractor<'a> {
    pub fn new(schema: &'a CanonicalSchema, resolver: &'a AliasResolver) -> Self {
        Self { schema, resolver }
    }
}

impl ExtractionStrategy for DirectKeyValueExtractor<'_> {
    fn zone(&self) -> Zone {
        Zone::Direct
    }

    fn extract_table(
        &self,
        table: &ExtractedTable,
        page: usize,
        table_index: usize,
        assembler: &mut RecordAssembler,
    ) {
        for (row_index, row) in table.rows.iter().enumerate() {
            let Some(label) = cell_text(row, LABEL_COLUMN) else {
                continue;
            };
            // A row assigns at most one field
            let Some(field) =
                first_open_field(self.schema, self.resolver, Zone::Direct, label, assembler)
            else {
                tracing::trace!("No open field for direct label '{}'", label);
                continue;
            };
            let location = RowLocation {
                page,
                table: table_index,
                row: row_index,
            };
            assign_cell(self.schema, field, row, VALUE_COLUMN, location, assembler);
        }
    }
}
