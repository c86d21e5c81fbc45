// src/mapping/schema.rs

/// Stable identifier of a canonical field.
///
/// Fields are identified by their slot in the schema rather than by name, so
/// duplicate header names remain distinct fields. The position only matters
/// again when a record is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(usize);

impl FieldId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered list of canonical field names. Order defines output column order.
#[derive(Debug, Clone, Default)]
pub struct CanonicalSchema {
    fields: Vec<String>,
}

impl CanonicalSchema {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    pub fn name(&self, id: FieldId) -> &str {
        &self.fields[id.0]
    }

    /// Fields in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &str)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .map(|(idx, name)| (FieldId(idx), name.as_str()))
    }

    /// First field whose name is exactly `name`.
    pub fn find(&self, name: &str) -> Option<FieldId> {
        self.iter().find(|(_, n)| *n == name).map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_exact_and_case_sensitive() {
        let schema = CanonicalSchema::new(["Datasheet Link", "Type", "type"]);
        assert_eq!(schema.find("Type").map(FieldId::index), Some(1));
        assert_eq!(schema.find("type").map(FieldId::index), Some(2));
        assert_eq!(schema.find("Type "), None);
    }

    #[test]
    fn test_duplicate_names_are_distinct_fields() {
        let schema = CanonicalSchema::new(["Standard", "Standard"]);
        let ids: Vec<usize> = schema.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(schema.find("Standard").map(FieldId::index), Some(0));
    }
}
