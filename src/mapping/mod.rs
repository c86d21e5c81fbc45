// src/mapping/mod.rs
pub mod alias;
pub mod record;
pub mod schema;
pub mod zone;

// Re-export key mapping types for convenience
pub use alias::AliasResolver;
pub use record::{Diagnostic, OutputRecord, RecordAssembler};
pub use schema::{CanonicalSchema, FieldId};
pub use zone::{Zone, ZonePolicy};
