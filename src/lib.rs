// src/lib.rs
//! Maps the tables of product datasheets onto a fixed manifest schema,
//! one output record per document.

pub mod extractors;
pub mod mapping;
pub mod pipeline;
pub mod source;
pub mod storage;
pub mod utils;
