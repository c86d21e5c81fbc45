// src/utils/error.rs
use thiserror::Error;

// Errors raised while turning a manifest locator into a local document
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {0} for {1}")]
    Http(reqwest::StatusCode, String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid document locator: '{0}'")]
    InvalidLocator(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF parsing error: {0}")]
    Pdf(String),

    #[error("Table sidecar error in {path}: {message}")]
    Sidecar { path: String, message: String },

    #[error("Document has no pages: {0}")]
    NoPages(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Header '{0}' not found in manifest header row")]
    MissingHeader(String),

    #[error("Manifest has no header row after skipping {0} rows")]
    NoHeaderRow(usize),

    #[error("Manifest CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid alias rules in {path}: {message}")]
    Aliases { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Page {0} is assigned to both the direct and the type-column zone")]
    OverlappingZone(usize),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Record for document {got} written out of order (expected document {expected})")]
    OutOfOrder { expected: usize, got: usize },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid zone configuration: {0}")]
    Zones(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Table extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
