// src/source/mod.rs
pub mod client;
pub mod manifest;

pub use client::{DocumentResolver, HttpResolver};
pub use manifest::{DocumentEntry, Manifest, ManifestOptions};
