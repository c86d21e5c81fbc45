// src/main.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use datasheet_extractor::extractors::DocumentTableSource;
use datasheet_extractor::mapping::{AliasResolver, ZonePolicy};
use datasheet_extractor::pipeline::DocumentPipeline;
use datasheet_extractor::source::manifest::{DEFAULT_LINK_HEADER, DEFAULT_TYPE_HEADER};
use datasheet_extractor::source::{HttpResolver, Manifest, ManifestOptions};
use datasheet_extractor::storage::{self, CsvRecordSink};
use datasheet_extractor::utils::{self, AppError};

/// Maps datasheet tables onto the columns of a product manifest
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV manifest: header row of canonical fields, one row per document
    #[arg(short, long)]
    manifest: PathBuf,

    /// Output CSV, one row per manifest document
    #[arg(short, long, default_value = "./output/records.csv")]
    output: PathBuf,

    /// Directory where downloaded datasheets are cached
    #[arg(long, default_value = "./cache")]
    cache_dir: PathBuf,

    /// Rows above the manifest header row
    #[arg(long, default_value_t = 0)]
    skip_rows: usize,

    /// Header of the column holding each document's link
    #[arg(long, default_value = DEFAULT_LINK_HEADER)]
    link_header: String,

    /// Header of the column holding each document's declared type
    #[arg(long, default_value = DEFAULT_TYPE_HEADER)]
    type_header: String,

    /// 0-based pages holding label/value tables
    #[arg(long, value_delimiter = ',', default_values_t = [2, 3])]
    direct_pages: Vec<usize>,

    /// 0-based pages holding per-type column tables
    #[arg(long, value_delimiter = ',', default_values_t = [4, 5])]
    type_pages: Vec<usize>,

    /// JSON file with extra label synonyms
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Pause before each download, in milliseconds
    #[arg(long, default_value_t = 150)]
    request_delay_ms: u64,

    /// Debug mode - save each document's extracted tables as JSON
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Static matching configuration, fixed for the whole run
    let policy = ZonePolicy::new(&args.direct_pages, &args.type_pages)?;
    let aliases = match &args.aliases {
        Some(path) => AliasResolver::with_rules_file(path)?,
        None => AliasResolver::default(),
    };

    // 4. Canonical schema and documents
    let options = ManifestOptions {
        skip_rows: args.skip_rows,
        link_header: args.link_header.clone(),
        type_header: args.type_header.clone(),
    };
    let manifest = Manifest::load(&args.manifest, &options)?;
    if manifest.documents().is_empty() {
        return Err(AppError::Config(format!(
            "No documents listed in {}",
            args.manifest.display()
        )));
    }

    // 5. Assemble the pipeline
    let request_delay = Duration::from_millis(args.request_delay_ms);
    let resolver = HttpResolver::new(&args.cache_dir, request_delay)?;
    let mut pipeline = DocumentPipeline::new(
        manifest.schema().clone(),
        aliases,
        policy,
        resolver,
        DocumentTableSource,
    );
    if args.debug {
        let debug_dir = args.output.with_extension("debug");
        std::fs::create_dir_all(&debug_dir)?;
        tracing::info!("Debug tables will be written to {}", debug_dir.display());
        pipeline = pipeline.with_debug_dir(debug_dir);
    }

    // 6. Process every document, one output row each
    let mut sink = CsvRecordSink::create(&args.output, &manifest)?;
    let summary = pipeline.run(manifest.documents(), &mut sink).await?;
    sink.finish()?;

    match storage::save_run_metadata(&args.output, &args.manifest, &summary) {
        Ok(path) => tracing::info!("Saved run metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save run metadata: {}", e),
    }

    tracing::info!(
        "Processing finished. Success: {}, Failures: {}, Fields filled: {}, Diagnostics: {}",
        summary.succeeded,
        summary.failed,
        summary.fields_filled,
        summary.diagnostics
    );

    if summary.succeeded == 0 && summary.failed > 0 {
        return Err(AppError::Processing(format!(
            "Failed to process any of {} documents",
            summary.failed
        )));
    }

    Ok(())
}
