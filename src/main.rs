// src/main.rs
mod ocr;
mod parser;
mod storage;
mod utils;

use std::path::{Path, PathBuf};

use clap::Parser;

use ocr::client::DocumentIntelligenceClient;
use ocr::models::parse_envelope;
use parser::{IncomeStatementParser, ParserConfig};
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the income statement extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the source document (PDF or image) to send for analysis
    #[arg(short, long, conflicts_with = "analyze_json")]
    document: Option<PathBuf>,

    /// Path to a saved analyze response, skipping the OCR service
    #[arg(short = 'j', long)]
    analyze_json: Option<PathBuf>,

    /// Output directory for parsed results
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Absolute tolerance when reconciling computed against stated totals
    #[arg(long, default_value = "0.01")]
    tolerance: f64,

    /// Override the maximum number of table rows processed per document
    #[arg(long)]
    max_rows: Option<u32>,

    /// Debug mode - save the raw analyze response and a grid preview
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Obtain the raw analyze response, either from the service or from
    //    a previously saved file
    let (raw_json, source_path) = if let Some(document_path) = &args.document {
        tracing::info!("Analyzing document: {}", document_path.display());
        let bytes = std::fs::read(document_path)?;
        let client = DocumentIntelligenceClient::from_env()?;
        let body = client.analyze_document(bytes).await?;
        (body, document_path.clone())
    } else if let Some(json_path) = &args.analyze_json {
        tracing::info!("Reading saved analyze response: {}", json_path.display());
        (std::fs::read_to_string(json_path)?, json_path.clone())
    } else {
        return Err(AppError::Config(
            "Provide either --document or --analyze-json".to_string(),
        ));
    };

    let stem = stem_of(&source_path);

    // 5. Build the table grids from the analyze response
    let envelope = parse_envelope(&raw_json)?;
    let analyze = envelope.require_result()?;
    let pages = ocr::grid::pages_from_analyze(analyze);
    tracing::info!("Built {} table grids from the analyze response", pages.len());

    if args.debug {
        let debug_dir = storage.document_dir(&stem)?.join("debug");
        std::fs::create_dir_all(&debug_dir)?;

        let raw_path = debug_dir.join("raw_analyze.json");
        std::fs::write(&raw_path, &raw_json)?;
        tracing::info!("Saved raw analyze response to: {}", raw_path.display());

        let preview_path = debug_dir.join("grid_preview.txt");
        if let Err(e) = utils::grid_debug::save_grid_preview(&pages, &preview_path) {
            tracing::warn!("Failed to save grid preview: {}", e);
        }
    }

    // 6. Parse the document
    let mut config = ParserConfig::default();
    config.tolerance = args.tolerance;
    if let Some(max_rows) = args.max_rows {
        config.max_rows = max_rows;
    }

    let income_parser = IncomeStatementParser::with_config(config);
    let result = income_parser.parse(&pages)?;

    // 7. Surface row-level problems, then print the summary
    for diagnostic in &result.diagnostics {
        tracing::warn!("Row dropped: {}", diagnostic);
    }

    let summary = parser::report::text_summary(&result);
    println!("{}", summary);

    // 8. Persist the artifacts
    match storage.save_result(&stem, &result) {
        Ok(path) => tracing::info!("Saved result to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save result: {}", e),
    }

    match storage.save_summary(&stem, &summary) {
        Ok(path) => tracing::info!("Saved summary to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save summary: {}", e),
    }

    match storage.save_metadata(&stem, &source_path.display().to_string(), &result) {
        Ok(path) => tracing::info!("Saved metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save metadata: {}", e),
    }

    tracing::info!(
        "Processing finished. Years: {}, grand total: {:.2}, diagnostics: {}",
        result.years.len(),
        result.grand_total,
        result.diagnostics.len()
    );

    Ok(())
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string()
}
