// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 404 Not Found, 429 Too Many Requests

    #[error("Document Intelligence rate limit likely exceeded")]
    RateLimited,

    #[error("Document Intelligence credentials not configured: {0}")]
    Credentials(String),

    #[error("Analysis failed on the service side: {0}")]
    AnalysisFailed(String),

    #[error("Analysis did not complete within the polling budget")]
    PollTimeout,

    #[error("Failed to parse analyze result: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("No column indicator row found on any page of the document")]
    StructureNotFound,

    #[error(
        "Document exceeds the resource guard: {pages} pages / {rows} rows \
         (limit {max_pages} pages / {max_rows} rows)"
    )]
    DocumentTooLarge {
        pages: u32,
        rows: u32,
        max_pages: u32,
        max_rows: u32,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document Intelligence interaction failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
