// src/storage/mod.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::parser::{report, ParseResult};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory all artifacts of one document land in: /base_dir/stem/
    pub fn document_dir(&self, stem: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(stem);

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        Ok(target_dir)
    }

    /// Saves the machine-readable result as result.json
    pub fn save_result(&self, stem: &str, result: &ParseResult) -> Result<PathBuf, StorageError> {
        let file_path = self.document_dir(stem)?.join("result.json");

        let payload = serde_json::json!({
            "data": report::machine_json(result),
            "grand_total": result.grand_total,
            "verification": result.verification,
            "diagnostics": result.diagnostics,
        });

        let payload_str = serde_json::to_string_pretty(&payload)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, payload_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved result to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves the human-readable summary as summary.txt
    pub fn save_summary(&self, stem: &str, summary: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.document_dir(stem)?.join("summary.txt");

        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        file.write_all(summary.as_bytes())
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved summary to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves processing metadata about one document in JSON format
    pub fn save_metadata(
        &self,
        stem: &str,
        source: &str,
        result: &ParseResult,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.document_dir(stem)?.join("meta.json");

        let code_count: usize = result.years.iter().map(|year| year.codes.len()).sum();
        let metadata = serde_json::json!({
            "source_document": source,
            "years": result.years.len(),
            "codes": code_count,
            "grand_total": result.grand_total,
            "total_match": result.verification.total_match,
            "diagnostics": result.diagnostics.len(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}
