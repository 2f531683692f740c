// src/ocr/models.rs
#![allow(dead_code, non_snake_case)]
use serde::Deserialize;

use crate::utils::error::OcrError;

// These structs mirror the Document Intelligence analyze response, so we
// keep the service's camelCase field names instead of renaming everything.

/// Top-level envelope returned while polling an analyze operation.
#[derive(Deserialize, Debug, Clone)]
pub struct AnalyzeEnvelope {
    #[serde(default)]
    pub status: String, // "notStarted" | "running" | "succeeded" | "failed"
    pub analyzeResult: Option<AnalyzeResult>,
    pub error: Option<ServiceError>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServiceError {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// The completed analysis payload.
#[derive(Deserialize, Debug, Clone)]
pub struct AnalyzeResult {
    pub modelId: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Page {
    pub pageNumber: u32,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Table {
    pub rowCount: u32,
    pub columnCount: u32,
    #[serde(default)]
    pub cells: Vec<TableCell>,
    #[serde(default)]
    pub boundingRegions: Vec<BoundingRegion>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TableCell {
    pub rowIndex: u32,
    pub columnIndex: u32,
    #[serde(default)]
    pub content: String,
    pub rowSpan: Option<u32>,
    pub columnSpan: Option<u32>,
    #[serde(default)]
    pub boundingRegions: Vec<BoundingRegion>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BoundingRegion {
    pub pageNumber: u32,
}

/// Parses a raw analyze response body into the typed envelope.
pub fn parse_envelope(json: &str) -> Result<AnalyzeEnvelope, OcrError> {
    serde_json::from_str(json).map_err(|e| OcrError::Parse(e.to_string()))
}

impl AnalyzeEnvelope {
    /// Returns the analysis payload, or an error when the service reported
    /// success without attaching one.
    pub fn require_result(&self) -> Result<&AnalyzeResult, OcrError> {
        self.analyzeResult
            .as_ref()
            .ok_or_else(|| OcrError::Parse("response contains no analyzeResult".to_string()))
    }

    /// Best-effort error description for a failed operation.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(err) => {
                let code = err.code.as_deref().unwrap_or("unknown");
                let message = err.message.as_deref().unwrap_or("no message");
                format!("{}: {}", code, message)
            }
            None => "Unknown error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_completed_analyze_response() {
        let json = r#"{
            "status": "succeeded",
            "analyzeResult": {
                "modelId": "prebuilt-layout",
                "content": "1 2 3",
                "pages": [{"pageNumber": 1, "width": 8.5, "height": 11.0, "unit": "inch"}],
                "tables": [{
                    "rowCount": 2,
                    "columnCount": 14,
                    "cells": [
                        {"rowIndex": 0, "columnIndex": 0, "content": "1",
                         "boundingRegions": [{"pageNumber": 1}]},
                        {"rowIndex": 1, "columnIndex": 4, "content": "2023"}
                    ],
                    "boundingRegions": [{"pageNumber": 1}]
                }]
            }
        }"#;

        let envelope = parse_envelope(json).unwrap();
        assert_eq!(envelope.status, "succeeded");

        let result = envelope.require_result().unwrap();
        assert_eq!(result.modelId.as_deref(), Some("prebuilt-layout"));
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.tables.len(), 1);

        let table = &result.tables[0];
        assert_eq!(table.rowCount, 2);
        assert_eq!(table.cells[0].content, "1");
        assert_eq!(table.cells[1].columnIndex, 4);
        // Cells without bounding regions deserialize to an empty list.
        assert!(table.cells[1].boundingRegions.is_empty());
    }

    #[test]
    fn failed_response_carries_error_message() {
        let json = r#"{
            "status": "failed",
            "error": {"code": "InvalidRequest", "message": "content not recognized"}
        }"#;

        let envelope = parse_envelope(json).unwrap();
        assert_eq!(envelope.status, "failed");
        assert_eq!(
            envelope.error_message(),
            "InvalidRequest: content not recognized"
        );
        assert!(envelope.require_result().is_err());
    }
}
