// src/ocr/client.rs
use std::time::Duration;

use crate::ocr::models::parse_envelope;
use crate::utils::error::OcrError;

const ENDPOINT_ENV: &str = "AZURE_DI_ENDPOINT";
const KEY_ENV: &str = "AZURE_DI_KEY";
// The layout model returns tables with per-cell row/column indices.
const MODEL_ID: &str = "prebuilt-layout";
const API_VERSION: &str = "2024-11-30";
// Analysis runs asynchronously on the service side. Poll every 2s and
// give up after 60 attempts.
const POLL_DELAY_MS: u64 = 2_000;
const MAX_POLLS: u32 = 60;

/// Client for the Document Intelligence analyze API.
pub struct DocumentIntelligenceClient {
    endpoint: String,
    key: String,
    client: reqwest::Client,
}

impl DocumentIntelligenceClient {
    /// Builds a client from the `AZURE_DI_ENDPOINT` and `AZURE_DI_KEY`
    /// environment variables.
    pub fn from_env() -> Result<Self, OcrError> {
        let endpoint = std::env::var(ENDPOINT_ENV).map_err(|_| {
            OcrError::Credentials(format!("check {} and {}", ENDPOINT_ENV, KEY_ENV))
        })?;
        let key = std::env::var(KEY_ENV).map_err(|_| {
            OcrError::Credentials(format!("check {} and {}", ENDPOINT_ENV, KEY_ENV))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        tracing::info!("Document Intelligence client initialized for {}", endpoint);
        Ok(DocumentIntelligenceClient {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
            client,
        })
    }

    /// Submits a document for layout analysis and waits for completion.
    ///
    /// Returns the raw analyze response body, so the caller can both
    /// persist it for debugging and parse it into the typed model.
    pub async fn analyze_document(&self, document: Vec<u8>) -> Result<String, OcrError> {
        let url = format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
            self.endpoint, MODEL_ID, API_VERSION
        );

        tracing::info!(
            "Submitting {} byte document for analysis with model {}",
            document.len(),
            MODEL_ID
        );

        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Analyze request rejected with status {}", status);
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Received 429 - slow down submissions or raise the service tier.");
                return Err(OcrError::RateLimited);
            }
            return Err(OcrError::Http(status));
        }

        // The service replies 202 with the result's polling URL.
        let operation_url = response
            .headers()
            .get("Operation-Location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| OcrError::Parse("missing Operation-Location header".to_string()))?;

        self.wait_for_result(&operation_url).await
    }

    async fn wait_for_result(&self, operation_url: &str) -> Result<String, OcrError> {
        for attempt in 1..=MAX_POLLS {
            tokio::time::sleep(Duration::from_millis(POLL_DELAY_MS)).await;

            let response = self
                .client
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.key)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(OcrError::Http(response.status()));
            }

            let body = response.text().await?;
            let envelope = parse_envelope(&body)?;

            match envelope.status.as_str() {
                "succeeded" => {
                    tracing::info!("Analysis completed after {} polls", attempt);
                    return Ok(body);
                }
                "failed" => {
                    return Err(OcrError::AnalysisFailed(envelope.error_message()));
                }
                other => {
                    tracing::debug!("Analysis status after poll {}: {}", attempt, other);
                }
            }
        }

        Err(OcrError::PollTimeout)
    }
}
