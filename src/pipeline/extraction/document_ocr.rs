//! Structured-document OCR service client.
//!
//! The service takes raw bytes + mime type and returns extracted text. Large
//! documents are split into consecutive page-range sub-documents before
//! upload: per-call payload size and request duration both scale with page
//! count, and the service enforces its own page limit. Chunk results are
//! concatenated with an explicit page-break marker so downstream consumers
//! can still see the seams.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::ocr::{OcrBackend, PAGE_BREAK_MARKER};
use super::pdf::PdfTextExtractor;
use super::ExtractionError;
use crate::models::RawDocument;

/// Documents over this many pages are chunked.
pub const PAGE_CHUNK_THRESHOLD: usize = 30;

const REQUEST_TIMEOUT_SECS: u64 = 300;

pub struct DocumentOcrClient {
    endpoint: String,
    project_id: String,
    processor_id: String,
    access_token: String,
}

impl DocumentOcrClient {
    pub fn new(
        endpoint: String,
        project_id: String,
        processor_id: String,
        access_token: String,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id,
            processor_id,
            access_token,
        }
    }

    fn process_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/processors/{}:process",
            self.endpoint, self.project_id, self.processor_id
        )
    }

    async fn process_chunk(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        let body = ProcessRequest {
            raw_document: RawDocumentPayload {
                content: base64::engine::general_purpose::STANDARD.encode(bytes),
                mime_type,
            },
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ExtractionError::OcrRequest(e.to_string()))?;

        let response = client
            .post(self.process_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractionError::OcrRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::OcrStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ProcessResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::OcrResponse(e.to_string()))?;

        Ok(parsed.document.map(|d| d.text).unwrap_or_default())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    raw_document: RawDocumentPayload<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocumentPayload<'a> {
    content: String,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct ProcessResponse {
    document: Option<ProcessedDocument>,
}

#[derive(Deserialize)]
struct ProcessedDocument {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl OcrBackend for DocumentOcrClient {
    async fn ocr(
        &self,
        document: &RawDocument,
        page_count: Option<usize>,
    ) -> Result<String, ExtractionError> {
        let pages = match page_count {
            Some(n) => n,
            None => PdfTextExtractor.page_count(document.bytes()).unwrap_or(1),
        };

        if pages <= PAGE_CHUNK_THRESHOLD {
            return self.process_chunk(document.bytes(), "application/pdf").await;
        }

        tracing::info!(
            document_id = %document.id(),
            pages,
            threshold = PAGE_CHUNK_THRESHOLD,
            "Chunking document for structured OCR"
        );

        let chunks =
            PdfTextExtractor.split_page_ranges(document.bytes(), PAGE_CHUNK_THRESHOLD)?;

        let mut parts = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let text = self.process_chunk(chunk, "application/pdf").await?;
            tracing::debug!(
                document_id = %document.id(),
                chunk = i + 1,
                of = chunks.len(),
                text_length = text.len(),
                "Chunk OCR complete"
            );
            parts.push(text);
        }

        Ok(parts.join(PAGE_BREAK_MARKER))
    }

    fn name(&self) -> &'static str {
        "document_ocr"
    }
}
