//! Vision-capable OCR backends: a generic vision API and a language-model
//! path. Both ship the document as base64 inline data and get free text back.

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::ocr::OcrBackend;
use super::ExtractionError;
use crate::models::RawDocument;

const REQUEST_TIMEOUT_SECS: u64 = 180;

/// Extraction instruction for the language-model path. Models drift toward
/// summarizing; the prompt pins them to transcription.
const LLM_OCR_PROMPT: &str = "\
Extract ALL visible text from this scanned police report document. \
Transcribe exactly what is printed, preserving line breaks, section headers, \
form labels, and tables. Do not summarize, interpret, or omit anything.";

const LLM_OCR_SYSTEM: &str = "\
You are a document transcription engine. Output only the transcribed text.";

fn http_client() -> Result<reqwest::Client, ExtractionError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ExtractionError::OcrRequest(e.to_string()))
}

fn mime_type_for(document: &RawDocument) -> &'static str {
    match document.filename() {
        Some(name) if name.to_ascii_lowercase().ends_with(".png") => "image/png",
        Some(name) if name.to_ascii_lowercase().ends_with(".jpg") => "image/jpeg",
        Some(name) if name.to_ascii_lowercase().ends_with(".jpeg") => "image/jpeg",
        Some(name) if name.to_ascii_lowercase().ends_with(".tif") => "image/tiff",
        Some(name) if name.to_ascii_lowercase().ends_with(".tiff") => "image/tiff",
        _ => "application/pdf",
    }
}

// ──────────────────────────────────────────────
// Vision API
// ──────────────────────────────────────────────

/// Generic vision API backend (files:annotate-style document text detection).
pub struct VisionApiOcr {
    api_key: String,
    endpoint: String,
}

impl VisionApiOcr {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: "https://vision.googleapis.com/v1/files:annotate".into(),
        }
    }

    /// Override the endpoint (tests).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[derive(Serialize)]
struct VisionRequest<'a> {
    requests: Vec<VisionFileRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisionFileRequest<'a> {
    input_config: VisionInputConfig<'a>,
    features: Vec<VisionFeature<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisionInputConfig<'a> {
    content: String,
    mime_type: &'a str,
}

#[derive(Serialize)]
struct VisionFeature<'a> {
    #[serde(rename = "type")]
    feature_type: &'a str,
}

#[derive(Deserialize)]
struct VisionResponse {
    responses: Vec<VisionFileResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionFileResponse {
    #[serde(default)]
    responses: Vec<VisionPageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisionPageResponse {
    full_text_annotation: Option<VisionTextAnnotation>,
}

#[derive(Deserialize)]
struct VisionTextAnnotation {
    text: String,
}

#[async_trait]
impl OcrBackend for VisionApiOcr {
    async fn ocr(
        &self,
        document: &RawDocument,
        _page_count: Option<usize>,
    ) -> Result<String, ExtractionError> {
        let body = VisionRequest {
            requests: vec![VisionFileRequest {
                input_config: VisionInputConfig {
                    content: base64::engine::general_purpose::STANDARD.encode(document.bytes()),
                    mime_type: mime_type_for(document),
                },
                features: vec![VisionFeature {
                    feature_type: "DOCUMENT_TEXT_DETECTION",
                }],
            }],
        };

        let url = format!("{}?key={}", self.endpoint, self.api_key);
        let response = http_client()?
            .post(&url)
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

        let parsed: VisionResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::OcrResponse(e.to_string()))?;

        let text = parsed
            .responses
            .into_iter()
            .flat_map(|f| f.responses)
            .filter_map(|p| p.full_text_annotation)
            .map(|a| a.text)
            .collect::<Vec<_>>()
            .join("\n");

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "vision_api"
    }
}

// ──────────────────────────────────────────────
// Language-model OCR
// ──────────────────────────────────────────────

/// Vision-capable language model driven through a generate endpoint.
pub struct LanguageModelOcr {
    base_url: String,
    model: String,
}

impl LanguageModelOcr {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    images: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl OcrBackend for LanguageModelOcr {
    async fn ocr(
        &self,
        document: &RawDocument,
        _page_count: Option<usize>,
    ) -> Result<String, ExtractionError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt: LLM_OCR_PROMPT,
            system: LLM_OCR_SYSTEM,
            stream: false,
            images: vec![base64::engine::general_purpose::STANDARD.encode(document.bytes())],
        };

        let response = http_client()?
            .post(&url)
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

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::OcrResponse(e.to_string()))?;

        Ok(parsed.response)
    }

    fn name(&self) -> &'static str {
        "language_model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn language_model_backend_parses_generate_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "CASE NO: 24-123456\nNAME USED AT ARREST: Roberts, Chandee"
            })))
            .mount(&server)
            .await;

        let backend = LanguageModelOcr::new(server.uri(), "llava:13b".into());
        let doc = RawDocument::new(vec![0xde, 0xad], Some("scan.pdf".into()));
        let text = backend.ocr(&doc, None).await.unwrap();
        assert!(text.contains("Roberts, Chandee"));
    }

    #[tokio::test]
    async fn language_model_backend_maps_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let backend = LanguageModelOcr::new(server.uri(), "llava:13b".into());
        let doc = RawDocument::new(vec![1], None);
        let err = backend.ocr(&doc, None).await.unwrap_err();
        assert!(matches!(err, ExtractionError::OcrStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn vision_backend_joins_page_annotations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "responses": [{
                    "responses": [
                        { "fullTextAnnotation": { "text": "Page one text" } },
                        { "fullTextAnnotation": { "text": "Page two text" } }
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let backend = VisionApiOcr::new("key".into())
            .with_endpoint(format!("{}/v1/files:annotate", server.uri()));
        let doc = RawDocument::new(vec![1], Some("scan.pdf".into()));
        let text = backend.ocr(&doc, None).await.unwrap();
        assert_eq!(text, "Page one text\nPage two text");
    }

    #[test]
    fn mime_type_follows_filename_hint() {
        let pdf = RawDocument::new(vec![], Some("report.pdf".into()));
        let png = RawDocument::new(vec![], Some("SCAN.PNG".into()));
        let unknown = RawDocument::new(vec![], None);
        assert_eq!(mime_type_for(&pdf), "application/pdf");
        assert_eq!(mime_type_for(&png), "image/png");
        assert_eq!(mime_type_for(&unknown), "application/pdf");
    }
}
