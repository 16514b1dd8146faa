//! Medical document analysis through the vision handle.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::gemini::{AiClient, Attachment};
use crate::prompts::{analysis_system_prompt, Language};

/// Media types sent to the model as inline binary data.
pub const INLINE_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
    "application/pdf",
];

/// Errors specific to document analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The uploaded file has no content.
    #[error("Uploaded file is empty")]
    EmptyDocument,

    /// The media type cannot be analysed.
    #[error("Unsupported file type: {0}. Upload an image, a PDF or a text file")]
    UnsupportedMediaType(String),

    /// A text upload is not valid UTF-8.
    #[error("Text file is not valid UTF-8")]
    InvalidText,
}

/// An uploaded document.
#[derive(Clone, Debug)]
pub struct Document {
    /// Client-supplied file name, for logging only.
    pub file_name: String,
    /// Media type, e.g. `image/png`.
    pub mime_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Structured analysis returned to the frontend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Text read from the document.
    #[serde(default)]
    pub extracted_text: String,
    /// Plain-language summary.
    #[serde(default)]
    pub summary: String,
    /// Notable findings.
    #[serde(default)]
    pub key_findings: Vec<String>,
    /// General recommendations.
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Suggested next steps.
    #[serde(default)]
    pub next_steps: Vec<String>,
}

enum Payload {
    Inline(Attachment),
    Text(String),
}

impl Document {
    fn normalized_mime(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    fn into_payload(self) -> Result<Payload, AnalysisError> {
        if self.bytes.is_empty() {
            return Err(AnalysisError::EmptyDocument);
        }
        let mime = self.normalized_mime();
        if INLINE_MEDIA_TYPES.contains(&mime.as_str()) {
            Ok(Payload::Inline(Attachment {
                mime_type: mime,
                data: self.bytes,
            }))
        } else if mime == "text/plain" {
            String::from_utf8(self.bytes)
                .map(Payload::Text)
                .map_err(|_| AnalysisError::InvalidText)
        } else {
            Err(AnalysisError::UnsupportedMediaType(self.mime_type))
        }
    }
}

/// Analyses uploaded documents with the vision handle.
pub struct DocumentAnalyzer {
    client: Arc<dyn AiClient>,
}

impl DocumentAnalyzer {
    /// Creates an analyzer over the given handle.
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        Self { client }
    }

    /// Analyses `document` and answers in `language`.
    pub async fn analyze(&self, document: Document, language: &str) -> Result<AnalysisResult> {
        let language = Language::from_tag(language);
        let system_prompt = analysis_system_prompt(language);
        let file_name = document.file_name.clone();

        debug!(
            file_name = %file_name,
            mime_type = %document.mime_type,
            size = document.bytes.len(),
            language = language.tag(),
            "Analysing document"
        );

        let reply = match document.into_payload()? {
            Payload::Inline(attachment) => {
                self.client
                    .send_request_with_attachment(
                        &system_prompt,
                        "Analyse the attached document.",
                        &attachment,
                    )
                    .await?
            }
            Payload::Text(text) => {
                let user_prompt = format!("Analyse this document:\n\n{text}");
                self.client.send_request(&system_prompt, &user_prompt).await?
            }
        };

        Ok(parse_analysis(&reply, &file_name))
    }
}

/// Parses the model's JSON reply, falling back to treating the whole reply
/// as the summary.
fn parse_analysis(reply: &str, file_name: &str) -> AnalysisResult {
    let json = strip_code_fence(reply);
    match serde_json::from_str::<AnalysisResult>(json) {
        Ok(result) => result,
        Err(e) => {
            warn!(file_name = %file_name, error = %e, "Analysis reply was not JSON; using it as summary");
            AnalysisResult {
                summary: reply.trim().to_string(),
                ..AnalysisResult::default()
            }
        }
    }
}

/// Returns the contents of a Markdown code fence if the text is wrapped in one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
