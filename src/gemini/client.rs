//! Gemini `generateContent` REST client.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{AiClient, AiClientMetadata, Attachment, GeminiError};

/// A single conversation turn.
#[derive(Serialize, Deserialize, Debug, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

/// A text or inline-data fragment of a turn.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

/// Base64-encoded binary payload.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Sampling parameters.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API request body.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

/// Gemini API response candidate.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

/// Feedback attached when the prompt itself was blocked.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini API response.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn into_text(self) -> Result<String, GeminiError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(GeminiError::InvalidResponseFormat(match block_reason {
                Some(reason) => format!("prompt blocked: {reason}"),
                None => "no candidates in response".to_string(),
            }));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(GeminiError::InvalidResponseFormat(format!(
                "no text content in response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }
}

/// Gemini API client bound to one model and one set of sampling parameters.
pub struct GeminiClient {
    /// HTTP client for API requests.
    client: Client,
    /// API key sent as `x-goog-api-key`.
    api_key: String,
    /// Model identifier.
    model: String,
    /// REST base URL.
    api_base: String,
    temperature: f32,
    max_output_tokens: u32,
    /// Fold the system prompt into the first user turn instead of sending
    /// `systemInstruction`.
    system_prompt_as_user: bool,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    ///
    /// The system prompt is merged into the user turn by default; see
    /// [`with_system_prompt_as_user`](Self::with_system_prompt_as_user).
    pub fn new(
        model: String,
        api_key: String,
        api_base: String,
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(GeminiError::AuthenticationFailed("API key is empty".to_string()).into());
        }

        Ok(Self {
            client: super::build_http_client()?,
            api_key,
            model,
            api_base,
            temperature,
            max_output_tokens,
            system_prompt_as_user: true,
        })
    }

    /// Chooses between merging the system prompt into the user turn and
    /// sending it as a first-class `systemInstruction`.
    #[must_use]
    pub fn with_system_prompt_as_user(mut self, enabled: bool) -> Self {
        self.system_prompt_as_user = enabled;
        self
    }

    /// Builds the full `generateContent` URL.
    fn get_api_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    fn build_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        attachment: Option<&Attachment>,
    ) -> GenerateContentRequest {
        let (system_instruction, user_text) = if self.system_prompt_as_user {
            (None, merge_system_prompt(system_prompt, user_prompt))
        } else {
            let instruction = (!system_prompt.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_prompt.to_string()),
                    inline_data: None,
                }],
            });
            (instruction, user_prompt.to_string())
        };

        let mut parts = vec![Part {
            text: Some(user_text),
            inline_data: None,
        }];
        if let Some(attachment) = attachment {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: BASE64.encode(&attachment.data),
                }),
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        attachment: Option<&Attachment>,
    ) -> Result<String> {
        debug!(
            system_prompt_len = system_prompt.len(),
            user_prompt_len = user_prompt.len(),
            attachment_mime = attachment.map(|a| a.mime_type.as_str()),
            model = %self.model,
            "Preparing Gemini API request"
        );

        let request = self.build_request(system_prompt, user_prompt, attachment);
        let url = self.get_api_url();

        info!(
            url = %url,
            model = %self.model,
            temperature = self.temperature,
            max_output_tokens = self.max_output_tokens,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        let response = super::check_error_response(response).await?;

        let gemini_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::InvalidResponseFormat(e.to_string()))?;

        debug!(
            candidate_count = gemini_response.candidates.len(),
            "Received Gemini API response"
        );

        let result = gemini_response.into_text().map_err(Into::into);
        super::log_response_success(&result);
        result
    }
}

/// Folds a system prompt into the user turn, the way chat front-ends do for
/// models without a system role.
pub(crate) fn merge_system_prompt(system_prompt: &str, user_prompt: &str) -> String {
    if system_prompt.is_empty() {
        user_prompt.to_string()
    } else {
        format!("{system_prompt}\n\n{user_prompt}")
    }
}

impl AiClient for GeminiClient {
    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.generate(system_prompt, user_prompt, None))
    }

    fn send_request_with_attachment<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
        attachment: &'a Attachment,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.generate(system_prompt, user_prompt, Some(attachment)))
    }

    fn get_metadata(&self) -> AiClientMetadata {
        AiClientMetadata {
            provider: "Google Gemini".to_string(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            system_prompt_as_user: self.system_prompt_as_user,
        }
    }
}
