//! Medical research: trusted-source search plus a model-written summary.

pub mod tavily;

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::gemini::AiClient;
use crate::prompts::{research_system_prompt, Language};
pub use tavily::{SearchHit, TavilyClient};

/// Longest excerpt kept per result, in characters.
pub const EXCERPT_CHARS: usize = 400;

/// Research errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResearchError {
    /// No Tavily credential is configured.
    #[error("Research is not configured. Set tavily_api_key")]
    NotConfigured,

    /// The query is blank.
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// Tavily API request failed with error message.
    #[error("Tavily API request failed: {0}")]
    ApiRequestFailed(String),

    /// Invalid response format from Tavily API.
    #[error("Invalid response format from Tavily API: {0}")]
    InvalidResponseFormat(String),

    /// Network connectivity error.
    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Publisher of a research result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Source {
    /// US National Library of Medicine.
    PubMed,
    /// World Health Organization.
    #[serde(rename = "WHO")]
    Who,
    /// US Centers for Disease Control and Prevention.
    #[serde(rename = "CDC")]
    Cdc,
}

impl Source {
    /// Classifies a result URL by host. Unknown hosts count as PubMed.
    pub fn from_url(url: &str) -> Self {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
            .unwrap_or_default();

        if host == "who.int" || host.ends_with(".who.int") {
            Self::Who
        } else if host == "cdc.gov" || host.ends_with(".cdc.gov") {
            Self::Cdc
        } else {
            Self::PubMed
        }
    }
}

/// One research result as returned to the frontend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResearchResult {
    /// Page title.
    pub title: String,
    /// Publisher.
    pub source: Source,
    /// Excerpt of the page content.
    pub summary: String,
    /// Page URL.
    pub url: String,
}

/// Research response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResearchResponse {
    /// The query as received.
    pub query: String,
    /// Hits in relevance order.
    pub results: Vec<ResearchResult>,
    /// Model-written synthesis; absent when there are no hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Runs searches and summarises the hits.
pub struct ResearchService {
    search: Option<TavilyClient>,
    client: Arc<dyn AiClient>,
}

impl ResearchService {
    /// Creates a service; `search` is `None` when research is disabled.
    pub fn new(search: Option<TavilyClient>, client: Arc<dyn AiClient>) -> Self {
        Self { search, client }
    }

    /// Searches for `query` and summarises the hits in `language`.
    pub async fn research(&self, query: &str, language: &str) -> Result<ResearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResearchError::EmptyQuery.into());
        }
        let search = self.search.as_ref().ok_or(ResearchError::NotConfigured)?;
        let language = Language::from_tag(language);

        let hits = search.search(query).await?;
        debug!(hit_count = hits.len(), language = language.tag(), "Research hits received");

        if hits.is_empty() {
            return Ok(ResearchResponse {
                query: query.to_string(),
                results: Vec::new(),
                summary: None,
            });
        }

        let summary = self
            .client
            .send_request(research_system_prompt(language), &render_hits(query, &hits))
            .await?;

        Ok(ResearchResponse {
            query: query.to_string(),
            results: hits.into_iter().map(to_result).collect(),
            summary: Some(summary),
        })
    }
}

fn to_result(hit: SearchHit) -> ResearchResult {
    ResearchResult {
        source: Source::from_url(&hit.url),
        summary: excerpt(&hit.content, EXCERPT_CHARS),
        title: hit.title,
        url: hit.url,
    }
}

fn render_hits(query: &str, hits: &[SearchHit]) -> String {
    let mut prompt = format!("Question: {query}\n\nExcerpts:\n");
    for (i, hit) in hits.iter().enumerate() {
        let _ = write!(
            prompt,
            "\n[{}] {} ({:?})\n{}\n{}\n",
            i + 1,
            hit.title,
            Source::from_url(&hit.url),
            hit.url,
            hit.content.trim()
        );
    }
    prompt
}

/// Truncates to `max_chars` characters, appending an ellipsis when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::test_utils::ConfigurableMockAiClient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn tavily_with(results: serde_json::Value) -> (MockServer, TavilyClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
            .mount(&server)
            .await;
        let client = TavilyClient::new("tvly-test".to_string(), server.uri()).unwrap();
        (server, client)
    }

    #[test]
    fn source_is_classified_by_host() {
        assert_eq!(Source::from_url("https://www.who.int/health-topics/malaria"), Source::Who);
        assert_eq!(Source::from_url("https://www.cdc.gov/malaria/"), Source::Cdc);
        assert_eq!(
            Source::from_url("https://pubmed.ncbi.nlm.nih.gov/12345/"),
            Source::PubMed
        );
        assert_eq!(Source::from_url("https://notwho.int.example.com"), Source::PubMed);
        assert_eq!(Source::from_url("not a url"), Source::PubMed);
    }

    #[test]
    fn source_serialises_as_display_name() {
        assert_eq!(serde_json::to_value(Source::Who).unwrap(), "WHO");
        assert_eq!(serde_json::to_value(Source::PubMed).unwrap(), "PubMed");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(excerpt(&text, 3), "ééé…");
        assert_eq!(excerpt("short", 10), "short");
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let service = ResearchService::new(None, Arc::new(ConfigurableMockAiClient::new(vec![])));
        let err = service.research("   ", "en").await.unwrap_err();
        assert_eq!(err.downcast_ref::<ResearchError>(), Some(&ResearchError::EmptyQuery));
    }

    #[tokio::test]
    async fn missing_search_client_is_not_configured() {
        let service = ResearchService::new(None, Arc::new(ConfigurableMockAiClient::new(vec![])));
        let err = service.research("malaria", "en").await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<ResearchError>(),
            Some(&ResearchError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn hits_are_mapped_and_summarised() {
        let (_server, tavily) = tavily_with(json!([
            {
                "title": "Malaria fact sheet",
                "url": "https://www.who.int/news-room/fact-sheets/detail/malaria",
                "content": "Malaria is preventable and curable.",
                "score": 0.9
            },
            {
                "title": "Bed nets trial",
                "url": "https://pubmed.ncbi.nlm.nih.gov/1/",
                "content": "Insecticide-treated nets reduce mortality.",
                "score": 0.8
            }
        ]))
        .await;
        let mock = ConfigurableMockAiClient::new(vec![Ok("Nets and treatment work.".to_string())]);
        let prompts = mock.prompt_handle();
        let service = ResearchService::new(Some(tavily), Arc::new(mock));

        let response = service.research(" malaria prevention ", "fr").await.unwrap();

        assert_eq!(response.query, "malaria prevention");
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].source, Source::Who);
        assert_eq!(response.results[1].source, Source::PubMed);
        assert_eq!(response.summary.as_deref(), Some("Nets and treatment work."));

        let recorded = prompts.prompts();
        assert!(recorded[0].0.contains("français"));
        assert!(recorded[0].1.contains("[2] Bed nets trial"));
    }

    #[tokio::test]
    async fn no_hits_skips_the_model() {
        let (_server, tavily) = tavily_with(json!([])).await;
        let mock = ConfigurableMockAiClient::new(vec![]);
        let prompts = mock.prompt_handle();
        let service = ResearchService::new(Some(tavily), Arc::new(mock));

        let response = service.research("rare query", "en").await.unwrap();

        assert!(response.results.is_empty());
        assert!(response.summary.is_none());
        assert_eq!(prompts.request_count(), 0);
    }
}
