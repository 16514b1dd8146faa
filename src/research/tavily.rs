//! Tavily search API client.

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ResearchError;

/// Domains searched for medical research.
pub const TRUSTED_DOMAINS: &[&str] = &[
    "pubmed.ncbi.nlm.nih.gov",
    "ncbi.nlm.nih.gov",
    "who.int",
    "cdc.gov",
];

/// Number of hits requested per query.
pub const MAX_RESULTS: u32 = 5;

/// Tavily search request body.
#[derive(Serialize, Debug)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: &'static str,
    include_domains: &'a [&'a str],
}

/// One search hit.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Extracted page content.
    #[serde(default)]
    pub content: String,
    /// Relevance score.
    #[serde(default)]
    pub score: f64,
}

/// Tavily search response.
#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// Tavily search API client.
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    /// Creates a new client.
    pub fn new(api_key: String, base_url: String) -> Result<Self> {
        Ok(Self {
            client: crate::gemini::build_http_client()?,
            api_key,
            base_url,
        })
    }

    fn get_api_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }

    /// Searches the trusted medical domains.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            query,
            max_results: MAX_RESULTS,
            search_depth: "basic",
            include_domains: TRUSTED_DOMAINS,
        };
        let url = self.get_api_url();
        info!(url = %url, query_len = query.len(), "Sending request to Tavily API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ResearchError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResearchError::ApiRequestFailed(format!("HTTP {status}: {error_text}")).into());
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::InvalidResponseFormat(e.to_string()))?;

        debug!(hit_count = search.results.len(), "Received Tavily API response");
        Ok(search.results)
    }
}
