//! Web Search Tool
//!
//! The retrieval capability offered to the reasoning service when an agent
//! asks for it. The core never calls it directly; the agent client runs it
//! when the model requests the `web_search` function.

use anyhow::{Context, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::fmt::Write as _;

/// Name of the function the model sees.
pub const WEB_SEARCH_TOOL: &str = "web_search";

const GOOGLE_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
const RESULTS_PER_QUERY: u8 = 5;

/// Arguments the model passes when calling the search function.
#[derive(Deserialize, JsonSchema, Debug)]
pub struct WebSearchArgs {
    /// The search query.
    #[schemars(description = "The search query.")]
    pub query: String,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A backend able to answer web searches.
#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Formats hits as the plain-text tool result handed back to the model.
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".to_string();
    }
    let mut out = String::new();
    for hit in hits {
        let _ = writeln!(out, "{} - {}", hit.title, hit.url);
        if !hit.snippet.is_empty() {
            let _ = writeln!(out, "  {}", hit.snippet);
        }
    }
    out
}

/// Google Programmable Search (Custom Search JSON API).
pub struct GoogleSearch {
    http: reqwest::Client,
    api_key: String,
    engine_id: String,
}

impl GoogleSearch {
    pub fn new(api_key: String, engine_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            engine_id,
        }
    }
}

#[derive(Deserialize)]
struct GoogleSearchResponse {
    #[serde(default)]
    items: Vec<GoogleSearchItem>,
}

#[derive(Deserialize)]
struct GoogleSearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

#[async_trait]
impl SearchTool for GoogleSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let num = RESULTS_PER_QUERY.to_string();
        let response: GoogleSearchResponse = self
            .http
            .get(GOOGLE_SEARCH_ENDPOINT)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .context("search request failed")?
            .error_for_status()
            .context("search API returned an error status")?
            .json()
            .await
            .context("could not decode search response")?;

        Ok(response
            .items
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                url: item.link,
                snippet: item.snippet.replace('\n', " "),
            })
            .collect())
    }
}
