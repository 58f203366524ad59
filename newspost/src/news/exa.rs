use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info};

use common::{NewsArticle, UNKNOWN_SOURCE};

use super::{lookback_window, NewsProvider, DESCRIPTION_FALLBACK_CHARS, RESULT_COUNT};
use crate::bootstrap::{require_credential, validate_endpoint};
use crate::error::{ConfigurationError, NewsFetchError};

/// News client backed by the Exa neural search API
pub struct ExaNewsClient {
    api_url: String,
    api_key: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl ExaNewsClient {
    /// Fails when the key is empty or the endpoint is not a valid URL.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let api_url = validate_endpoint(api_url.into())?;
        let api_key = require_credential("news API key", api_key.into())?;
        Ok(Self {
            api_url,
            api_key,
            timeout: None,
            client: reqwest::Client::new(),
        })
    }

    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout = timeout_secs.map(Duration::from_secs);
        self
    }

    async fn search(&self, keyword: &str) -> Result<Vec<NewsArticle>> {
        let (start, end) = lookback_window(Local::now().date_naive());
        // Build Exa search request
        let body = SearchRequest {
            query: keyword,
            category: "news",
            search_type: "neural",
            use_autoprompt: true,
            start_published_date: start,
            end_published_date: end,
            num_results: RESULT_COUNT,
            contents: ContentsOptions {
                text: true,
                highlights: true,
                summary: true,
            },
        };

        // Make HTTP request; the timeout also covers reading the body
        let exchange = async {
            let response = self
                .client
                .post(&self.api_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
                .context("news search HTTP request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("news search API error {}: {}", status, body);
            }

            response
                .json::<SearchResponse>()
                .await
                .context("Failed to parse news search response")
        };

        let payload = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .context("news search timed out")??,
            None => exchange.await?,
        };

        Ok(payload.results.into_iter().map(map_result).collect())
    }
}

#[async_trait]
impl NewsProvider for ExaNewsClient {
    async fn fetch_news(&self, keyword: &str) -> Result<Vec<NewsArticle>, NewsFetchError> {
        let t0 = Instant::now();
        match self.search(keyword).await {
            Ok(articles) => {
                info!(
                    keyword,
                    count = articles.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "news search succeeded"
                );
                Ok(articles)
            }
            Err(e) => {
                error!(keyword, error = %format!("{:#}", e), "news search failed");
                Err(NewsFetchError::new(e))
            }
        }
    }
}

/// Normalize one raw search result.
///
/// Description falls back from the summary to the first highlight to the
/// leading characters of the raw text. A missing author becomes
/// [`UNKNOWN_SOURCE`].
pub fn map_result(result: SearchResult) -> NewsArticle {
    let source = result
        .author
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    let first_highlight = result
        .highlights
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(Highlight::into_text)
        .filter(|h| !h.is_empty());

    let description = result
        .summary
        .filter(|s| !s.is_empty())
        .or(first_highlight)
        .unwrap_or_else(|| {
            result
                .text
                .unwrap_or_default()
                .chars()
                .take(DESCRIPTION_FALLBACK_CHARS)
                .collect()
        });

    let published = result.published_date.unwrap_or_default();

    NewsArticle {
        title: result.title.unwrap_or_default(),
        source,
        description,
        last_updated: published.clone(),
        date_created: published,
        url: result.url.filter(|u| !u.is_empty()),
    }
}

// Exa API request/response structures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    query: &'a str,
    category: &'static str,
    #[serde(rename = "type")]
    search_type: &'static str,
    use_autoprompt: bool,
    start_published_date: String,
    end_published_date: String,
    num_results: u32,
    contents: ContentsOptions,
}

#[derive(Debug, Serialize)]
struct ContentsOptions {
    text: bool,
    highlights: bool,
    summary: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

/// One raw search hit as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "published")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub highlights: Option<Vec<Highlight>>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Highlights come back either as plain strings or as scored snippets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Highlight {
    Text(String),
    Scored {
        text: String,
        #[serde(default)]
        score: Option<f64>,
    },
}

impl Highlight {
    fn into_text(self) -> String {
        match self {
            Highlight::Text(text) | Highlight::Scored { text, .. } => text,
        }
    }
}
