use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
};

const SEARCH_CACHE_TTL: u64 = 604_800; // 1 week

/// A title as returned by the third-party metadata API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleSummary {
    pub id: i64,
    pub name: String,
    pub original_name: Option<String>,
    pub media_type: String,
    pub release_year: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: i64,
    #[serde(alias = "title")]
    name: Option<String>,
    #[serde(alias = "original_title")]
    original_name: Option<String>,
    media_type: Option<String>,
    #[serde(alias = "release_date")]
    first_air_date: Option<String>,
}

/// Client for the third-party title metadata API.
///
/// Pure lookup glue for the catalog UI; search responses are cached in Redis
/// for a week since title metadata changes rarely. No achievement logic
/// depends on this client.
#[derive(Clone)]
pub struct MetadataClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl MetadataClient {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    /// Searches titles by free-text query, serving from cache when possible
    pub async fn search_titles(&self, query: &str) -> AppResult<Vec<TitleSummary>> {
        let cache_key = CacheKey::TitleSearch(query.to_string());
        cached!(self.cache, cache_key, SEARCH_CACHE_TTL, self.call_search(query))
    }

    async fn call_search(&self, query: &str) -> AppResult<Vec<TitleSummary>> {
        let url = format!("{}/search/multi", self.api_url);

        tracing::debug!(query = %query, "Searching metadata API");

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("query", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                query = %query,
                status = %status,
                body = %body,
                "Metadata API request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Metadata API returned status {}",
                status
            )));
        }

        let search: SearchResponse = response.json().await?;

        let titles = search
            .results
            .into_iter()
            .filter_map(|result| {
                let media_type = result.media_type?;
                // People and other non-watchable result types are dropped
                if media_type != "movie" && media_type != "tv" {
                    return None;
                }
                Some(TitleSummary {
                    id: result.id,
                    name: result.name.unwrap_or_default(),
                    original_name: result.original_name,
                    media_type,
                    release_year: result
                        .first_air_date
                        .as_deref()
                        .and_then(|date| date.get(..4))
                        .and_then(|year| year.parse().ok()),
                })
            })
            .collect();

        Ok(titles)
    }
}
