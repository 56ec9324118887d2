//! Catalog API client
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | partition lookup | `POST api/server/audio/filter` | `seriesData[{slug,title}]` |
//! | landing / item page | `GET {slug}` | HTML with embedded payload |
//! | membership listing | `POST api/server/audio/series-filter` | `listData[{slug}]` |

use crate::config::SourceConfig;
use crate::remote::build_http_client;
use crate::{HarvestError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

const FILTER_PATH: [&str; 4] = ["api", "server", "audio", "filter"];
const SERIES_FILTER_PATH: [&str; 4] = ["api", "server", "audio", "series-filter"];

/// One collection as returned by a partition lookup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionListing {
    pub slug: String,

    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize)]
struct FilterRequest<'a> {
    letter: &'a str,
    language: &'a str,
}

#[derive(Deserialize)]
struct FilterResponse {
    #[serde(rename = "seriesData", default)]
    series_data: Option<Vec<CollectionListing>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesFilterRequest<'a> {
    per_page: u64,
    page: u32,
    current_id: &'a str,
}

#[derive(Deserialize)]
struct SeriesFilterResponse {
    #[serde(rename = "listData", default)]
    list_data: Option<Vec<MemberListing>>,
}

#[derive(Deserialize)]
struct MemberListing {
    slug: String,
}

/// Client for the content server's catalog and page endpoints
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: Url,
    language: String,
}

impl CatalogClient {
    /// Creates a client from the source configuration
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        Self::with_client(client, config)
    }

    /// Creates a client around an existing `reqwest::Client`
    pub fn with_client(client: Client, config: &SourceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        Ok(Self {
            client,
            base_url,
            language: config.corpus_language.clone(),
        })
    }

    /// Lists every collection in one discovery partition
    pub async fn list_collections(&self, partition: &str) -> Result<Vec<CollectionListing>> {
        let url = self.endpoint(&FILTER_PATH)?;
        let body = FilterRequest {
            letter: partition,
            language: &self.language,
        };

        let response: FilterResponse = self.post_json(url, &body).await?;
        Ok(response.series_data.unwrap_or_default())
    }

    /// Lists the member item slugs of a collection in a single page
    pub async fn list_members(&self, category_id: &str, page_size: u64) -> Result<Vec<String>> {
        let url = self.endpoint(&SERIES_FILTER_PATH)?;
        let body = SeriesFilterRequest {
            per_page: page_size,
            page: 1,
            current_id: category_id,
        };

        let response: SeriesFilterResponse = self.post_json(url, &body).await?;
        Ok(response
            .list_data
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.slug)
            .collect())
    }

    /// Fetches the HTML page addressed by a collection or item slug
    pub async fn fetch_page(&self, slug: &str) -> Result<String> {
        let url = self.endpoint(&[slug])?;
        let response = self.send(self.client.get(url.clone()), &url).await?;
        response.text().await.map_err(|e| transport_error(&url, e))
    }

    /// Appends path segments to the base URL, percent-encoding each one
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| HarvestError::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_json<B, R>(&self, url: Url, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(self.client.post(url.clone()).json(body), &url).await?;
        let text = response.text().await.map_err(|e| transport_error(&url, e))?;

        serde_json::from_str(&text).map_err(|source| HarvestError::Json {
            url: url.to_string(),
            source,
        })
    }

    /// Sends a request; non-2xx statuses are failures
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response> {
        let response = request.send().await.map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Classifies a transport-level failure; timeouts get their own variant
fn transport_error(url: &Url, e: reqwest::Error) -> HarvestError {
    if e.is_timeout() {
        HarvestError::Timeout {
            url: url.to_string(),
        }
    } else {
        HarvestError::Http {
            url: url.to_string(),
            source: e,
        }
    }
}
