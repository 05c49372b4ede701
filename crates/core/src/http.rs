//! HTTP client for the hotel search service.
//!
//! Every endpoint wraps its payload in `{code, msg, data}`; any `code` other
//! than 200 is an error even when the HTTP status is 2xx.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::backend::{RecommendationSource, SearchBackend};
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::types::{HotHotel, HotRegion, Recommendations, SearchPage, SearchRequest};

const SUCCESS_CODE: i64 = 200;

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

/// `GET /search/cities` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PopularCity {
    name_cn: String,
    #[serde(default)]
    name_en: Option<String>,
}

/// `GET /search/hotels` entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PopularHotel {
    name_cn: String,
    #[serde(default)]
    name_en: Option<String>,
    #[serde(default)]
    city_cn: String,
}

#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.auth_token {
            // The service expects the raw token, no scheme prefix
            request = request.header(reqwest::header::AUTHORIZATION, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let envelope: ApiEnvelope<T> = response.json().await?;
        if envelope.code != SUCCESS_CODE {
            return Err(SearchError::Api {
                code: envelope.code,
                message: envelope.msg.unwrap_or_default(),
            });
        }
        envelope
            .data
            .ok_or_else(|| SearchError::Decode(format!("missing data in response from {url}")))
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let page: SearchPage = self.get("/search/smart", &request.query_pairs()).await?;
        debug!(
            query = request.query.as_str(),
            hits = page.hotels.len(),
            total = page.total_count(),
            took_ms = page.duration_ms,
            "Search call returned"
        );
        Ok(page)
    }
}

/// Popular regions from `/search/cities` and hotels from `/search/hotels`.
/// Neither endpoint reports counts or ids, so hotels are numbered in order.
#[async_trait]
impl RecommendationSource for HttpSearchClient {
    async fn recommendations(&self) -> Result<Recommendations> {
        let (cities, hotels) = tokio::try_join!(
            self.get::<Vec<PopularCity>>("/search/cities", &[]),
            self.get::<Vec<PopularHotel>>("/search/hotels", &[]),
        )?;
        Ok(Recommendations {
            popular_regions: cities
                .into_iter()
                .map(|c| HotRegion {
                    name: c.name_cn,
                    name_en: c.name_en,
                    count: None,
                })
                .collect(),
            popular_hotels: hotels
                .into_iter()
                .enumerate()
                .map(|(i, h)| HotHotel {
                    id: i as i64 + 1,
                    name: h.name_cn,
                    name_en: h.name_en,
                    city: h.city_cn,
                    brand: None,
                })
                .collect(),
        })
    }
}
