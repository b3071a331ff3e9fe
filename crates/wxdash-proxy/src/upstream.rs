//! Client for the third-party weather provider

use axum::body::Bytes;
use reqwest::Client;
use thiserror::Error;
use wxdash_core::{ForecastQuery, WeatherQuery};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("provider returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One request in, one response out: no retries, no caching
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Current weather by city or coordinates; returns the provider body unchanged
    pub async fn current_weather(&self, query: &WeatherQuery) -> Result<Bytes, UpstreamError> {
        let mut params = query.location_params();
        params.push(("units", query.unit.as_str().to_string()));
        self.get("weather", &params).await
    }

    /// 5-day / 3-hour forecast by city; returns the provider body unchanged
    pub async fn forecast(&self, query: &ForecastQuery) -> Result<Bytes, UpstreamError> {
        let params = vec![
            ("q", query.city.clone()),
            ("units", query.unit.as_str().to_string()),
        ];
        self.get("forecast", &params).await
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Bytes, UpstreamError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_slice::<serde::de::IgnoredAny>(&body)?;
        Ok(body)
    }
}

fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 200;
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = UpstreamClient::new("http://example.test/data/2.5/", "k");
        assert_eq!(client.base_url, "http://example.test/data/2.5");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let out = truncate_body(body.as_bytes());
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_body(b"short"), "short");
    }
}
