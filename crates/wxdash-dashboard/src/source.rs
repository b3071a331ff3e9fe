//! Weather data source used by the dashboard

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;
use wxdash_core::{ForecastQuery, Location, WeatherQuery};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to proxy failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("proxy returned a non-JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid proxy URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Current weather and forecast lookups, returning the JSON body as-is
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn weather(&self, query: &WeatherQuery) -> Result<Value, FetchError>;

    async fn forecast(&self, query: &ForecastQuery) -> Result<Value, FetchError>;
}

/// HTTP client of the proxy service
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: Client,
    base_url: Url,
}

impl ProxyClient {
    /// Endpoints resolve below `base_url`, so `http://host/api` serves
    /// `http://host/api/weather`.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// The body is decoded whatever the status; error bodies carry `error`
    /// and fail validation downstream.
    async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = self.base_url.join(endpoint)?;
        let res = self.http.get(url).query(params).send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        tracing::debug!(%status, endpoint, "proxy responded");
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl WeatherSource for ProxyClient {
    async fn weather(&self, query: &WeatherQuery) -> Result<Value, FetchError> {
        let mut params = match &query.location {
            Location::City(city) => vec![("city", city.clone())],
            Location::Coordinates(c) => vec![("lat", c.lat.to_string()), ("lon", c.lon.to_string())],
        };
        params.push(("unit", query.unit.as_str().to_string()));
        self.get_json("weather", &params).await
    }

    async fn forecast(&self, query: &ForecastQuery) -> Result<Value, FetchError> {
        let params = [
            ("city", query.city.clone()),
            ("unit", query.unit.as_str().to_string()),
        ];
        self.get_json("forecast", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wxdash_core::{Coordinates, Unit};

    fn client(server: &MockServer) -> ProxyClient {
        ProxyClient::new(Url::parse(&server.uri()).unwrap())
    }

    #[tokio::test]
    async fn test_weather_by_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("city", "Lima"))
            .and(query_param("unit", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": 200, "name": "Lima"})))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server)
            .weather(&WeatherQuery::city("Lima", Unit::Imperial))
            .await
            .unwrap();
        assert_eq!(body["name"], "Lima");
    }

    #[tokio::test]
    async fn test_weather_by_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "35.5"))
            .and(query_param("lon", "139.25"))
            .and(query_param("unit", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": 200})))
            .expect(1)
            .mount(&server)
            .await;

        let coords = Coordinates {
            lat: 35.5,
            lon: 139.25,
        };
        client(&server)
            .weather(&WeatherQuery::coordinates(coords, Unit::Metric))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_base_path_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather"))
            .and(query_param("city", "Quito"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": 200, "name": "Quito"})))
            .expect(2)
            .mount(&server)
            .await;

        for base in [format!("{}/api", server.uri()), format!("{}/api/", server.uri())] {
            let body = ProxyClient::new(Url::parse(&base).unwrap())
                .weather(&WeatherQuery::city("Quito", Unit::Metric))
                .await
                .unwrap();
            assert_eq!(body["name"], "Quito");
        }
    }

    #[tokio::test]
    async fn test_error_body_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "Failed to fetch forecast data"})),
            )
            .mount(&server)
            .await;

        let body = client(&server)
            .forecast(&ForecastQuery::new("Nowhere", Unit::Metric))
            .await
            .unwrap();
        assert_eq!(body["error"], "Failed to fetch forecast data");
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server)
            .forecast(&ForecastQuery::new("Paris", Unit::Metric))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }
}
