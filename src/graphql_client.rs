//! Thin client for the LIF GraphQL API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:8000/graphql";
pub const DEFAULT_READ_TIMEOUT_SECS: f64 = 300.0;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Budget for requests that do not set their own read timeout.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Error, Debug)]
pub enum GraphQlClientError {
    /// The endpoint answered with a non-success status.
    #[error("GraphQL HTTP error {}: {body}", .status.as_u16())]
    Http { status: StatusCode, body: String },
    /// Connection, timeout or response decoding failure.
    #[error("GraphQL client error: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub read_timeout_secs: f64,
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GRAPHQL_URL.to_string(),
            api_key: None,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl GraphQlConfig {
    /// Defaults overridden by `LIF_GRAPHQL_API_URL`, `LIF_GRAPHQL_API_KEY` and
    /// `SEMANTIC_SEARCH_SERVICE__GRAPHQL_TIMEOUT__READ`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("LIF_GRAPHQL_API_URL").filter(|v| !v.is_empty()) {
            config.url = url;
        }
        config.api_key = lookup("LIF_GRAPHQL_API_KEY").filter(|v| !v.is_empty());
        if let Some(raw) = lookup("SEMANTIC_SEARCH_SERVICE__GRAPHQL_TIMEOUT__READ") {
            match raw.parse::<f64>() {
                Ok(secs) if timeout_from_secs(secs).is_ok() => config.read_timeout_secs = secs,
                _ => {
                    log::warn!("Ignoring invalid GraphQL read timeout '{}'", raw);
                }
            }
        }
        config
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The read timeout as a `Duration`. Zero, negative, NaN and out-of-range
    /// values are rejected.
    pub fn read_timeout(&self) -> Result<Duration, GraphQlClientError> {
        timeout_from_secs(self.read_timeout_secs)
    }
}

fn timeout_from_secs(secs: f64) -> Result<Duration, GraphQlClientError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(timeout) if !timeout.is_zero() => Ok(timeout),
        _ => Err(GraphQlClientError::Client(format!(
            "invalid read timeout {} seconds",
            secs
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct GraphQlClient {
    client: Client,
    config: GraphQlConfig,
}

impl GraphQlClient {
    pub fn new(config: GraphQlConfig) -> Result<Self, GraphQlClientError> {
        config.read_timeout()?;
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GraphQlClientError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GraphQlConfig {
        &self.config
    }

    /// Run a query, allowing the configured read timeout.
    pub async fn query(&self, query: &str) -> Result<Value, GraphQlClientError> {
        self.post(query, self.config.read_timeout()?).await
    }

    pub async fn mutation(&self, mutation: &str) -> Result<Value, GraphQlClientError> {
        self.post(mutation, DEFAULT_REQUEST_TIMEOUT).await
    }

    async fn post(&self, query: &str, timeout: Duration) -> Result<Value, GraphQlClientError> {
        let mut request = self
            .client
            .post(&self.config.url)
            .timeout(timeout)
            .json(&json!({ "query": query }));
        if let Some(api_key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, api_key);
        }

        let response = request.send().await.map_err(client_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = GraphQlClientError::Http { status, body };
            log::error!("{}", err);
            return Err(err);
        }

        response.json::<Value>().await.map_err(client_error)
    }
}

fn client_error(err: reqwest::Error) -> GraphQlClientError {
    let err = GraphQlClientError::Client(err.to_string());
    log::error!("{}", err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    const QUERY: &str = "{ person { Name { firstName } } }";
    const MUTATION: &str = "mutation { updatePerson(filter: {}, input: {}) { Name { firstName } } }";

    fn client_for(server: &mockito::ServerGuard) -> GraphQlConfig {
        GraphQlConfig::default().with_url(format!("{}/graphql", server.url()))
    }

    #[tokio::test]
    async fn test_query_sends_api_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("x-api-key", "test-key-123")
            .match_body(Matcher::Json(json!({ "query": QUERY })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"person": []}}"#)
            .create_async()
            .await;

        let client = GraphQlClient::new(client_for(&server).with_api_key("test-key-123")).unwrap();
        let result = client.query(QUERY).await.unwrap();

        assert_eq!(result, json!({"data": {"person": []}}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_without_api_key_sends_no_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("x-api-key", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"data": {"person": []}}"#)
            .create_async()
            .await;

        let client = GraphQlClient::new(client_for(&server)).unwrap();
        let result = client.query(QUERY).await.unwrap();

        assert_eq!(result, json!({"data": {"person": []}}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(401)
            .with_body(r#"{"detail": "Unauthorized"}"#)
            .create_async()
            .await;

        let client = GraphQlClient::new(client_for(&server)).unwrap();
        let err = client.query(QUERY).await.unwrap_err();

        assert!(matches!(err, GraphQlClientError::Http { status, .. } if status.as_u16() == 401));
        assert!(err.to_string().starts_with("GraphQL HTTP error 401"));
    }

    #[tokio::test]
    async fn test_mutation_http_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(500)
            .with_body(r#"{"detail": "Internal Server Error"}"#)
            .create_async()
            .await;

        let client = GraphQlClient::new(client_for(&server).with_api_key("test-key-123")).unwrap();
        let err = client.mutation(MUTATION).await.unwrap_err();

        assert!(err.to_string().starts_with("GraphQL HTTP error 500"));
    }

    #[tokio::test]
    async fn test_mutation_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("x-api-key", "test-key-123")
            .with_status(200)
            .with_body(r#"{"data": {"updatePerson": {}}}"#)
            .create_async()
            .await;

        let client = GraphQlClient::new(client_for(&server).with_api_key("test-key-123")).unwrap();
        let result = client.mutation(MUTATION).await.unwrap();

        assert_eq!(result, json!({"data": {"updatePerson": {}}}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_error() {
        // nothing listens on the discard port
        let config = GraphQlConfig::default().with_url("http://127.0.0.1:9/graphql");
        let client = GraphQlClient::new(config).unwrap();
        let err = client.query(QUERY).await.unwrap_err();

        assert!(matches!(err, GraphQlClientError::Client(_)));
        assert!(err.to_string().starts_with("GraphQL client error"));
    }

    #[test]
    fn test_env_lookup_overrides() {
        let env = |name: &str| match name {
            "LIF_GRAPHQL_API_URL" => Some("http://graphql.internal/graphql".to_string()),
            "LIF_GRAPHQL_API_KEY" => Some("env-key-456".to_string()),
            "SEMANTIC_SEARCH_SERVICE__GRAPHQL_TIMEOUT__READ" => Some("12.5".to_string()),
            _ => None,
        };
        let config = GraphQlConfig::from_lookup(env);

        assert_eq!(config.url, "http://graphql.internal/graphql");
        assert_eq!(config.api_key.as_deref(), Some("env-key-456"));
        assert_eq!(config.read_timeout().unwrap(), Duration::from_millis(12_500));
    }

    #[test]
    fn test_env_lookup_defaults() {
        let config = GraphQlConfig::from_lookup(|name: &str| match name {
            "LIF_GRAPHQL_API_KEY" => Some(String::new()),
            "SEMANTIC_SEARCH_SERVICE__GRAPHQL_TIMEOUT__READ" => Some("soon".to_string()),
            _ => None,
        });

        assert_eq!(config, GraphQlConfig::default());
    }

    #[test]
    fn test_env_lookup_ignores_non_finite_timeout() {
        for raw in ["inf", "NaN", "-1", "0"] {
            let config = GraphQlConfig::from_lookup(|name: &str| match name {
                "SEMANTIC_SEARCH_SERVICE__GRAPHQL_TIMEOUT__READ" => Some(raw.to_string()),
                _ => None,
            });
            assert_eq!(config.read_timeout_secs, DEFAULT_READ_TIMEOUT_SECS, "{}", raw);
        }
    }

    #[test]
    fn test_invalid_configured_timeout_is_an_error() {
        for secs in [f64::INFINITY, f64::NAN, -1.0, 0.0] {
            let config = GraphQlConfig {
                read_timeout_secs: secs,
                ..GraphQlConfig::default()
            };
            assert!(matches!(config.read_timeout(), Err(GraphQlClientError::Client(_))));

            let err = GraphQlClient::new(config).unwrap_err();
            assert!(err.to_string().starts_with("GraphQL client error: invalid read timeout"));
        }
    }
}
