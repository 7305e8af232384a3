// src/infrastructure/graphql.rs
use crate::application::{Operation, QueryExecutor};
use crate::domain::{DomainError, Session};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP transport for GraphQL operations
pub struct GraphQlClient {
    endpoint: String,
    api_key: Option<String>,
    token: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl GraphQlClient {
    pub fn new(endpoint: &str, session: &Session) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DomainError::Remote(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key: None,
            token: session.token.clone(),
            client,
        })
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string()).filter(|k| !k.is_empty());
        self
    }
}

/// Turn a GraphQL response body into its `data` object
fn into_data(operation: &Operation, body: GraphQlResponse) -> Result<Value, DomainError> {
    if !body.errors.is_empty() {
        let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
        return Err(DomainError::Remote(format!(
            "{} failed: {}",
            operation.name(),
            messages.join("; ")
        )));
    }
    body.data
        .filter(|data| !data.is_null())
        .ok_or_else(|| DomainError::Remote(format!("{} returned no data", operation.name())))
}

#[async_trait]
impl QueryExecutor for GraphQlClient {
    #[instrument(level = "debug", skip(self), fields(operation = operation.name()))]
    async fn execute(&self, operation: &Operation) -> Result<Value, DomainError> {
        let request = GraphQlRequest {
            query: operation.document(),
            operation_name: operation.name(),
            variables: operation.variables(),
        };

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, &self.token)
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-api-key", api_key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| DomainError::Remote(format!("{} request failed: {}", operation.name(), e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Remote(format!(
                "{} HTTP {}: {}",
                operation.name(),
                status,
                body
            )));
        }

        let body: GraphQlResponse = resp.json().await.map_err(|e| {
            DomainError::Remote(format!("{} response is not valid JSON: {}", operation.name(), e))
        })?;
        debug!(errors = body.errors.len(), "Received GraphQL response");

        into_data(operation, body)
    }
}
