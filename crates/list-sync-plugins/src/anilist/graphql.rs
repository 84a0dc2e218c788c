use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
    #[serde(default)]
    status: Option<u16>,
}

/// Minimal GraphQL executor with a cache-first fetch policy
pub struct GraphqlClient {
    client: Arc<Client>,
    endpoint: String,
    /// Successful `data` payloads keyed by query + variables
    cache: RwLock<HashMap<String, Value>>,
}

impl GraphqlClient {
    pub fn new(client: Arc<Client>, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Always hit the network
    pub async fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let data = self.execute(query, &variables).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Answer from the cache when the same query and variables ran before
    pub async fn query_cached<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T> {
        let key = Self::cache_key(query, &variables);

        let cached = self.cache.read().await.get(&key).cloned();
        if let Some(data) = cached {
            debug!("GraphQL: cache hit for {}", variables);
            return Ok(serde_json::from_value(data)?);
        }

        let data = self.execute(query, &variables).await?;
        self.cache.write().await.insert(key, data.clone());
        Ok(serde_json::from_value(data)?)
    }

    fn cache_key(query: &str, variables: &Value) -> String {
        format!("{}:{}", query, variables)
    }

    async fn execute(&self, query: &str, variables: &Value) -> Result<Value> {
        let payload = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: GraphqlResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse GraphQL response ({}): {} - {}", status, e, body))?;

        Self::into_data(parsed)
    }

    /// Not-found errors leave `null` in `data`; every other error fails the query
    fn into_data(response: GraphqlResponse) -> Result<Value> {
        let only_not_found = response.errors.iter().all(|e| e.status == Some(404));

        if !response.errors.is_empty() && !(only_not_found && response.data.is_some()) {
            let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(anyhow!("GraphQL error: {}", messages.join("; ")));
        }

        response
            .data
            .ok_or_else(|| anyhow!("GraphQL response contained no data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GraphqlResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_data_is_returned() {
        let data = GraphqlClient::into_data(parse(r#"{"data":{"Media":{"id":1,"idMal":2}}}"#)).unwrap();
        assert_eq!(data["Media"]["idMal"], 2);
    }

    #[test]
    fn test_not_found_keeps_null_data() {
        let body = r#"{"errors":[{"message":"Not Found.","status":404}],"data":{"Media":null}}"#;
        let data = GraphqlClient::into_data(parse(body)).unwrap();
        assert!(data["Media"].is_null());
    }

    #[test]
    fn test_other_errors_fail() {
        let body = r#"{"errors":[{"message":"Too Many Requests.","status":429}],"data":null}"#;
        let err = GraphqlClient::into_data(parse(body)).unwrap_err();
        assert_eq!(err.to_string(), "GraphQL error: Too Many Requests.");
    }

    #[test]
    fn test_cache_key_depends_on_variables() {
        let a = GraphqlClient::cache_key("q", &json!({"mediaId": 1}));
        let b = GraphqlClient::cache_key("q", &json!({"mediaId": 2}));
        assert_ne!(a, b);
    }
}
