use crate::http::trim_base_url;
use crate::simkl::api::{SimklAllItemsResponse, SimklApi, SimklListEntry, SimklStatus};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use list_sync_config::{default_simkl_status_mapping, StatusMapping};
use list_sync_models::{ExternalId, ListStatus};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Upper bound on progress when Simkl does not know the episode count
const MAX_EPISODES: u32 = 10_000;

#[derive(Clone)]
pub struct SimklClient {
    client: Arc<Client>,
    base_url: String,
    client_id: String,
    access_token: Option<String>,
    status_mapping: StatusMapping,
}

impl SimklClient {
    pub fn new(client: Arc<Client>, base_url: &str, client_id: String) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
            client_id,
            access_token: None,
            status_mapping: default_simkl_status_mapping(),
        }
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token.filter(|token| !token.is_empty());
        self
    }

    pub fn with_status_mapping(mut self, status_mapping: StatusMapping) -> Self {
        self.status_mapping = status_mapping;
        self
    }

    fn access_token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| anyhow!("Not authenticated with Simkl"))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.access_token()?))
            .header("simkl-api-key", &self.client_id)
            .header("Accept", "application/json"))
    }

    async fn get(&self, path: &str, action: &str) -> Result<Response> {
        let response = self.request(Method::GET, path)?.send().await?;
        Self::check(response, action).await
    }

    async fn post(&self, path: &str, payload: &Value, action: &str) -> Result<Response> {
        let response = self.request(Method::POST, path)?.json(payload).send().await?;
        Self::check(response, action).await
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Failed to {}: {} - {}", action, status, error_text));
        }
        Ok(response)
    }

    /// Episode count to write, clamped to the show's length
    fn capped_progress(episodes: u32, total_episodes: Option<u32>) -> u32 {
        match total_episodes {
            Some(total) if total > 0 => episodes.min(total),
            _ => episodes.min(MAX_EPISODES),
        }
    }

    fn episodes_payload(mal_id: ExternalId, episodes: impl Iterator<Item = u32>) -> Value {
        let numbers: Vec<Value> = episodes.map(|number| json!({ "number": number })).collect();
        json!({
            "shows": [{
                "ids": { "mal": mal_id },
                "episodes": numbers,
            }]
        })
    }
}

#[async_trait]
impl SimklApi for SimklClient {
    async fn watched_info(&self, mal_id: ExternalId) -> Result<Option<SimklListEntry>> {
        let entries = self.all_list_entries().await?;
        Ok(entries.into_iter().find(|entry| entry.mal_id() == Some(mal_id)))
    }

    async fn all_list_entries(&self) -> Result<Vec<SimklListEntry>> {
        let response = self.get("/sync/all-items/anime/", "fetch anime list").await?;

        // An empty list comes back as an empty body or `null`
        let body = response.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(Vec::new());
        }

        let parsed: SimklAllItemsResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse Simkl anime list: {}", e))?;
        let entries = parsed.anime.unwrap_or_default();
        debug!("Simkl: fetched {} anime list entries", entries.len());
        Ok(entries)
    }

    async fn set_progress(&self, mal_id: ExternalId, episodes: u32) -> Result<()> {
        let current = self.watched_info(mal_id).await?;
        let watched = current.as_ref().map(|entry| entry.watched_episodes_count).unwrap_or(0);
        let episodes = Self::capped_progress(episodes, current.and_then(|entry| entry.total_episodes_count));

        if episodes > watched {
            let payload = Self::episodes_payload(mal_id, watched + 1..=episodes);
            self.post("/sync/history", &payload, "add watched episodes").await?;
        } else if episodes < watched {
            let payload = Self::episodes_payload(mal_id, episodes + 1..=watched);
            self.post("/sync/history/remove", &payload, "remove watched episodes").await?;
        }

        debug!("Simkl: progress for MAL {} set from {} to {}", mal_id, watched, episodes);
        Ok(())
    }

    async fn add_rating(&self, mal_id: ExternalId, rating: u8) -> Result<()> {
        if rating == 0 {
            let payload = json!({ "shows": [{ "ids": { "mal": mal_id } }] });
            self.post("/sync/ratings/remove", &payload, "remove rating").await?;
            return Ok(());
        }

        let payload = json!({
            "shows": [{
                "rating": rating.min(10),
                "ids": { "mal": mal_id },
            }]
        });
        self.post("/sync/ratings", &payload, "set rating").await?;
        Ok(())
    }

    async fn add_item_to_list(&self, mal_id: ExternalId, status: SimklStatus) -> Result<()> {
        let payload = json!({
            "shows": [{
                "to": status.as_str(),
                "ids": { "mal": mal_id },
            }]
        });
        self.post("/sync/add-to-list", &payload, "add item to list").await?;
        Ok(())
    }

    async fn remove_from_list(&self, mal_id: ExternalId) -> Result<bool> {
        let payload = json!({ "shows": [{ "ids": { "mal": mal_id } }] });
        let response = self
            .request(Method::POST, "/sync/history/remove")?
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Simkl: removing MAL {} from list failed with {}", mal_id, response.status());
            return Ok(false);
        }
        Ok(true)
    }

    fn simkl_status_for(&self, status: ListStatus) -> SimklStatus {
        self.status_mapping
            .from_client
            .get(&status)
            .and_then(|native| native.parse().ok())
            .unwrap_or_else(|| SimklStatus::from(status))
    }

    fn status_from_simkl(&self, status: SimklStatus) -> ListStatus {
        self.status_mapping
            .to_client
            .get(status.as_str())
            .copied()
            .unwrap_or_else(|| ListStatus::from(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> SimklClient {
        SimklClient::new(Arc::new(Client::new()), "https://api.simkl.com/", "id".to_string())
    }

    #[test]
    fn test_base_url_trimmed() {
        assert_eq!(client().base_url, "https://api.simkl.com");
    }

    #[test]
    fn test_empty_token_is_not_authenticated() {
        assert!(client().with_access_token(Some(String::new())).access_token().is_err());
        assert_eq!(client().with_access_token(Some("abc".to_string())).access_token().unwrap(), "abc");
        assert!(client().access_token().is_err());
    }

    #[test]
    fn test_request_carries_auth_headers() {
        let request = client()
            .with_access_token(Some("abc".to_string()))
            .request(Method::POST, "/sync/history/remove")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://api.simkl.com/sync/history/remove");
        assert_eq!(request.headers()["Authorization"], "Bearer abc");
        assert_eq!(request.headers()["simkl-api-key"], "id");
        assert!(client().request(Method::GET, "/sync/all-items/anime/").is_err());
    }

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(SimklClient::capped_progress(4_000_000_000, Some(28)), 28);
        assert_eq!(SimklClient::capped_progress(12, Some(28)), 12);
        assert_eq!(SimklClient::capped_progress(4_000_000_000, None), MAX_EPISODES);
        assert_eq!(SimklClient::capped_progress(4_000_000_000, Some(0)), MAX_EPISODES);
        assert_eq!(SimklClient::capped_progress(1100, None), 1100);
    }

    #[test]
    fn test_default_mapping() {
        let client = client();
        assert_eq!(client.simkl_status_for(ListStatus::Planning), SimklStatus::PlanToWatch);
        assert_eq!(client.simkl_status_for(ListStatus::Repeating), SimklStatus::Watching);
        assert_eq!(client.status_from_simkl(SimklStatus::Hold), ListStatus::Paused);
    }

    #[test]
    fn test_custom_mapping_with_fallback() {
        let mut from_client = HashMap::new();
        from_client.insert(ListStatus::Paused, "dropped".to_string());
        from_client.insert(ListStatus::Current, "not-a-status".to_string());
        let mut to_client = HashMap::new();
        to_client.insert("dropped".to_string(), ListStatus::Paused);

        let client = client().with_status_mapping(StatusMapping { to_client, from_client });
        assert_eq!(client.simkl_status_for(ListStatus::Paused), SimklStatus::Dropped);
        assert_eq!(client.simkl_status_for(ListStatus::Current), SimklStatus::Watching);
        assert_eq!(client.status_from_simkl(SimklStatus::Dropped), ListStatus::Paused);
        assert_eq!(client.status_from_simkl(SimklStatus::Completed), ListStatus::Completed);
    }

    #[test]
    fn test_episodes_payload() {
        let payload = SimklClient::episodes_payload(42, 3..=4);
        assert_eq!(
            payload,
            json!({ "shows": [{ "ids": { "mal": 42 }, "episodes": [{ "number": 3 }, { "number": 4 }] }] })
        );
    }
}
