use anyhow::{anyhow, Result};
use async_trait::async_trait;
use list_sync_models::IdSource;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use tracing::debug;

use crate::capabilities::{IdMappingService, RelatedIds};
use crate::http::trim_base_url;

/// Client for the anime relations mapping server (`/api/ids`)
#[derive(Clone)]
pub struct ArmClient {
    client: Arc<Client>,
    base_url: String,
}

impl ArmClient {
    pub fn new(client: Arc<Client>, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base_url(base_url),
        }
    }
}

#[async_trait]
impl IdMappingService for ArmClient {
    async fn ids_for(&self, source: IdSource, id: u64) -> Result<Option<RelatedIds>> {
        let url = format!("{}/api/ids?source={}&id={}", self.base_url, source.as_str(), id);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("ARM: no mapping for {} id {}", source, id);
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Failed to fetch id mapping: {} - {}", status, error_text));
        }

        // The server answers `null` for ids it has never seen
        let ids: Option<RelatedIds> = response.json().await?;
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_ids_parse_with_extra_fields() {
        let json = r#"{"anidb":4563,"anilist":1535,"anime-planet":"death-note","kitsu":1376,"myanimelist":1535}"#;
        let ids: Option<RelatedIds> = serde_json::from_str(json).unwrap();
        let ids = ids.unwrap();
        assert_eq!(ids.anilist, Some(1535));
        assert_eq!(ids.myanimelist, Some(1535));
        assert_eq!(ids.kitsu, Some(1376));
    }

    #[test]
    fn test_related_ids_null_body() {
        let ids: Option<RelatedIds> = serde_json::from_str("null").unwrap();
        assert!(ids.is_none());
    }

    #[test]
    fn test_related_ids_missing_mal() {
        let ids: Option<RelatedIds> = serde_json::from_str(r#"{"anilist":1,"myanimelist":null}"#).unwrap();
        assert_eq!(ids.unwrap().myanimelist, None);
    }
}
