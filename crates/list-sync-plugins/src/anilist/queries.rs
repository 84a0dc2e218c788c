use anyhow::Result;
use async_trait::async_trait;
use list_sync_models::{CatalogId, ExternalId};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::graphql::GraphqlClient;
use crate::capabilities::{MediaGraph, MediaIdPair};

pub const MAL_ID_FROM_ANILIST_ID: &str = r#"
query MalIdFromAnilistId($mediaId: Int) {
  Media(id: $mediaId) {
    id
    idMal
  }
}
"#;

pub const ANILIST_IDS_FROM_MAL_IDS: &str = r#"
query AnilistIdsFromMalIds($page: Int, $perPage: Int, $malIds: [Int]) {
  Page(page: $page, perPage: $perPage) {
    media(idMal_in: $malIds, type: ANIME) {
      id
      idMal
    }
  }
}
"#;

/// AniList caps `perPage` at 50
const MAX_PER_PAGE: usize = 50;

#[derive(Debug, Deserialize)]
struct MediaResponse {
    #[serde(rename = "Media")]
    media: Option<MediaIdPair>,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(rename = "Page")]
    page: Option<MediaPage>,
}

#[derive(Debug, Deserialize)]
struct MediaPage {
    #[serde(default)]
    media: Vec<Option<MediaIdPair>>,
}

/// The client's media graph, served by AniList
pub struct AniListGraph {
    graphql: Arc<GraphqlClient>,
}

impl AniListGraph {
    pub fn new(graphql: Arc<GraphqlClient>) -> Self {
        Self { graphql }
    }
}

#[async_trait]
impl MediaGraph for AniListGraph {
    async fn mal_id_for(&self, catalog_id: CatalogId) -> Result<Option<ExternalId>> {
        let response: MediaResponse = self
            .graphql
            .query_cached(MAL_ID_FROM_ANILIST_ID, json!({ "mediaId": catalog_id }))
            .await?;

        Ok(response.media.and_then(|media| media.id_mal))
    }

    async fn catalog_ids_for_mal_ids(&self, mal_ids: &[ExternalId]) -> Result<Vec<MediaIdPair>> {
        let mut pairs = Vec::with_capacity(mal_ids.len());

        for chunk in mal_ids.chunks(MAX_PER_PAGE) {
            let response: PageResponse = self
                .graphql
                .query(
                    ANILIST_IDS_FROM_MAL_IDS,
                    json!({ "page": 1, "perPage": MAX_PER_PAGE, "malIds": chunk }),
                )
                .await?;

            let found = response
                .page
                .map(|page| page.media.into_iter().flatten().collect::<Vec<_>>())
                .unwrap_or_default();
            debug!("AniList: matched {} of {} MAL ids in batch", found.len(), chunk.len());
            pairs.extend(found);
        }

        Ok(pairs)
    }
}
