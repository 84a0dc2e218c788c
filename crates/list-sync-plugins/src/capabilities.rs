//! Capability traits for the services a list plugin depends on
//!
//! Plugins hold these as trait objects so the HTTP-backed implementations can be
//! swapped for in-memory ones in tests.

use anyhow::Result;
use async_trait::async_trait;
use list_sync_models::{CatalogId, ExternalId, IdSource};
use serde::{Deserialize, Serialize};

/// Ids of one media item across catalog systems, as reported by the mapping service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelatedIds {
    #[serde(default)]
    pub anilist: Option<CatalogId>,
    #[serde(default)]
    pub anidb: Option<u64>,
    #[serde(default)]
    pub kitsu: Option<u64>,
    #[serde(default)]
    pub myanimelist: Option<ExternalId>,
}

/// A catalog id and the MyAnimeList id the media graph has on record for it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaIdPair {
    pub id: CatalogId,
    #[serde(rename = "idMal", default)]
    pub id_mal: Option<ExternalId>,
}

/// Maps an id in one catalog system to the ids of the same media in the others
#[async_trait]
pub trait IdMappingService: Send + Sync {
    /// Look up related ids for a media item
    ///
    /// # Returns
    /// * `Ok(Some(RelatedIds))` - The service knows this media
    /// * `Ok(None)` - Unknown media (not an error)
    /// * `Err(_)` - The request failed
    async fn ids_for(&self, source: IdSource, id: u64) -> Result<Option<RelatedIds>>;
}

/// Queries against the client's own media graph
#[async_trait]
pub trait MediaGraph: Send + Sync {
    /// MyAnimeList id stored on the media, answered from cache when possible
    async fn mal_id_for(&self, catalog_id: CatalogId) -> Result<Option<ExternalId>>;

    /// Batched reverse lookup. Media without a match are simply absent from the result.
    async fn catalog_ids_for_mal_ids(&self, mal_ids: &[ExternalId]) -> Result<Vec<MediaIdPair>>;
}

/// Read-only view of which services the user is signed in to
pub trait SessionState: Send + Sync {
    fn is_connected_to(&self, service: &str) -> bool;
}
