use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture};
use list_sync_models::{
    CatalogId, EditListEntryOptions, ExternalId, IdSource, ListEntriesQuery, ListEntry, ListStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::capabilities::{IdMappingService, MediaGraph, SessionState};
use crate::error::{ListSyncError, Operation, UpstreamExt};
use crate::simkl::api::{SimklApi, SimklListEntry};
use crate::traits::{ListPlugin, ListPluginType};


/// List plugin mirroring the client's AniList-keyed list to Simkl.
///
/// Simkl keys anime by MyAnimeList id, so every call first maps the catalog id
/// to a MAL id. Nothing is cached here; records are re-read after every write.
pub struct SimklListPlugin {
    simkl: Arc<dyn SimklApi>,
    id_mapping: Arc<dyn IdMappingService>,
    graph: Arc<dyn MediaGraph>,
    session: Arc<dyn SessionState>,
}

impl SimklListPlugin {
    pub const SERVICE: &'static str = "simkl";

    pub fn new(
        simkl: Arc<dyn SimklApi>,
        id_mapping: Arc<dyn IdMappingService>,
        graph: Arc<dyn MediaGraph>,
        session: Arc<dyn SessionState>,
    ) -> Self {
        Self {
            simkl,
            id_mapping,
            graph,
            session,
        }
    }

    /// MAL id for a catalog id, or `None` when neither the mapping service nor the media graph has one
    pub async fn resolve_external_id(&self, catalog_id: CatalogId) -> Result<Option<ExternalId>, ListSyncError> {
        self.resolve_for(catalog_id, Operation::ResolveExternalId).await
    }

    async fn resolve_for(&self, catalog_id: CatalogId, operation: Operation) -> Result<Option<ExternalId>, ListSyncError> {
        let related = self
            .id_mapping
            .ids_for(IdSource::AniList, catalog_id)
            .await
            .upstream(operation)?;

        if let Some(mal_id) = related.and_then(|ids| ids.myanimelist) {
            debug!("Simkl: AniList {} maps to MAL {} via id mapping", catalog_id, mal_id);
            return Ok(Some(mal_id));
        }

        let mal_id = self.graph.mal_id_for(catalog_id).await.upstream(operation)?;
        debug!("Simkl: AniList {} maps to MAL {:?} via media graph", catalog_id, mal_id);
        Ok(mal_id)
    }

    async fn require_external_id(&self, catalog_id: CatalogId, operation: Operation) -> Result<ExternalId, ListSyncError> {
        self.resolve_for(catalog_id, operation)
            .await?
            .ok_or(ListSyncError::IdentifierUnresolved { operation })
    }

    async fn read_back(&self, mal_id: ExternalId, operation: Operation) -> Result<SimklListEntry, ListSyncError> {
        self.simkl
            .watched_info(mal_id)
            .await
            .upstream(operation)?
            .ok_or(ListSyncError::ReadBackEmpty { operation })
    }

    async fn update_status_as(
        &self,
        catalog_id: CatalogId,
        status: ListStatus,
        operation: Operation,
    ) -> Result<ListEntry, ListSyncError> {
        let mal_id = self.require_external_id(catalog_id, operation).await?;

        let simkl_status = self.simkl.simkl_status_for(status);
        self.simkl
            .add_item_to_list(mal_id, simkl_status)
            .await
            .upstream(operation)?;

        let record = self.read_back(mal_id, operation).await?;
        Ok(self.from_watched_info(catalog_id, &record))
    }

    async fn update_progress_as(
        &self,
        catalog_id: CatalogId,
        progress: u32,
        operation: Operation,
    ) -> Result<ListEntry, ListSyncError> {
        let mal_id = self.require_external_id(catalog_id, operation).await?;

        self.simkl.set_progress(mal_id, progress).await.upstream(operation)?;

        let record = self.read_back(mal_id, operation).await?;
        if record.is_finished() {
            debug!("Simkl: AniList {} reached its last episode, marking completed", catalog_id);
            return self.update_status_as(catalog_id, ListStatus::Completed, operation).await;
        }

        Ok(self.from_watched_info(catalog_id, &record))
    }

    fn from_watched_info(&self, catalog_id: CatalogId, record: &SimklListEntry) -> ListEntry {
        ListEntry {
            id: record.show.ids.simkl,
            media_id: catalog_id,
            progress: record.watched_episodes_count,
            rewatched: 0,
            score: u32::from(record.rating()) * 10,
            status: self.simkl.status_from_simkl(record.status),
        }
    }
}

/// Client scores are 0-100, Simkl ratings 0-10
fn rating_from_score(score: u32) -> u8 {
    (f64::from(score) / 10.0).round().min(f64::from(u8::MAX)) as u8
}

#[async_trait]
impl ListPlugin for SimklListPlugin {
    fn service(&self) -> &str {
        Self::SERVICE
    }

    fn plugin_type(&self) -> ListPluginType {
        ListPluginType::Full
    }

    fn is_available(&self) -> bool {
        self.session.is_connected_to(Self::SERVICE)
    }

    async fn get_list_entry(&self, catalog_id: CatalogId) -> Result<Option<ListEntry>, ListSyncError> {
        let operation = Operation::GetListEntry;

        let Some(mal_id) = self.resolve_for(catalog_id, operation).await? else {
            return Ok(None);
        };

        let record = self.simkl.watched_info(mal_id).await.upstream(operation)?;
        Ok(record.map(|record| self.from_watched_info(catalog_id, &record)))
    }

    async fn get_list_entries(&self, query: &ListEntriesQuery) -> Result<Vec<ListEntry>, ListSyncError> {
        let operation = Operation::GetListEntries;

        let records = self.simkl.all_list_entries().await.upstream(operation)?;
        let mal_ids: Vec<ExternalId> = records.iter().filter_map(SimklListEntry::mal_id).collect();
        let relations = self
            .graph
            .catalog_ids_for_mal_ids(&mal_ids)
            .await
            .upstream(operation)?;

        let mut catalog_by_mal: HashMap<ExternalId, CatalogId> = HashMap::new();
        for pair in relations {
            if let Some(mal_id) = pair.id_mal {
                catalog_by_mal.entry(mal_id).or_insert(pair.id);
            }
        }

        let total = records.len();
        let entries: Vec<ListEntry> = records
            .iter()
            .filter_map(|record| {
                let catalog_id = record.mal_id().and_then(|mal_id| catalog_by_mal.get(&mal_id))?;
                Some(self.from_watched_info(*catalog_id, record))
            })
            .collect();

        if entries.len() < total {
            warn!("Simkl: dropped {} of {} list entries without an AniList match", total - entries.len(), total);
        }

        Ok(query.paginate(entries))
    }

    async fn add_to_list(&self, catalog_id: CatalogId) -> Result<ListEntry, ListSyncError> {
        self.update_status_as(catalog_id, ListStatus::Planning, Operation::AddToList)
            .await
    }

    async fn delete_from_list(&self, catalog_id: CatalogId) -> Result<bool, ListSyncError> {
        let operation = Operation::DeleteFromList;

        let Some(mal_id) = self.resolve_for(catalog_id, operation).await? else {
            return Ok(true);
        };

        let removed = self.simkl.remove_from_list(mal_id).await.upstream(operation)?;
        info!("Simkl: removed AniList {} (MAL {}) from list: {}", catalog_id, mal_id, removed);
        Ok(removed)
    }

    async fn start_rewatching(&self, catalog_id: CatalogId) -> Result<ListEntry, ListSyncError> {
        // Two separate writes; a failure in between leaves the status changed and the progress untouched
        let operation = Operation::StartRewatching;
        self.update_status_as(catalog_id, ListStatus::Repeating, operation).await?;
        self.update_progress_as(catalog_id, 0, operation).await
    }

    async fn update_progress(&self, catalog_id: CatalogId, progress: u32) -> Result<ListEntry, ListSyncError> {
        self.update_progress_as(catalog_id, progress, Operation::UpdateProgress)
            .await
    }

    async fn update_score(&self, catalog_id: CatalogId, score: u32) -> Result<ListEntry, ListSyncError> {
        let operation = Operation::UpdateScore;
        let mal_id = self.require_external_id(catalog_id, operation).await?;
        let rating = rating_from_score(score);

        self.simkl.add_rating(mal_id, rating).await.upstream(operation)?;

        let mut record = self.read_back(mal_id, operation).await?;
        // The read may not reflect the write yet
        record.user_rating = Some(rating);
        Ok(self.from_watched_info(catalog_id, &record))
    }

    async fn update_status(&self, catalog_id: CatalogId, status: ListStatus) -> Result<ListEntry, ListSyncError> {
        self.update_status_as(catalog_id, status, Operation::UpdateStatus)
            .await
    }

    async fn edit_list_entry(
        &self,
        catalog_id: CatalogId,
        options: &EditListEntryOptions,
    ) -> Result<ListEntry, ListSyncError> {
        let operation = Operation::EditListEntry;
        let mal_id = self.require_external_id(catalog_id, operation).await?;

        let simkl_status = self.simkl.simkl_status_for(options.status);
        let mut writes: Vec<BoxFuture<'_, anyhow::Result<()>>> = vec![
            self.simkl.add_item_to_list(mal_id, simkl_status),
            self.simkl.set_progress(mal_id, options.progress),
        ];
        if let Some(score) = options.score {
            writes.push(self.simkl.add_rating(mal_id, rating_from_score(score)));
        }

        try_join_all(writes).await.upstream(operation)?;

        let record = self.read_back(mal_id, operation).await?;
        Ok(self.from_watched_info(catalog_id, &record))
    }
}
