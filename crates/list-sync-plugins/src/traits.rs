use async_trait::async_trait;
use list_sync_models::{CatalogId, EditListEntryOptions, ListEntriesQuery, ListEntry, ListStatus};
use crate::error::ListSyncError;

/// How much of the list interface a plugin covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPluginType {
    /// Supports every list operation
    Full,
    /// Only tracks progress
    Simple,
}

/// A list tracking service the client can mirror its list to.
///
/// Every operation is keyed by the client's own catalog id. Implementations
/// translate to the service's id space themselves and keep no state between calls.
#[async_trait]
pub trait ListPlugin: Send + Sync {
    fn service(&self) -> &str;

    fn plugin_type(&self) -> ListPluginType;

    /// Whether the current session is authenticated against the service
    fn is_available(&self) -> bool;

    /// `Ok(None)` when the media is not on the list or cannot be mapped
    async fn get_list_entry(&self, catalog_id: CatalogId) -> Result<Option<ListEntry>, ListSyncError>;

    async fn get_list_entries(&self, query: &ListEntriesQuery) -> Result<Vec<ListEntry>, ListSyncError>;

    async fn add_to_list(&self, catalog_id: CatalogId) -> Result<ListEntry, ListSyncError>;

    /// Returns `true` when nothing could be found to delete
    async fn delete_from_list(&self, catalog_id: CatalogId) -> Result<bool, ListSyncError>;

    async fn start_rewatching(&self, catalog_id: CatalogId) -> Result<ListEntry, ListSyncError>;

    async fn update_progress(&self, catalog_id: CatalogId, progress: u32) -> Result<ListEntry, ListSyncError>;

    /// `score` is on the client's 0-100 scale
    async fn update_score(&self, catalog_id: CatalogId, score: u32) -> Result<ListEntry, ListSyncError>;

    async fn update_status(&self, catalog_id: CatalogId, status: ListStatus) -> Result<ListEntry, ListSyncError>;

    async fn edit_list_entry(
        &self,
        catalog_id: CatalogId,
        options: &EditListEntryOptions,
    ) -> Result<ListEntry, ListSyncError>;
}
