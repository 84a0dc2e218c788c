use serde::{Deserialize, Serialize};
use crate::ids::CatalogId;
use crate::status::ListStatus;

/// A list entry as the client sees it, rebuilt from the external record on every read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListEntry {
    /// Id of the record on the external service
    pub id: u64,
    pub media_id: CatalogId,
    pub progress: u32,
    /// Always 0: the external service keeps no rewatch counter
    pub rewatched: u32,
    /// 0-100 scale
    pub score: u32,
    pub status: ListStatus,
}
