use anyhow::Result;
use async_trait::async_trait;
use list_sync_models::{ExternalId, ListStatus};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// List status as Simkl names it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SimklStatus {
    #[serde(rename = "watching")]
    Watching,
    #[serde(rename = "plantowatch")]
    PlanToWatch,
    #[serde(rename = "hold")]
    Hold,
    #[serde(rename = "dropped")]
    Dropped,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "notinteresting")]
    NotInteresting,
}

impl SimklStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimklStatus::Watching => "watching",
            SimklStatus::PlanToWatch => "plantowatch",
            SimklStatus::Hold => "hold",
            SimklStatus::Dropped => "dropped",
            SimklStatus::Completed => "completed",
            SimklStatus::NotInteresting => "notinteresting",
        }
    }
}

impl fmt::Display for SimklStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimklStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "watching" => Ok(SimklStatus::Watching),
            "plantowatch" => Ok(SimklStatus::PlanToWatch),
            "hold" => Ok(SimklStatus::Hold),
            "dropped" => Ok(SimklStatus::Dropped),
            "completed" => Ok(SimklStatus::Completed),
            "notinteresting" => Ok(SimklStatus::NotInteresting),
            other => Err(anyhow::anyhow!("Unknown Simkl status: {}", other)),
        }
    }
}

/// Built-in conversion, used when the configured mapping has no entry
impl From<ListStatus> for SimklStatus {
    fn from(status: ListStatus) -> Self {
        match status {
            ListStatus::Current | ListStatus::Repeating => SimklStatus::Watching,
            ListStatus::Planning => SimklStatus::PlanToWatch,
            ListStatus::Completed => SimklStatus::Completed,
            ListStatus::Dropped => SimklStatus::Dropped,
            ListStatus::Paused => SimklStatus::Hold,
        }
    }
}

impl From<SimklStatus> for ListStatus {
    fn from(status: SimklStatus) -> Self {
        match status {
            SimklStatus::Watching => ListStatus::Current,
            SimklStatus::PlanToWatch => ListStatus::Planning,
            SimklStatus::Hold => ListStatus::Paused,
            SimklStatus::Dropped | SimklStatus::NotInteresting => ListStatus::Dropped,
            SimklStatus::Completed => ListStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimklIds {
    pub simkl: u64,
    /// Simkl sends this as a string for some titles
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub mal: Option<ExternalId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimklShow {
    #[serde(default)]
    pub title: String,
    pub ids: SimklIds,
}

/// One anime on the user's Simkl list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimklListEntry {
    pub status: SimklStatus,
    /// 1-10, absent when unrated
    #[serde(default)]
    pub user_rating: Option<u8>,
    #[serde(default)]
    pub watched_episodes_count: u32,
    #[serde(default)]
    pub total_episodes_count: Option<u32>,
    pub show: SimklShow,
}

impl SimklListEntry {
    pub fn rating(&self) -> u8 {
        self.user_rating.unwrap_or(0)
    }

    pub fn mal_id(&self) -> Option<ExternalId> {
        self.show.ids.mal
    }

    /// Watched count reached the episode total. An unknown or zero total never matches.
    pub fn is_finished(&self) -> bool {
        match self.total_episodes_count {
            Some(total) if total > 0 => self.watched_episodes_count == total,
            _ => false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SimklAllItemsResponse {
    #[serde(default)]
    pub anime: Option<Vec<SimklListEntry>>,
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(id)) => Some(id),
        Some(RawId::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// The Simkl calls a list plugin needs
#[async_trait]
pub trait SimklApi: Send + Sync {
    /// The list record for one anime, `None` when it is not on the list
    async fn watched_info(&self, mal_id: ExternalId) -> Result<Option<SimklListEntry>>;

    async fn all_list_entries(&self) -> Result<Vec<SimklListEntry>>;

    /// Make the watched episode count equal `episodes`
    async fn set_progress(&self, mal_id: ExternalId, episodes: u32) -> Result<()>;

    /// `rating` is 0-10; 0 clears the rating
    async fn add_rating(&self, mal_id: ExternalId, rating: u8) -> Result<()>;

    /// Add the anime to the list, or move it, under `status`
    async fn add_item_to_list(&self, mal_id: ExternalId, status: SimklStatus) -> Result<()>;

    async fn remove_from_list(&self, mal_id: ExternalId) -> Result<bool>;

    fn simkl_status_for(&self, status: ListStatus) -> SimklStatus;

    fn status_from_simkl(&self, status: SimklStatus) -> ListStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_items_response() {
        let json = r#"{
            "anime": [
                {
                    "last_watched_at": "2024-01-01T00:00:00Z",
                    "status": "watching",
                    "user_rating": 8,
                    "watched_episodes_count": 5,
                    "total_episodes_count": 12,
                    "not_aired_episodes_count": 0,
                    "show": {"title": "Frieren", "ids": {"simkl": 100, "mal": "52991"}}
                },
                {
                    "status": "plantowatch",
                    "user_rating": null,
                    "watched_episodes_count": 0,
                    "show": {"title": "No MAL", "ids": {"simkl": 101}}
                }
            ]
        }"#;
        let response: SimklAllItemsResponse = serde_json::from_str(json).unwrap();
        let anime = response.anime.unwrap();

        assert_eq!(anime.len(), 2);
        assert_eq!(anime[0].mal_id(), Some(52991));
        assert_eq!(anime[0].rating(), 8);
        assert_eq!(anime[0].status, SimklStatus::Watching);
        assert_eq!(anime[1].mal_id(), None);
        assert_eq!(anime[1].rating(), 0);
        assert_eq!(anime[1].total_episodes_count, None);
    }

    #[test]
    fn test_numeric_mal_id() {
        let ids: SimklIds = serde_json::from_str(r#"{"simkl": 1, "mal": 5114}"#).unwrap();
        assert_eq!(ids.mal, Some(5114));
    }

    #[test]
    fn test_is_finished() {
        let mut entry = SimklListEntry {
            status: SimklStatus::Watching,
            user_rating: None,
            watched_episodes_count: 12,
            total_episodes_count: Some(12),
            show: SimklShow { title: String::new(), ids: SimklIds { simkl: 1, mal: Some(1) } },
        };
        assert!(entry.is_finished());

        entry.total_episodes_count = None;
        assert!(!entry.is_finished());

        entry.watched_episodes_count = 0;
        entry.total_episodes_count = Some(0);
        assert!(!entry.is_finished());
    }

    #[test]
    fn test_default_status_conversion() {
        assert_eq!(SimklStatus::from(ListStatus::Repeating), SimklStatus::Watching);
        assert_eq!(SimklStatus::from(ListStatus::Paused), SimklStatus::Hold);
        assert_eq!(ListStatus::from(SimklStatus::NotInteresting), ListStatus::Dropped);
        assert_eq!(ListStatus::from(SimklStatus::PlanToWatch), ListStatus::Planning);
        assert_eq!("PlanToWatch".parse::<SimklStatus>().unwrap(), SimklStatus::PlanToWatch);
    }
}
