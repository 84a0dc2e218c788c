use serde::{Deserialize, Serialize};
use std::fmt;

/// Media id in the client's own catalog (AniList).
pub type CatalogId = u64;

/// Media id in the catalog the external list service is keyed by (MyAnimeList).
pub type ExternalId = u64;

/// Catalog systems known to the id mapping service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IdSource {
    AniList,
    MyAnimeList,
    Kitsu,
    AniDb,
}

impl IdSource {
    /// Name used by the mapping service in its `source` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            IdSource::AniList => "anilist",
            IdSource::MyAnimeList => "myanimelist",
            IdSource::Kitsu => "kitsu",
            IdSource::AniDb => "anidb",
        }
    }
}

impl fmt::Display for IdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_source_names() {
        assert_eq!(IdSource::AniList.as_str(), "anilist");
        assert_eq!(IdSource::MyAnimeList.to_string(), "myanimelist");
        assert_eq!(serde_json::to_string(&IdSource::AniDb).unwrap(), "\"anidb\"");
    }
}
