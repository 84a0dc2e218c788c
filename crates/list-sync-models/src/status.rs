use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// List status as the client models it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListStatus {
    /// Currently watching
    Current,
    /// Want to watch
    Planning,
    /// Finished watching
    Completed,
    /// Stopped watching
    Dropped,
    /// On hold
    Paused,
    /// Watching again after completing
    Repeating,
}

impl ListStatus {
    pub const ALL: [ListStatus; 6] = [
        ListStatus::Current,
        ListStatus::Planning,
        ListStatus::Completed,
        ListStatus::Dropped,
        ListStatus::Paused,
        ListStatus::Repeating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListStatus::Current => "CURRENT",
            ListStatus::Planning => "PLANNING",
            ListStatus::Completed => "COMPLETED",
            ListStatus::Dropped => "DROPPED",
            ListStatus::Paused => "PAUSED",
            ListStatus::Repeating => "REPEATING",
        }
    }
}

impl fmt::Display for ListStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ListStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "Invalid list status: {}. Use one of: current, planning, completed, dropped, paused, repeating",
                    s
                )
            })
    }
}
