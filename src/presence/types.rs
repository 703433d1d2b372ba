use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Availability reported by the remote for one account
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum Presence {
    Online,
    Offline {
        #[serde(with = "chrono::serde::ts_seconds")]
        was_online: DateTime<Utc>,
    },
    Recently,
    LastWeek,
    LastMonth,
    /// Hidden, empty, or a kind this client does not know
    #[default]
    #[serde(other)]
    Unknown,
}

/// Full account info for a single username
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct Account {
    #[serde(default)]
    pub(crate) bot: bool,
    #[serde(default)]
    pub(crate) status: Presence,
}
