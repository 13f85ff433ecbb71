//! Which of the two views a request is for.

use crate::constants::HANDOFF_VIEW_PARAM;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Raw-input board.
    #[default]
    Entry,
    /// Rendered handoff sheet.
    Handoff,
}

impl ViewMode {
    /// `Some("1")` selects the handoff view; anything else selects the entry board.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("1") => ViewMode::Handoff,
            _ => ViewMode::Entry,
        }
    }

    /// Reads the mode flag from a raw query string such as `passometro=1&x=y`.
    pub fn from_query_string(query: &str) -> Self {
        let value = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(key, _)| *key == HANDOFF_VIEW_PARAM)
            .map(|(_, value)| value);
        Self::from_param(value)
    }

    pub fn is_handoff(self) -> bool {
        self == ViewMode::Handoff
    }
}
