//! Tagged items: a line of clinical text plus its keyword emphasis table.

use crate::wire;
use passometro_types::StyleTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a list-type field (controls, labs, blood gas).
///
/// `text` may hold several `|`-separated segments, each optionally `"label: value"`. The
/// `highlights` table is keyed by the token derived from a segment value (see
/// [`crate::highlight`]), never by raw segment text. A missing key means "no emphasis".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedItem {
    #[serde(
        rename = "texto",
        alias = "text",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub text: String,

    #[serde(
        rename = "destaques",
        alias = "highlights",
        default,
        deserialize_with = "wire::lenient_highlights"
    )]
    pub highlights: BTreeMap<String, StyleTag>,

    /// Keys this crate does not model, such as the item's source.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TaggedItem {
    /// An item with no emphasis, as produced by a raw-line edit.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlights: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_highlight(mut self, key: impl Into<String>, tag: impl Into<StyleTag>) -> Self {
        self.highlights.insert(key.into(), tag.into());
        self
    }

    /// Items whose text is blank are never rendered.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
