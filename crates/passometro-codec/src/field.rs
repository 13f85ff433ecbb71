//! Field kinds of the handoff sheet.
//!
//! Each kind carries its own display decode and its own edit transform pair. The sheet schema
//! assigns a kind to every field once; rendering and editing dispatch on the kind rather than on
//! the field title.

use crate::condutas::{self, DirectiveGrid};
use crate::highlight::{HighlightRules, Segment};
use crate::problems::{self, OrphanPolicy, ProblemBlock};
use crate::{list_field, TaggedItem};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Running prose (HDA, evolution).
    FreeNarrative { preserve_line_breaks: bool },
    /// The `"block | block"` problem list.
    StructuredProblemList,
    /// Highlighted tagged items (controls, labs, blood gas).
    TaggedItemList,
    /// Text shown as-is, one block.
    PlainLabel,
    /// Text shown one line per row (medications).
    LinedText,
    /// The fixed three-column Condutas grid.
    DirectiveGrid,
}

/// Stored value of a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Items(Vec<TaggedItem>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Items(_) => None,
        }
    }

    pub fn as_items(&self) -> Option<&[TaggedItem]> {
        match self {
            FieldValue::Items(items) => Some(items),
            FieldValue::Text(_) => None,
        }
    }
}

/// Read-only display form of a field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RenderedField {
    Narrative {
        text: String,
        preserve_line_breaks: bool,
    },
    Problems(Vec<ProblemBlock>),
    Items(Vec<Vec<Segment>>),
    Label(String),
    Lines(Vec<String>),
    Grid(DirectiveGrid),
}

/// A saved edit and any input lines the transform had to discard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedEdit {
    pub value: FieldValue,
    pub dropped_lines: Vec<String>,
}

impl FieldKind {
    pub fn holds_items(&self) -> bool {
        matches!(self, FieldKind::TaggedItemList)
    }

    /// Display form of `value`, or `None` when there is nothing to show.
    ///
    /// A value of the wrong shape for this kind is treated as absent.
    pub fn render(&self, value: &FieldValue) -> Option<RenderedField> {
        self.render_with(value, &HighlightRules::default())
    }

    pub fn render_with(&self, value: &FieldValue, rules: &HighlightRules) -> Option<RenderedField> {
        if let FieldKind::TaggedItemList = self {
            let rows: Vec<Vec<Segment>> = value
                .as_items()?
                .iter()
                .map(|item| rules.segments(item))
                .filter(|segments| !segments.is_empty())
                .collect();
            return (!rows.is_empty()).then_some(RenderedField::Items(rows));
        }

        let text = value.as_text()?;
        if text.trim().is_empty() {
            return None;
        }

        let rendered = match self {
            FieldKind::FreeNarrative {
                preserve_line_breaks,
            } => RenderedField::Narrative {
                text: text.to_string(),
                preserve_line_breaks: *preserve_line_breaks,
            },
            FieldKind::StructuredProblemList => {
                let blocks = problems::decode(text);
                if blocks.is_empty() {
                    return None;
                }
                RenderedField::Problems(blocks)
            }
            FieldKind::PlainLabel => RenderedField::Label(text.to_string()),
            FieldKind::LinedText => {
                RenderedField::Lines(text.split('\n').map(str::to_string).collect())
            }
            FieldKind::DirectiveGrid => {
                let grid = condutas::layout(text);
                if grid.is_empty() {
                    return None;
                }
                RenderedField::Grid(grid)
            }
            FieldKind::TaggedItemList => return None,
        };
        Some(rendered)
    }

    /// Editable text for `value`.
    pub fn to_edit_text(&self, value: &FieldValue) -> String {
        match (self, value) {
            (FieldKind::TaggedItemList, FieldValue::Items(items)) => {
                list_field::to_edit_text(items)
            }
            (FieldKind::StructuredProblemList, FieldValue::Text(text)) => {
                problems::to_edit_text(text)
            }
            (FieldKind::TaggedItemList, FieldValue::Text(_)) => String::new(),
            (_, FieldValue::Text(text)) => text.clone(),
            (_, FieldValue::Items(_)) => String::new(),
        }
    }

    /// Encodes edited text back into a stored value.
    pub fn apply_edit(&self, text: &str) -> AppliedEdit {
        match self {
            FieldKind::TaggedItemList => AppliedEdit {
                value: FieldValue::Items(list_field::from_edit_text(text)),
                dropped_lines: Vec::new(),
            },
            FieldKind::StructuredProblemList => {
                let collapsed = problems::collapse_with(text, OrphanPolicy::Drop);
                AppliedEdit {
                    value: FieldValue::Text(collapsed.encoded),
                    dropped_lines: collapsed.orphans,
                }
            }
            _ => AppliedEdit {
                value: FieldValue::Text(text.to_string()),
                dropped_lines: Vec::new(),
            },
        }
    }

    pub fn from_edit_text(&self, text: &str) -> FieldValue {
        self.apply_edit(text).value
    }
}
