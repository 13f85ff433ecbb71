//! The handoff view: rendered sheet plus modal per-field editing.
//!
//! At most one `(record, field)` pair is in edit mode at a time. The pair is an explicit
//! [`EditSelector`] owned by the view and passed into [`render_record`]; the codec never sees it.
//! Entering edit mode on another field replaces the selector. Stored values change only on an
//! explicit save, so switching fields never loses data.

use crate::record::{FieldKey, HandoffRecord, HANDOFF_SCHEMA};
use crate::{HandoffError, HandoffResult};
use passometro_codec::{Identification, IdentificationHeader, RenderedField};
use passometro_types::RecordId;
use serde::{Deserialize, Serialize};

/// What part of a record is being edited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTarget {
    Identification,
    Field(FieldKey),
}

impl std::fmt::Display for EditTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditTarget::Identification => f.write_str("identificacao"),
            EditTarget::Field(key) => write!(f, "{key}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSelector {
    pub record_id: RecordId,
    pub target: EditTarget,
}

impl EditSelector {
    pub fn field(record_id: RecordId, key: FieldKey) -> Self {
        Self {
            record_id,
            target: EditTarget::Field(key),
        }
    }

    pub fn identification(record_id: RecordId) -> Self {
        Self {
            record_id,
            target: EditTarget::Identification,
        }
    }
}

/// How one field is shown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FieldView {
    Display { rendered: RenderedField },
    Editing { text: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldRender {
    pub key: FieldKey,
    pub title: &'static str,
    pub editable: bool,
    #[serde(flatten)]
    pub view: FieldView,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedRecord {
    pub id: RecordId,
    pub header: IdentificationHeader,
    /// Identification sub-fields while the header is in edit mode.
    pub identification_draft: Option<Identification>,
    pub fields: Vec<FieldRender>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RenderedSheet {
    pub records: Vec<RenderedRecord>,
}

impl RenderedSheet {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Renders one record. Fields with nothing to show are omitted unless they are being edited.
pub fn render_record(record: &HandoffRecord, editing: Option<&EditSelector>) -> RenderedRecord {
    let editing = editing.filter(|sel| sel.record_id == record.id);
    let note = &record.data;

    let fields = HANDOFF_SCHEMA
        .iter()
        .filter_map(|spec| {
            let value = note.field(spec.key);
            let in_edit = editing.is_some_and(|sel| sel.target == EditTarget::Field(spec.key));
            let view = if in_edit {
                FieldView::Editing {
                    text: spec.kind.to_edit_text(&value),
                }
            } else {
                FieldView::Display {
                    rendered: spec.kind.render(&value)?,
                }
            };
            Some(FieldRender {
                key: spec.key,
                title: spec.title,
                editable: spec.editable,
                view,
            })
        })
        .collect();

    RenderedRecord {
        id: record.id,
        header: note.identification.header(&record.bed),
        identification_draft: editing
            .filter(|sel| sel.target == EditTarget::Identification)
            .map(|_| note.identification.clone()),
        fields,
    }
}

/// Handoff sheet state: the records plus the current edit selector.
#[derive(Clone, Debug, Default)]
pub struct HandoffView {
    records: Vec<HandoffRecord>,
    editing: Option<EditSelector>,
}

impl HandoffView {
    pub fn new(records: Vec<HandoffRecord>) -> Self {
        Self {
            records,
            editing: None,
        }
    }

    pub fn records(&self) -> &[HandoffRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<HandoffRecord> {
        self.records
    }

    /// Replaces the whole sheet and leaves edit mode.
    pub fn replace_records(&mut self, records: Vec<HandoffRecord>) {
        self.records = records;
        self.editing = None;
    }

    pub fn editing(&self) -> Option<&EditSelector> {
        self.editing.as_ref()
    }

    pub fn record(&self, id: RecordId) -> HandoffResult<&HandoffRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(HandoffError::RecordNotFound(id))
    }

    fn record_mut(&mut self, id: RecordId) -> HandoffResult<&mut HandoffRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(HandoffError::RecordNotFound(id))
    }

    /// Puts one field in edit mode and returns its editable text.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::RecordNotFound` for an unknown record and
    /// `HandoffError::FieldNotEditable` for read-only fields (controls, complications).
    pub fn begin_edit(&mut self, id: RecordId, key: FieldKey) -> HandoffResult<String> {
        let spec = key.spec();
        if !spec.editable {
            return Err(HandoffError::FieldNotEditable(key));
        }
        let record = self.record(id)?;
        let text = spec.kind.to_edit_text(&record.data.field(key));

        if let Some(previous) = self.editing.replace(EditSelector::field(id, key)) {
            tracing::debug!(
                "leaving edit of {} on patient {}",
                previous.target,
                previous.record_id
            );
        }
        tracing::debug!("editing {} on patient {}", key, id);
        Ok(text)
    }

    /// Puts the identification header in edit mode and returns the current sub-fields.
    pub fn begin_identification_edit(&mut self, id: RecordId) -> HandoffResult<Identification> {
        let ident = self.record(id)?.data.identification.clone();
        self.editing = Some(EditSelector::identification(id));
        Ok(ident)
    }

    fn require_editing(&self, selector: EditSelector) -> HandoffResult<()> {
        if self.editing == Some(selector) {
            Ok(())
        } else {
            Err(HandoffError::NotEditing {
                record_id: selector.record_id,
                target: selector.target.to_string(),
            })
        }
    }

    /// Encodes `text` with the field's edit transform, stores it, and leaves edit mode.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::NotEditing` unless `(id, key)` is the field currently in edit mode.
    pub fn save_edit(&mut self, id: RecordId, key: FieldKey, text: &str) -> HandoffResult<()> {
        self.require_editing(EditSelector::field(id, key))?;

        let applied = key.spec().kind.apply_edit(text);
        if !applied.dropped_lines.is_empty() {
            tracing::warn!(
                "dropped {} sub-item line(s) with no statement above in {} of patient {}: {:?}",
                applied.dropped_lines.len(),
                key,
                id,
                applied.dropped_lines
            );
        }

        self.record_mut(id)?.data.set_field(key, applied.value)?;
        self.editing = None;
        tracing::info!("saved {} on patient {}", key, id);
        Ok(())
    }

    /// Normalises and stores the identification, then leaves edit mode.
    pub fn save_identification(
        &mut self,
        id: RecordId,
        identification: &Identification,
    ) -> HandoffResult<Identification> {
        self.require_editing(EditSelector::identification(id))?;

        let record = self.record_mut(id)?;
        let mut normalized = identification.normalized();
        for (key, value) in &record.data.identification.extra {
            normalized
                .extra
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        record.data.identification = normalized.clone();
        self.editing = None;
        tracing::info!("saved identification on patient {}", id);
        Ok(normalized)
    }

    /// Leaves edit mode without touching any stored value.
    pub fn finish_edit(&mut self) {
        self.editing = None;
    }

    pub fn render(&self) -> RenderedSheet {
        RenderedSheet {
            records: self
                .records
                .iter()
                .map(|record| render_record(record, self.editing.as_ref()))
                .collect(),
        }
    }
}
