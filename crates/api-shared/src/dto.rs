//! Request and response bodies of the REST API.
//!
//! Records are carried in their persisted wire shape (Portuguese keys), so the same JSON moves
//! between the store, the note service and API clients. Core types have no OpenAPI schema of their
//! own and are documented as generic objects.

use passometro_codec::Identification;
use passometro_core::sheet::RenderedRecord;
use passometro_core::{EditSelector, EntryPatient, HandoffRecord, ViewMode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ViewRes {
    /// `entry` or `handoff`.
    pub mode: String,
    pub handoff: bool,
}

impl From<ViewMode> for ViewRes {
    fn from(mode: ViewMode) -> Self {
        let name = match mode {
            ViewMode::Entry => "entry",
            ViewMode::Handoff => "handoff",
        };
        Self {
            mode: name.into(),
            handoff: mode.is_handoff(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryListRes {
    #[schema(value_type = Vec<Object>)]
    pub patients: Vec<EntryPatient>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EntryRes {
    #[schema(value_type = Object)]
    pub patient: EntryPatient,
}

/// Replaces one raw input of an entry patient.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateEntryReq {
    /// `leito`, `evolucaoAnterior`, `controles`, `laboratorio` or `gasometria`.
    pub field: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PublishRes {
    pub published: usize,
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<HandoffRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HandoffListRes {
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<HandoffRecord>,
    #[schema(value_type = Option<Object>)]
    pub editing: Option<EditSelector>,
}

/// Replaces the whole sheet. Accepts the note service's `pacientes` key too.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplaceHandoffReq {
    #[serde(alias = "pacientes")]
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<HandoffRecord>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct SheetRes {
    pub title: String,
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<RenderedRecord>,
    /// Plain-text rendering of the same sheet.
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BeginEditRes {
    pub record_id: i64,
    pub field: String,
    /// Editable text of the field. Empty for `identificacao`.
    pub text: String,
    /// Current sub-fields when the identification header is being edited.
    #[schema(value_type = Option<Object>)]
    pub identification: Option<Identification>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveFieldReq {
    pub text: String,
}

/// Identification sub-fields as typed in the header editor.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct IdentificationReq {
    #[serde(rename = "leito", alias = "bed", default)]
    pub bed: String,
    #[serde(rename = "nome", alias = "name", default)]
    pub name: String,
    #[serde(rename = "idade", alias = "age", default)]
    pub age: String,
    #[serde(rename = "sexo", alias = "sex", default)]
    pub sex: String,
}

impl From<IdentificationReq> for Identification {
    fn from(req: IdentificationReq) -> Self {
        Identification {
            bed: req.bed,
            name: req.name,
            age: req.age,
            sex: req.sex,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentificationRes {
    pub title: String,
    pub details: Option<String>,
    #[schema(value_type = Object)]
    pub identification: Identification,
}
