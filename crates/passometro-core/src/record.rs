//! Handoff records and the sheet schema.
//!
//! A [`HandoffRecord`] is one patient card on the handoff sheet. Its [`StructuredNote`] is the
//! payload produced by the note service; field names follow the service's Portuguese wire keys,
//! and unknown keys are carried through untouched so the store round-trips the payload.

use crate::{HandoffError, HandoffResult};
use passometro_codec::{wire, FieldKind, FieldValue, Identification, TaggedItem};
use passometro_types::RecordId;
use serde::{Deserialize, Serialize};

/// Structured clinical note for one patient.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredNote {
    #[serde(
        rename = "identificacao",
        alias = "identification",
        default,
        deserialize_with = "wire::null_as_default"
    )]
    pub identification: Identification,

    #[serde(
        rename = "problemas",
        alias = "problems",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub problems: String,

    #[serde(
        rename = "hda",
        alias = "history",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub history: String,

    #[serde(
        rename = "evolucao",
        alias = "evolution",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub evolution: String,

    #[serde(
        rename = "controles",
        alias = "controls",
        default,
        deserialize_with = "wire::lenient_items"
    )]
    pub controls: Vec<TaggedItem>,

    #[serde(
        rename = "laboratorio",
        alias = "labs",
        default,
        deserialize_with = "wire::lenient_items"
    )]
    pub labs: Vec<TaggedItem>,

    #[serde(
        rename = "gasometria",
        alias = "blood_gas",
        default,
        deserialize_with = "wire::lenient_items"
    )]
    pub blood_gas: Vec<TaggedItem>,

    #[serde(
        rename = "medicacoes",
        alias = "medications",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub medications: String,

    #[serde(
        rename = "condutas",
        alias = "directives",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub directives: String,

    #[serde(
        rename = "intercorrencias",
        alias = "complications",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub complications: String,

    /// Keys this crate does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StructuredNote {
    pub fn field(&self, key: FieldKey) -> FieldValue {
        match key {
            FieldKey::Controls => FieldValue::Items(self.controls.clone()),
            FieldKey::Labs => FieldValue::Items(self.labs.clone()),
            FieldKey::BloodGas => FieldValue::Items(self.blood_gas.clone()),
            FieldKey::Problems => FieldValue::Text(self.problems.clone()),
            FieldKey::History => FieldValue::Text(self.history.clone()),
            FieldKey::Evolution => FieldValue::Text(self.evolution.clone()),
            FieldKey::Medications => FieldValue::Text(self.medications.clone()),
            FieldKey::Directives => FieldValue::Text(self.directives.clone()),
            FieldKey::Complications => FieldValue::Text(self.complications.clone()),
        }
    }

    /// Replaces one field wholesale.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::FieldShapeMismatch` if a list field is given text or a text field
    /// is given items.
    pub fn set_field(&mut self, key: FieldKey, value: FieldValue) -> HandoffResult<()> {
        match value {
            FieldValue::Items(items) => {
                let slot = match key {
                    FieldKey::Controls => &mut self.controls,
                    FieldKey::Labs => &mut self.labs,
                    FieldKey::BloodGas => &mut self.blood_gas,
                    _ => return Err(HandoffError::FieldShapeMismatch(key)),
                };
                *slot = items;
            }
            FieldValue::Text(text) => {
                let slot = match key {
                    FieldKey::Problems => &mut self.problems,
                    FieldKey::History => &mut self.history,
                    FieldKey::Evolution => &mut self.evolution,
                    FieldKey::Medications => &mut self.medications,
                    FieldKey::Directives => &mut self.directives,
                    FieldKey::Complications => &mut self.complications,
                    _ => return Err(HandoffError::FieldShapeMismatch(key)),
                };
                *slot = text;
            }
        }
        Ok(())
    }
}

/// One patient card on the handoff sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandoffRecord {
    pub id: RecordId,

    /// Bed typed on the entry board. The identification's own bed takes precedence.
    #[serde(
        rename = "leito",
        alias = "bed",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub bed: String,

    #[serde(
        rename = "dados",
        alias = "data",
        default,
        deserialize_with = "wire::null_as_default"
    )]
    pub data: StructuredNote,
}

/// Sheet fields, named by their wire keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "problemas")]
    Problems,
    #[serde(rename = "hda")]
    History,
    #[serde(rename = "evolucao")]
    Evolution,
    #[serde(rename = "controles")]
    Controls,
    #[serde(rename = "laboratorio")]
    Labs,
    #[serde(rename = "gasometria")]
    BloodGas,
    #[serde(rename = "medicacoes")]
    Medications,
    #[serde(rename = "condutas")]
    Directives,
    #[serde(rename = "intercorrencias")]
    Complications,
}

impl FieldKey {
    pub const ALL: [FieldKey; 9] = [
        FieldKey::Problems,
        FieldKey::History,
        FieldKey::Evolution,
        FieldKey::Controls,
        FieldKey::Labs,
        FieldKey::BloodGas,
        FieldKey::Medications,
        FieldKey::Directives,
        FieldKey::Complications,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            FieldKey::Problems => "problemas",
            FieldKey::History => "hda",
            FieldKey::Evolution => "evolucao",
            FieldKey::Controls => "controles",
            FieldKey::Labs => "laboratorio",
            FieldKey::BloodGas => "gasometria",
            FieldKey::Medications => "medicacoes",
            FieldKey::Directives => "condutas",
            FieldKey::Complications => "intercorrencias",
        }
    }

    fn english_name(self) -> &'static str {
        match self {
            FieldKey::Problems => "problems",
            FieldKey::History => "history",
            FieldKey::Evolution => "evolution",
            FieldKey::Controls => "controls",
            FieldKey::Labs => "labs",
            FieldKey::BloodGas => "blood_gas",
            FieldKey::Medications => "medications",
            FieldKey::Directives => "directives",
            FieldKey::Complications => "complications",
        }
    }

    pub fn spec(self) -> &'static FieldSpec {
        // Every key has exactly one schema entry.
        HANDOFF_SCHEMA
            .iter()
            .find(|spec| spec.key == self)
            .unwrap_or(&HANDOFF_SCHEMA[0])
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl std::str::FromStr for FieldKey {
    type Err = HandoffError;

    /// Accepts the wire key or the English name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FieldKey::ALL
            .into_iter()
            .find(|key| {
                key.wire_name().eq_ignore_ascii_case(wanted)
                    || key.english_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| HandoffError::UnknownField(wanted.to_string()))
    }
}

/// How one field appears on the sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub title: &'static str,
    pub kind: FieldKind,
    pub editable: bool,
}

/// Sheet fields in display order.
pub static HANDOFF_SCHEMA: [FieldSpec; 9] = [
    FieldSpec {
        key: FieldKey::Problems,
        title: "Problemas",
        kind: FieldKind::StructuredProblemList,
        editable: true,
    },
    FieldSpec {
        key: FieldKey::History,
        title: "HDA",
        kind: FieldKind::FreeNarrative {
            preserve_line_breaks: true,
        },
        editable: true,
    },
    FieldSpec {
        key: FieldKey::Evolution,
        title: "Evolução / Intercorrências",
        kind: FieldKind::FreeNarrative {
            preserve_line_breaks: false,
        },
        editable: true,
    },
    FieldSpec {
        key: FieldKey::Controls,
        title: "Controles",
        kind: FieldKind::TaggedItemList,
        editable: false,
    },
    FieldSpec {
        key: FieldKey::Labs,
        title: "Laboratório",
        kind: FieldKind::TaggedItemList,
        editable: true,
    },
    FieldSpec {
        key: FieldKey::BloodGas,
        title: "Gasometria",
        kind: FieldKind::TaggedItemList,
        editable: true,
    },
    FieldSpec {
        key: FieldKey::Medications,
        title: "Medicações",
        kind: FieldKind::LinedText,
        editable: true,
    },
    FieldSpec {
        key: FieldKey::Directives,
        title: "Condutas / Pendências",
        kind: FieldKind::DirectiveGrid,
        editable: true,
    },
    FieldSpec {
        key: FieldKey::Complications,
        title: "Intercorrências",
        kind: FieldKind::PlainLabel,
        editable: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use passometro_types::StyleTag;

    const PAYLOAD: &str = r#"{
        "id": 1718000000000,
        "leito": "7",
        "dados": {
            "identificacao": {"nome": "MARIA", "idade": 81, "sexo": "FEMININO"},
            "problemas": "Sepse ~ foco pulmonar | DRC",
            "hda": null,
            "controles": [{"texto": "Tax: 38.2 Febre", "destaques": {"TEMPERATURE": "alert"}}],
            "laboratorio": null,
            "condutas": "Colher culturas",
            "versaoModelo": "2024-06"
        }
    }"#;

    #[test]
    fn test_reads_service_payload() {
        let record: HandoffRecord = serde_json::from_str(PAYLOAD).unwrap();
        assert_eq!(record.id, RecordId::new(1_718_000_000_000));
        assert_eq!(record.bed, "7");
        assert_eq!(record.data.identification.age, "81");
        assert_eq!(record.data.history, "");
        assert!(record.data.labs.is_empty());
        assert!(record.data.blood_gas.is_empty());
        assert_eq!(
            record.data.controls[0].highlights.get("TEMPERATURE"),
            Some(&StyleTag::from("alert"))
        );
    }

    #[test]
    fn test_round_trips_unknown_keys() {
        let record: HandoffRecord = serde_json::from_str(PAYLOAD).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["dados"]["versaoModelo"], "2024-06");
        let again: HandoffRecord = serde_json::from_value(json).unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn test_missing_data_reads_as_empty_note() {
        let record: HandoffRecord = serde_json::from_str(r#"{"id": 1, "dados": null}"#).unwrap();
        assert_eq!(record.data, StructuredNote::default());
        assert_eq!(record.bed, "");
    }

    #[test]
    fn test_set_field_rejects_wrong_shape() {
        let mut note = StructuredNote::default();
        let err = note
            .set_field(FieldKey::Labs, FieldValue::Text("Hb 9".into()))
            .unwrap_err();
        assert!(matches!(err, HandoffError::FieldShapeMismatch(FieldKey::Labs)));

        let err = note
            .set_field(FieldKey::Problems, FieldValue::Items(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, HandoffError::FieldShapeMismatch(FieldKey::Problems)));
    }

    #[test]
    fn test_field_accessors_cover_every_key() {
        let mut note = StructuredNote::default();
        for key in FieldKey::ALL {
            let value = match key.spec().kind {
                FieldKind::TaggedItemList => {
                    FieldValue::Items(vec![TaggedItem::plain(key.wire_name())])
                }
                _ => FieldValue::Text(key.wire_name().to_string()),
            };
            note.set_field(key, value.clone()).unwrap();
            assert_eq!(note.field(key), value);
        }
    }

    #[test]
    fn test_field_key_parsing() {
        assert_eq!("gasometria".parse::<FieldKey>().unwrap(), FieldKey::BloodGas);
        assert_eq!("blood_gas".parse::<FieldKey>().unwrap(), FieldKey::BloodGas);
        assert_eq!(" HDA ".parse::<FieldKey>().unwrap(), FieldKey::History);
        assert!(matches!(
            "identificacao".parse::<FieldKey>(),
            Err(HandoffError::UnknownField(_))
        ));
    }

    #[test]
    fn test_schema_has_one_entry_per_key() {
        for key in FieldKey::ALL {
            assert_eq!(HANDOFF_SCHEMA.iter().filter(|s| s.key == key).count(), 1);
            assert_eq!(key.spec().key, key);
        }
    }
}
