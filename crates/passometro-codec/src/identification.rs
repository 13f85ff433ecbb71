//! Patient identification: normalisation on save and the sheet header line.

use crate::wire;
use serde::{Deserialize, Serialize};

/// Shown when the generator could not extract a name.
pub const UNIDENTIFIED_PATIENT: &str = "PACIENTE NÃO IDENTIFICADO";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    #[serde(
        rename = "leito",
        alias = "bed",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub bed: String,

    #[serde(
        rename = "nome",
        alias = "name",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub name: String,

    #[serde(
        rename = "idade",
        alias = "age",
        default,
        deserialize_with = "wire::string_or_number"
    )]
    pub age: String,

    #[serde(
        rename = "sexo",
        alias = "sex",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub sex: String,

    /// Keys this crate does not model, such as the record number.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Identification {
    /// Trims every sub-field and uppercases bed, name and sex. Age is only trimmed.
    ///
    /// Applied when an identification edit is confirmed, never while typing.
    pub fn normalized(&self) -> Self {
        Self {
            bed: self.bed.trim().to_uppercase(),
            name: self.name.trim().to_uppercase(),
            age: self.age.trim().to_string(),
            sex: self.sex.trim().to_uppercase(),
            extra: self.extra.clone(),
        }
    }

    /// Header for the sheet. `fallback_bed` is the bed typed on the entry board, used when the
    /// identification itself carries none.
    pub fn header(&self, fallback_bed: &str) -> IdentificationHeader {
        let bed = non_blank(&self.bed).or_else(|| non_blank(fallback_bed));
        let name = non_blank(&self.name).unwrap_or(UNIDENTIFIED_PATIENT);

        let title = match bed {
            Some(bed) => format!("LEITO {bed}: {name}"),
            None => name.to_string(),
        };

        let details: Vec<String> = [
            non_blank(&self.age).map(|age| format!("{age} ANOS")),
            non_blank(&self.sex).map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .collect();

        IdentificationHeader {
            title,
            details: (!details.is_empty()).then(|| details.join(" | ")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IdentificationHeader {
    pub title: String,
    pub details: Option<String>,
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
