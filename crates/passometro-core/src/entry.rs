//! The entry board: raw clinical input per patient, before generation.
//!
//! Patients are added blank, filled in, submitted to the note service one at a time, and the
//! finished ones are published to the handoff sheet. Status moves `idle -> processing -> done`;
//! a failed generation goes back to `idle`.

use crate::generator::GenerationRequest;
use crate::record::{HandoffRecord, StructuredNote};
use crate::{HandoffError, HandoffResult};
use chrono::{DateTime, Utc};
use passometro_codec::wire;
use passometro_types::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Idle,
    Processing,
    Done,
}

/// One patient on the entry board. Controls, labs and blood gas are raw text here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryPatient {
    pub id: RecordId,

    #[serde(
        rename = "leito",
        alias = "bed",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub bed: String,

    #[serde(
        rename = "evolucaoAnterior",
        alias = "previous_evolution",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub previous_evolution: String,

    #[serde(
        rename = "controles",
        alias = "controls",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub controls: String,

    #[serde(
        rename = "laboratorio",
        alias = "labs",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub labs: String,

    #[serde(
        rename = "gasometria",
        alias = "blood_gas",
        default,
        deserialize_with = "wire::nullable_string"
    )]
    pub blood_gas: String,

    #[serde(default)]
    pub status: EntryStatus,

    #[serde(rename = "dados", alias = "data", default)]
    pub data: Option<StructuredNote>,
}

impl EntryPatient {
    pub fn blank(id: RecordId) -> Self {
        Self {
            id,
            bed: String::new(),
            previous_evolution: String::new(),
            controls: String::new(),
            labs: String::new(),
            blood_gas: String::new(),
            status: EntryStatus::Idle,
            data: None,
        }
    }

    fn slot_mut(&mut self, field: EntryField) -> &mut String {
        match field {
            EntryField::Bed => &mut self.bed,
            EntryField::PreviousEvolution => &mut self.previous_evolution,
            EntryField::Controls => &mut self.controls,
            EntryField::Labs => &mut self.labs,
            EntryField::BloodGas => &mut self.blood_gas,
        }
    }
}

/// Editable text inputs of an entry patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryField {
    #[serde(rename = "leito")]
    Bed,
    #[serde(rename = "evolucaoAnterior")]
    PreviousEvolution,
    #[serde(rename = "controles")]
    Controls,
    #[serde(rename = "laboratorio")]
    Labs,
    #[serde(rename = "gasometria")]
    BloodGas,
}

impl EntryField {
    pub const ALL: [EntryField; 5] = [
        EntryField::Bed,
        EntryField::PreviousEvolution,
        EntryField::Controls,
        EntryField::Labs,
        EntryField::BloodGas,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            EntryField::Bed => "leito",
            EntryField::PreviousEvolution => "evolucaoAnterior",
            EntryField::Controls => "controles",
            EntryField::Labs => "laboratorio",
            EntryField::BloodGas => "gasometria",
        }
    }
}

impl std::str::FromStr for EntryField {
    type Err = HandoffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        EntryField::ALL
            .into_iter()
            .find(|f| f.wire_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| HandoffError::UnknownField(wanted.to_string()))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryBoard {
    patients: Vec<EntryPatient>,
}

impl EntryBoard {
    pub fn new(patients: Vec<EntryPatient>) -> Self {
        Self { patients }
    }

    pub fn patients(&self) -> &[EntryPatient] {
        &self.patients
    }

    pub fn into_patients(self) -> Vec<EntryPatient> {
        self.patients
    }

    pub fn patient(&self, id: RecordId) -> HandoffResult<&EntryPatient> {
        self.patients
            .iter()
            .find(|p| p.id == id)
            .ok_or(HandoffError::RecordNotFound(id))
    }

    fn patient_mut(&mut self, id: RecordId) -> HandoffResult<&mut EntryPatient> {
        self.patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(HandoffError::RecordNotFound(id))
    }

    /// Appends a blank patient. The id is the millisecond timestamp of `now`, bumped past any id
    /// already on the board.
    pub fn add(&mut self, now: DateTime<Utc>) -> &EntryPatient {
        let mut id = now.timestamp_millis();
        if let Some(max) = self.patients.iter().map(|p| p.id.value()).max() {
            if id <= max {
                id = max + 1;
            }
        }
        self.patients.push(EntryPatient::blank(RecordId::new(id)));
        let added = &self.patients[self.patients.len() - 1];
        tracing::info!("added patient {} to entry board", added.id);
        added
    }

    pub fn add_now(&mut self) -> &EntryPatient {
        self.add(Utc::now())
    }

    /// Replaces one text input. Status and generated data are left alone.
    pub fn update(&mut self, id: RecordId, field: EntryField, value: String) -> HandoffResult<()> {
        *self.patient_mut(id)?.slot_mut(field) = value;
        Ok(())
    }

    /// Blanks every input, resets the status and discards the generated note.
    pub fn clear(&mut self, id: RecordId) -> HandoffResult<()> {
        let patient = self.patient_mut(id)?;
        *patient = EntryPatient::blank(id);
        tracing::info!("cleared patient {} on entry board", id);
        Ok(())
    }

    pub fn delete(&mut self, id: RecordId) -> HandoffResult<EntryPatient> {
        let index = self
            .patients
            .iter()
            .position(|p| p.id == id)
            .ok_or(HandoffError::RecordNotFound(id))?;
        tracing::info!("deleted patient {} from entry board", id);
        Ok(self.patients.remove(index))
    }

    pub fn generation_request(&self, id: RecordId) -> HandoffResult<GenerationRequest> {
        Ok(GenerationRequest::from(self.patient(id)?))
    }

    /// Marks the patient as submitted and returns the request to send.
    pub fn mark_processing(&mut self, id: RecordId) -> HandoffResult<GenerationRequest> {
        let patient = self.patient_mut(id)?;
        patient.status = EntryStatus::Processing;
        Ok(GenerationRequest::from(&*patient))
    }

    /// Stores the generated note as returned by the service.
    pub fn complete(&mut self, id: RecordId, note: StructuredNote) -> HandoffResult<()> {
        let patient = self.patient_mut(id)?;
        patient.status = EntryStatus::Done;
        patient.data = Some(note);
        tracing::info!("generation finished for patient {}", id);
        Ok(())
    }

    /// Returns a patient to `idle` after a failed generation. Earlier generated data is kept.
    pub fn fail(&mut self, id: RecordId) -> HandoffResult<()> {
        self.patient_mut(id)?.status = EntryStatus::Idle;
        Ok(())
    }

    pub fn has_done(&self) -> bool {
        self.patients.iter().any(|p| p.status == EntryStatus::Done)
    }

    /// Handoff records for every `done` patient, in board order.
    ///
    /// The board's bed is copied into the note's identification so the sheet header shows it.
    pub fn publish(&self) -> Vec<HandoffRecord> {
        self.patients
            .iter()
            .filter(|p| p.status == EntryStatus::Done)
            .map(|p| {
                let mut data = p.data.clone().unwrap_or_default();
                data.identification.bed = p.bed.clone();
                HandoffRecord {
                    id: p.id,
                    bed: p.bed.clone(),
                    data,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().unwrap()
    }

    #[test]
    fn test_add_uses_timestamp_and_stays_unique() {
        let mut board = EntryBoard::default();
        let first = board.add(at(1_000)).id;
        let second = board.add(at(1_000)).id;
        let third = board.add(at(500)).id;
        assert_eq!(first, RecordId::new(1_000));
        assert_eq!(second, RecordId::new(1_001));
        assert_eq!(third, RecordId::new(1_002));
        assert!(board.patients().iter().all(|p| p.status == EntryStatus::Idle));
    }

    #[test]
    fn test_update_and_clear() {
        let mut board = EntryBoard::default();
        let id = board.add(at(1)).id;
        board.update(id, EntryField::Bed, "7".into()).unwrap();
        board
            .update(id, EntryField::Labs, "Hb 9,1 Cr 1,3".into())
            .unwrap();
        board.complete(id, StructuredNote::default()).unwrap();

        assert_eq!(board.patient(id).unwrap().labs, "Hb 9,1 Cr 1,3");
        board.clear(id).unwrap();
        assert_eq!(board.patient(id).unwrap(), &EntryPatient::blank(id));
    }

    #[test]
    fn test_delete_unknown_patient() {
        let mut board = EntryBoard::default();
        assert!(matches!(
            board.delete(RecordId::new(3)),
            Err(HandoffError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_processing_lifecycle() {
        let mut board = EntryBoard::default();
        let id = board.add(at(1)).id;
        board.update(id, EntryField::Bed, "3".into()).unwrap();

        let request = board.mark_processing(id).unwrap();
        assert_eq!(request.bed, "3");
        assert_eq!(board.patient(id).unwrap().status, EntryStatus::Processing);

        board.fail(id).unwrap();
        assert_eq!(board.patient(id).unwrap().status, EntryStatus::Idle);
        assert!(!board.has_done());
    }

    #[test]
    fn test_publish_copies_bed_into_identification() {
        let mut board = EntryBoard::default();
        let done = board.add(at(1)).id;
        let idle = board.add(at(2)).id;
        board.update(done, EntryField::Bed, "12".into()).unwrap();
        board.update(idle, EntryField::Bed, "13".into()).unwrap();

        let note: StructuredNote = serde_json::from_str(
            r#"{"identificacao": {"leito": "99", "nome": "ANA"}, "problemas": "DPOC"}"#,
        )
        .unwrap();
        board.complete(done, note).unwrap();

        let published = board.publish();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].id, done);
        assert_eq!(published[0].bed, "12");
        assert_eq!(published[0].data.identification.bed, "12");
        assert_eq!(published[0].data.identification.name, "ANA");
        assert_eq!(published[0].data.problems, "DPOC");
    }

    #[test]
    fn test_entry_patient_wire_shape() {
        let json = r#"{
            "id": 42, "leito": "1", "evolucaoAnterior": null,
            "controles": "PA 120x80", "status": "done", "dados": null
        }"#;
        let patient: EntryPatient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.status, EntryStatus::Done);
        assert_eq!(patient.previous_evolution, "");
        assert_eq!(patient.data, None);

        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["evolucaoAnterior"], "");
        assert_eq!(value["status"], "done");
    }

    #[test]
    fn test_entry_field_parsing() {
        assert_eq!(
            "evolucaoanterior".parse::<EntryField>().unwrap(),
            EntryField::PreviousEvolution
        );
        assert!("status".parse::<EntryField>().is_err());
    }
}
