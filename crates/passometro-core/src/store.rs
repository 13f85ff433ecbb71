//! JSON persistence of whole collections keyed by view name.
//!
//! Each view owns one file, `<data_dir>/<key>.json`, holding a JSON array. Saves replace the file
//! wholesale (write to a sibling temp file, then rename). A missing file reads as an empty
//! collection.

use crate::constants::{ENTRY_STORE_KEY, HANDOFF_STORE_KEY, STORE_FILE_EXTENSION};
use crate::entry::EntryPatient;
use crate::record::HandoffRecord;
use crate::{HandoffError, HandoffResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{STORE_FILE_EXTENSION}"))
    }

    /// Loads the collection stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::FileRead` on I/O failure other than a missing file and
    /// `HandoffError::Deserialization` if the file is not a JSON array of `T`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> HandoffResult<Vec<T>> {
        let path = self.path(key);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no store file at {}, starting empty", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(HandoffError::FileRead(e)),
        };
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&json).map_err(HandoffError::Deserialization)
    }

    /// Replaces the collection stored under `key`.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> HandoffResult<()> {
        fs::create_dir_all(&self.dir).map_err(HandoffError::StorageDirCreation)?;

        let json = serde_json::to_string_pretty(items).map_err(HandoffError::Serialization)?;
        let path = self.path(key);
        let tmp = path.with_extension(format!("{STORE_FILE_EXTENSION}.tmp"));
        fs::write(&tmp, json).map_err(HandoffError::FileWrite)?;
        fs::rename(&tmp, &path).map_err(HandoffError::FileWrite)?;

        tracing::debug!("saved {} item(s) to {}", items.len(), path.display());
        Ok(())
    }

    pub fn load_entries(&self) -> HandoffResult<Vec<EntryPatient>> {
        self.load(ENTRY_STORE_KEY)
    }

    pub fn save_entries(&self, entries: &[EntryPatient]) -> HandoffResult<()> {
        self.save(ENTRY_STORE_KEY, entries)
    }

    pub fn load_handoff(&self) -> HandoffResult<Vec<HandoffRecord>> {
        self.load(HANDOFF_STORE_KEY)
    }

    pub fn save_handoff(&self, records: &[HandoffRecord]) -> HandoffResult<()> {
        self.save(HANDOFF_STORE_KEY, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StructuredNote;
    use passometro_codec::TaggedItem;
    use passometro_types::RecordId;
    use tempfile::TempDir;

    fn sample() -> Vec<HandoffRecord> {
        let mut data: StructuredNote = serde_json::from_str(
            r#"{"problemas": "Sepse ~ foco pulmonar", "origem": {"modelo": "x"}}"#,
        )
        .unwrap();
        data.labs = vec![TaggedItem::plain("Hb: 8.1").with_highlight("8.1", "warn")];
        vec![HandoffRecord {
            id: RecordId::new(1_700_000_000_000),
            bed: "5".into(),
            data,
        }]
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path().join("not-yet"));
        assert!(store.load_handoff().unwrap().is_empty());
        assert!(store.load_entries().unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        let records = sample();
        store.save_handoff(&records).unwrap();

        assert!(store.path(HANDOFF_STORE_KEY).ends_with("pacientes-passometro.json"));
        assert_eq!(store.load_handoff().unwrap(), records);
    }

    #[test]
    fn test_save_uses_wire_keys() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save_handoff(&sample()).unwrap();

        let raw = fs::read_to_string(store.path(HANDOFF_STORE_KEY)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["leito"], "5");
        assert_eq!(value[0]["dados"]["laboratorio"][0]["texto"], "Hb: 8.1");
        assert_eq!(value[0]["dados"]["origem"]["modelo"], "x");
    }

    #[test]
    fn test_nested_unmodelled_keys_survive_load_and_save() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        let raw = r#"[{"id": 1, "leito": "2", "dados": {
            "identificacao": {"nome": "ANA", "idade": 70, "prontuario": "123"},
            "laboratorio": [{"texto": "Hb: 9", "destaques": {"9": "ok"}, "fonte": "lab"}],
            "controles": [{"texto": "PA: 120x80", "destaques": {"120x80": null}}]
        }}]"#;
        fs::write(store.path(HANDOFF_STORE_KEY), raw).unwrap();

        let records = store.load_handoff().unwrap();
        store.save_handoff(&records).unwrap();

        let saved = fs::read_to_string(store.path(HANDOFF_STORE_KEY)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&saved).unwrap();
        let data = &value[0]["dados"];
        assert_eq!(data["identificacao"]["prontuario"], "123");
        assert_eq!(data["laboratorio"][0]["fonte"], "lab");
        assert_eq!(data["laboratorio"][0]["destaques"]["9"], "ok");
        assert_eq!(data["controles"][0]["texto"], "PA: 120x80");
        assert_eq!(store.load_handoff().unwrap(), records);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        fs::write(store.path(HANDOFF_STORE_KEY), "{not json").unwrap();
        assert!(matches!(
            store.load_handoff(),
            Err(HandoffError::Deserialization(_))
        ));
    }

    #[test]
    fn test_save_replaces_previous_collection() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::new(tmp.path());
        store.save_handoff(&sample()).unwrap();
        store.save_handoff(&[]).unwrap();
        assert!(store.load_handoff().unwrap().is_empty());
    }
}
