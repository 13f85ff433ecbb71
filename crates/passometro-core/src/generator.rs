//! Client for the external note service.
//!
//! The service turns raw entry-board text into a [`StructuredNote`] and mirrors the published
//! sheet. Both concerns sit behind traits so the board, the view and the REST layer can run against
//! fakes in tests. Sync failures never block rendering: callers fall back to local state and log.

use crate::constants::{GENERATE_PATH, SHEET_PATH};
use crate::entry::EntryPatient;
use crate::record::{HandoffRecord, StructuredNote};
use crate::{CoreConfig, HandoffError, HandoffResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body of a generation request, in the service's wire names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(rename = "leitoInsercao")]
    pub bed: String,
    #[serde(rename = "evolucaoAnterior")]
    pub previous_evolution: String,
    #[serde(rename = "controles")]
    pub controls: String,
    #[serde(rename = "laboratorio")]
    pub labs: String,
    #[serde(rename = "gasometria")]
    pub blood_gas: String,
}

impl From<&EntryPatient> for GenerationRequest {
    fn from(patient: &EntryPatient) -> Self {
        Self {
            bed: patient.bed.clone(),
            previous_evolution: patient.previous_evolution.clone(),
            controls: patient.controls.clone(),
            labs: patient.labs.clone(),
            blood_gas: patient.blood_gas.clone(),
        }
    }
}

/// Turns raw clinical text into a structured note.
pub trait NoteGenerator: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> HandoffResult<StructuredNote>;
}

/// Remote copy of the handoff sheet.
pub trait SheetBackend: Send + Sync {
    fn fetch_sheet(&self) -> HandoffResult<Vec<HandoffRecord>>;
    fn push_sheet(&self, records: &[HandoffRecord]) -> HandoffResult<()>;
}

#[derive(Serialize)]
struct PushSheetBody<'a> {
    #[serde(rename = "pacientes")]
    patients: &'a [HandoffRecord],
}

/// HTTP client for the note service.
pub struct HttpNoteService {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpNoteService {
    /// # Errors
    ///
    /// Returns `HandoffError::HttpClientBuild` if the TLS backend cannot be initialised.
    pub fn new(base_url: &str, timeout: Duration) -> HandoffResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HandoffError::HttpClientBuild)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    /// `None` when the configuration runs without a backend.
    pub fn from_config(cfg: &CoreConfig) -> HandoffResult<Option<Self>> {
        cfg.backend_url()
            .map(|url| Self::new(url, cfg.request_timeout()))
            .transpose()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_error(&self, e: reqwest::Error) -> HandoffError {
        if e.is_connect() {
            HandoffError::GeneratorConnection(self.base_url.clone())
        } else if e.is_timeout() {
            HandoffError::HttpClient(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            HandoffError::HttpClient(e.to_string())
        }
    }

    fn check_status(
        response: reqwest::blocking::Response,
    ) -> HandoffResult<reqwest::blocking::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(HandoffError::GeneratorStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl NoteGenerator for HttpNoteService {
    fn generate(&self, request: &GenerationRequest) -> HandoffResult<StructuredNote> {
        let response = self
            .client
            .post(self.url(GENERATE_PATH))
            .json(request)
            .send()
            .map_err(|e| self.send_error(e))?;

        Self::check_status(response)?
            .json()
            .map_err(|e| HandoffError::GeneratorResponse(e.to_string()))
    }
}

impl SheetBackend for HttpNoteService {
    fn fetch_sheet(&self) -> HandoffResult<Vec<HandoffRecord>> {
        let response = self
            .client
            .get(self.url(SHEET_PATH))
            .send()
            .map_err(|e| self.send_error(e))?;

        let value: serde_json::Value = Self::check_status(response)?
            .json()
            .map_err(|e| HandoffError::GeneratorResponse(e.to_string()))?;
        records_from_sheet_response(value)
    }

    fn push_sheet(&self, records: &[HandoffRecord]) -> HandoffResult<()> {
        let response = self
            .client
            .post(self.url(SHEET_PATH))
            .json(&PushSheetBody { patients: records })
            .send()
            .map_err(|e| self.send_error(e))?;

        Self::check_status(response).map(|_| ())
    }
}

/// Reads the sheet endpoint's body. Anything but an array counts as "no remote sheet".
fn records_from_sheet_response(value: serde_json::Value) -> HandoffResult<Vec<HandoffRecord>> {
    match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)
            .map_err(|e| HandoffError::GeneratorResponse(e.to_string())),
        _ => Ok(Vec::new()),
    }
}

/// The remote sheet when it has records, else `local`.
pub fn load_sheet_or_local(
    backend: Option<&dyn SheetBackend>,
    local: Vec<HandoffRecord>,
) -> Vec<HandoffRecord> {
    let Some(backend) = backend else {
        return local;
    };
    match backend.fetch_sheet() {
        Ok(remote) if !remote.is_empty() => {
            tracing::info!("loaded {} patient(s) from the sheet backend", remote.len());
            remote
        }
        Ok(_) => local,
        Err(e) => {
            tracing::warn!("sheet backend unavailable, using local state: {}", e);
            local
        }
    }
}

/// Mirrors the sheet to the backend. Failures are logged and otherwise ignored.
pub fn push_sheet_or_warn(backend: Option<&dyn SheetBackend>, records: &[HandoffRecord]) {
    if let Some(backend) = backend {
        if let Err(e) = backend.push_sheet(records) {
            tracing::warn!("failed to save sheet to backend: {}", e);
        }
    }
}
