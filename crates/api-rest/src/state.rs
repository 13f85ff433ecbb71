use axum::http::StatusCode;
use passometro_core::generator::{load_sheet_or_local, push_sheet_or_warn};
use passometro_core::{
    CoreConfig, EntryBoard, HandoffError, HandoffRecord, HandoffResult, HandoffView,
    HttpNoteService, JsonStore, NoteGenerator, SheetBackend,
};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

type ApiResult<T> = Result<T, (StatusCode, &'static str)>;

/// Mirrors saved sheets to the backend from a single task.
///
/// Snapshots are pushed in the order they were saved. When several are queued only the newest is
/// sent, so the remote copy always ends on the last local save.
#[derive(Clone)]
pub(crate) struct SheetMirror {
    tx: mpsc::UnboundedSender<Vec<HandoffRecord>>,
}

impl SheetMirror {
    /// Starts the push task on the current runtime. Returns `None` outside a runtime.
    fn spawn(backend: Arc<dyn SheetBackend>) -> Option<Self> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime; saved sheets will not be mirrored to the backend");
            return None;
        };
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<HandoffRecord>>();
        handle.spawn(async move {
            while let Some(mut records) = rx.recv().await {
                while let Ok(newer) = rx.try_recv() {
                    records = newer;
                }
                let backend = backend.clone();
                let pushed = tokio::task::spawn_blocking(move || {
                    push_sheet_or_warn(Some(backend.as_ref()), &records);
                })
                .await;
                if let Err(e) = pushed {
                    tracing::error!("sheet push task failed: {:?}", e);
                }
            }
        });
        Some(Self { tx })
    }

    fn send(&self, records: &[HandoffRecord]) {
        if self.tx.send(records.to_vec()).is_err() {
            tracing::warn!("sheet mirror stopped; backend copy not updated");
        }
    }
}

/// Application state for the REST API server.
///
/// One entry board and one handoff view, each behind its own lock, plus the store they are
/// persisted to and the optional note service.
#[derive(Clone)]
pub struct AppState {
    pub(crate) store: JsonStore,
    pub(crate) board: Arc<Mutex<EntryBoard>>,
    pub(crate) view: Arc<Mutex<HandoffView>>,
    pub(crate) generator: Option<Arc<dyn NoteGenerator>>,
    pub(crate) mirror: Option<SheetMirror>,
}

impl AppState {
    /// Builds the state from configuration, using the HTTP note service when one is configured.
    ///
    /// Blocking: fetches the remote sheet. Call from `spawn_blocking` inside a runtime.
    pub fn from_config(cfg: &CoreConfig) -> HandoffResult<Self> {
        let service = HttpNoteService::from_config(cfg)?.map(Arc::new);
        let generator = service
            .clone()
            .map(|s| s as Arc<dyn NoteGenerator>);
        let sheet_backend = service.map(|s| s as Arc<dyn SheetBackend>);
        Self::load(cfg, generator, sheet_backend)
    }

    /// Loads both views from the store. A non-empty remote sheet replaces the local one.
    pub fn load(
        cfg: &CoreConfig,
        generator: Option<Arc<dyn NoteGenerator>>,
        sheet_backend: Option<Arc<dyn SheetBackend>>,
    ) -> HandoffResult<Self> {
        let store = JsonStore::new(cfg.data_dir());
        let entries = store.load_entries()?;
        let records = load_sheet_or_local(sheet_backend.as_deref(), store.load_handoff()?);

        tracing::info!(
            "loaded {} entry patient(s) and {} sheet patient(s) from {}",
            entries.len(),
            records.len(),
            store.dir().display()
        );

        Ok(Self {
            store,
            board: Arc::new(Mutex::new(EntryBoard::new(entries))),
            view: Arc::new(Mutex::new(HandoffView::new(records))),
            generator,
            mirror: sheet_backend.and_then(SheetMirror::spawn),
        })
    }

    pub(crate) fn persist_board(&self, board: &EntryBoard) -> ApiResult<()> {
        self.store
            .save_entries(board.patients())
            .map_err(|e| reject("save entry board", e))
    }

    /// Saves the sheet locally and queues it for the backend.
    pub(crate) fn persist_sheet(&self, records: &[HandoffRecord]) -> ApiResult<()> {
        self.store
            .save_handoff(records)
            .map_err(|e| reject("save handoff sheet", e))?;

        if let Some(mirror) = &self.mirror {
            mirror.send(records);
        }
        Ok(())
    }

    /// Applies `change` to a copy of the board and makes it live only once it is stored.
    pub(crate) fn commit_board<T>(
        &self,
        board: &mut EntryBoard,
        change: impl FnOnce(&mut EntryBoard) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let mut next = board.clone();
        let out = change(&mut next)?;
        self.persist_board(&next)?;
        *board = next;
        Ok(out)
    }

    /// Applies `change` to a copy of the sheet and makes it live only once it is stored.
    pub(crate) fn commit_sheet<T>(
        &self,
        view: &mut HandoffView,
        change: impl FnOnce(&mut HandoffView) -> ApiResult<T>,
    ) -> ApiResult<T> {
        let mut next = view.clone();
        let out = change(&mut next)?;
        self.persist_sheet(next.records())?;
        *view = next;
        Ok(out)
    }
}

/// Maps a core error to a response, logging it.
pub(crate) fn reject(context: &str, e: HandoffError) -> (StatusCode, &'static str) {
    let response = match &e {
        HandoffError::RecordNotFound(_) => (StatusCode::NOT_FOUND, "Patient not found"),
        HandoffError::UnknownField(_) => (StatusCode::BAD_REQUEST, "Unknown field"),
        HandoffError::FieldNotEditable(_) => (StatusCode::BAD_REQUEST, "Field is read-only"),
        HandoffError::InvalidInput(_) | HandoffError::FieldShapeMismatch(_) => {
            (StatusCode::BAD_REQUEST, "Invalid input")
        }
        HandoffError::NotEditing { .. } => (StatusCode::CONFLICT, "Field is not in edit mode"),
        HandoffError::GeneratorConnection(_)
        | HandoffError::HttpClient(_)
        | HandoffError::GeneratorStatus { .. }
        | HandoffError::GeneratorResponse(_) => (StatusCode::BAD_GATEWAY, "Note service error"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
    };

    if response.0.is_server_error() {
        tracing::error!("{} error: {:?}", context, e);
    } else {
        tracing::warn!("{} rejected: {}", context, e);
    }
    response
}
