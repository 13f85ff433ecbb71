//! Entry board endpoints.

use crate::state::{reject, AppState};
use api_shared::{EntryListRes, EntryRes, PublishRes, UpdateEntryReq};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use passometro_core::{EntryField, RecordId};

type ApiResult<T> = Result<T, (StatusCode, &'static str)>;

#[utoipa::path(
    get,
    path = "/entry",
    responses(
        (status = 200, description = "Patients on the entry board", body = EntryListRes)
    )
)]
#[axum::debug_handler]
pub async fn list_entries(State(state): State<AppState>) -> Json<EntryListRes> {
    let board = state.board.lock().await;
    Json(EntryListRes {
        patients: board.patients().to_vec(),
    })
}

#[utoipa::path(
    post,
    path = "/entry",
    responses(
        (status = 201, description = "Blank patient added", body = EntryRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
pub async fn add_entry(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<EntryRes>)> {
    let mut board = state.board.lock().await;
    let patient = state.commit_board(&mut board, |board| Ok(board.add_now().clone()))?;
    Ok((StatusCode::CREATED, Json(EntryRes { patient })))
}

#[utoipa::path(
    put,
    path = "/entry/{id}",
    params(("id" = i64, Path, description = "Entry patient id")),
    request_body = UpdateEntryReq,
    responses(
        (status = 200, description = "Input updated", body = EntryRes),
        (status = 400, description = "Unknown field"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEntryReq>,
) -> ApiResult<Json<EntryRes>> {
    let id = RecordId::new(id);
    let field: EntryField = req.field.parse().map_err(|e| reject("update entry", e))?;

    let mut board = state.board.lock().await;
    state.commit_board(&mut board, |board| {
        board
            .update(id, field, req.value)
            .map_err(|e| reject("update entry", e))
    })?;

    let patient = board.patient(id).map_err(|e| reject("update entry", e))?.clone();
    Ok(Json(EntryRes { patient }))
}

#[utoipa::path(
    post,
    path = "/entry/{id}/clear",
    params(("id" = i64, Path, description = "Entry patient id")),
    responses(
        (status = 200, description = "Inputs and generated note cleared", body = EntryRes),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn clear_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EntryRes>> {
    let id = RecordId::new(id);
    let mut board = state.board.lock().await;
    state.commit_board(&mut board, |board| {
        board.clear(id).map_err(|e| reject("clear entry", e))
    })?;

    let patient = board.patient(id).map_err(|e| reject("clear entry", e))?.clone();
    Ok(Json(EntryRes { patient }))
}

#[utoipa::path(
    delete,
    path = "/entry/{id}",
    params(("id" = i64, Path, description = "Entry patient id")),
    responses(
        (status = 204, description = "Patient removed"),
        (status = 404, description = "Patient not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let mut board = state.board.lock().await;
    state.commit_board(&mut board, |board| {
        board
            .delete(RecordId::new(id))
            .map_err(|e| reject("delete entry", e))
    })?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/entry/{id}/process",
    params(("id" = i64, Path, description = "Entry patient id")),
    responses(
        (status = 200, description = "Structured note generated", body = EntryRes),
        (status = 404, description = "Patient not found"),
        (status = 502, description = "Note service error"),
        (status = 503, description = "No note service configured")
    )
)]
/// Sends the patient's raw input to the note service.
///
/// The patient is `processing` while the request runs and the board lock is released. On failure
/// it goes back to `idle`.
#[axum::debug_handler]
pub async fn process_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EntryRes>> {
    let id = RecordId::new(id);
    let Some(generator) = state.generator.clone() else {
        tracing::warn!("process entry rejected: no note service configured");
        return Err((StatusCode::SERVICE_UNAVAILABLE, "Note service not configured"));
    };

    let request = {
        let mut board = state.board.lock().await;
        let request = board
            .mark_processing(id)
            .map_err(|e| reject("process entry", e))?;
        state.persist_board(&board)?;
        request
    };

    tracing::info!("generating note for patient {}", id);
    let generated = tokio::task::spawn_blocking(move || generator.generate(&request)).await;

    let mut board = state.board.lock().await;
    match generated {
        Ok(Ok(note)) => {
            state.commit_board(&mut board, |board| {
                board
                    .complete(id, note)
                    .map_err(|e| reject("process entry", e))
            })?;
        }
        Ok(Err(e)) => {
            board.fail(id).map_err(|e| reject("process entry", e))?;
            state.persist_board(&board)?;
            return Err(reject("generate note", e));
        }
        Err(e) => {
            tracing::error!("generation task failed: {:?}", e);
            board.fail(id).map_err(|e| reject("process entry", e))?;
            state.persist_board(&board)?;
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));
        }
    }

    let patient = board.patient(id).map_err(|e| reject("process entry", e))?.clone();
    Ok(Json(EntryRes { patient }))
}

#[utoipa::path(
    post,
    path = "/entry/publish",
    responses(
        (
            status = 200,
            description = "Finished patients published to the handoff sheet",
            body = PublishRes
        ),
        (status = 500, description = "Internal server error")
    )
)]
/// Replaces the handoff sheet with every `done` patient on the board.
#[axum::debug_handler]
pub async fn publish_entries(State(state): State<AppState>) -> ApiResult<Json<PublishRes>> {
    let records = state.board.lock().await.publish();

    let mut view = state.view.lock().await;
    state.commit_sheet(&mut view, |view| {
        view.replace_records(records.clone());
        Ok(())
    })?;

    tracing::info!("published {} patient(s) to the handoff sheet", records.len());
    Ok(Json(PublishRes {
        published: records.len(),
        records,
    }))
}
