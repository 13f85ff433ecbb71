//! Handoff sheet endpoints: the stored records, the rendered sheet and field editing.

use crate::state::{reject, AppState};
use api_shared::{
    BeginEditRes, HandoffListRes, IdentificationReq, IdentificationRes, ReplaceHandoffReq,
    SaveFieldReq, SheetRes,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use passometro_codec::Identification;
use passometro_core::constants::SHEET_TITLE;
use passometro_core::{FieldKey, HandoffView, RecordId, TextRenderer};

type ApiResult<T> = Result<T, (StatusCode, &'static str)>;

/// Path segment that selects the identification header instead of a field.
const IDENTIFICATION_SEGMENT: &str = "identificacao";

fn list_res(view: &HandoffView) -> HandoffListRes {
    HandoffListRes {
        records: view.records().to_vec(),
        editing: view.editing().copied(),
    }
}

#[utoipa::path(
    get,
    path = "/passometro",
    responses(
        (
            status = 200,
            description = "Stored handoff records and the open edit",
            body = HandoffListRes
        )
    )
)]
#[axum::debug_handler]
pub async fn get_handoff(State(state): State<AppState>) -> Json<HandoffListRes> {
    Json(list_res(&*state.view.lock().await))
}

#[utoipa::path(
    put,
    path = "/passometro",
    request_body = ReplaceHandoffReq,
    responses(
        (status = 200, description = "Sheet replaced", body = HandoffListRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
pub async fn replace_handoff(
    State(state): State<AppState>,
    Json(req): Json<ReplaceHandoffReq>,
) -> ApiResult<Json<HandoffListRes>> {
    let mut view = state.view.lock().await;
    state.commit_sheet(&mut view, |view| {
        view.replace_records(req.records);
        Ok(())
    })?;
    Ok(Json(list_res(&view)))
}

#[utoipa::path(
    get,
    path = "/passometro/sheet",
    responses(
        (status = 200, description = "Rendered handoff sheet", body = SheetRes)
    )
)]
#[axum::debug_handler]
pub async fn get_sheet(State(state): State<AppState>) -> Json<SheetRes> {
    let sheet = state.view.lock().await.render();
    let text = TextRenderer::new().render_sheet(&sheet);
    Json(SheetRes {
        title: SHEET_TITLE.to_string(),
        records: sheet.records,
        text,
    })
}

#[utoipa::path(
    post,
    path = "/passometro/{id}/edit/{field}",
    params(
        ("id" = i64, Path, description = "Record id"),
        ("field" = String, Path, description = "Field wire key, or identificacao")
    ),
    responses(
        (status = 200, description = "Field is now in edit mode", body = BeginEditRes),
        (status = 400, description = "Unknown or read-only field"),
        (status = 404, description = "Patient not found")
    )
)]
/// Puts one field in edit mode. Any other field in edit mode leaves it without saving.
#[axum::debug_handler]
pub async fn begin_edit(
    State(state): State<AppState>,
    Path((id, field)): Path<(i64, String)>,
) -> ApiResult<Json<BeginEditRes>> {
    let record_id = RecordId::new(id);
    let mut view = state.view.lock().await;

    if field.eq_ignore_ascii_case(IDENTIFICATION_SEGMENT) {
        let identification = view
            .begin_identification_edit(record_id)
            .map_err(|e| reject("begin identification edit", e))?;
        return Ok(Json(BeginEditRes {
            record_id: id,
            field: IDENTIFICATION_SEGMENT.to_string(),
            text: String::new(),
            identification: Some(identification),
        }));
    }

    let key: FieldKey = field.parse().map_err(|e| reject("begin edit", e))?;
    let text = view
        .begin_edit(record_id, key)
        .map_err(|e| reject("begin edit", e))?;
    Ok(Json(BeginEditRes {
        record_id: id,
        field: key.wire_name().to_string(),
        text,
        identification: None,
    }))
}

#[utoipa::path(
    put,
    path = "/passometro/{id}/fields/{field}",
    params(
        ("id" = i64, Path, description = "Record id"),
        ("field" = String, Path, description = "Field wire key")
    ),
    request_body = SaveFieldReq,
    responses(
        (status = 200, description = "Field saved and edit mode closed", body = HandoffListRes),
        (status = 400, description = "Unknown field"),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "Field is not in edit mode")
    )
)]
#[axum::debug_handler]
pub async fn save_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(i64, String)>,
    Json(req): Json<SaveFieldReq>,
) -> ApiResult<Json<HandoffListRes>> {
    let key: FieldKey = field.parse().map_err(|e| reject("save field", e))?;
    let mut view = state.view.lock().await;
    state.commit_sheet(&mut view, |view| {
        view.save_edit(RecordId::new(id), key, &req.text)
            .map_err(|e| reject("save field", e))
    })?;
    Ok(Json(list_res(&view)))
}

#[utoipa::path(
    put,
    path = "/passometro/{id}/identification",
    params(("id" = i64, Path, description = "Record id")),
    request_body = IdentificationReq,
    responses(
        (
            status = 200,
            description = "Identification normalised and saved",
            body = IdentificationRes
        ),
        (status = 404, description = "Patient not found"),
        (status = 409, description = "Identification is not in edit mode")
    )
)]
#[axum::debug_handler]
pub async fn save_identification(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<IdentificationReq>,
) -> ApiResult<Json<IdentificationRes>> {
    let record_id = RecordId::new(id);
    let mut view = state.view.lock().await;
    let identification = state.commit_sheet(&mut view, |view| {
        view.save_identification(record_id, &Identification::from(req))
            .map_err(|e| reject("save identification", e))
    })?;

    let record = view
        .record(record_id)
        .map_err(|e| reject("save identification", e))?;
    let header = identification.header(&record.bed);
    Ok(Json(IdentificationRes {
        title: header.title,
        details: header.details,
        identification,
    }))
}

#[utoipa::path(
    delete,
    path = "/passometro/edit",
    responses(
        (status = 204, description = "Edit mode closed without saving")
    )
)]
#[axum::debug_handler]
pub async fn finish_edit(State(state): State<AppState>) -> StatusCode {
    state.view.lock().await.finish_edit();
    StatusCode::NO_CONTENT
}
