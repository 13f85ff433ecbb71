//! # API REST
//!
//! REST API for the passômetro.
//!
//! Handles:
//! - HTTP endpoints with axum over the entry board and the handoff sheet
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request and response bodies.

#![warn(rust_2018_idioms)]

pub mod entry;
pub mod passometro;
pub mod state;

pub use state::AppState;

use api_shared::{HealthRes, HealthService, ViewRes};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use passometro_core::ViewMode;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        view,
        entry::list_entries,
        entry::add_entry,
        entry::update_entry,
        entry::clear_entry,
        entry::delete_entry,
        entry::process_entry,
        entry::publish_entries,
        passometro::get_handoff,
        passometro::replace_handoff,
        passometro::get_sheet,
        passometro::begin_edit,
        passometro::save_field,
        passometro::save_identification,
        passometro::finish_edit,
    ),
    components(schemas(
        HealthRes,
        ViewRes,
        api_shared::EntryListRes,
        api_shared::EntryRes,
        api_shared::UpdateEntryReq,
        api_shared::PublishRes,
        api_shared::HandoffListRes,
        api_shared::ReplaceHandoffReq,
        api_shared::SheetRes,
        api_shared::BeginEditRes,
        api_shared::SaveFieldReq,
        api_shared::IdentificationReq,
        api_shared::IdentificationRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/view", get(view))
        .route("/entry", get(entry::list_entries).post(entry::add_entry))
        .route("/entry/publish", post(entry::publish_entries))
        .route(
            "/entry/:id",
            put(entry::update_entry).delete(entry::delete_entry),
        )
        .route("/entry/:id/clear", post(entry::clear_entry))
        .route("/entry/:id/process", post(entry::process_entry))
        .route(
            "/passometro",
            get(passometro::get_handoff).put(passometro::replace_handoff),
        )
        .route("/passometro/sheet", get(passometro::get_sheet))
        .route("/passometro/edit", delete(passometro::finish_edit))
        .route("/passometro/:id/edit/:field", post(passometro::begin_edit))
        .route("/passometro/:id/fields/:field", put(passometro::save_field))
        .route(
            "/passometro/:id/identification",
            put(passometro::save_identification),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ViewQuery {
    /// `1` selects the handoff sheet.
    pub passometro: Option<String>,
}

#[utoipa::path(
    get,
    path = "/view",
    params(ViewQuery),
    responses(
        (status = 200, description = "View selected by the mode flag", body = ViewRes)
    )
)]
#[axum::debug_handler]
pub async fn view(State(_state): State<AppState>, Query(query): Query<ViewQuery>) -> Json<ViewRes> {
    Json(ViewRes::from(ViewMode::from_param(query.passometro.as_deref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use passometro_core::generator::GenerationRequest;
    use passometro_core::constants::HANDOFF_STORE_KEY;
    use passometro_core::{
        CoreConfig, HandoffError, HandoffRecord, HandoffResult, JsonStore, NoteGenerator,
        SheetBackend, StructuredNote,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct FixedNote(Option<Value>);

    impl NoteGenerator for FixedNote {
        fn generate(&self, _request: &GenerationRequest) -> HandoffResult<StructuredNote> {
            match &self.0 {
                Some(value) => Ok(serde_json::from_value(value.clone()).unwrap()),
                None => Err(HandoffError::GeneratorConnection("test".into())),
            }
        }
    }

    fn note() -> Value {
        json!({
            "identificacao": {"nome": "maria", "idade": 81, "sexo": "FEMININO"},
            "problemas": "Sepse ~ foco pulmonar | DRC ~ estágio 4",
            "laboratorio": [{"texto": "Hb: 7.9 | Cr: 2.1", "destaques": {"2.1": "alert"}}],
            "condutas": "Colher culturas\nDesmame DVA",
            "intercorrencias": "Sem intercorrências"
        })
    }

    /// Records every push. The first one is slow, so a later save can overtake it.
    #[derive(Default)]
    struct RecordingSheet {
        pushes: std::sync::Mutex<Vec<Vec<HandoffRecord>>>,
    }

    impl SheetBackend for RecordingSheet {
        fn fetch_sheet(&self) -> HandoffResult<Vec<HandoffRecord>> {
            Ok(Vec::new())
        }

        fn push_sheet(&self, records: &[HandoffRecord]) -> HandoffResult<()> {
            if self.pushes.lock().unwrap().is_empty() {
                std::thread::sleep(Duration::from_millis(50));
            }
            self.pushes.lock().unwrap().push(records.to_vec());
            Ok(())
        }
    }

    fn app_with(tmp: &TempDir, generator: Option<FixedNote>) -> Router {
        let cfg = CoreConfig::new(tmp.path().to_path_buf(), None, Duration::from_secs(5)).unwrap();
        let generator = generator.map(|g| Arc::new(g) as Arc<dyn NoteGenerator>);
        router(AppState::load(&cfg, generator, None).unwrap())
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Adds a patient on bed 7, generates its note and publishes the board.
    async fn published(app: &Router) -> i64 {
        let (status, body) = call(app, "POST", "/entry", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["patient"]["id"].as_i64().unwrap();

        let (status, _) = call(
            app,
            "PUT",
            &format!("/entry/{id}"),
            Some(json!({"field": "leito", "value": "7"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(app, "POST", &format!("/entry/{id}/process"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patient"]["status"], "done");

        let (status, body) = call(app, "POST", "/entry/publish", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["published"], 1);
        id
    }

    #[tokio::test]
    async fn test_health() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, None);
        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_view_switch() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, None);
        let (_, body) = call(&app, "GET", "/view?passometro=1", None).await;
        assert_eq!(body["mode"], "handoff");
        let (_, body) = call(&app, "GET", "/view", None).await;
        assert_eq!(body["mode"], "entry");
    }

    #[tokio::test]
    async fn test_publish_renders_sheet_and_persists() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, Some(FixedNote(Some(note()))));
        published(&app).await;

        let (status, body) = call(&app, "GET", "/passometro/sheet", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"][0]["header"]["title"], "LEITO 7: maria");
        let text = body["text"].as_str().unwrap();
        assert!(text.contains("Hb: 7.9 | Cr: [2.1](alert)"));
        assert!(text.contains("▸ Sepse"));

        // A fresh state reads the same sheet back from disk.
        let reloaded = app_with(&tmp, None);
        let (_, body) = call(&reloaded, "GET", "/passometro", None).await;
        assert_eq!(body["records"][0]["dados"]["identificacao"]["leito"], "7");
    }

    #[tokio::test]
    async fn test_edit_flow() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, Some(FixedNote(Some(note()))));
        let id = published(&app).await;

        let uri = format!("/passometro/{id}/edit/problemas");
        let (status, body) = call(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Sepse\n> foco pulmonar\nDRC\n> estágio 4");

        // Saving a field that is not in edit mode is a conflict.
        let (status, _) = call(
            &app,
            "PUT",
            &format!("/passometro/{id}/fields/hda"),
            Some(json!({"text": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/passometro/{id}/fields/problemas"),
            Some(json!({"text": "IRA\n> KDIGO 3\nFA"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"][0]["dados"]["problemas"], "IRA ~ KDIGO 3 | FA");
        assert_eq!(body["editing"], Value::Null);
    }

    #[tokio::test]
    async fn test_identification_edit() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, Some(FixedNote(Some(note()))));
        let id = published(&app).await;

        let (status, body) = call(
            &app,
            "POST",
            &format!("/passometro/{id}/edit/identificacao"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["identification"]["nome"], "maria");

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/passometro/{id}/identification"),
            Some(json!({
                "leito": " 7b",
                "nome": " maria lima ",
                "idade": "81",
                "sexo": "feminino"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "LEITO 7B: MARIA LIMA");
        assert_eq!(body["details"], "81 ANOS | FEMININO");
    }

    #[tokio::test]
    async fn test_read_only_and_unknown() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, Some(FixedNote(Some(note()))));
        let id = published(&app).await;

        let uri = format!("/passometro/{id}/edit/controles");
        let (status, _) = call(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", &format!("/passometro/{id}/edit/altura"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", "/passometro/1/edit/hda", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "DELETE", "/passometro/edit", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_failed_generation_returns_to_idle() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, Some(FixedNote(None)));
        let (_, body) = call(&app, "POST", "/entry", None).await;
        let id = body["patient"]["id"].as_i64().unwrap();

        let (status, _) = call(&app, "POST", &format!("/entry/{id}/process"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (_, body) = call(&app, "GET", "/entry", None).await;
        assert_eq!(body["patients"][0]["status"], "idle");
    }

    #[tokio::test]
    async fn test_process_without_service() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, None);
        let (_, body) = call(&app, "POST", "/entry", None).await;
        let id = body["patient"]["id"].as_i64().unwrap();
        let (status, _) = call(&app, "POST", &format!("/entry/{id}/process"), None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_clear_and_delete_entry() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, None);
        let (_, body) = call(&app, "POST", "/entry", None).await;
        let id = body["patient"]["id"].as_i64().unwrap();

        call(
            &app,
            "PUT",
            &format!("/entry/{id}"),
            Some(json!({"field": "laboratorio", "value": "Hb 9"})),
        )
        .await;
        let (status, body) = call(&app, "POST", &format!("/entry/{id}/clear"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patient"]["laboratorio"], "");

        let (status, _) = call(
            &app,
            "PUT",
            &format!("/entry/{id}"),
            Some(json!({"field": "status", "value": "done"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, "DELETE", &format!("/entry/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, "DELETE", &format!("/entry/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_backend_copy_ends_on_last_save() {
        let tmp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(tmp.path().to_path_buf(), None, Duration::from_secs(5)).unwrap();
        let backend = Arc::new(RecordingSheet::default());
        let state = AppState::load(&cfg, None, Some(backend.clone() as Arc<dyn SheetBackend>));
        let app = router(state.unwrap());

        for problems in ["Sepse", "Sepse | DRC"] {
            let sheet = json!({
                "records": [{"id": 1, "leito": "3", "dados": {"problemas": problems}}]
            });
            let (status, _) = call(&app, "PUT", "/passometro", Some(sheet)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let local = JsonStore::new(tmp.path()).load_handoff().unwrap();
        assert_eq!(local[0].data.problems, "Sepse | DRC");
        for _ in 0..200 {
            if backend.pushes.lock().unwrap().last() == Some(&local) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let pushes = backend.pushes.lock().unwrap();
        assert_eq!(pushes.last(), Some(&local));
    }

    #[tokio::test]
    async fn test_failed_store_write_leaves_sheet_unchanged() {
        let tmp = TempDir::new().unwrap();
        let app = app_with(&tmp, Some(FixedNote(Some(note()))));
        let id = published(&app).await;

        let uri = format!("/passometro/{id}/edit/problemas");
        let (status, _) = call(&app, "POST", &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let path = JsonStore::new(tmp.path()).path(HANDOFF_STORE_KEY);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let (status, _) = call(
            &app,
            "PUT",
            &format!("/passometro/{id}/fields/problemas"),
            Some(json!({"text": "IRA"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (_, body) = call(&app, "GET", "/passometro", None).await;
        assert_eq!(
            body["records"][0]["dados"]["problemas"],
            "Sepse ~ foco pulmonar | DRC ~ estágio 4"
        );
        assert!(!body["editing"].is_null());
    }
}
