//! HTTP server for the registration API.
//!
//! All actions go through one [`Registrar`] behind a mutex, so requests are
//! applied one at a time. Store access is blocking file I/O, so every
//! action runs on the blocking thread pool rather than on a runtime worker.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                        |
//! |--------|-----------------------|------------------------------------|
//! | GET    | `/health`             | Health check                       |
//! | GET    | `/api/students?q=`    | Filtered listing                   |
//! | GET    | `/api/students/count` | Number of records                  |
//! | GET    | `/api/students/new`   | Blank form (today's admission date)|
//! | GET    | `/api/students/{id}`  | One record                         |
//! | GET    | `/api/students/{id}/form` | Form prefilled for editing     |
//! | POST   | `/api/students`       | Register, or update with `editId`  |
//! | PUT    | `/api/students/{id}`  | Update a record                    |
//! | DELETE | `/api/students/{id}`  | Delete a record                    |
//! | DELETE | `/api/students`       | Delete every record                |
//! | GET    | `/api/export`         | CSV download                       |
//! | GET    | `/api/notices`        | SSE stream of notices              |

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::types::{
    ApiError, ExportParams, ListParams, ListResponse, SubmitRequest, SubmitResponse,
};
use crate::config::Config;
use crate::error::{RegistrarError, RegistrarResult, ServerResult, StoreError};
use crate::export::CSV_MIME;
use crate::models::{StudentForm, StudentRecord};
use crate::reconcile::WriteKind;
use crate::registrar::Registrar;

/// Registrar shared by all handlers.
pub type SharedRegistrar = Arc<Mutex<Registrar>>;

/// Build the API router over `registrar`.
pub fn router(registrar: Registrar) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let state: SharedRegistrar = Arc::new(Mutex::new(registrar));

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/students", get(list_students).post(submit_student).delete(clear_students))
        .route("/api/students/count", get(count_students))
        .route("/api/students/new", get(blank_form))
        .route(
            "/api/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/api/students/{id}/form", get(edit_form))
        .route("/api/export", get(export_csv))
        .route("/api/notices", get(sse_notices))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server with `config`.
///
/// Fails before binding if the store cannot be read.
pub async fn start_server(config: Config) -> ServerResult<()> {
    let store = config.open_store();
    let existing = store.count()?;
    let registrar = Registrar::new(store).with_options(config.options.clone());
    let app = router(registrar);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!(
        %addr,
        data_dir = %config.data_dir.display(),
        records = existing,
        "eduregister server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run `action` against the registrar on the blocking pool.
async fn with_registrar<T, F>(state: &SharedRegistrar, action: F) -> Result<T, ApiError>
where
    F: FnOnce(&mut Registrar) -> RegistrarResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut registrar = state.lock().unwrap_or_else(PoisonError::into_inner);
        action(&mut *registrar)
    })
    .await
    .map_err(|e| {
        let lost = std::io::Error::other(format!("registrar task failed: {}", e));
        ApiError(RegistrarError::Store(StoreError::Unavailable(lost)))
    })?;

    Ok(result?)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "eduregister",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_students(
    State(state): State<SharedRegistrar>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ApiError> {
    let response = with_registrar(&state, move |registrar| {
        let students = registrar.list(&params.q);
        Ok(ListResponse {
            shown: students.len(),
            total: registrar.count()?,
            students,
        })
    })
    .await?;
    Ok(Json(response))
}

async fn count_students(State(state): State<SharedRegistrar>) -> Result<Json<Value>, ApiError> {
    let count = with_registrar(&state, |registrar| registrar.count()).await?;
    Ok(Json(json!({ "count": count })))
}

async fn blank_form(State(state): State<SharedRegistrar>) -> Result<Json<StudentForm>, ApiError> {
    let form = with_registrar(&state, |registrar| Ok(registrar.blank_form())).await?;
    Ok(Json(form))
}

async fn get_student(
    State(state): State<SharedRegistrar>,
    Path(id): Path<String>,
) -> Result<Json<StudentRecord>, ApiError> {
    let student = with_registrar(&state, move |registrar| registrar.get(&id)).await?;
    Ok(Json(student))
}

async fn edit_form(
    State(state): State<SharedRegistrar>,
    Path(id): Path<String>,
) -> Result<Json<StudentForm>, ApiError> {
    let form = with_registrar(&state, move |registrar| registrar.edit_form(&id)).await?;
    Ok(Json(form))
}

async fn submit_student(
    State(state): State<SharedRegistrar>,
    Json(req): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let saved = with_registrar(&state, move |registrar| {
        registrar.submit(req.form, req.edit_id.as_deref())
    })
    .await?;
    let status = match saved.kind {
        WriteKind::Create => StatusCode::CREATED,
        WriteKind::Update => StatusCode::OK,
    };
    Ok((status, Json(SubmitResponse::new(saved.kind, saved.record))))
}

async fn update_student(
    State(state): State<SharedRegistrar>,
    Path(id): Path<String>,
    Json(form): Json<StudentForm>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let saved = with_registrar(&state, move |registrar| {
        // PUT only edits; it never creates under a caller-chosen id
        registrar.get(&id)?;
        registrar.submit(form, Some(&id))
    })
    .await?;
    Ok(Json(SubmitResponse::new(saved.kind, saved.record)))
}

async fn delete_student(
    State(state): State<SharedRegistrar>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    with_registrar(&state, move |registrar| registrar.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_students(State(state): State<SharedRegistrar>) -> Result<Json<Value>, ApiError> {
    let cleared = with_registrar(&state, |registrar| registrar.clear()).await?;
    Ok(Json(json!({ "cleared": cleared })))
}

async fn export_csv(
    State(state): State<SharedRegistrar>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let export =
        with_registrar(&state, move |registrar| registrar.export(params.quoting)).await?;

    let Some(export) = export else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, CSV_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

/// SSE endpoint streaming notices as they are posted
async fn sse_notices(
    State(state): State<SharedRegistrar>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .notices()
        .subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(notice) => {
            let json = serde_json::to_string(&notice).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
