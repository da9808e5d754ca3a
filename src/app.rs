use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::address::build_full_address;
use crate::downloader::{self, MAPS_LINK_COLUMN, OUTPUT_FILE_NAME, OUTPUT_MIME_TYPE};
use crate::error::AppError;
use crate::geocode::{Geocoder, NominatimGeocoder, Progress, geocode_table};
use crate::loader;
use crate::table::Table;

/// Upload cap for spreadsheet files.
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Lifecycle of the single conversion run held in memory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Phase {
    Idle,
    Loaded,
    Validated,
    Geocoding,
    Done,
    Failed,
}

struct Session {
    table: Option<Table>,
    phase: Phase,
}

pub struct AppState {
    session: Mutex<Session>,
    geocoder: Box<dyn Geocoder>,
    progress: Progress,
}

impl AppState {
    pub fn new(geocoder: Box<dyn Geocoder>) -> Self {
        AppState {
            session: Mutex::new(Session {
                table: None,
                phase: Phase::Idle,
            }),
            geocoder,
            progress: Progress::default(),
        }
    }
}

#[derive(Deserialize)]
struct ConvertRequest {
    columns: Vec<String>,
}

/// Build the application router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/upload", post(upload_spreadsheet))
        .route("/api/table", get(get_table))
        .route("/api/convert", post(convert_addresses))
        .route("/api/progress", get(get_progress))
        .route("/api/download", get(download_result))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server against the public Nominatim endpoint.
pub async fn run(addr: &str) -> anyhow::Result<()> {
    let geocoder = NominatimGeocoder::new()?;
    run_with_geocoder(addr, Box::new(geocoder)).await
}

/// Start the server with a caller-supplied geocoding provider.
pub async fn run_with_geocoder(addr: &str, geocoder: Box<dyn Geocoder>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(geocoder));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

/// Accept a multipart upload, parse it and replace the session table.
async fn upload_spreadsheet(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut file_data = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Load(e.to_string()))?
    {
        if field.name() == Some("spreadsheet") {
            file_data = field
                .bytes()
                .await
                .map_err(|e| AppError::Load(e.to_string()))?
                .to_vec();
        }
    }
    if file_data.is_empty() {
        return Err(AppError::Load("no file data received".to_string()));
    }

    let loaded = loader::load_table(&file_data);
    let mut session = state.session.lock().await;
    // A fresh upload invalidates the previous run's progress counters.
    state.progress.start(0);
    match loaded {
        Ok(table) => {
            info!(rows = table.row_count(), columns = table.columns().len(), "spreadsheet uploaded");
            let response = Json(serde_json::json!({
                "status": "ok",
                "columns": table.columns(),
                "rows": table.row_count(),
            }));
            session.table = Some(table);
            session.phase = Phase::Loaded;
            Ok(response)
        }
        Err(e) => {
            session.table = None;
            session.phase = Phase::Failed;
            Err(e)
        }
    }
}

/// JSON preview of the current table, as uploaded or as converted.
async fn get_table(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let session = state.session.lock().await;
    let table = session.table.as_ref().ok_or(AppError::NoTable)?;
    Ok(Json(serde_json::json!({
        "phase": session.phase,
        "columns": table.columns(),
        "rows": table.rows(),
    })))
}

/// Run the whole pipeline: address build, geocoding loop, maps links.
///
/// The session lock is held for the entire run, so the interface blocks
/// until the last row is processed; only the progress counters remain
/// readable. A validation failure leaves the uploaded table untouched,
/// while a failure mid-run discards it — no partial output is offered.
async fn convert_addresses(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConvertRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.session.lock().await;
    let mut table = session.table.take().ok_or(AppError::NoTable)?;

    if let Err(e) = build_full_address(&mut table, &request.columns) {
        // Selection problems are recoverable; the table stays loaded.
        session.table = Some(table);
        return Err(e);
    }
    session.phase = Phase::Validated;
    // Validation holds, so the run starts immediately.
    session.phase = Phase::Geocoding;
    info!(rows = table.row_count(), "starting geocoding run");

    let outcome = async {
        let summary = geocode_table(&mut table, state.geocoder.as_ref(), &state.progress).await?;
        downloader::add_maps_links(&mut table)?;
        Ok::<_, AppError>(summary)
    }
    .await;

    match outcome {
        Ok(summary) => {
            session.table = Some(table);
            session.phase = Phase::Done;
            info!(rows = summary.rows, misses = summary.misses, "geocoding run finished");
            Ok(Json(serde_json::json!({
                "status": "ok",
                "rows": summary.rows,
                "misses": summary.misses,
            })))
        }
        Err(e) => {
            session.table = None;
            session.phase = Phase::Failed;
            Err(e)
        }
    }
}

/// Progress over the row loop, readable while a conversion is running.
async fn get_progress(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (done, total) = state.progress.snapshot();
    Json(serde_json::json!({ "done": done, "total": total }))
}

/// Stream the converted workbook back as a file download.
async fn download_result(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let session = state.session.lock().await;
    let table = session.table.as_ref().ok_or(AppError::NoTable)?;
    if session.phase != Phase::Done || !table.has_column(MAPS_LINK_COLUMN) {
        return Err(AppError::NotReady);
    }

    let buffer = downloader::to_xlsx(table)?;
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, OUTPUT_MIME_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{OUTPUT_FILE_NAME}\""),
        )
        .body(Body::from(buffer))
        .map_err(|e| AppError::Unhandled(e.into()))?;
    Ok(response)
}
