use axum::{extract::State, http::StatusCode, response::Html, Json};
use serde_json::json;
use tracing::error;
use utoipa::OpenApi;

use super::{
    dto::{AuthorDto, HistoryRowDto, LiveStateDto, NewAuthor},
    errors::AppError,
    AppState,
};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Serve the dashboard document. The page itself only polls the two JSON
/// endpoints below; it renders nothing server-side.
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../static/dashboard.html"))
}

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Current live state. Always succeeds — zero-values and `Desconectado`
/// before the first message arrives.
#[utoipa::path(
    get,
    path = "/api/tiempo_real",
    responses(
        (status = 200, description = "Latest reading plus broker status", body = LiveStateDto),
    ),
    tag = "sensores"
)]
pub async fn tiempo_real(State(state): State<AppState>) -> Json<LiveStateDto> {
    Json(state.cache.snapshot().await.into())
}

/// The most recent stored readings, newest first, capped at the configured
/// limit.
///
/// A storage failure is reported in-band as `{"error": ...}` on a 200
/// response — the dashboard keys off the body shape, so the transport-level
/// contract stays intact even when the store is broken.
#[utoipa::path(
    get,
    path = "/api/historial",
    responses(
        (status = 200, description = "Recent readings (array), or an error object on storage failure", body = Vec<HistoryRowDto>),
    ),
    tag = "sensores"
)]
pub async fn historial(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.readings.recent(state.history_limit).await {
        Ok(rows) => {
            let rows: Vec<HistoryRowDto> = rows.into_iter().map(Into::into).collect();
            Json(json!(rows))
        }
        Err(e) => {
            error!(error = %e, "History query failed");
            Json(json!({ "error": e.to_string() }))
        }
    }
}

// ---------------------------------------------------------------------------
// Authors (administrative surface — never touched by ingestion)
// ---------------------------------------------------------------------------

/// Register a contact record.
#[utoipa::path(
    post,
    path = "/api/autores",
    request_body = NewAuthor,
    responses(
        (status = 201, description = "Author created", body = AuthorDto),
        (status = 500, description = "Internal server error"),
    ),
    tag = "autores"
)]
pub async fn create_author(
    State(state): State<AppState>,
    Json(body): Json<NewAuthor>,
) -> Result<(StatusCode, Json<AuthorDto>), AppError> {
    let author = state
        .authors
        .insert(&body.nombre, &body.apellido, &body.correo, &body.celular)
        .await?;
    Ok((StatusCode::CREATED, Json(author.into())))
}

/// List all registered contact records.
#[utoipa::path(
    get,
    path = "/api/autores",
    responses(
        (status = 200, description = "All authors", body = Vec<AuthorDto>),
        (status = 500, description = "Internal server error"),
    ),
    tag = "autores"
)]
pub async fn list_authors(
    State(state): State<AppState>,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let rows = state.authors.list().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(tiempo_real, historial, create_author, list_authors, health),
    components(schemas(LiveStateDto, HistoryRowDto, AuthorDto, NewAuthor)),
    tags(
        (name = "sensores", description = "Live and historical sensor readings"),
        (name = "autores", description = "Contact record administration"),
        (name = "system", description = "System endpoints"),
    ),
    info(
        title = "Sensor Dashboard API",
        version = "0.1.0",
        description = "REST API over MQTT-ingested humidity and distance telemetry"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
