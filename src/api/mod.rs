pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{routing::get, Router};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{
    live_state::LiveStateCache,
    storage::{AuthorStore, ReadingStore},
};

/// Everything the request handlers need. Read-only with respect to the
/// readings — no mutation of cache or store is reachable from the API.
#[derive(Clone)]
pub struct AppState {
    pub cache: LiveStateCache,
    pub readings: ReadingStore,
    pub authors: AuthorStore,
    pub history_limit: i64,
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/tiempo_real", get(handlers::tiempo_real))
        .route("/api/historial", get(handlers::historial))
        .route(
            "/api/autores",
            get(handlers::list_authors).post(handlers::create_author),
        )
        .with_state(state)
        .split_for_parts();

    router
        .route("/", get(handlers::dashboard))
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
