use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    services::ServeFile,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{api::handlers, app::AppState};

/// Path under which keys are resolved, `short_url`s are built from it
pub(crate) const REDIRECT_PREFIX: &str = "/go";

pub fn build_router(state: AppState) -> Router {
    let landing_page = ServeFile::new(&state.index_file);

    Router::new()
        .route("/shorten", post(handlers::shorten))
        .route("/go/{*rest}", get(handlers::redirect))
        .route_service("/", landing_page)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
