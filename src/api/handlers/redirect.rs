use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{api::error::ApiError, app::AppState};

/// The key is the last non-empty segment, so `/go/<key>/` and `/go/x/<key>` both resolve
fn last_segment(rest: &str) -> &str {
    rest.rsplit('/').find(|s| !s.is_empty()).unwrap_or("")
}

pub async fn redirect(
    State(app): State<AppState>,
    Path(rest): Path<String>,
) -> Result<Response, ApiError> {
    let key = last_segment(&rest);

    let target = app.resolve(key).await.inspect_err(|e| {
        tracing::debug!(error = %e, "redirect for {key} failed");
    })?;

    let location = HeaderValue::try_from(target).map_err(|e| {
        tracing::error!(error = %e, "stored url is not a valid Location header");
        ApiError::internal()
    })?;

    // 301 rather than axum's Redirect::permanent, which answers 308
    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response())
}
