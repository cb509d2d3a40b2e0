use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{error::ApiError, router::REDIRECT_PREFIX},
    app::AppState,
    domain::{Key, Url},
};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Serialize, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub url: String,
    pub key: String,
    pub short_url: String,
}

impl IntoResponse for ShortenResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `<scheme>://<host>` the client reached us at
fn request_origin(headers: &HeaderMap, uri: &Uri) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|h| h.to_str().ok())
        .filter(|proto| *proto == "http" || *proto == "https")
        .unwrap_or("http");

    format!("{scheme}://{host}")
}

fn short_url(app: &AppState, headers: &HeaderMap, uri: &Uri, key: &Key) -> String {
    let origin = match &app.base_url {
        Some(base) => base.as_str().trim_end_matches('/').to_string(),
        None => request_origin(headers, uri),
    };

    format!("{origin}{REDIRECT_PREFIX}/{key}")
}

pub async fn shorten(
    State(app): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<ShortenResponse, ApiError> {
    // Content-Type is not required, any body that decodes is accepted
    let ShortenRequest { url } = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "malformed shorten request");
        ApiError::bad_request()
    })?;

    let url: Url = url.try_into()?;
    let key = app.shorten(&url).await?;
    let short_url = short_url(&app, &headers, &uri, &key);

    Ok(ShortenResponse {
        url: url.into_string(),
        key: key.into_string(),
        short_url,
    })
}
