use axum::{
    body::Body,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets"]
struct Asset;

fn respond(path: &str) -> Option<Response> {
    let content = Asset::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            [(header::CONTENT_TYPE, mime.as_ref())],
            Body::from(content.data),
        )
            .into_response(),
    )
}

/// GET /
pub async fn home() -> Response {
    respond("index.html").unwrap_or_else(not_found)
}

/// GET /what-is-foodlens
pub async fn what_is_foodlens() -> Response {
    respond("what-is-foodlens.html").unwrap_or_else(not_found)
}

/// Static files (styles, scripts) bundled with the pages.
pub async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    respond(path).unwrap_or_else(not_found)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 Not Found").into_response()
}
