//! Guard-gated static file responder.
//!
//! Every request passes the PathGuard (safety → allow-list → hidden) before
//! the filesystem is touched. Denials answer with a uniform 403 that does
//! not reveal which check failed. Directories without an `index.html` get a
//! minimal HTML listing; everything else is delegated to `ServeDir`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

use crate::config::ServerOptions;
use crate::security::path_guard;

/// Per-server state shared by the file handler; all fields immutable.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub allow: Arc<Vec<PathBuf>>,
    serve_dir: ServeDir,
}

impl AppState {
    pub fn new(options: &ServerOptions) -> Self {
        Self {
            root: options.root.clone(),
            allow: Arc::new(options.allow.clone()),
            serve_dir: ServeDir::new(&options.root),
        }
    }
}

/// Fallback handler: guard decision, then filesystem.
pub async fn serve_files(State(state): State<AppState>, request: Request<Body>) -> Response {
    let uri_path = request.uri().path().to_string();

    if !path_guard::is_request_allowed(&uri_path, &state.root, &state.allow) {
        tracing::debug!(path = %uri_path, "request denied by path guard");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    // Directory without an index file: render a listing instead of a 404.
    if let Some(dir) = listable_directory(&state, &uri_path) {
        return match render_listing(&state, &dir, &uri_path).await {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::warn!(path = %uri_path, error = %err, "failed to list directory");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        };
    }

    match state.serve_dir.clone().oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(infallible) => match infallible {},
    }
}

/// The filesystem directory to list, if the request targets a directory
/// that has no `index.html` of its own.
fn listable_directory(state: &AppState, uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;
    let rel = decoded.trim_matches('/');
    let target = if rel.is_empty() {
        state.root.clone()
    } else {
        state.root.join(rel)
    };

    if target.is_dir() && !target.join("index.html").is_file() {
        Some(target)
    } else {
        None
    }
}

/// Render a minimal HTML listing of one directory. Hidden entries are
/// skipped, and entries outside the allow-list scope never appear.
async fn render_listing(
    state: &AppState,
    dir: &Path,
    uri_path: &str,
) -> std::io::Result<String> {
    let base = uri_path.trim_end_matches('/');
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut items: Vec<(String, bool)> = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let entry_path = format!("{base}/{name}");
        if !path_guard::is_allowed(&entry_path, &state.allow, &state.root) {
            continue;
        }
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        items.push((name, is_dir));
    }
    items.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    let title = if base.is_empty() { "/" } else { base };
    let mut body =
        String::from("<html><head><meta charset=\"utf-8\"><title>lanshare</title></head><body>");
    let _ = write!(
        body,
        "<h1>Index of {}</h1><ul>",
        html_escape::encode_text(title)
    );
    for (name, is_dir) in items {
        let slash = if is_dir { "/" } else { "" };
        let _ = write!(
            body,
            "<li><a href=\"{href}{slash}\">{display}{slash}</a></li>",
            href = html_escape::encode_double_quoted_attribute(&name),
            display = html_escape::encode_text(&name),
        );
    }
    body.push_str("</ul></body></html>");
    Ok(body)
}
