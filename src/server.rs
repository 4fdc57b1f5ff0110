use crate::api::{DocsService, FetchDocsRequest};
use crate::upload::UploadedFile;
use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, State},
    http::StatusCode,
    response::{Html, Json as ResponseJson},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Multipart field carrying the uploaded files
pub const FILES_FIELD: &str = "files[]";

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service behind every endpoint
    pub service: Arc<DocsService>,
}

impl AppState {
    /// Wraps a service for sharing across handlers
    pub fn new(service: DocsService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

type ApiError = (StatusCode, ResponseJson<Value>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, ResponseJson(json!({ "error": message.into() })))
}

/// Create the main application with all routes
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/upload", post(upload_files))
        .route("/fetch_docs", post(fetch_docs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Landing page with a plain upload form
async fn index() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> ResponseJson<Value> {
    ResponseJson(json!(state.service.health()))
}

/// Extract library names from the files in the `files[]` multipart field
async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<ResponseJson<Value>, ApiError> {
    let mut files = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Rejecting malformed upload: {}", e);
                return Err(error_response(StatusCode::BAD_REQUEST, e.body_text()));
            }
        };
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
        files.push(UploadedFile::new(name, content));
    }

    info!("Upload received with {} file(s)", files.len());
    match state.service.upload(&files) {
        Ok(response) => Ok(ResponseJson(json!(response))),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                error!("Upload failed: {}", e);
            }
            Err(error_response(status, e.to_string()))
        }
    }
}

/// Resolve documentation chunks for the requested libraries
async fn fetch_docs(
    State(state): State<AppState>,
    Json(request): Json<FetchDocsRequest>,
) -> ResponseJson<Value> {
    let outcome = state.service.fetch_docs(request).await;
    ResponseJson(json!(outcome))
}

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>depdocs</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        code { background: #f4f4f4; padding: 2px 4px; border-radius: 3px; }
        pre { background: #f4f4f4; padding: 10px; border-radius: 5px; overflow-x: auto; }
        .endpoint { margin: 20px 0; padding: 15px; background: #f9f9f9; border-radius: 5px; }
    </style>
</head>
<body>
    <h1>depdocs</h1>
    <p>Upload source files to list the libraries they use, then fetch each library's official documentation as text.</p>

    <form action="/upload" method="post" enctype="multipart/form-data">
        <input type="file" name="files[]" multiple>
        <button type="submit">Extract dependencies</button>
    </form>

    <div class="endpoint">
        <h3>POST /upload</h3>
        <pre>multipart field files[] -> {"libraries": ["flask", "requests"]}</pre>
    </div>

    <div class="endpoint">
        <h3>POST /fetch_docs</h3>
        <pre>Request: {"libraries": ["flask"], "serpapiKey": "...", "geminiKey": "..."}</pre>
        <pre>Response: {"flask": ["chunk 1", "chunk 2"]}</pre>
    </div>

    <div class="endpoint">
        <h3>GET /health</h3>
        <pre>{"service": "depdocs", "status": "healthy", "uptime": 123}</pre>
    </div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        create_app(AppState::new(DocsService::new(Config::default()).unwrap()))
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("name=\"files[]\""));
    }

    #[tokio::test]
    async fn test_non_multipart_upload_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
