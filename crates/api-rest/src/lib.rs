//! # API REST
//!
//! REST API implementation for vstore.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Multipart upload parsing and the request body limit
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response types and `vstore-core` for every storage operation.
//! The server binary lives in the workspace root (`vstore-run`); this crate only builds the
//! [`Router`].

#![warn(rust_2018_idioms)]

mod error;

pub use error::ApiError;

use api_shared::{
    ArtifactRes, ErrorRes, FileQuery, FileVersionRes, HealthRes, HealthService, HistoryRes,
    LatestFileRes, ListFilesRes, NamespaceQuery, UploadForm,
};
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use vstore_core::{CoreConfig, Namespace, StoreError, StoreResult, StoreService};

/// Leading bytes read from an artifact to pick the download's content type.
const SNIFF_LEN: u64 = 8 * 1024;

/// Application state for the REST API server
///
/// Shared by all request handlers. The service is opened once at startup, so handlers never touch
/// process-wide configuration.
#[derive(Clone)]
pub struct AppState {
    cfg: Arc<CoreConfig>,
    service: Arc<StoreService>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, service: Arc<StoreService>) -> Self {
        Self { cfg, service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        upload,
        latest_file,
        file_version,
        list_files,
        file_history,
        file_content,
    ),
    components(schemas(
        HealthRes,
        ArtifactRes,
        LatestFileRes,
        FileVersionRes,
        ListFilesRes,
        HistoryRes,
        ErrorRes,
        UploadForm,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`.
///
/// The upload body limit comes from [`CoreConfig::max_upload_bytes`].
pub fn router(state: AppState) -> Router {
    let body_limit = state.cfg.max_upload_bytes();

    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/files/latest", get(latest_file))
        .route("/files/version", get(file_version))
        .route("/files/list", get(list_files))
        .route("/files/history", get(file_history))
        .route("/files/content", get(file_content))
        .layer(DefaultBodyLimit::max(body_limit))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload committed as a new version", body = ArtifactRes),
        (status = 400, description = "Missing file part, bad file name or namespace", body = ErrorRes),
        (status = 413, description = "Upload exceeds the configured size limit", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Upload a file as the next version of its logical name
///
/// Multipart fields may arrive in any order. `userId` and `category` fall back to their defaults
/// when absent or blank; the `file` part is required and its file name is the logical name.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not valid multipart, or has no (or more than one) `file` part,
/// - the namespace or file name is unsafe, or
/// - the content is empty and empty uploads are disabled.
///
/// Returns `413 Payload Too Large` when the body exceeds the configured limit.
#[axum::debug_handler]
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ArtifactRes>, ApiError> {
    let mut user_id: Option<String> = None;
    let mut category: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "userId" => user_id = Some(field.text().await?),
            "category" => category = Some(field.text().await?),
            "file" => {
                if file.is_some() {
                    return Err(ApiError::bad_request("Only one file part is accepted"));
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                file = Some((file_name, data));
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let Some((file_name, data)) = file else {
        return Err(ApiError::bad_request("No file uploaded"));
    };

    let namespace = Namespace::with_defaults(user_id.as_deref(), category.as_deref())?;
    let service = state.service.clone();
    let descriptor = blocking(move || service.commit(&namespace, &file_name, data.as_ref())).await?;

    tracing::info!(
        file = %descriptor.file_name,
        version = descriptor.version,
        size_bytes = descriptor.size_bytes,
        "upload committed"
    );

    Ok(Json(ArtifactRes::from(&descriptor)))
}

#[utoipa::path(
    get,
    path = "/files/latest",
    params(FileQuery),
    responses(
        (status = 200, description = "Latest version of the file", body = LatestFileRes),
        (status = 400, description = "Missing or invalid parameters", body = ErrorRes),
        (status = 404, description = "No versions found", body = ErrorRes)
    )
)]
/// Latest version of a logical file
#[axum::debug_handler]
async fn latest_file(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Json<LatestFileRes>, ApiError> {
    let (namespace, file_name) = file_target(&query)?;
    let service = state.service.clone();
    let descriptor = blocking(move || service.latest(&namespace, &file_name)).await?;

    Ok(Json(LatestFileRes::from(&descriptor)))
}

#[utoipa::path(
    get,
    path = "/files/version",
    params(FileQuery),
    responses(
        (status = 200, description = "The requested version", body = FileVersionRes),
        (status = 400, description = "Missing or invalid parameters", body = ErrorRes),
        (status = 404, description = "Version not found", body = ErrorRes)
    )
)]
/// A specific version of a logical file
#[axum::debug_handler]
async fn file_version(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Json<FileVersionRes>, ApiError> {
    let (namespace, file_name) = file_target(&query)?;
    let version = match required(&query.version) {
        Some(raw) => parse_version(raw)?,
        None => return Err(ApiError::missing_params()),
    };
    let service = state.service.clone();
    let descriptor = blocking(move || service.version(&namespace, &file_name, version)).await?;

    Ok(Json(FileVersionRes::from(&descriptor)))
}

#[utoipa::path(
    get,
    path = "/files/list",
    params(NamespaceQuery),
    responses(
        (status = 200, description = "Every file in the namespace", body = ListFilesRes),
        (status = 400, description = "Missing or invalid parameters", body = ErrorRes),
        (status = 404, description = "Namespace has no files", body = ErrorRes)
    )
)]
/// Raw listing of a namespace
#[axum::debug_handler]
async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<NamespaceQuery>,
) -> Result<Json<ListFilesRes>, ApiError> {
    let namespace = namespace_target(query.user_id.as_ref(), query.category.as_ref())?;
    let service = state.service.clone();
    let files = blocking(move || service.list(&namespace)).await?;

    Ok(Json(ListFilesRes { files }))
}

#[utoipa::path(
    get,
    path = "/files/history",
    params(FileQuery),
    responses(
        (status = 200, description = "Every version, oldest first", body = HistoryRes),
        (status = 400, description = "Missing or invalid parameters", body = ErrorRes),
        (status = 404, description = "No versions found", body = ErrorRes)
    )
)]
/// Version history of a logical file
///
/// An existing namespace with no matching versions is `404`, like `/files/latest`.
#[axum::debug_handler]
async fn file_history(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Json<HistoryRes>, ApiError> {
    let (namespace, file_name) = file_target(&query)?;
    let service = state.service.clone();
    let lookup = file_name.clone();
    let descriptors = blocking(move || service.history(&namespace, &lookup)).await?;

    if descriptors.is_empty() {
        return Err(ApiError::not_found(format!("no versions of {file_name}")));
    }

    Ok(Json(HistoryRes {
        versions: descriptors.iter().map(ArtifactRes::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/files/content",
    params(FileQuery),
    responses(
        (status = 200, description = "Raw artifact bytes"),
        (status = 400, description = "Missing or invalid parameters", body = ErrorRes),
        (status = 404, description = "Version not found", body = ErrorRes)
    )
)]
/// Download an artifact's content
///
/// Serves the latest version unless `version` is given. The artifact is streamed from disk, so
/// memory use does not grow with its size.
#[axum::debug_handler]
async fn file_content(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let (namespace, file_name) = file_target(&query)?;
    let version = required(&query.version).map(parse_version).transpose()?;
    let service = state.service.clone();

    let (descriptor, head, file) = blocking(move || {
        let descriptor = match version {
            Some(version) => service.version(&namespace, &file_name, version)?,
            None => service.latest(&namespace, &file_name)?,
        };
        let mut file = service.open_artifact(&descriptor)?;
        let head = read_head(&mut file).map_err(|e| StoreError::Files(e.into()))?;
        Ok((descriptor, head, file))
    })
    .await?;

    let media_type = infer::get(&head)
        .map(|t| t.mime_type())
        .unwrap_or("application/octet-stream");
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        descriptor.file_name.replace('"', "_")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    tracing::debug!(file = %descriptor.file_name, size_bytes = descriptor.size_bytes, "streaming artifact");

    let stream = ReaderStream::new(tokio::fs::File::from_std(file));
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(media_type)),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(descriptor.size_bytes)),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

/// Reads the first bytes of `file` for media type sniffing, then rewinds it.
fn read_head(file: &mut File) -> io::Result<Vec<u8>> {
    let mut head = Vec::new();
    file.by_ref().take(SNIFF_LEN).read_to_end(&mut head)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(head)
}

/// Runs a synchronous store call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => {
            tracing::error!("Store task failed: {:?}", e);
            Err(ApiError::internal())
        }
    }
}

/// A query value that is present and not blank.
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn namespace_target(
    user_id: Option<&String>,
    category: Option<&String>,
) -> Result<Namespace, ApiError> {
    match (
        user_id.map(String::as_str).filter(|v| !v.trim().is_empty()),
        category.map(String::as_str).filter(|v| !v.trim().is_empty()),
    ) {
        (Some(user_id), Some(category)) => Ok(Namespace::new(user_id, category)?),
        _ => Err(ApiError::missing_params()),
    }
}

fn file_target(query: &FileQuery) -> Result<(Namespace, String), ApiError> {
    let namespace = namespace_target(query.user_id.as_ref(), query.category.as_ref())?;
    let file_name = required(&query.file_name).ok_or_else(ApiError::missing_params)?;
    Ok((namespace, file_name.to_string()))
}

fn parse_version(raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ApiError::bad_request(format!("Invalid version '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "vstore-test-boundary";

    fn app_with(temp: &TempDir, max_upload_bytes: usize, allow_empty: bool) -> Router {
        let cfg =
            CoreConfig::new(temp.path().join("uploads"), allow_empty, max_upload_bytes).unwrap();
        let service = StoreService::initialise(&cfg).unwrap();
        router(AppState::new(Arc::new(cfg), Arc::new(service)))
    }

    fn app(temp: &TempDir) -> Router {
        app_with(temp, 1024 * 1024, true)
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, file)))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn upload(app: &Router, user: &str, category: &str, name: &str, content: &[u8]) {
        let (status, _) = send(
            app,
            upload_request(&[("userId", user), ("category", category)], Some((name, content))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let temp = TempDir::new().unwrap();
        let (status, json) = send_json(&app(&temp), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
        assert_eq!(json["message"], "vstore is alive");
    }

    #[tokio::test]
    async fn test_upload_returns_descriptor() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        let (status, json) = send_json(
            &app,
            upload_request(
                &[("userId", "alice"), ("category", "invoices")],
                Some(("report.pdf", b"%PDF-1.4 january")),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fileName"], "report_v1.pdf");
        assert_eq!(json["version"], 1);
        assert_eq!(json["sizeBytes"], 16);
        assert_eq!(json["mediaType"], "application/pdf");
        assert!(json["sha256"].as_str().unwrap().len() == 64);

        let stored = temp
            .path()
            .join("uploads/alice/invoices/report_v1.pdf");
        assert_eq!(std::fs::read(stored).unwrap(), b"%PDF-1.4 january");
    }

    #[tokio::test]
    async fn test_upload_fields_in_any_order_and_defaults() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        // file part first, namespace fields after it
        let mut body = multipart_body(&[], Some(("notes.txt", b"hi")));
        body.truncate(body.len() - format!("--{BOUNDARY}--\r\n").len());
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"userId\"\r\n\r\nbob\r\n--{BOUNDARY}--\r\n"
            )
            .as_bytes(),
        );
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, json) = send_json(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(Path::new(json["fullPath"].as_str().unwrap())
            .ends_with("bob/uncategorized/notes_v1.txt"));

        let (status, json) = send_json(&app, upload_request(&[], Some(("notes.txt", b"x")))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(Path::new(json["fullPath"].as_str().unwrap())
            .ends_with("defaultUser/uncategorized/notes_v1.txt"));
    }

    #[tokio::test]
    async fn test_upload_without_file_part_is_bad_request() {
        let temp = TempDir::new().unwrap();
        let (status, json) =
            send_json(&app(&temp), upload_request(&[("userId", "alice")], None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_rejects_unsafe_namespace() {
        let temp = TempDir::new().unwrap();
        let (status, json) = send_json(
            &app(&temp),
            upload_request(
                &[("userId", ".."), ("category", "invoices")],
                Some(("report.pdf", b"x")),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("invalid namespace"));
        assert!(!temp.path().join("invoices").exists());
    }

    #[tokio::test]
    async fn test_empty_upload_policy() {
        let temp = TempDir::new().unwrap();
        let strict = app_with(&temp, 1024, false);

        let (status, _) = send(&strict, upload_request(&[], Some(("empty.txt", b"")))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let lenient_dir = TempDir::new().unwrap();
        let lenient = app(&lenient_dir);
        let (status, json) =
            send_json(&lenient, upload_request(&[], Some(("empty.txt", b"")))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sizeBytes"], 0);
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let temp = TempDir::new().unwrap();
        let app = app_with(&temp, 256, true);
        let big = vec![b'a'; 4096];

        let (status, _) = send(
            &app,
            upload_request(
                &[("userId", "alice"), ("category", "big")],
                Some(("blob.bin", &big)),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(!temp.path().join("uploads/alice/big/blob_v1.bin").exists());
    }

    #[tokio::test]
    async fn test_latest_version_list_history() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        upload(&app, "alice", "invoices", "report.pdf", b"january").await;
        upload(&app, "alice", "invoices", "report.pdf", b"february").await;

        let (status, json) = send_json(
            &app,
            get("/files/latest?userId=alice&category=invoices&fileName=report.pdf"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["latestFile"], "report_v2.pdf");
        assert_eq!(json["version"], 2);

        let (status, json) = send_json(
            &app,
            get("/files/version?userId=alice&category=invoices&fileName=report.pdf&version=1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["file"], "report_v1.pdf");

        let (status, json) =
            send_json(&app, get("/files/list?userId=alice&category=invoices")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["files"],
            serde_json::json!(["report_v1.pdf", "report_v2.pdf"])
        );

        let (status, json) = send_json(
            &app,
            get("/files/history?userId=alice&category=invoices&fileName=report.pdf"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let versions: Vec<u64> = json["versions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["version"].as_u64().unwrap())
            .collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_content_download() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        upload(&app, "alice", "notes", "todo.txt", b"first").await;
        upload(&app, "alice", "notes", "todo.txt", b"second").await;

        let (status, body) = send(
            &app,
            get("/files/content?userId=alice&category=notes&fileName=todo.txt"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"second");

        let response = app
            .clone()
            .oneshot(get(
                "/files/content?userId=alice&category=notes&fileName=todo.txt&version=1",
            ))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"todo_v1.txt\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"first");
    }

    #[tokio::test]
    async fn test_content_streams_large_artifacts() {
        let temp = TempDir::new().unwrap();
        let app = app_with(&temp, 4 * 1024 * 1024, true);
        let content: Vec<u8> = (0..300 * 1024).map(|i| b'a' + (i % 26) as u8).collect();
        upload(&app, "alice", "blobs", "data.bin", &content).await;

        let response = app
            .clone()
            .oneshot(get("/files/content?userId=alice&category=blobs&fileName=data.bin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_LENGTH],
            content.len().to_string().as_str()
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.len(), content.len());
        assert!(body[..] == content[..]);
    }

    #[tokio::test]
    async fn test_read_errors() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);
        upload(&app, "alice", "invoices", "report.pdf", b"x").await;

        let cases = [
            ("/files/latest?userId=alice&category=invoices", StatusCode::BAD_REQUEST),
            ("/files/list?userId=alice", StatusCode::BAD_REQUEST),
            (
                "/files/version?userId=alice&category=invoices&fileName=report.pdf",
                StatusCode::BAD_REQUEST,
            ),
            (
                "/files/version?userId=alice&category=invoices&fileName=report.pdf&version=two",
                StatusCode::BAD_REQUEST,
            ),
            (
                "/files/latest?userId=..&category=invoices&fileName=report.pdf",
                StatusCode::BAD_REQUEST,
            ),
            (
                "/files/latest?userId=alice&category=invoices&fileName=missing.pdf",
                StatusCode::NOT_FOUND,
            ),
            (
                "/files/version?userId=alice&category=invoices&fileName=report.pdf&version=0",
                StatusCode::NOT_FOUND,
            ),
            (
                "/files/version?userId=alice&category=invoices&fileName=report.pdf&version=7",
                StatusCode::NOT_FOUND,
            ),
            ("/files/list?userId=nobody&category=invoices", StatusCode::NOT_FOUND),
            (
                "/files/history?userId=alice&category=invoices&fileName=missing.pdf",
                StatusCode::NOT_FOUND,
            ),
        ];

        for (uri, expected) in cases {
            let (status, json) = send_json(&app, get(uri)).await;
            assert_eq!(status, expected, "{uri}");
            assert!(json["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_concurrent_uploads_get_distinct_versions() {
        let temp = TempDir::new().unwrap();
        let app = app(&temp);

        let mut tasks = Vec::new();
        for i in 0..8 {
            let app = app.clone();
            tasks.push(tokio::spawn(async move {
                let content = format!("upload {i}");
                let request = upload_request(
                    &[("userId", "alice"), ("category", "race")],
                    Some(("data.csv", content.as_bytes())),
                );
                send_json(&app, request).await
            }));
        }

        let mut versions = Vec::new();
        for task in tasks {
            let (status, json) = task.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            versions.push(json["version"].as_u64().unwrap());
        }
        versions.sort_unstable();
        assert_eq!(versions, (1..=8).collect::<Vec<u64>>());
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/upload",
            "/files/latest",
            "/files/version",
            "/files/list",
            "/files/history",
            "/files/content",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
    }
}
