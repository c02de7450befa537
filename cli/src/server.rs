//! HTTP front end: multipart upload in, converted file out.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tempfile::NamedTempFile;

use docshift::{ConversionKind, ConvertOptions, Converter, Orientation};

/// Server settings.
pub struct ServerConfig {
    pub work_dir: PathBuf,
    pub max_upload_bytes: usize,
}

struct AppState {
    work_dir: PathBuf,
}

/// Routes: `POST /converter/file/` and `POST /converter/tables/` convert,
/// `POST /converter/inspect/` returns the extracted tables as JSON.
pub fn router(config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        work_dir: config.work_dir,
    });
    let limit = DefaultBodyLimit::max(config.max_upload_bytes);

    Router::new()
        .route("/converter/file/", post(convert_file).layer(limit.clone()))
        .route("/converter/tables/", post(convert_file).layer(limit.clone()))
        .route("/converter/inspect/", post(inspect_tables).layer(limit))
        .with_state(state)
}

#[derive(Default)]
struct UploadForm {
    file: Option<Vec<u8>>,
    file_name: Option<String>,
    file_type: Option<String>,
    orientation: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, Response> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| bad_request(err.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|err| bad_request(err.to_string()))?;
                form.file = Some(data.to_vec());
            }
            "file_type" => {
                form.file_type =
                    Some(field.text().await.map_err(|err| bad_request(err.to_string()))?);
            }
            "orientation" => {
                form.orientation =
                    Some(field.text().await.map_err(|err| bad_request(err.to_string()))?);
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn convert_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let form = read_form(multipart).await?;

    // Validate the request before anything touches the disk.
    let file_type = form
        .file_type
        .ok_or_else(|| bad_request("missing field: file_type".into()))?;
    let kind: ConversionKind = file_type.parse().map_err(|e| error_response(&e))?;
    let orientation: Orientation = form
        .orientation
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(bad_request)?;
    let data = form
        .file
        .ok_or_else(|| bad_request("missing field: file".into()))?;

    let upload = stash_upload(state.work_dir.clone(), data).await?;
    let converter = Converter::new(&state.work_dir)
        .with_options(ConvertOptions::new().with_orientation(orientation));

    // `upload` is removed when dropped at the end of this handler.
    let output = docshift::convert_async(converter, kind, upload.path().to_path_buf())
        .await
        .map_err(|e| error_response(&e))?;
    let bytes = tokio::fs::read(&output).await;
    if let Err(e) = tokio::fs::remove_file(&output).await {
        log::warn!("Failed to remove {}: {}", output.display(), e);
    }
    let bytes = bytes.map_err(|e| error_response(&docshift::Error::Io(e)))?;

    let target = kind.target();
    let disposition = format!(
        "attachment; filename=\"{}.{}\"",
        download_stem(form.file_name.as_deref()),
        target.extension()
    );
    log::info!("Served {} ({} bytes)", kind, bytes.len());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, target.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn inspect_tables(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Response> {
    let form = read_form(multipart).await?;
    let data = form
        .file
        .ok_or_else(|| bad_request("missing field: file".into()))?;
    let upload = stash_upload(state.work_dir.clone(), data).await?;

    let path = upload.path().to_path_buf();
    let (format, workbook) = tokio::task::spawn_blocking(move || docshift::inspect(path))
        .await
        .map_err(|e| internal_error(e.to_string()))?
        .map_err(|e| error_response(&e))?;

    Ok(Json(json!({
        "format": format,
        "sheets": workbook.sheets(),
    }))
    .into_response())
}

/// Store an upload on a blocking worker.
async fn stash_upload(dir: PathBuf, data: Vec<u8>) -> Result<NamedTempFile, Response> {
    tokio::task::spawn_blocking(move || save_upload(&dir, &data))
        .await
        .map_err(|e| internal_error(e.to_string()))?
        .map_err(|e| error_response(&e))
}

/// Store an upload under a unique name in `dir`.
fn save_upload(dir: &Path, data: &[u8]) -> docshift::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("docshift-upload-")
        .tempfile_in(dir)?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}

/// File name stem for the download, restricted to a header-safe alphabet.
fn download_stem(file_name: Option<&str>) -> String {
    let stem = file_name
        .and_then(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let safe: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
        .collect();
    let safe = safe.trim();
    if safe.is_empty() {
        "converted".to_string()
    } else {
        safe.to_string()
    }
}

fn status_for(err: &docshift::Error) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_response(err: &docshift::Error) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        log::error!("Conversion failed: {}", err);
    } else {
        log::debug!("Rejected request: {}", err);
    }
    (
        status,
        Json(json!({ "error": err.kind(), "message": err.to_string() })),
    )
        .into_response()
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "bad_request", "message": message })),
    )
        .into_response()
}

fn internal_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal", "message": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use docshift::{Table, TableLocation, Workbook};
    use tower::ServiceExt;

    const BOUNDARY: &str = "docshift-form-boundary";

    fn scores_xlsx() -> Vec<u8> {
        let mut table = Table::new(TableLocation::Sheet("Scores".into()));
        table.add_row(["Name", "Score"]);
        table.add_row(["Grace", "91"]);
        docshift::render::write_xlsx(&Workbook::from_tables(&[table])).unwrap()
    }

    fn upload(uri: &str, file: &[u8], file_type: Option<&str>) -> Request<Body> {
        let mut body = Vec::new();
        if let Some(file_type) = file_type {
            write!(
                body,
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file_type\"\r\n\r\n{file_type}\r\n"
            )
            .unwrap();
        }
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"scores.xlsx\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .unwrap();
        body.extend_from_slice(file);
        write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn app(dir: &Path) -> Router {
        router(ServerConfig {
            work_dir: dir.to_path_buf(),
            max_upload_bytes: 1 << 20,
        })
    }

    #[tokio::test]
    async fn test_both_converter_routes_convert() {
        for uri in ["/converter/file/", "/converter/tables/"] {
            let dir = tempfile::tempdir().unwrap();
            let response = app(dir.path())
                .oneshot(upload(uri, &scores_xlsx(), Some("excel to docx")))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                ConversionKind::ExcelToDocx.target().mime_type()
            );
            assert_eq!(
                response.headers()[header::CONTENT_DISPOSITION],
                "attachment; filename=\"scores.docx\""
            );
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert!(bytes.starts_with(b"PK"));
            // Upload and output are both gone.
            assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        }
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected_before_saving() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(upload("/converter/tables/", &scores_xlsx(), Some("foo to bar")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "unsupported_kind");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_inspect_route_returns_tables() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(upload("/converter/inspect/", &scores_xlsx(), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["format"], "xlsx");
        assert_eq!(body["sheets"][0]["name"], "Scores");
    }

    #[tokio::test]
    async fn test_stash_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let Ok(upload) = stash_upload(dir.path().to_path_buf(), b"%PDF-1.5".to_vec()).await else {
            panic!("upload was not stored");
        };
        assert_eq!(std::fs::read(upload.path()).unwrap(), b"%PDF-1.5");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&docshift::Error::UnsupportedKind("foo to bar".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&docshift::Error::EmptyResult("none".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&docshift::Error::Write("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_download_stem() {
        assert_eq!(download_stem(Some("Q3 report.pdf")), "Q3 report");
        assert_eq!(download_stem(Some("a\"b;c.docx")), "abc");
        assert_eq!(download_stem(Some("보고서.pdf")), "converted");
        assert_eq!(download_stem(None), "converted");
    }

    #[test]
    fn test_save_upload_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let upload = save_upload(dir.path(), b"%PDF-1.5").unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        drop(upload);
        assert!(!path.exists());
    }
}
