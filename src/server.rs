//! HTTP boundary: accepts a multipart PDF upload and answers with the ZIP
//! archive of its images.
//!
//! | Outcome | Status |
//! |---|---|
//! | archive produced | `200`, `application/zip`, attachment `extracted_images.zip` |
//! | no accepted upload field | `400 No PDF file uploaded.` |
//! | malformed or oversized multipart body | `400` / `413` |
//! | unreadable PDF | `400 Bad Request: …` |
//! | no images | `404 No images found in the PDF.` |
//! | packaging failure | `500 Internal Server Error: …` |
//! | method other than `POST` | `405 Method Not Allowed` |

use crate::{ExtractError, Extraction, ExtractorConfig, FailureKind, PdfImageExtractor};
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

/// Multipart field name the PDF must be uploaded under.
pub const UPLOAD_FIELD: &str = "pdfFile";

/// Content type the upload field must declare.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

pub const BIND_ENV: &str = "EXTRACT_IMAGES_BIND";
pub const MAX_UPLOAD_ENV: &str = "EXTRACT_IMAGES_MAX_UPLOAD";

// ── Configuration ────────────────────────────────────────────────────────────

/// Settings for [`router`] and [`serve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,

    /// Largest request body accepted, in bytes.
    pub max_upload_bytes: usize,

    pub extractor: ExtractorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_upload_bytes: 32 * 1024 * 1024,
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `EXTRACT_IMAGES_BIND`,
    /// `EXTRACT_IMAGES_MAX_UPLOAD` and `EXTRACT_IMAGES_COMPRESSION_LEVEL`.
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Self {
            extractor: ExtractorConfig::from_env()?,
            ..Self::default()
        };

        if let Ok(raw) = std::env::var(BIND_ENV) {
            config.bind_addr = raw.trim().parse().map_err(|_| {
                ExtractError::InvalidConfig(format!("{BIND_ENV} is not a socket address: '{raw}'"))
            })?;
        }
        if let Ok(raw) = std::env::var(MAX_UPLOAD_ENV) {
            config.max_upload_bytes = raw.trim().parse().map_err(|_| {
                ExtractError::InvalidConfig(format!("{MAX_UPLOAD_ENV} is not a byte count: '{raw}'"))
            })?;
        }

        Ok(config)
    }
}

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the application router.
///
/// - `POST /extract-images`: multipart upload, see the module docs
/// - `GET /health`: liveness check
pub fn router(config: ServerConfig) -> Router {
    let extractor = Arc::new(PdfImageExtractor::with_config(config.extractor));

    Router::new()
        .route(
            "/extract-images",
            post(extract_images).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(extractor)
}

/// Bind `config.bind_addr` and serve [`router`] until the process exits.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(config)).await
}

async fn health() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method Not Allowed",
    )
        .into_response()
}

async fn extract_images(
    State(extractor): State<Arc<PdfImageExtractor>>,
    multipart: Multipart,
) -> Response {
    let pdf = match read_pdf_upload(multipart).await {
        Ok(Some(pdf)) => pdf,
        Ok(None) => return (StatusCode::BAD_REQUEST, "No PDF file uploaded.").into_response(),
        Err(e) => {
            log::warn!("rejecting malformed upload: {e}");
            return (e.status(), format!("Bad Request: {}", e.body_text())).into_response();
        }
    };

    log::info!("extracting images from {} byte upload", pdf.len());
    match tokio::task::spawn_blocking(move || extractor.extract_archive(&pdf)).await {
        Ok(outcome) => response_for(outcome),
        Err(e) => {
            log::error!("extraction task aborted: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal Server Error: {e}"),
            )
                .into_response()
        }
    }
}

// ── Upload handling ──────────────────────────────────────────────────────────

/// The discard rule for multipart fields: only a field named `pdfFile`
/// declaring `application/pdf` (parameters ignored) carries the upload.
pub fn is_pdf_upload_field(name: Option<&str>, content_type: Option<&str>) -> bool {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim);

    name == Some(UPLOAD_FIELD)
        && essence.is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_CONTENT_TYPE))
}

/// Read the first accepted upload field; every other field is discarded
/// unread.
async fn read_pdf_upload(mut multipart: Multipart) -> Result<Option<Bytes>, MultipartError> {
    let mut pdf = None;

    while let Some(field) = multipart.next_field().await? {
        if pdf.is_none() && is_pdf_upload_field(field.name(), field.content_type()) {
            pdf = Some(field.bytes().await?);
        } else {
            log::debug!(
                "discarding multipart field {:?} ({:?})",
                field.name(),
                field.content_type()
            );
        }
    }

    Ok(pdf)
}

// ── Outcome mapping ──────────────────────────────────────────────────────────

/// Map a pipeline outcome to the HTTP response sent to the client.
pub fn response_for(outcome: crate::Result<Extraction>) -> Response {
    match outcome {
        Ok(Extraction::Archive(archive)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, archive.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", archive.file_name),
                ),
            ],
            archive.data,
        )
            .into_response(),
        Ok(Extraction::NoImagesFound) => {
            (StatusCode::NOT_FOUND, "No images found in the PDF.").into_response()
        }
        Err(e) => match e.kind() {
            FailureKind::BadInput => {
                (StatusCode::BAD_REQUEST, format!("Bad Request: {e}")).into_response()
            }
            FailureKind::PackagingFailed => {
                log::error!("error processing PDF: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal Server Error: {e}"),
                )
                    .into_response()
            }
        },
    }
}
