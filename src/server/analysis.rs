//! Document analysis endpoint (multipart upload).

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};

use super::{default_language, ApiError, AppState};
use crate::analysis::{AnalysisResult, Document, DocumentAnalyzer};

/// Analysis routes.
pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze_handler))
}

async fn analyze_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    let mut multipart = multipart?;
    let limit = state.settings.max_file_size;
    let mut document = None;
    let mut language = default_language();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| guess_mime(&file_name).to_string());
                let bytes = field.bytes().await?;
                if bytes.len() > limit {
                    return Err(ApiError::PayloadTooLarge { limit });
                }
                document = Some(Document {
                    file_name,
                    mime_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("language") => language = field.text().await?,
            _ => {}
        }
    }

    let document =
        document.ok_or_else(|| ApiError::BadRequest("Missing `file` field".to_string()))?;

    let analyzer = DocumentAnalyzer::new(state.factory.vision_client()?);
    let result = analyzer.analyze(document, &language).await?;
    Ok(Json(result))
}

/// Guesses a media type from a file extension when the client sent none.
fn guess_mime(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
