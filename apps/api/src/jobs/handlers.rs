//! Axum route handlers for the job application assistant.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::documents::extract_text;
use crate::errors::AppError;
use crate::jobs::analysis::{
    analyze_application, resolve_model, ApplicationAnalysis, ApplicationInput, ALLOWED_MODELS,
    DEFAULT_MODEL,
};
use crate::jobs::export::ExportFormat;
use crate::state::AppState;
use crate::uploads::{FormFields, Upload};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: &'static [&'static str],
    pub default: &'static str,
    pub credential_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub model: String,
    #[serde(flatten)]
    pub analysis: ApplicationAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub text: String,
    pub title: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs/models
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: ALLOWED_MODELS,
        default: DEFAULT_MODEL,
        credential_configured: state.llm.has_credential(),
    })
}

/// POST /api/v1/jobs/analyze
///
/// Multipart fields: `cv_file`, `cv_text`, `jd_file`, `jd_text`, `skills`, `model`.
/// Input is validated before any model call is made.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let form = FormFields::read(multipart).await?;
    let model = resolve_model(form.text("model"))?;

    let input = ApplicationInput::resolve(
        extract_upload(form.file("cv_file")).await?,
        form.text("cv_text"),
        extract_upload(form.file("jd_file")).await?,
        form.text("jd_text"),
        form.text("skills"),
    )?;

    let analysis = analyze_application(&state.llm, &input, model).await?;

    Ok(Json(AnalyzeResponse {
        model: model.to_string(),
        analysis,
    }))
}

/// POST /api/v1/jobs/export/docx
pub async fn handle_export_docx(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    export(ExportFormat::Docx, request).await
}

/// POST /api/v1/jobs/export/pdf
pub async fn handle_export_pdf(Json(request): Json<ExportRequest>) -> Result<Response, AppError> {
    export(ExportFormat::Pdf, request).await
}

async fn export(format: ExportFormat, request: ExportRequest) -> Result<Response, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let file_name = format!(
        "{}.{}",
        file_stem(request.title.as_deref().unwrap_or("document")),
        format.extension()
    );
    let text = request.text;
    let bytes = tokio::task::spawn_blocking(move || format.render(&text))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Text extraction is CPU-bound; keep it off the async workers.
async fn extract_upload(upload: Option<&Upload>) -> Result<Option<String>, AppError> {
    let Some(upload) = upload.cloned() else {
        return Ok(None);
    };
    let text = tokio::task::spawn_blocking(move || extract_text(&upload.file_name, &upload.data))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(Some(text))
}

/// "Improved CV" → "improved_cv".
fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("Improved CV"), "improved_cv");
        assert_eq!(file_stem("Cover Letter!"), "cover_letter");
        assert_eq!(file_stem("  "), "document");
    }

    #[tokio::test]
    async fn test_export_rejects_empty_text() {
        let err = export(
            ExportFormat::Pdf,
            ExportRequest {
                text: "  ".into(),
                title: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_extract_upload_plain_text() {
        let upload = Upload {
            file_name: "jd.txt".into(),
            data: bytes::Bytes::from_static(b"Rust engineer wanted"),
        };
        assert_eq!(
            extract_upload(Some(&upload)).await.unwrap().as_deref(),
            Some("Rust engineer wanted")
        );
        assert!(extract_upload(None).await.unwrap().is_none());
    }
}
