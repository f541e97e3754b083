use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::extract_resume;
use crate::models::resume::ResumeRow;
use crate::state::AppState;

/// The multipart field carrying the document.
const UPLOAD_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: Uuid,
    pub resume: ResumeRow,
}

/// POST /api/v1/resumes
///
/// Accepts a PDF in the `resume` multipart field, runs the extraction
/// pipeline, and persists the resulting record. Non-PDF payloads are
/// rejected before the pipeline runs; an unreadable document persists
/// nothing.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut payload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        payload = Some((bytes, filename, content_type));
    }

    let (bytes, filename, content_type) = payload
        .ok_or_else(|| AppError::Validation(format!("missing '{UPLOAD_FIELD}' file field")))?;

    if !is_pdf_upload(&filename, content_type.as_deref()) {
        return Err(AppError::Validation(
            "only PDF files are accepted".to_string(),
        ));
    }

    let record = extract_resume(&bytes, &filename, state.ner.as_ref(), &state.extraction).await?;
    let stored = state.store.insert(record).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: stored.id,
            resume: stored,
        }),
    ))
}

/// A payload qualifies as PDF when either the declared content type or
/// the filename extension says so.
fn is_pdf_upload(filename: &str, content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || filename.to_lowercase().ends_with(".pdf")
}
