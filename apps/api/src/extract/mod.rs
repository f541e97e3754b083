//! The document-to-record pipeline: PDF bytes in, structured candidate
//! record out. Each invocation is an independent, synchronous computation
//! over its own inputs, so callers may parallelize across documents freely.

pub mod builder;
pub mod entities;
pub mod handlers;
pub mod normalize;
pub mod resolver;
pub mod text;

use crate::config::ExtractionConfig;
use crate::errors::AppError;
use crate::extract::entities::EntityExtractor;
use crate::models::resume::NewResume;

/// Runs the full extraction pipeline on one document. The only external
/// touchpoint is the entity-extraction call; everything else is pure.
pub async fn extract_resume(
    bytes: &[u8],
    filename: &str,
    ner: &dyn EntityExtractor,
    cfg: &ExtractionConfig,
) -> Result<NewResume, AppError> {
    let text = text::extract_text(bytes)?;

    let email = normalize::find_email(&text);
    let phone = normalize::find_phone(&text);

    let spans = ner.extract(&text.full_text()).await?;
    let resolved = resolver::resolve(&text, &spans, cfg);

    Ok(builder::build_record(resolved, email, phone, &text, filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::entities::DisabledEntityExtractor;

    #[tokio::test]
    async fn test_pipeline_rejects_non_pdf_and_produces_no_record() {
        let err = extract_resume(
            b"plain text masquerading as a resume",
            "cv.pdf",
            &DisabledEntityExtractor,
            &ExtractionConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UnreadableDocument(_)));
    }
}
