use crate::errors::AppError;

/// One line of extracted text, tagged with the 1-based page it came from.
/// The page tag is the line-level boundary marker the resolver's
/// positional heuristics rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub page: usize,
    pub text: String,
}

/// The plain-text representation of a document: an ordered sequence of
/// lines in document order. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    lines: Vec<TextLine>,
}

impl ExtractedText {
    /// Builds the line sequence from per-page text. Blank lines are kept;
    /// the resolver's block and section logic depends on them.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = Vec::new();
        for (i, page) in pages.into_iter().enumerate() {
            for line in page.as_ref().lines() {
                lines.push(TextLine {
                    page: i + 1,
                    text: line.to_string(),
                });
            }
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// The exact string handed to the entity-extraction capability.
    /// Entity span offsets index into this representation.
    pub fn full_text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Byte offset of each line's start within `full_text()`.
    pub fn line_offsets(&self) -> Vec<usize> {
        let mut offsets = Vec::with_capacity(self.lines.len());
        let mut pos = 0;
        for line in &self.lines {
            offsets.push(pos);
            pos += line.text.len() + 1; // '\n'
        }
        offsets
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.text.trim().is_empty())
    }
}

/// Converts a PDF byte stream into its plain-text line representation.
///
/// Fails with `UnreadableDocument` when the bytes are not a valid PDF or
/// when no page yields any text (e.g. a scanned image with no OCR layer).
/// This error is terminal for the document and is never retried.
pub fn extract_text(bytes: &[u8]) -> Result<ExtractedText, AppError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::UnreadableDocument(format!("not a readable PDF: {e}")))?;

    let text = ExtractedText::from_pages(pages);
    if text.is_blank() {
        return Err(AppError::UnreadableDocument(
            "document has no extractable text layer".to_string(),
        ));
    }
    Ok(text)
}
