use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted candidate record. Created only by the record builder and
/// never mutated after insert; corrections are new records.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    /// Assigned by the storage layer on insert, immutable thereafter.
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Lowercase, deduplicated, sorted. Matched against the configured
    /// vocabulary at extraction time.
    pub skills: Vec<String>,
    /// Document order.
    pub education: Vec<String>,
    /// Document order, capped at extraction time.
    pub experience: Vec<String>,
    pub summary: String,
    /// Full extracted text, retained for audit and re-extraction.
    pub raw_text: String,
    pub source_file: String,
    /// Which heuristic produced each field.
    pub extraction_notes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// An extracted record that has not been persisted yet. `id` and
/// `created_at` exist only after the store accepts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResume {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub education: Vec<String>,
    pub experience: Vec<String>,
    pub summary: String,
    pub raw_text: String,
    pub source_file: String,
    pub extraction_notes: Vec<String>,
}
