//! The persistence contract consumed by the core. Append-only: records
//! are inserted and read, never updated or deleted. Corrections are new
//! records. Any conforming store satisfies the contract; concurrency
//! discipline (insert atomicity) is the implementation's concern.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow};

/// Record filter. The empty filter is an unrestricted listing. Scalar
/// fields match exactly; `name_contains` is a case-insensitive substring;
/// `skill` is case-insensitive set membership on the skills field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeFilter {
    pub name: Option<String>,
    pub name_contains: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skill: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Persists a record, assigning its id and timestamp. The id is
    /// assigned exactly once, here.
    async fn insert(&self, resume: NewResume) -> Result<ResumeRow, AppError>;

    /// Matching records, newest first.
    async fn find(&self, filter: &ResumeFilter) -> Result<Vec<ResumeRow>, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
