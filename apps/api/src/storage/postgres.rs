use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow};
use crate::storage::{ResumeFilter, ResumeStore};

/// Postgres-backed record store. Schema lives in `migrations/`; the
/// multi-valued fields are `TEXT[]` columns.
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Connection-level failures surface as `StorageUnavailable` so callers
/// can distinguish "retry the whole operation" from a query bug.
fn storage_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Tls(_) => AppError::StorageUnavailable(e.to_string()),
        _ => AppError::Database(e),
    }
}

fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert(&self, resume: NewResume) -> Result<ResumeRow, AppError> {
        let id = Uuid::new_v4();
        let row: ResumeRow = sqlx::query_as(
            r#"
            INSERT INTO resumes
                (id, name, email, phone, skills, education, experience,
                 summary, raw_text, source_file, extraction_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&resume.name)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.skills)
        .bind(&resume.education)
        .bind(&resume.experience)
        .bind(&resume.summary)
        .bind(&resume.raw_text)
        .bind(&resume.source_file)
        .bind(&resume.extraction_notes)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        info!("Inserted resume {} from '{}'", row.id, row.source_file);
        Ok(row)
    }

    async fn find(&self, filter: &ResumeFilter) -> Result<Vec<ResumeRow>, AppError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM resumes WHERE TRUE");

        if let Some(name) = &filter.name {
            qb.push(" AND name = ").push_bind(name);
        }
        if let Some(fragment) = &filter.name_contains {
            qb.push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(fragment)));
        }
        if let Some(email) = &filter.email {
            qb.push(" AND email = ").push_bind(email);
        }
        if let Some(phone) = &filter.phone {
            qb.push(" AND phone = ").push_bind(phone);
        }
        if let Some(skill) = &filter.skill {
            // Skills are stored lowercase; normalize the probe to match.
            qb.push(" AND ")
                .push_bind(skill.to_lowercase())
                .push(" = ANY(skills)");
        }

        qb.push(" ORDER BY created_at DESC, id DESC");

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ").push_bind(offset);
        }

        qb.build_query_as::<ResumeRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM resumes")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)
    }
}
