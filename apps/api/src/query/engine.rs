//! Read-only query and aggregation surface over the record store. Every
//! operation is stateless between calls and mutates nothing. Aggregations
//! run as full scans; the store is expected to stay small at this scope.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::storage::{ResumeFilter, ResumeStore};

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A record similar to a reference record, by skill-set overlap.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarResume {
    /// Jaccard similarity of the two skill sets, in (0, 1].
    pub score: f64,
    pub shared_skills: Vec<String>,
    pub resume: ResumeRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateLevel {
    pub id: Uuid,
    pub name: Option<String>,
    pub level: &'static str,
    pub experience_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperienceAnalysis {
    pub total: i64,
    pub entry: i64,
    pub mid: i64,
    pub senior: i64,
    /// Per-candidate breakdown, most experienced first.
    pub breakdown: Vec<CandidateLevel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub total_resumes: i64,
    pub with_skills: i64,
    pub with_education: i64,
    pub with_experience: i64,
    pub with_email: i64,
    pub with_phone: i64,
    pub avg_skills: f64,
    pub avg_education: f64,
    pub avg_experience: f64,
}

/// Seniority bucket by number of experience entries.
pub fn experience_level(count: usize) -> &'static str {
    if count <= 2 {
        "entry"
    } else if count <= 5 {
        "mid"
    } else {
        "senior"
    }
}

#[derive(Clone)]
pub struct QueryEngine {
    store: Arc<dyn ResumeStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn ResumeStore>) -> Self {
        Self { store }
    }

    /// A page of records, newest first. `limit` must be positive and is
    /// capped; it defaults when omitted.
    pub async fn list_resumes(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<ResumeRow>, AppError> {
        let limit = match limit {
            None => DEFAULT_PAGE_LIMIT,
            Some(l) if l < 1 => {
                return Err(AppError::InvalidFilter(format!(
                    "limit must be a positive integer, got {l}"
                )))
            }
            Some(l) => l.min(MAX_PAGE_LIMIT),
        };
        let offset = match offset {
            None => 0,
            Some(o) if o < 0 => {
                return Err(AppError::InvalidFilter(format!(
                    "offset must be non-negative, got {o}"
                )))
            }
            Some(o) => o,
        };

        self.store
            .find(&ResumeFilter {
                limit: Some(limit),
                offset: Some(offset),
                ..Default::default()
            })
            .await
    }

    /// Records whose skills contain the token, case-insensitively. Empty
    /// results are a valid outcome, not an error.
    pub async fn find_by_skill(&self, skill: &str) -> Result<Vec<ResumeRow>, AppError> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(AppError::InvalidFilter(
                "skill must be a non-empty token".to_string(),
            ));
        }
        self.store
            .find(&ResumeFilter {
                skill: Some(skill.to_string()),
                ..Default::default()
            })
            .await
    }

    /// Histogram of distinct values for a categorical field. Multi-valued
    /// fields count one per occurrence; scalar fields count non-empty
    /// values. Unknown fields fail immediately.
    pub async fn count_by(&self, field: &str) -> Result<BTreeMap<String, i64>, AppError> {
        let rows = self.store.find(&ResumeFilter::default()).await?;
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();

        match field {
            "skills" => {
                for row in &rows {
                    for skill in &row.skills {
                        *counts.entry(skill.clone()).or_insert(0) += 1;
                    }
                }
            }
            "education" => {
                for row in &rows {
                    for entry in &row.education {
                        *counts.entry(entry.clone()).or_insert(0) += 1;
                    }
                }
            }
            "name" | "email" | "phone" => {
                for row in &rows {
                    let value = match field {
                        "name" => row.name.as_deref(),
                        "email" => row.email.as_deref(),
                        _ => row.phone.as_deref(),
                    };
                    if let Some(value) = value.filter(|v| !v.is_empty()) {
                        *counts.entry(value.to_string()).or_insert(0) += 1;
                    }
                }
            }
            other => {
                return Err(AppError::UnknownField(format!(
                    "cannot aggregate by '{other}'"
                )))
            }
        }
        Ok(counts)
    }

    /// `None` when the id is unknown: an empty result, not an error.
    pub async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        self.store.get(id).await
    }

    pub async fn search_by_name(
        &self,
        name: &str,
        exact: bool,
    ) -> Result<Vec<ResumeRow>, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidFilter(
                "name must be a non-empty string".to_string(),
            ));
        }
        let filter = if exact {
            ResumeFilter {
                name: Some(name.to_string()),
                ..Default::default()
            }
        } else {
            ResumeFilter {
                name_contains: Some(name.to_string()),
                ..Default::default()
            }
        };
        self.store.find(&filter).await
    }

    /// Records sharing skills with the reference record, by descending
    /// Jaccard similarity. The reference itself and records with no
    /// overlap are excluded.
    pub async fn find_similar(
        &self,
        id: Uuid,
        limit: usize,
    ) -> Result<Vec<SimilarResume>, AppError> {
        let reference = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("resume {id} not found")))?;

        let reference_skills: BTreeSet<&str> =
            reference.skills.iter().map(String::as_str).collect();
        if reference_skills.is_empty() {
            return Ok(Vec::new());
        }

        let mut similar = Vec::new();
        for row in self.store.find(&ResumeFilter::default()).await? {
            if row.id == id {
                continue;
            }
            let skills: BTreeSet<&str> = row.skills.iter().map(String::as_str).collect();
            let shared: Vec<String> = reference_skills
                .intersection(&skills)
                .map(|s| s.to_string())
                .collect();
            if shared.is_empty() {
                continue;
            }
            let union = reference_skills.union(&skills).count();
            let score = shared.len() as f64 / union as f64;
            similar.push(SimilarResume {
                score,
                shared_skills: shared,
                resume: row,
            });
        }

        similar.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        similar.truncate(limit);
        Ok(similar)
    }

    /// Seniority distribution across all records, by experience count.
    pub async fn experience_analysis(&self) -> Result<ExperienceAnalysis, AppError> {
        let rows = self.store.find(&ResumeFilter::default()).await?;

        let mut analysis = ExperienceAnalysis {
            total: rows.len() as i64,
            entry: 0,
            mid: 0,
            senior: 0,
            breakdown: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            let count = row.experience.len();
            let level = experience_level(count);
            match level {
                "entry" => analysis.entry += 1,
                "mid" => analysis.mid += 1,
                _ => analysis.senior += 1,
            }
            analysis.breakdown.push(CandidateLevel {
                id: row.id,
                name: row.name,
                level,
                experience_count: count,
            });
        }
        analysis
            .breakdown
            .sort_by(|a, b| b.experience_count.cmp(&a.experience_count));
        Ok(analysis)
    }

    /// Completeness counts and per-record averages across the store.
    pub async fn database_stats(&self) -> Result<DatabaseStats, AppError> {
        let rows = self.store.find(&ResumeFilter::default()).await?;
        let total = rows.len() as i64;

        let mut stats = DatabaseStats {
            total_resumes: total,
            with_skills: 0,
            with_education: 0,
            with_experience: 0,
            with_email: 0,
            with_phone: 0,
            avg_skills: 0.0,
            avg_education: 0.0,
            avg_experience: 0.0,
        };
        if total == 0 {
            return Ok(stats);
        }

        let mut skill_total = 0usize;
        let mut education_total = 0usize;
        let mut experience_total = 0usize;
        for row in &rows {
            skill_total += row.skills.len();
            education_total += row.education.len();
            experience_total += row.experience.len();
            if !row.skills.is_empty() {
                stats.with_skills += 1;
            }
            if !row.education.is_empty() {
                stats.with_education += 1;
            }
            if !row.experience.is_empty() {
                stats.with_experience += 1;
            }
            if row.email.as_deref().is_some_and(|e| !e.is_empty()) {
                stats.with_email += 1;
            }
            if row.phone.as_deref().is_some_and(|p| !p.is_empty()) {
                stats.with_phone += 1;
            }
        }
        stats.avg_skills = skill_total as f64 / total as f64;
        stats.avg_education = education_total as f64 / total as f64;
        stats.avg_experience = experience_total as f64 / total as f64;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::NewResume;
    use crate::storage::memory::MemResumeStore;

    fn record(name: &str, skills: &[&str], experience: &[&str]) -> NewResume {
        NewResume {
            name: Some(name.to_string()),
            email: Some(format!(
                "{}@example.com",
                name.to_lowercase().replace(' ', ".")
            )),
            phone: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            education: vec!["B.S. Computer Science".to_string()],
            experience: experience.iter().map(|s| s.to_string()).collect(),
            summary: String::new(),
            raw_text: name.to_string(),
            source_file: "cv.pdf".to_string(),
            extraction_notes: vec![],
        }
    }

    async fn engine_with(records: Vec<NewResume>) -> (QueryEngine, Vec<ResumeRow>) {
        let store = Arc::new(MemResumeStore::new());
        let mut rows = Vec::new();
        for r in records {
            rows.push(store.insert(r).await.unwrap());
        }
        (QueryEngine::new(store), rows)
    }

    #[tokio::test]
    async fn test_list_defaults_and_orders_newest_first() {
        let (engine, _) = engine_with(vec![
            record("First", &[], &[]),
            record("Second", &[], &[]),
        ])
        .await;
        let page = engine.list_resumes(None, None).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name.as_deref(), Some("Second"));
    }

    #[tokio::test]
    async fn test_list_rejects_non_positive_limit() {
        let (engine, _) = engine_with(vec![]).await;
        let err = engine.list_resumes(Some(0), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
        let err = engine.list_resumes(Some(-3), None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn test_list_caps_oversized_limit() {
        let (engine, _) = engine_with(vec![record("A", &[], &[])]).await;
        // A huge limit is clamped rather than rejected.
        let page = engine.list_resumes(Some(10_000), None).await.unwrap();
        assert_eq!(page.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_skill_roundtrip() {
        let (engine, rows) = engine_with(vec![
            record("Ada", &["python", "sql"], &[]),
            record("Bob", &["java"], &[]),
        ])
        .await;
        let hits = engine.find_by_skill("SQL").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, rows[0].id);

        // No false positives for an unknown skill; empty is not an error.
        let hits = engine.find_by_skill("cobol").await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_skill_rejects_empty_token() {
        let (engine, _) = engine_with(vec![]).await;
        let err = engine.find_by_skill("  ").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn test_count_by_skills_sums_to_occurrences() {
        let (engine, _) = engine_with(vec![
            record("Ada", &["python", "sql"], &[]),
            record("Bob", &["python"], &[]),
        ])
        .await;
        let counts = engine.count_by("skills").await.unwrap();
        assert_eq!(counts.get("python"), Some(&2));
        assert_eq!(counts.get("sql"), Some(&1));
        // Total equals the occurrence count across all records.
        assert_eq!(counts.values().sum::<i64>(), 3);
    }

    #[tokio::test]
    async fn test_count_by_unknown_field_fails() {
        let (engine, _) = engine_with(vec![]).await;
        let err = engine.count_by("shoe_size").await.unwrap_err();
        assert!(matches!(err, AppError::UnknownField(_)));
    }

    #[tokio::test]
    async fn test_count_by_scalar_field_skips_absent_values() {
        let (engine, _) = engine_with(vec![
            record("Ada", &[], &[]),
            NewResume {
                email: None,
                ..record("Bob", &[], &[])
            },
        ])
        .await;
        let counts = engine.count_by("email").await.unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("ada@example.com"), Some(&1));
    }

    #[tokio::test]
    async fn test_get_resume_absent_is_none() {
        let (engine, _) = engine_with(vec![]).await;
        assert!(engine.get_resume(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_by_name_exact_and_substring() {
        let (engine, _) = engine_with(vec![
            record("Jane Doe", &[], &[]),
            record("John Smith", &[], &[]),
        ])
        .await;

        let exact = engine.search_by_name("Jane Doe", true).await.unwrap();
        assert_eq!(exact.len(), 1);

        let partial = engine.search_by_name("jane", false).await.unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].name.as_deref(), Some("Jane Doe"));

        let none = engine.search_by_name("jane", true).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_find_similar_orders_by_overlap() {
        let (engine, rows) = engine_with(vec![
            record("Ref", &["python", "sql", "docker"], &[]),
            record("Close", &["python", "sql"], &[]),
            record("Far", &["python", "java", "react", "css"], &[]),
            record("Unrelated", &["excel"], &[]),
        ])
        .await;

        let similar = engine.find_similar(rows[0].id, 5).await.unwrap();
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].resume.name.as_deref(), Some("Close"));
        assert!(similar[0].score > similar[1].score);
        // The reference record never appears in its own results.
        assert!(similar.iter().all(|s| s.resume.id != rows[0].id));
    }

    #[tokio::test]
    async fn test_find_similar_unknown_reference_fails() {
        let (engine, _) = engine_with(vec![]).await;
        let err = engine.find_similar(Uuid::new_v4(), 3).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_experience_analysis_buckets() {
        let (engine, _) = engine_with(vec![
            record("Entry", &[], &["one"]),
            record("Mid", &[], &["a", "b", "c"]),
            record(
                "Senior",
                &[],
                &["a", "b", "c", "d", "e", "f"],
            ),
        ])
        .await;
        let analysis = engine.experience_analysis().await.unwrap();
        assert_eq!(analysis.total, 3);
        assert_eq!(analysis.entry, 1);
        assert_eq!(analysis.mid, 1);
        assert_eq!(analysis.senior, 1);
        assert_eq!(analysis.breakdown[0].name.as_deref(), Some("Senior"));
    }

    #[tokio::test]
    async fn test_database_stats_counts_and_averages() {
        let (engine, _) = engine_with(vec![
            record("Ada", &["python", "sql"], &["x"]),
            NewResume {
                email: None,
                skills: vec![],
                ..record("Bob", &[], &[])
            },
        ])
        .await;
        let stats = engine.database_stats().await.unwrap();
        assert_eq!(stats.total_resumes, 2);
        assert_eq!(stats.with_skills, 1);
        assert_eq!(stats.with_email, 1);
        assert!((stats.avg_skills - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_database_stats_empty_store() {
        let (engine, _) = engine_with(vec![]).await;
        let stats = engine.database_stats().await.unwrap();
        assert_eq!(stats.total_resumes, 0);
        assert_eq!(stats.avg_skills, 0.0);
    }

    #[test]
    fn test_experience_level_thresholds() {
        assert_eq!(experience_level(0), "entry");
        assert_eq!(experience_level(2), "entry");
        assert_eq!(experience_level(3), "mid");
        assert_eq!(experience_level(5), "mid");
        assert_eq!(experience_level(6), "senior");
    }
}
