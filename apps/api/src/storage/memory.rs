use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow};
use crate::storage::{ResumeFilter, ResumeStore};

/// In-memory store with the same observable semantics as the Postgres
/// store. Backs the unit tests; insertion order stands in for the
/// timestamp ordering (newest first).
#[derive(Default)]
pub struct MemResumeStore {
    rows: RwLock<Vec<ResumeRow>>,
}

impl MemResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(row: &ResumeRow, filter: &ResumeFilter) -> bool {
    if let Some(name) = &filter.name {
        if row.name.as_deref() != Some(name.as_str()) {
            return false;
        }
    }
    if let Some(fragment) = &filter.name_contains {
        let fragment = fragment.to_lowercase();
        let hit = row
            .name
            .as_deref()
            .map(|n| n.to_lowercase().contains(&fragment))
            .unwrap_or(false);
        if !hit {
            return false;
        }
    }
    if let Some(email) = &filter.email {
        if row.email.as_deref() != Some(email.as_str()) {
            return false;
        }
    }
    if let Some(phone) = &filter.phone {
        if row.phone.as_deref() != Some(phone.as_str()) {
            return false;
        }
    }
    if let Some(skill) = &filter.skill {
        let probe = skill.to_lowercase();
        if !row.skills.iter().any(|s| s == &probe) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ResumeStore for MemResumeStore {
    async fn insert(&self, resume: NewResume) -> Result<ResumeRow, AppError> {
        let row = ResumeRow {
            id: Uuid::new_v4(),
            name: resume.name,
            email: resume.email,
            phone: resume.phone,
            skills: resume.skills,
            education: resume.education,
            experience: resume.experience,
            summary: resume.summary,
            raw_text: resume.raw_text,
            source_file: resume.source_file,
            extraction_notes: resume.extraction_notes,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn find(&self, filter: &ResumeFilter) -> Result<Vec<ResumeRow>, AppError> {
        let rows = self.rows.read().await;
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        Ok(rows
            .iter()
            .rev() // newest first
            .filter(|row| matches(row, filter))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeRow>, AppError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|row| row.id == id)
            .cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.rows.read().await.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, skills: &[&str]) -> NewResume {
        NewResume {
            name: Some(name.to_string()),
            email: None,
            phone: None,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            education: vec![],
            experience: vec![],
            summary: String::new(),
            raw_text: name.to_string(),
            source_file: "cv.pdf".to_string(),
            extraction_notes: vec![],
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemResumeStore::new();
        let a = store.insert(record("A", &[])).await.unwrap();
        let b = store.insert(record("B", &[])).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_find_returns_newest_first() {
        let store = MemResumeStore::new();
        store.insert(record("First", &[])).await.unwrap();
        store.insert(record("Second", &[])).await.unwrap();
        let rows = store.find(&ResumeFilter::default()).await.unwrap();
        assert_eq!(rows[0].name.as_deref(), Some("Second"));
        assert_eq!(rows[1].name.as_deref(), Some("First"));
    }

    #[tokio::test]
    async fn test_skill_filter_is_case_insensitive() {
        let store = MemResumeStore::new();
        store.insert(record("Ada", &["python", "sql"])).await.unwrap();
        store.insert(record("Bob", &["java"])).await.unwrap();

        let rows = store
            .find(&ResumeFilter {
                skill: Some("Python".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_name_contains_filter() {
        let store = MemResumeStore::new();
        store.insert(record("Jane Doe", &[])).await.unwrap();
        store.insert(record("John Smith", &[])).await.unwrap();

        let rows = store
            .find(&ResumeFilter {
                name_contains: Some("doe".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("Jane Doe"));
    }

    #[tokio::test]
    async fn test_limit_and_offset_page_through() {
        let store = MemResumeStore::new();
        for name in ["A", "B", "C"] {
            store.insert(record(name, &[])).await.unwrap();
        }
        let page = store
            .find(&ResumeFilter {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name.as_deref(), Some("B"));
    }
}
