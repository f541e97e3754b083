//! Tool catalogue for the stdio boundary, dispatching onto the query
//! engine. All tools are read-only.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::mcp::protocol::ToolDescriptor;
use crate::query::engine::QueryEngine;

const DEFAULT_TOP_SKILLS: usize = 10;
const DEFAULT_SIMILAR_LIMIT: usize = 3;

pub fn tool_descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "list_resumes".to_string(),
            description: "List stored resumes, newest first".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "description": "Page size (default 20)"},
                    "offset": {"type": "integer", "description": "Rows to skip (default 0)"}
                }
            }),
        },
        ToolDescriptor {
            name: "get_resume_by_id".to_string(),
            description: "Fetch a single resume by its id".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "resume_id": {"type": "string", "description": "Resume UUID"}
                },
                "required": ["resume_id"]
            }),
        },
        ToolDescriptor {
            name: "search_by_skill".to_string(),
            description: "Resumes whose skill set contains the given token (case-insensitive)"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "skill": {"type": "string", "description": "Skill token to match"},
                    "limit": {"type": "integer", "description": "Truncate results"}
                },
                "required": ["skill"]
            }),
        },
        ToolDescriptor {
            name: "search_by_name".to_string(),
            description: "Search resumes by candidate name".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Name to search for"},
                    "exact": {"type": "boolean", "description": "Exact match (default: substring)"}
                },
                "required": ["name"]
            }),
        },
        ToolDescriptor {
            name: "count_by_field".to_string(),
            description: "Histogram of distinct values for a categorical field".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "field": {
                        "type": "string",
                        "description": "One of: skills, education, name, email, phone"
                    }
                },
                "required": ["field"]
            }),
        },
        ToolDescriptor {
            name: "analyze_skills_distribution".to_string(),
            description: "Most frequent skills across all resumes".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "top_n": {"type": "integer", "description": "Number of top skills (default 10)"}
                }
            }),
        },
        ToolDescriptor {
            name: "get_experience_analysis".to_string(),
            description: "Entry/mid/senior distribution by experience entries".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDescriptor {
            name: "find_similar_resumes".to_string(),
            description: "Resumes with overlapping skill sets, by similarity".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "resume_id": {"type": "string", "description": "Reference resume UUID"},
                    "limit": {"type": "integer", "description": "Number of results (default 3)"}
                },
                "required": ["resume_id"]
            }),
        },
        ToolDescriptor {
            name: "get_database_stats".to_string(),
            description: "Record counts, completeness, and per-resume averages".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
    ]
}

/// Executes one tool call. Domain errors bubble up as `AppError` and are
/// rendered as `isError` tool results by the server loop.
pub async fn dispatch(
    engine: &QueryEngine,
    name: &str,
    arguments: &Value,
) -> Result<Value, AppError> {
    match name {
        "list_resumes" => {
            let limit = arguments.get("limit").and_then(Value::as_i64);
            let offset = arguments.get("offset").and_then(Value::as_i64);
            let page = engine.list_resumes(limit, offset).await?;
            Ok(json!({ "count": page.len(), "resumes": page }))
        }
        "get_resume_by_id" => {
            let id = required_id(arguments, "resume_id")?;
            match engine.get_resume(id).await? {
                Some(resume) => Ok(serde_json::to_value(resume).unwrap_or_default()),
                None => Err(AppError::NotFound(format!("resume {id} not found"))),
            }
        }
        "search_by_skill" => {
            let skill = required_str(arguments, "skill")?;
            let mut rows = engine.find_by_skill(skill).await?;
            if let Some(limit) = arguments.get("limit").and_then(Value::as_u64) {
                rows.truncate(limit as usize);
            }
            Ok(json!({ "skill": skill, "count": rows.len(), "resumes": rows }))
        }
        "search_by_name" => {
            let name = required_str(arguments, "name")?;
            let exact = arguments
                .get("exact")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let rows = engine.search_by_name(name, exact).await?;
            Ok(json!({ "name": name, "count": rows.len(), "resumes": rows }))
        }
        "count_by_field" => {
            let field = required_str(arguments, "field")?;
            let counts = engine.count_by(field).await?;
            Ok(json!({ "field": field, "counts": counts }))
        }
        "analyze_skills_distribution" => {
            let top_n = arguments
                .get("top_n")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_TOP_SKILLS);
            let counts = engine.count_by("skills").await?;
            let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
            // Descending by count, alphabetical within ties.
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(top_n);
            let top: Vec<Value> = ranked
                .into_iter()
                .map(|(skill, count)| json!({ "skill": skill, "count": count }))
                .collect();
            Ok(json!({ "top_skills": top }))
        }
        "get_experience_analysis" => {
            let analysis = engine.experience_analysis().await?;
            Ok(serde_json::to_value(analysis).unwrap_or_default())
        }
        "find_similar_resumes" => {
            let id = required_id(arguments, "resume_id")?;
            let limit = arguments
                .get("limit")
                .and_then(Value::as_u64)
                .map(|n| n as usize)
                .unwrap_or(DEFAULT_SIMILAR_LIMIT);
            let similar = engine.find_similar(id, limit).await?;
            Ok(json!({ "count": similar.len(), "similar": similar }))
        }
        "get_database_stats" => {
            let stats = engine.database_stats().await?;
            Ok(serde_json::to_value(stats).unwrap_or_default())
        }
        other => Err(AppError::Validation(format!("unknown tool: {other}"))),
    }
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, AppError> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidFilter(format!("'{key}' is required")))
}

fn required_id(arguments: &Value, key: &str) -> Result<Uuid, AppError> {
    let raw = required_str(arguments, key)?;
    Uuid::parse_str(raw)
        .map_err(|_| AppError::InvalidFilter(format!("'{key}' is not a valid UUID: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::NewResume;
    use crate::storage::memory::MemResumeStore;
    use crate::storage::ResumeStore;
    use std::sync::Arc;

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

    async fn engine_with(records: Vec<NewResume>) -> QueryEngine {
        let store = Arc::new(MemResumeStore::new());
        for r in records {
            store.insert(r).await.unwrap();
        }
        QueryEngine::new(store)
    }

    #[test]
    fn test_descriptor_names_are_unique() {
        let tools = tool_descriptors();
        let mut names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), tools.len());
        assert!(names.contains(&"list_resumes"));
        assert!(names.contains(&"search_by_skill"));
        assert!(names.contains(&"count_by_field"));
    }

    #[tokio::test]
    async fn test_dispatch_list_resumes() {
        let engine = engine_with(vec![record("Ada", &["python"])]).await;
        let result = dispatch(&engine, "list_resumes", &json!({})).await.unwrap();
        assert_eq!(result["count"], 1);
        assert_eq!(result["resumes"][0]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_dispatch_search_by_skill_requires_argument() {
        let engine = engine_with(vec![]).await;
        let err = dispatch(&engine, "search_by_skill", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn test_dispatch_count_by_unknown_field_surfaces_error() {
        let engine = engine_with(vec![]).await;
        let err = dispatch(&engine, "count_by_field", &json!({"field": "shoe_size"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownField(_)));
    }

    #[tokio::test]
    async fn test_dispatch_skills_distribution_ranks_descending() {
        let engine = engine_with(vec![
            record("Ada", &["python", "sql"]),
            record("Bob", &["python"]),
        ])
        .await;
        let result = dispatch(&engine, "analyze_skills_distribution", &json!({"top_n": 1}))
            .await
            .unwrap();
        let top = result["top_skills"].as_array().unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0]["skill"], "python");
        assert_eq!(top[0]["count"], 2);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_malformed_uuid() {
        let engine = engine_with(vec![]).await;
        let err = dispatch(
            &engine,
            "get_resume_by_id",
            &json!({"resume_id": "not-a-uuid"}),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let engine = engine_with(vec![]).await;
        let err = dispatch(&engine, "drop_all_tables", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
