use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::query::engine::{DatabaseStats, ExperienceAnalysis, SimilarResume};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub skill: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub exact: bool,
}

#[derive(Deserialize)]
pub struct DistributionQuery {
    pub field: String,
}

#[derive(Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<usize>,
}

const DEFAULT_SIMILAR_LIMIT: usize = 3;

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    let page = state.engine.list_resumes(params.limit, params.offset).await?;
    Ok(Json(page))
}

/// GET /api/v1/resumes/search?skill=… | ?name=…&exact=…
pub async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    let rows = match (&params.skill, &params.name) {
        (Some(skill), _) => state.engine.find_by_skill(skill).await?,
        (None, Some(name)) => state.engine.search_by_name(name, params.exact).await?,
        (None, None) => {
            return Err(AppError::InvalidFilter(
                "provide a 'skill' or 'name' parameter".to_string(),
            ))
        }
    };
    Ok(Json(rows))
}

/// GET /api/v1/resumes/distribution?field=skills
pub async fn handle_distribution(
    State(state): State<AppState>,
    Query(params): Query<DistributionQuery>,
) -> Result<Json<BTreeMap<String, i64>>, AppError> {
    let counts = state.engine.count_by(&params.field).await?;
    Ok(Json(counts))
}

/// GET /api/v1/resumes/stats
pub async fn handle_stats(
    State(state): State<AppState>,
) -> Result<Json<DatabaseStats>, AppError> {
    Ok(Json(state.engine.database_stats().await?))
}

/// GET /api/v1/resumes/experience
pub async fn handle_experience_analysis(
    State(state): State<AppState>,
) -> Result<Json<ExperienceAnalysis>, AppError> {
    Ok(Json(state.engine.experience_analysis().await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRow>, AppError> {
    let resume = state
        .engine
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(resume))
}

/// GET /api/v1/resumes/:id/similar
pub async fn handle_find_similar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SimilarQuery>,
) -> Result<Json<Vec<SimilarResume>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
    Ok(Json(state.engine.find_similar(id, limit).await?))
}
