//! HTTP handler for free-text search

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::reports::{ReportsService, SearchOutcome};
use crate::AppState;

/// Search query parameters
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

/// Free-text search: exact bin-name match wins, otherwise article codes
/// are matched by substring. The caller resolves zero, one, or many.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchOutcome>> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(AppError::Validation {
            field: "q".to_string(),
            message: "Enter a search term".to_string(),
        });
    }

    let service = ReportsService::new(state.db);
    let outcome = service.search(&query).await?;
    Ok(Json(outcome))
}
