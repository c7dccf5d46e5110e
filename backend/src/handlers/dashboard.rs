//! HTTP handlers for the dashboard and movement history

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::ledger::{LedgerService, Metrics, Movement};
use crate::services::reports::{
    ArticleActivity, CodeBins, DailyCount, ReportsService, TopArticle,
};
use crate::AppState;

/// Date-range query parameters. Both bounds default to today, matching
/// the dashboard's initial view.
#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRangeParams {
    fn resolve(&self) -> (NaiveDate, NaiveDate) {
        let today = Utc::now().date_naive();
        let start = self.start_date.unwrap_or(today);
        let end = self.end_date.unwrap_or(start);
        (start, end)
    }
}

/// Dashboard payload: running totals, top-5 rankings, date-range series,
/// and duplicate detection
#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub total_articles: i64,
    pub metrics: Metrics,
    pub top_in: Vec<TopArticle>,
    pub top_out: Vec<TopArticle>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_movements: Vec<DailyCount>,
    pub article_activity: Vec<ArticleActivity>,
    pub duplicates: Vec<CodeBins>,
}

/// Aggregated dashboard view
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<Dashboard>> {
    let ledger = LedgerService::new(state.db.clone());
    let reports = ReportsService::new(state.db);
    let (start, end) = params.resolve();

    Ok(Json(Dashboard {
        total_articles: ledger.total_articles().await?,
        metrics: ledger.metrics().await?,
        top_in: reports.top_in().await?,
        top_out: reports.top_out().await?,
        start_date: start,
        end_date: end,
        daily_movements: reports.daily_movement_counts(start, end).await?,
        article_activity: reports.movement_counts_between(start, end).await?,
        duplicates: reports.duplicates().await?,
    }))
}

/// Raw movements in a date range, oldest first
pub async fn list_movements(
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<Vec<Movement>>> {
    let reports = ReportsService::new(state.db);
    let (start, end) = params.resolve();
    let movements = reports.movements_between(start, end).await?;
    Ok(Json(movements))
}
