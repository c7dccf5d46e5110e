//! Read-only aggregation over the movement log and current stock
//!
//! Every query scans the full table; at a few thousand rows that is the
//! accepted design. None of these operations write.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::AppResult;
use crate::services::bins::Bin;
use crate::services::ledger::{Direction, Movement};

/// Aggregation service
#[derive(Clone)]
pub struct ReportsService {
    db: SqlitePool,
}

/// One entry of a top-5 ranking: article code and summed magnitude
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopArticle {
    pub code: String,
    pub total: i64,
}

/// Movement count (not magnitude) per article code in a date range
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ArticleActivity {
    pub code: String,
    pub moves: i64,
}

/// An article code together with the bins it currently sits in
#[derive(Debug, Clone, Serialize)]
pub struct CodeBins {
    pub code: String,
    pub bins: Vec<String>,
}

/// Movements folded per calendar day
#[derive(Debug, Clone, Serialize)]
pub struct DailyCount {
    pub day: String,
    pub moves: i64,
}

/// Free-text search result: an exact bin-name match short-circuits,
/// otherwise article codes are matched by substring and grouped by code.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchOutcome {
    Bin { bin: Bin },
    Articles { matches: Vec<CodeBins> },
}

impl ReportsService {
    /// Create a new ReportsService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Top 5 articles by cumulative IN magnitude
    pub async fn top_in(&self) -> AppResult<Vec<TopArticle>> {
        self.top_by_direction(Direction::In).await
    }

    /// Top 5 articles by cumulative OUT magnitude
    pub async fn top_out(&self) -> AppResult<Vec<TopArticle>> {
        self.top_by_direction(Direction::Out).await
    }

    // Grouped by article identity; the join drops movements whose
    // article has since been deleted.
    async fn top_by_direction(&self, direction: Direction) -> AppResult<Vec<TopArticle>> {
        let rows = sqlx::query_as::<_, TopArticle>(
            r#"
            SELECT a.code, SUM(m.magnitude) AS total
            FROM movements m
            JOIN articles a ON m.article_id = a.id
            WHERE m.direction = ?
            GROUP BY m.article_id
            ORDER BY total DESC
            LIMIT 5
            "#,
        )
        .bind(direction)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Movements within an inclusive calendar-day range, oldest first.
    /// The comparison is a string prefix match against the timestamp.
    pub async fn movements_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Movement>> {
        let rows = sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, article_id, bin_id, direction, magnitude, recorded_at
            FROM movements
            WHERE substr(recorded_at, 1, 10) >= ?
              AND substr(recorded_at, 1, 10) <= ?
            ORDER BY recorded_at ASC
            "#,
        )
        .bind(start.format("%Y-%m-%d").to_string())
        .bind(end.format("%Y-%m-%d").to_string())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Per-article movement count within a date range, busiest first
    pub async fn movement_counts_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<ArticleActivity>> {
        let rows = sqlx::query_as::<_, ArticleActivity>(
            r#"
            SELECT a.code, COUNT(m.id) AS moves
            FROM movements m
            JOIN articles a ON m.article_id = a.id
            WHERE substr(m.recorded_at, 1, 10) >= ?
              AND substr(m.recorded_at, 1, 10) <= ?
            GROUP BY a.code
            ORDER BY moves DESC
            "#,
        )
        .bind(start.format("%Y-%m-%d").to_string())
        .bind(end.format("%Y-%m-%d").to_string())
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Movements in a date range folded into one count per day,
    /// chronologically ascending (the dashboard chart series)
    pub async fn daily_movement_counts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyCount>> {
        let movements = self.movements_between(start, end).await?;

        let mut per_day: BTreeMap<String, i64> = BTreeMap::new();
        for movement in &movements {
            let day = movement
                .recorded_at
                .get(..10)
                .unwrap_or(&movement.recorded_at)
                .to_string();
            *per_day.entry(day).or_insert(0) += 1;
        }

        Ok(per_day
            .into_iter()
            .map(|(day, moves)| DailyCount { day, moves })
            .collect())
    }

    /// Article codes currently present in more than one bin, each with
    /// its sorted set of bin names
    pub async fn duplicates(&self) -> AppResult<Vec<CodeBins>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT a.code, b.name FROM articles a JOIN bins b ON a.bin_id = b.id",
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_code: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (code, bin_name) in rows {
            by_code.entry(code).or_default().insert(bin_name);
        }

        Ok(by_code
            .into_iter()
            .filter(|(_, bins)| bins.len() > 1)
            .map(|(code, bins)| CodeBins {
                code,
                bins: bins.into_iter().collect(),
            })
            .collect())
    }

    /// Free-text search. An exact case-insensitive bin-name match always
    /// short-circuits, even if the same string would match article
    /// codes. Otherwise article codes are matched case-insensitively by
    /// substring and grouped code -> sorted bin names; the caller
    /// resolves zero, one, or many.
    pub async fn search(&self, query: &str) -> AppResult<SearchOutcome> {
        let bin = sqlx::query_as::<_, Bin>(
            "SELECT id, name, weight, image_ref FROM bins WHERE LOWER(name) = LOWER(?)",
        )
        .bind(query)
        .fetch_optional(&self.db)
        .await?;

        if let Some(bin) = bin {
            return Ok(SearchOutcome::Bin { bin });
        }

        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT a.code, b.name
            FROM articles a
            JOIN bins b ON a.bin_id = b.id
            WHERE LOWER(a.code) LIKE '%' || LOWER(?) || '%'
            "#,
        )
        .bind(query)
        .fetch_all(&self.db)
        .await?;

        let mut by_code: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (code, bin_name) in rows {
            by_code.entry(code).or_default().insert(bin_name);
        }

        Ok(SearchOutcome::Articles {
            matches: by_code
                .into_iter()
                .map(|(code, bins)| CodeBins {
                    code,
                    bins: bins.into_iter().collect(),
                })
                .collect(),
        })
    }
}
