//! Tabular snapshot export
//!
//! Three sheets: one row per bin x article join (bins with no articles
//! appear once with empty article fields), the single metrics row, and
//! the movement log verbatim. Bulk reads only; the ledger is never
//! touched.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{AppError, AppResult};
use crate::services::ledger::{Metrics, Movement};

/// Snapshot export service
#[derive(Clone)]
pub struct ExportService {
    db: SqlitePool,
}

/// One row of the bins x articles sheet
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryRow {
    pub bin_name: String,
    pub weight: f64,
    pub image_ref: Option<String>,
    pub article_id: Option<i64>,
    pub code: Option<String>,
    pub reference: Option<String>,
    pub operator: Option<String>,
    pub quantity: Option<i64>,
}

/// The full three-sheet snapshot
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub inventory: Vec<InventoryRow>,
    pub metrics: Metrics,
    pub movements: Vec<Movement>,
}

impl ExportService {
    /// Create a new ExportService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Sheet 1: bins left-joined with their articles, ordered by bin name
    pub async fn inventory_rows(&self) -> AppResult<Vec<InventoryRow>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT b.name AS bin_name, b.weight, b.image_ref,
                   a.id AS article_id, a.code, a.reference, a.operator, a.quantity
            FROM bins b
            LEFT JOIN articles a ON b.id = a.bin_id
            ORDER BY b.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Sheet 2: the metrics singleton
    pub async fn metrics(&self) -> AppResult<Metrics> {
        let metrics = sqlx::query_as::<_, Metrics>(
            "SELECT total_in, total_out FROM metrics WHERE id = 1",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(metrics)
    }

    /// Sheet 3: the movement log verbatim
    pub async fn movements(&self) -> AppResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(
            "SELECT id, article_id, bin_id, direction, magnitude, recorded_at
             FROM movements ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// All three sheets at once
    pub async fn snapshot(&self) -> AppResult<Snapshot> {
        Ok(Snapshot {
            inventory: self.inventory_rows().await?,
            metrics: self.metrics().await?,
            movements: self.movements().await?,
        })
    }
}

/// Render one sheet as CSV with a header row derived from the record
/// type.
pub fn to_csv<T: Serialize>(rows: &[T]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::Export(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
}
