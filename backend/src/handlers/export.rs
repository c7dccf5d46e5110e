//! HTTP handlers for the snapshot export

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::AppResult;
use crate::services::export::{self, ExportService, Snapshot};
use crate::AppState;

/// All three sheets as one JSON document
pub async fn export_snapshot(State(state): State<AppState>) -> AppResult<Json<Snapshot>> {
    let service = ExportService::new(state.db);
    let snapshot = service.snapshot().await?;
    Ok(Json(snapshot))
}

/// Sheet 1 as CSV: bins joined with their articles
pub async fn export_inventory_csv(State(state): State<AppState>) -> AppResult<Response> {
    let service = ExportService::new(state.db);
    let body = export::to_csv(&service.inventory_rows().await?)?;
    Ok(csv_response("inventory.csv", body))
}

/// Sheet 2 as CSV: the metrics row
pub async fn export_metrics_csv(State(state): State<AppState>) -> AppResult<Response> {
    let service = ExportService::new(state.db);
    let metrics = service.metrics().await?;
    let body = export::to_csv(&[metrics])?;
    Ok(csv_response("metrics.csv", body))
}

/// Sheet 3 as CSV: the movement log
pub async fn export_movements_csv(State(state): State<AppState>) -> AppResult<Response> {
    let service = ExportService::new(state.db);
    let body = export::to_csv(&service.movements().await?)?;
    Ok(csv_response("movements.csv", body))
}

fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}
