//! HTTP handlers for bin registry endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use shared::{StatusMessage, BIN_WEIGHT_CAP, GROUP_WEIGHT_CAP};

use crate::error::AppResult;
use crate::services::bins::{
    Bin, BinService, BinUpsert, BoardZone, SetImageInput, UpdateWeightInput, UpsertBinInput,
    WeightOutcome,
};
use crate::services::ledger::{Article, LedgerService};
use crate::AppState;

/// Floor overview: every zone with its slots and group totals
pub async fn get_board(State(state): State<AppState>) -> AppResult<Json<Vec<BoardZone>>> {
    let service = BinService::new(state.db);
    let zones = service.board().await?;
    Ok(Json(zones))
}

/// List all bins
pub async fn list_bins(State(state): State<AppState>) -> AppResult<Json<Vec<Bin>>> {
    let service = BinService::new(state.db);
    let bins = service.list().await?;
    Ok(Json(bins))
}

/// Explicit lookup-or-create upsert
pub async fn upsert_bin(
    State(state): State<AppState>,
    Json(input): Json<UpsertBinInput>,
) -> AppResult<Json<BinUpsertResponse>> {
    let service = BinService::new(state.db);
    let upsert = service.get_or_create(&input.name).await?;
    let status = if upsert.created {
        StatusMessage::success(format!("Bin {} created.", upsert.bin.name))
    } else {
        StatusMessage::info(format!("Bin {} already exists.", upsert.bin.name))
    };
    Ok(Json(BinUpsertResponse { upsert, status }))
}

/// Bin detail with its articles. Bins are created lazily on first
/// reference, so fetching an unknown name creates it with weight 0.
pub async fn get_bin(
    State(state): State<AppState>,
    Path(bin_name): Path<String>,
) -> AppResult<Json<BinDetail>> {
    let bins = BinService::new(state.db.clone());
    let ledger = LedgerService::new(state.db);

    let BinUpsert { bin, created } = bins.get_or_create(&bin_name).await?;
    let articles = ledger.list_in_bin(bin.id).await?;
    let fill_percent = ((bin.weight / BIN_WEIGHT_CAP) * 100.0).min(100.0);

    Ok(Json(BinDetail {
        bin,
        created,
        fill_percent,
        articles,
    }))
}

/// Overwrite a bin's weight
pub async fn update_weight(
    State(state): State<AppState>,
    Path(bin_name): Path<String>,
    Json(input): Json<UpdateWeightInput>,
) -> AppResult<Json<WeightResponse>> {
    let service = BinService::new(state.db);
    let BinUpsert { bin, .. } = service.get_or_create(&bin_name).await?;
    let outcome = service.set_weight(bin.id, input.weight).await?;

    let status = if outcome.forced_reset {
        let group = outcome.group.clone().unwrap_or_default();
        StatusMessage::warning(format!(
            "ALERT: group {} exceeds {} kg! Weight reset to 0.",
            group, GROUP_WEIGHT_CAP
        ))
    } else {
        StatusMessage::success("Weight updated.")
    };

    Ok(Json(WeightResponse { outcome, status }))
}

/// Attach an image reference to a bin
pub async fn set_image(
    State(state): State<AppState>,
    Path(bin_name): Path<String>,
    Json(input): Json<SetImageInput>,
) -> AppResult<Json<StatusResponse>> {
    let service = BinService::new(state.db);
    let BinUpsert { bin, .. } = service.get_or_create(&bin_name).await?;
    service.set_image(bin.id, &input.image_ref).await?;
    Ok(Json(StatusResponse {
        status: StatusMessage::success("Image updated."),
    }))
}

/// Remove a bin's image reference
pub async fn clear_image(
    State(state): State<AppState>,
    Path(bin_name): Path<String>,
) -> AppResult<Json<StatusResponse>> {
    let service = BinService::new(state.db);
    let BinUpsert { bin, .. } = service.get_or_create(&bin_name).await?;
    service.clear_image(bin.id).await?;
    Ok(Json(StatusResponse {
        status: StatusMessage::info("Image removed."),
    }))
}

/// Upsert result with its status message
#[derive(Debug, Serialize)]
pub struct BinUpsertResponse {
    #[serde(flatten)]
    pub upsert: BinUpsert,
    pub status: StatusMessage,
}

/// Bin detail response
#[derive(Debug, Serialize)]
pub struct BinDetail {
    pub bin: Bin,
    pub created: bool,
    pub fill_percent: f64,
    pub articles: Vec<Article>,
}

/// Weight update result with its status message
#[derive(Debug, Serialize)]
pub struct WeightResponse {
    #[serde(flatten)]
    pub outcome: WeightOutcome,
    pub status: StatusMessage,
}

/// Bare status-message response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: StatusMessage,
}
