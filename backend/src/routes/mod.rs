//! Route definitions for the Palletrack API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Floor overview
        .route("/board", get(handlers::get_board))
        // Free-text search
        .route("/search", get(handlers::search))
        // Dashboard and movement history
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/movements", get(handlers::list_movements))
        // Bin registry
        .nest("/bins", bin_routes())
        // Ledger
        .nest("/articles", article_routes())
        // Snapshot export
        .nest("/export", export_routes())
}

/// Bin registry routes
fn bin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_bins).post(handlers::upsert_bin))
        .route("/:bin_name", get(handlers::get_bin))
        .route("/:bin_name/weight", put(handlers::update_weight))
        .route(
            "/:bin_name/image",
            put(handlers::set_image).delete(handlers::clear_image),
        )
        .route("/:bin_name/articles", post(handlers::add_article))
}

/// Article routes
fn article_routes() -> Router<AppState> {
    Router::new().route(
        "/:article_id",
        get(handlers::get_article)
            .put(handlers::edit_article)
            .delete(handlers::remove_article),
    )
}

/// Export routes
fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::export_snapshot))
        .route("/inventory.csv", get(handlers::export_inventory_csv))
        .route("/metrics.csv", get(handlers::export_metrics_csv))
        .route("/movements.csv", get(handlers::export_movements_csv))
}
