//! Health handler: connectivity plus ledger readiness
//!
//! The schema bootstrap seeds the metrics singleton, so its presence is
//! the readiness signal that the store can take movements.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

/// Health report for the store behind the ledger
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub ledger: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let ledger = match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM metrics WHERE id = 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(1) => "ready",
        _ => "unseeded",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        ledger: ledger.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DatabaseConfig, ServerConfig};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn test_state(seed_schema: bool) -> AppState {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        if seed_schema {
            crate::db::init_schema(&pool).await.unwrap();
        }
        AppState {
            db: pool,
            config: Arc::new(Config {
                environment: "test".to_string(),
                server: ServerConfig {
                    port: 0,
                    host: "127.0.0.1".to_string(),
                },
                database: DatabaseConfig {
                    url: "sqlite::memory:".to_string(),
                    max_connections: 1,
                },
            }),
        }
    }

    #[tokio::test]
    async fn reports_ready_once_the_schema_is_seeded() {
        let state = test_state(true).await;
        let Json(report) = health_check(State(state)).await;
        assert_eq!(report.database, "connected");
        assert_eq!(report.ledger, "ready");
    }

    #[tokio::test]
    async fn reports_unseeded_before_the_schema_bootstrap() {
        let state = test_state(false).await;
        let Json(report) = health_check(State(state)).await;
        assert_eq!(report.database, "connected");
        assert_eq!(report.ledger, "unseeded");
    }
}
