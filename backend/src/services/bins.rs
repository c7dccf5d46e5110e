//! Bin registry service: named storage slots, their weights, and images
//!
//! Bins are created lazily on first reference and never deleted. The
//! registry owns the weight constraints: the per-bin cap rejects before
//! persisting, while the 4-bin group cap is checked after the update and
//! corrected by forcing the offending bin back to zero.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use shared::{
    group_label, group_members, sanitize_weight, BinLocation, BIN_WEIGHT_CAP, GROUP_WEIGHT_CAP,
    SLOTS_PER_ZONE, ZONES,
};

use crate::error::{AppError, AppResult};

/// Bin registry service
#[derive(Clone)]
pub struct BinService {
    db: SqlitePool,
}

/// A named storage slot
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Bin {
    pub id: i64,
    pub name: String,
    pub weight: f64,
    pub image_ref: Option<String>,
}

/// Result of the lookup-or-create upsert
#[derive(Debug, Clone, Serialize)]
pub struct BinUpsert {
    pub bin: Bin,
    pub created: bool,
}

/// Result of a weight update
///
/// `group_total` is the group sum right after the update was applied;
/// when it breaches the group cap, `forced_reset` reports that this
/// bin's weight was put back to zero.
#[derive(Debug, Clone, Serialize)]
pub struct WeightOutcome {
    pub bin: Bin,
    pub group: Option<String>,
    pub group_total: f64,
    pub forced_reset: bool,
}

/// Input for the upsert endpoint
#[derive(Debug, Deserialize)]
pub struct UpsertBinInput {
    pub name: String,
}

/// Input for weight updates
#[derive(Debug, Deserialize)]
pub struct UpdateWeightInput {
    pub weight: f64,
}

/// Input for image updates
#[derive(Debug, Deserialize)]
pub struct SetImageInput {
    pub image_ref: String,
}

/// One bin cell of the board overview
#[derive(Debug, Clone, Serialize)]
pub struct BoardBin {
    pub name: String,
    pub weight: f64,
    pub fill_percent: f64,
}

/// One 4-bin group of the board overview
#[derive(Debug, Clone, Serialize)]
pub struct BoardGroup {
    pub label: String,
    pub weight: f64,
    pub fill_percent: f64,
}

/// One zone row of the board overview
#[derive(Debug, Clone, Serialize)]
pub struct BoardZone {
    pub zone: char,
    pub bins: Vec<BoardBin>,
    pub group1: BoardGroup,
    pub group2: BoardGroup,
}

fn fill_percent(weight: f64, cap: f64) -> f64 {
    ((weight / cap) * 100.0).min(100.0)
}

impl BinService {
    /// Create a new BinService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Look up a bin by name, creating it with weight 0 and no image if
    /// it does not exist yet. Idempotent.
    pub async fn get_or_create(&self, name: &str) -> AppResult<BinUpsert> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Bin name is required".to_string(),
            });
        }

        if let Some(bin) = self.get_by_name(name).await? {
            return Ok(BinUpsert {
                bin,
                created: false,
            });
        }

        let bin = sqlx::query_as::<_, Bin>(
            "INSERT INTO bins (name) VALUES (?) RETURNING id, name, weight, image_ref",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(bin = %bin.name, id = bin.id, "created bin on first reference");
        Ok(BinUpsert { bin, created: true })
    }

    /// Point lookup by id
    pub async fn get(&self, bin_id: i64) -> AppResult<Option<Bin>> {
        let bin = sqlx::query_as::<_, Bin>(
            "SELECT id, name, weight, image_ref FROM bins WHERE id = ?",
        )
        .bind(bin_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(bin)
    }

    /// Point lookup by exact name
    pub async fn get_by_name(&self, name: &str) -> AppResult<Option<Bin>> {
        let bin = sqlx::query_as::<_, Bin>(
            "SELECT id, name, weight, image_ref FROM bins WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(bin)
    }

    /// All bins, ordered by name
    pub async fn list(&self) -> AppResult<Vec<Bin>> {
        let bins = sqlx::query_as::<_, Bin>(
            "SELECT id, name, weight, image_ref FROM bins ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(bins)
    }

    /// Combined weight of the four bins in `group` (1 or 2) of `zone`
    pub async fn group_weight(&self, zone: char, group: u8) -> AppResult<f64> {
        let members = group_members(zone, group);
        let total = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT SUM(weight) FROM bins WHERE name IN (?, ?, ?, ?)",
        )
        .bind(&members[0])
        .bind(&members[1])
        .bind(&members[2])
        .bind(&members[3])
        .fetch_one(&self.db)
        .await?;

        Ok(total.unwrap_or(0.0))
    }

    /// Overwrite a bin's weight, enforcing both weight constraints.
    ///
    /// The raw value is sanitized first (invalid input becomes 0). A
    /// value above the per-bin cap is rejected without persisting. After
    /// a successful update the bin's 4-bin group is summed; a total
    /// above the group cap forces this bin's weight back to zero.
    pub async fn set_weight(&self, bin_id: i64, raw_weight: f64) -> AppResult<WeightOutcome> {
        let weight = sanitize_weight(raw_weight);
        let bin = self
            .get(bin_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bin".to_string()))?;

        if weight > BIN_WEIGHT_CAP {
            return Err(AppError::BinWeightCapExceeded {
                bin: bin.name,
                weight,
            });
        }

        sqlx::query("UPDATE bins SET weight = ? WHERE id = ?")
            .bind(weight)
            .bind(bin_id)
            .execute(&self.db)
            .await?;

        let location = BinLocation::parse(&bin.name);
        let (group, group_total) = match location {
            Some(loc) => (
                Some(group_label(loc.zone, loc.group())),
                self.group_weight(loc.zone, loc.group()).await?,
            ),
            // Names without a zone letter belong to no group
            None => (None, weight),
        };

        let mut forced_reset = false;
        if location.is_some() && group_total > GROUP_WEIGHT_CAP {
            sqlx::query("UPDATE bins SET weight = 0 WHERE id = ?")
                .bind(bin_id)
                .execute(&self.db)
                .await?;
            forced_reset = true;
            tracing::warn!(
                bin = %bin.name,
                group_total,
                "group weight cap exceeded, bin weight forced back to zero"
            );
        }

        let bin = self
            .get(bin_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Bin".to_string()))?;

        Ok(WeightOutcome {
            bin,
            group,
            group_total,
            forced_reset,
        })
    }

    /// Attach an image reference to a bin
    pub async fn set_image(&self, bin_id: i64, image_ref: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE bins SET image_ref = ? WHERE id = ?")
            .bind(image_ref)
            .bind(bin_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Bin".to_string()));
        }

        Ok(())
    }

    /// Remove a bin's image reference
    pub async fn clear_image(&self, bin_id: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE bins SET image_ref = NULL WHERE id = ?")
            .bind(bin_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Bin".to_string()));
        }

        Ok(())
    }

    /// Full floor overview: every zone with its eight slots and the two
    /// group totals. Slots without a bin row yet show weight 0.
    pub async fn board(&self) -> AppResult<Vec<BoardZone>> {
        let weights: HashMap<String, f64> = self
            .list()
            .await?
            .into_iter()
            .map(|b| (b.name, b.weight))
            .collect();

        let mut zones = Vec::with_capacity(ZONES.len());
        for zone in ZONES {
            let mut bins = Vec::with_capacity(SLOTS_PER_ZONE as usize);
            for slot in 1..=SLOTS_PER_ZONE {
                let name = BinLocation::new(zone, slot).name();
                let weight = weights.get(&name).copied().unwrap_or(0.0);
                bins.push(BoardBin {
                    name,
                    weight,
                    fill_percent: fill_percent(weight, BIN_WEIGHT_CAP),
                });
            }

            let group_sum = |group: u8| -> f64 {
                group_members(zone, group)
                    .iter()
                    .filter_map(|n| weights.get(n))
                    .sum()
            };
            let g1 = group_sum(1);
            let g2 = group_sum(2);

            zones.push(BoardZone {
                zone,
                bins,
                group1: BoardGroup {
                    label: group_label(zone, 1),
                    weight: g1,
                    fill_percent: fill_percent(g1, GROUP_WEIGHT_CAP),
                },
                group2: BoardGroup {
                    label: group_label(zone, 2),
                    weight: g2,
                    fill_percent: fill_percent(g2, GROUP_WEIGHT_CAP),
                },
            });
        }

        Ok(zones)
    }
}
