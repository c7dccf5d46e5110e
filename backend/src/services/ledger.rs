//! Ledger and metrics engine
//!
//! Owns articles, the append-only movement log, and the running in/out
//! totals. Every quantity change appends exactly one movement and bumps
//! the matching counter inside the same transaction, so the totals
//! always equal the per-direction sums over the log.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Sqlite, SqlitePool, Transaction};

use shared::sanitize_quantity;

use crate::error::{AppError, AppResult};

/// Ledger and metrics service
#[derive(Clone)]
pub struct LedgerService {
    db: SqlitePool,
}

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

/// A stock-keeping entry inside exactly one bin
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub bin_id: i64,
    pub code: String,
    pub reference: Option<String>,
    pub operator: Option<String>,
    pub quantity: i64,
}

/// An immutable audit record of one quantity change
///
/// `article_id` is kept by value so history survives article deletion.
/// `recorded_at` is an RFC 3339 string; its first ten characters are the
/// calendar day the range queries compare against.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Movement {
    pub id: i64,
    pub article_id: Option<i64>,
    pub bin_id: i64,
    pub direction: Direction,
    pub magnitude: i64,
    pub recorded_at: String,
}

/// The running in/out totals (singleton row)
#[derive(Debug, Clone, Copy, Serialize, FromRow)]
pub struct Metrics {
    pub total_in: i64,
    pub total_out: i64,
}

/// Input for adding an article to a bin
#[derive(Debug, Deserialize)]
pub struct AddArticleInput {
    pub code: String,
    pub reference: Option<String>,
    pub operator: Option<String>,
    pub quantity: Option<i64>,
}

/// Input for editing an article
#[derive(Debug, Deserialize)]
pub struct EditArticleInput {
    pub reference: Option<String>,
    pub operator: Option<String>,
    pub quantity: i64,
}

/// Result of an add: the article plus the previously-empty-bin flag
/// (callers prompt for a weight when it is raised; nothing is enforced)
#[derive(Debug, Clone, Serialize)]
pub struct ArticleAdded {
    pub article: Article,
    pub first_in_bin: bool,
    pub bin_weight: f64,
}

/// Result of a removal
#[derive(Debug, Clone, Serialize)]
pub struct ArticleRemoved {
    pub article_id: i64,
    pub bin_id: i64,
    pub quantity: i64,
    pub bin_weight_reset: bool,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Add an article to a bin.
    ///
    /// The quantity is clamped to at least 1, the whole of it is logged
    /// as one `IN` movement, and `total_in` grows by the same amount.
    pub async fn add_article(&self, bin_id: i64, input: AddArticleInput) -> AppResult<ArticleAdded> {
        let code = input.code.trim();
        if code.is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Article code is required".to_string(),
            });
        }
        let quantity = sanitize_quantity(input.quantity.unwrap_or(1));

        let bin_weight = sqlx::query_scalar::<_, f64>("SELECT weight FROM bins WHERE id = ?")
            .bind(bin_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Bin".to_string()))?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE bin_id = ?")
                .bind(bin_id)
                .fetch_one(&self.db)
                .await?;

        let mut tx = self.db.begin().await?;

        let article = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (bin_id, code, reference, operator, quantity)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, bin_id, code, reference, operator, quantity
            "#,
        )
        .bind(bin_id)
        .bind(code)
        .bind(&input.reference)
        .bind(&input.operator)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        record_movement(&mut tx, Some(article.id), bin_id, Direction::In, quantity).await?;

        tx.commit().await?;

        tracing::debug!(article = article.id, bin = bin_id, quantity, "article added");
        Ok(ArticleAdded {
            article,
            first_in_bin: existing == 0,
            bin_weight,
        })
    }

    /// Edit an article's reference, operator, and quantity.
    ///
    /// The quantity delta decides the movement: an increase is always an
    /// `IN` of the difference, a decrease always an `OUT` of its
    /// magnitude, regardless of history. An unchanged quantity touches
    /// neither the log nor the totals.
    pub async fn edit_article(
        &self,
        article_id: i64,
        input: EditArticleInput,
    ) -> AppResult<Article> {
        let old = self
            .get_article(article_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article".to_string()))?;

        let quantity = sanitize_quantity(input.quantity);
        let delta = quantity - old.quantity;

        let mut tx = self.db.begin().await?;

        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET reference = ?, operator = ?, quantity = ?
            WHERE id = ?
            RETURNING id, bin_id, code, reference, operator, quantity
            "#,
        )
        .bind(&input.reference)
        .bind(&input.operator)
        .bind(quantity)
        .bind(article_id)
        .fetch_one(&mut *tx)
        .await?;

        if delta > 0 {
            record_movement(&mut tx, Some(article_id), old.bin_id, Direction::In, delta).await?;
        } else if delta < 0 {
            record_movement(&mut tx, Some(article_id), old.bin_id, Direction::Out, -delta).await?;
        }

        tx.commit().await?;

        Ok(article)
    }

    /// Remove an article, logging its whole current quantity as one
    /// `OUT`. Deleting the bin's last article resets the bin's weight to
    /// zero (the pallet is considered empty).
    pub async fn remove_article(&self, article_id: i64) -> AppResult<ArticleRemoved> {
        let old = self
            .get_article(article_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Article".to_string()))?;

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;

        record_movement(&mut tx, Some(article_id), old.bin_id, Direction::Out, old.quantity)
            .await?;

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE bin_id = ?")
                .bind(old.bin_id)
                .fetch_one(&mut *tx)
                .await?;

        let bin_weight_reset = remaining == 0;
        if bin_weight_reset {
            sqlx::query("UPDATE bins SET weight = 0 WHERE id = ?")
                .bind(old.bin_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            article = article_id,
            bin = old.bin_id,
            quantity = old.quantity,
            bin_weight_reset,
            "article removed"
        );
        Ok(ArticleRemoved {
            article_id,
            bin_id: old.bin_id,
            quantity: old.quantity,
            bin_weight_reset,
        })
    }

    /// Point lookup
    pub async fn get_article(&self, article_id: i64) -> AppResult<Option<Article>> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT id, bin_id, code, reference, operator, quantity FROM articles WHERE id = ?",
        )
        .bind(article_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(article)
    }

    /// Articles currently stored in a bin, in insertion order
    pub async fn list_in_bin(&self, bin_id: i64) -> AppResult<Vec<Article>> {
        let articles = sqlx::query_as::<_, Article>(
            "SELECT id, bin_id, code, reference, operator, quantity
             FROM articles WHERE bin_id = ? ORDER BY id",
        )
        .bind(bin_id)
        .fetch_all(&self.db)
        .await?;

        Ok(articles)
    }

    /// The running totals
    pub async fn metrics(&self) -> AppResult<Metrics> {
        let metrics = sqlx::query_as::<_, Metrics>(
            "SELECT total_in, total_out FROM metrics WHERE id = 1",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(metrics)
    }

    /// Number of article rows across all bins
    pub async fn total_articles(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }
}

/// Append a movement and bump the matching metrics counter. Runs inside
/// the caller's transaction so the article write, the movement, and the
/// counter commit together or not at all.
async fn record_movement(
    tx: &mut Transaction<'_, Sqlite>,
    article_id: Option<i64>,
    bin_id: i64,
    direction: Direction,
    magnitude: i64,
) -> AppResult<()> {
    let recorded_at = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO movements (article_id, bin_id, direction, magnitude, recorded_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(article_id)
    .bind(bin_id)
    .bind(direction)
    .bind(magnitude)
    .bind(recorded_at)
    .execute(&mut **tx)
    .await?;

    let sql = match direction {
        Direction::In => "UPDATE metrics SET total_in = total_in + ? WHERE id = 1",
        Direction::Out => "UPDATE metrics SET total_out = total_out + ? WHERE id = 1",
    };
    sqlx::query(sql).bind(magnitude).execute(&mut **tx).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::bins::BinService;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        // One connection keeps the in-memory database alive for the test
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_schema(&pool).await.unwrap();
        pool
    }

    fn add_input(code: &str, quantity: i64) -> AddArticleInput {
        AddArticleInput {
            code: code.to_string(),
            reference: None,
            operator: None,
            quantity: Some(quantity),
        }
    }

    async fn movement_sums(pool: &SqlitePool) -> (i64, i64) {
        let total_in: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(magnitude), 0) FROM movements WHERE direction = 'IN'",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let total_out: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(magnitude), 0) FROM movements WHERE direction = 'OUT'",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        (total_in, total_out)
    }

    #[tokio::test]
    async fn add_logs_one_in_movement_and_bumps_total_in() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        let added = ledger.add_article(bin.id, add_input("X1", 3)).await.unwrap();

        assert!(added.first_in_bin);
        assert_eq!(added.article.quantity, 3);

        let movements: Vec<Movement> = sqlx::query_as(
            "SELECT id, article_id, bin_id, direction, magnitude, recorded_at FROM movements",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].direction, Direction::In);
        assert_eq!(movements[0].magnitude, 3);
        assert_eq!(movements[0].article_id, Some(added.article.id));

        let metrics = ledger.metrics().await.unwrap();
        assert_eq!(metrics.total_in, 3);
        assert_eq!(metrics.total_out, 0);
    }

    #[tokio::test]
    async fn second_add_does_not_raise_first_in_bin() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool);

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        ledger.add_article(bin.id, add_input("X1", 1)).await.unwrap();
        let second = ledger.add_article(bin.id, add_input("X2", 1)).await.unwrap();
        assert!(!second.first_in_bin);
    }

    #[tokio::test]
    async fn add_clamps_non_positive_quantity_to_one() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool);

        let bin = bins.get_or_create("A1").await.unwrap().bin;
        let added = ledger.add_article(bin.id, add_input("X1", -4)).await.unwrap();
        assert_eq!(added.article.quantity, 1);

        let metrics = ledger.metrics().await.unwrap();
        assert_eq!(metrics.total_in, 1);
    }

    #[tokio::test]
    async fn add_rejects_empty_code_and_missing_bin() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool);

        let bin = bins.get_or_create("A1").await.unwrap().bin;
        let err = ledger.add_article(bin.id, add_input("  ", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = ledger.add_article(9999, add_input("X1", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn edit_shrink_logs_one_out_of_the_difference() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        let added = ledger.add_article(bin.id, add_input("X1", 5)).await.unwrap();

        let article = ledger
            .edit_article(
                added.article.id,
                EditArticleInput {
                    reference: Some("ref".to_string()),
                    operator: None,
                    quantity: 2,
                },
            )
            .await
            .unwrap();
        assert_eq!(article.quantity, 2);

        let out_movements: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM movements WHERE direction = 'OUT' AND magnitude = 3",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(out_movements, 1);

        let metrics = ledger.metrics().await.unwrap();
        assert_eq!(metrics.total_in, 5);
        assert_eq!(metrics.total_out, 3);
    }

    #[tokio::test]
    async fn edit_grow_logs_one_in_of_the_difference() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        let added = ledger.add_article(bin.id, add_input("X1", 2)).await.unwrap();

        ledger
            .edit_article(
                added.article.id,
                EditArticleInput {
                    reference: None,
                    operator: Some("op".to_string()),
                    quantity: 7,
                },
            )
            .await
            .unwrap();

        let in_movements: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM movements WHERE direction = 'IN' AND magnitude = 5",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(in_movements, 1);

        let metrics = ledger.metrics().await.unwrap();
        assert_eq!(metrics.total_in, 7);
        assert_eq!(metrics.total_out, 0);
    }

    #[tokio::test]
    async fn edit_with_unchanged_quantity_logs_nothing() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        let added = ledger.add_article(bin.id, add_input("X1", 4)).await.unwrap();
        let before = ledger.metrics().await.unwrap();

        let article = ledger
            .edit_article(
                added.article.id,
                EditArticleInput {
                    reference: Some("new ref".to_string()),
                    operator: Some("op".to_string()),
                    quantity: 4,
                },
            )
            .await
            .unwrap();
        assert_eq!(article.reference.as_deref(), Some("new ref"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movements")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        let after = ledger.metrics().await.unwrap();
        assert_eq!(after.total_in, before.total_in);
        assert_eq!(after.total_out, before.total_out);
    }

    #[tokio::test]
    async fn remove_logs_full_quantity_out_and_resets_weight_of_emptied_bin() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        let added = ledger.add_article(bin.id, add_input("X1", 6)).await.unwrap();
        bins.set_weight(bin.id, 120.0).await.unwrap();

        let removed = ledger.remove_article(added.article.id).await.unwrap();
        assert!(removed.bin_weight_reset);
        assert_eq!(removed.quantity, 6);

        let bin = bins.get(bin.id).await.unwrap().unwrap();
        assert_eq!(bin.weight, 0.0);

        let metrics = ledger.metrics().await.unwrap();
        assert_eq!(metrics.total_out, 6);

        // History survives the deletion by value
        let kept: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM movements WHERE article_id = ?",
        )
        .bind(removed.article_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(kept, 2);
    }

    #[tokio::test]
    async fn remove_keeps_weight_when_other_articles_remain() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        let first = ledger.add_article(bin.id, add_input("X1", 2)).await.unwrap();
        ledger.add_article(bin.id, add_input("X2", 2)).await.unwrap();
        bins.set_weight(bin.id, 80.0).await.unwrap();

        let removed = ledger.remove_article(first.article.id).await.unwrap();
        assert!(!removed.bin_weight_reset);

        let bin = bins.get(bin.id).await.unwrap().unwrap();
        assert_eq!(bin.weight, 80.0);
    }

    #[tokio::test]
    async fn totals_always_equal_the_movement_sums() {
        let pool = test_pool().await;
        let bins = BinService::new(pool.clone());
        let ledger = LedgerService::new(pool.clone());

        let bin = bins.get_or_create("E1").await.unwrap().bin;
        let a = ledger.add_article(bin.id, add_input("X1", 5)).await.unwrap();
        let b = ledger.add_article(bin.id, add_input("X2", 8)).await.unwrap();
        ledger
            .edit_article(
                a.article.id,
                EditArticleInput { reference: None, operator: None, quantity: 9 },
            )
            .await
            .unwrap();
        ledger
            .edit_article(
                b.article.id,
                EditArticleInput { reference: None, operator: None, quantity: 1 },
            )
            .await
            .unwrap();
        ledger.remove_article(a.article.id).await.unwrap();

        let metrics = ledger.metrics().await.unwrap();
        let (sum_in, sum_out) = movement_sums(&pool).await;
        assert_eq!(metrics.total_in, sum_in);
        assert_eq!(metrics.total_out, sum_out);
        // 5 + 8 + 4 in; 7 + 9 out
        assert_eq!(metrics.total_in, 17);
        assert_eq!(metrics.total_out, 16);
    }
}
