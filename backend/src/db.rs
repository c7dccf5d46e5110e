//! Schema bootstrap for the SQLite store
//!
//! The four tables are the system's binding wire format. They are
//! created on first run, together with the metrics singleton row. The
//! secondary indexes only speed up the aggregation scans; they change no
//! observable behavior.

use sqlx::SqlitePool;

/// Create tables, indexes, and the metrics singleton if they do not
/// already exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE NOT NULL,
            weight REAL NOT NULL DEFAULT 0,
            image_ref TEXT DEFAULT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bin_id INTEGER NOT NULL REFERENCES bins(id),
            code TEXT NOT NULL,
            reference TEXT,
            operator TEXT,
            quantity INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Append-only; article_id survives article deletion by value
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS movements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            article_id INTEGER,
            bin_id INTEGER NOT NULL,
            direction TEXT NOT NULL CHECK (direction IN ('IN', 'OUT')),
            magnitude INTEGER NOT NULL CHECK (magnitude > 0),
            recorded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metrics (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            total_in INTEGER NOT NULL DEFAULT 0,
            total_out INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO metrics (id, total_in, total_out) SELECT 1, 0, 0
         WHERE NOT EXISTS (SELECT 1 FROM metrics WHERE id = 1)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_bin ON articles(bin_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movements_article ON movements(article_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_movements_recorded_at ON movements(recorded_at)")
        .execute(pool)
        .await?;

    Ok(())
}
