use sqlx::PgPool;
use sqlx::types::Json;
use tournament::PredictionValue;

use crate::error::Result;
use crate::models::PredictionRow;

pub struct PredictionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PredictionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, scope: &str, key: &str) -> Result<Option<PredictionRow>> {
        let row = sqlx::query_as::<_, PredictionRow>(
            "SELECT key, value FROM predictions WHERE scope = $1 AND key = $2",
        )
        .bind(scope)
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// All rows of a scope, read in a single statement.
    pub async fn list_scope(&self, scope: &str) -> Result<Vec<PredictionRow>> {
        let rows = sqlx::query_as::<_, PredictionRow>(
            "SELECT key, value FROM predictions WHERE scope = $1 ORDER BY key",
        )
        .bind(scope)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn upsert(&self, scope: &str, key: &str, value: &PredictionValue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO predictions (scope, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (scope, key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(scope)
        .bind(key)
        .bind(Json(value))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, scope: &str, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM predictions WHERE scope = $1 AND key = $2")
            .bind(scope)
            .bind(key)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_scope(&self, scope: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM predictions WHERE scope = $1")
            .bind(scope)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Single-statement compare-and-swap on one row. JSONB equality ignores
    /// key order, so values round-trip through serde safely.
    pub async fn compare_and_swap(
        &self,
        scope: &str,
        key: &str,
        expected: Option<&PredictionValue>,
        new: Option<&PredictionValue>,
    ) -> Result<bool> {
        let affected = match (expected, new) {
            (None, Some(new)) => sqlx::query(
                r#"
                INSERT INTO predictions (scope, key, value)
                VALUES ($1, $2, $3)
                ON CONFLICT (scope, key) DO NOTHING
                "#,
            )
            .bind(scope)
            .bind(key)
            .bind(Json(new))
            .execute(self.pool)
            .await?
            .rows_affected(),
            (Some(expected), Some(new)) => sqlx::query(
                r#"
                UPDATE predictions
                SET value = $4, updated_at = NOW()
                WHERE scope = $1 AND key = $2 AND value = $3
                "#,
            )
            .bind(scope)
            .bind(key)
            .bind(Json(expected))
            .bind(Json(new))
            .execute(self.pool)
            .await?
            .rows_affected(),
            (Some(expected), None) => sqlx::query(
                "DELETE FROM predictions WHERE scope = $1 AND key = $2 AND value = $3",
            )
            .bind(scope)
            .bind(key)
            .bind(Json(expected))
            .execute(self.pool)
            .await?
            .rows_affected(),
            (None, None) => {
                let (exists,): (bool,) = sqlx::query_as(
                    "SELECT EXISTS(SELECT 1 FROM predictions WHERE scope = $1 AND key = $2)",
                )
                .bind(scope)
                .bind(key)
                .fetch_one(self.pool)
                .await?;
                u64::from(!exists)
            }
        };

        Ok(affected == 1)
    }
}
