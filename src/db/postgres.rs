use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use super::RecommendationStore;
use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationFilter},
};

const COLUMNS: &str = "id, product_id, product_name, rec_id, rec_name, rec_type, like_num";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Creates the recommendations table if it does not exist yet
pub async fn init_schema(pool: &PgPool) -> anyhow::Result<()> {
    tracing::info!("Initializing database schema");

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS recommendations (
            id BIGSERIAL PRIMARY KEY,
            product_id BIGINT NOT NULL UNIQUE,
            product_name VARCHAR(256) NOT NULL,
            rec_id BIGINT NOT NULL UNIQUE,
            rec_name VARCHAR(256) NOT NULL,
            rec_type TEXT NOT NULL
                CHECK (rec_type IN ('CROSS_SELL', 'UP_SELL', 'ACCESSORY', 'BUY_WITH')),
            like_num INTEGER NOT NULL DEFAULT 0 CHECK (like_num >= 0)
        )"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Drops the recommendations table and everything in it
pub async fn drop_schema(pool: &PgPool) -> anyhow::Result<()> {
    tracing::info!("Dropping database schema");
    sqlx::query("DROP TABLE IF EXISTS recommendations")
        .execute(pool)
        .await?;
    Ok(())
}

/// Translates constraint violations into client-facing errors
fn map_write_error(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!(
                "Recommendation conflicts with an existing row (constraint '{}').",
                constraint
            ));
        }
        if db_err.is_check_violation() {
            return AppError::DataValidation(format!(
                "Invalid Recommendation: violates constraint '{}'",
                constraint
            ));
        }
    }
    AppError::Database(err)
}

/// PostgreSQL-backed recommendations table
#[derive(Clone)]
pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn create(&self, rec: &Recommendation) -> AppResult<Recommendation> {
        let query = format!(
            "INSERT INTO recommendations (product_id, product_name, rec_id, rec_name, rec_type, like_num) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Recommendation>(&query)
            .bind(rec.product_id)
            .bind(&rec.product_name)
            .bind(rec.rec_id)
            .bind(&rec.rec_name)
            .bind(rec.rec_type.as_str())
            .bind(rec.like_num)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update(&self, rec: &Recommendation) -> AppResult<Recommendation> {
        let id = rec.id.ok_or_else(|| {
            AppError::DataValidation("Update called with empty ID field".to_string())
        })?;

        let query = format!(
            "UPDATE recommendations SET product_id = $1, product_name = $2, rec_id = $3, \
             rec_name = $4, rec_type = $5, like_num = $6 WHERE id = $7 RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Recommendation>(&query)
            .bind(rec.product_id)
            .bind(&rec.product_name)
            .bind(rec.rec_id)
            .bind(&rec.rec_name)
            .bind(rec.rec_type.as_str())
            .bind(rec.like_num)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recommendations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let query = format!("SELECT {} FROM recommendations WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, Recommendation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn all(&self) -> AppResult<Vec<Recommendation>> {
        self.filter(&RecommendationFilter::default()).await
    }

    async fn filter(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM recommendations WHERE TRUE", COLUMNS));

        if let Some(product_id) = filter.product_id {
            builder.push(" AND product_id = ").push_bind(product_id);
        }
        if let Some(product_name) = &filter.product_name {
            builder.push(" AND product_name = ").push_bind(product_name.clone());
        }
        if let Some(rec_id) = filter.rec_id {
            builder.push(" AND rec_id = ").push_bind(rec_id);
        }
        if let Some(rec_name) = &filter.rec_name {
            builder.push(" AND rec_name = ").push_bind(rec_name.clone());
        }
        if let Some(rec_type) = filter.rec_type {
            builder.push(" AND rec_type = ").push_bind(rec_type.as_str());
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<Recommendation>()
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(?filter, count = rows.len(), "Filtered recommendations");
        Ok(rows)
    }

    /// Saturates at `i32::MAX` like [`Recommendation::like`]
    async fn like(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let query = format!(
            "UPDATE recommendations SET like_num = LEAST(like_num, 2147483646) + 1 \
             WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, Recommendation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn unlike(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let query = format!(
            "UPDATE recommendations SET like_num = GREATEST(like_num - 1, 0) WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, Recommendation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
