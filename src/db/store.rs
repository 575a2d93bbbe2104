use crate::{
    error::{AppError, AppResult},
    models::{RecType, Recommendation, RecommendationFilter},
};

/// Persistence port for the recommendations table
///
/// Adapters own id assignment and the uniqueness of `product_id` and
/// `rec_id`; a write that would break either constraint fails with
/// [`AppError::Conflict`]. Rows are always returned in ascending id order.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Persists a new row, ignoring any id carried by `rec`
    async fn create(&self, rec: &Recommendation) -> AppResult<Recommendation>;

    /// Writes every mutable field of an already persisted row
    ///
    /// Fails with a validation error when `rec` has no id, and with
    /// not-found when no row carries that id.
    async fn update(&self, rec: &Recommendation) -> AppResult<Recommendation>;

    /// Removes the row with `id`; returns whether a row was removed
    async fn delete(&self, id: i64) -> AppResult<bool>;

    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>>;

    async fn all(&self) -> AppResult<Vec<Recommendation>>;

    /// Returns rows matching every criterion set on `filter`
    async fn filter(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>>;

    /// Increments `like_num` by one; `None` when the row does not exist
    async fn like(&self, id: i64) -> AppResult<Option<Recommendation>>;

    /// Decrements `like_num` by one, never below zero
    async fn unlike(&self, id: i64) -> AppResult<Option<Recommendation>>;

    /// Looks up a row that must exist
    async fn find_or_not_found(&self, id: i64) -> AppResult<Recommendation> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::recommendation_not_found(id))
    }

    async fn find_by_product_id(&self, product_id: i64) -> AppResult<Recommendation> {
        single(
            self.filter(&RecommendationFilter::by_product_id(product_id))
                .await?,
            || format!("Recommendation for product_id '{}' was not found.", product_id),
        )
    }

    async fn find_by_rec_id(&self, rec_id: i64) -> AppResult<Recommendation> {
        single(
            self.filter(&RecommendationFilter::by_rec_id(rec_id)).await?,
            || format!("Recommendation with rec_id '{}' was not found.", rec_id),
        )
    }

    async fn find_by_product_name(&self, product_name: &str) -> AppResult<Vec<Recommendation>> {
        self.filter(&RecommendationFilter::by_product_name(product_name))
            .await
    }

    async fn find_by_rec_name(&self, rec_name: &str) -> AppResult<Vec<Recommendation>> {
        self.filter(&RecommendationFilter::by_rec_name(rec_name))
            .await
    }

    async fn find_by_rec_type(&self, rec_type: RecType) -> AppResult<Vec<Recommendation>> {
        self.filter(&RecommendationFilter::by_rec_type(rec_type))
            .await
    }
}

/// Collapses a query result that must hold exactly one row
fn single(
    mut rows: Vec<Recommendation>,
    not_found: impl FnOnce() -> String,
) -> AppResult<Recommendation> {
    match rows.len() {
        1 => Ok(rows.remove(0)),
        0 => Err(AppError::NotFound(not_found())),
        n => Err(AppError::Internal(format!(
            "expected a single recommendation, found {}",
            n
        ))),
    }
}
