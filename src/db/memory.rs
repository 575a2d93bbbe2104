use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::RecommendationStore;
use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationFilter},
};

/// Process-local recommendations table
///
/// Mirrors the relational adapter's contract: sequential ids that are never
/// reused, unique `product_id` and `rec_id`, ordered scans.
#[derive(Clone, Default)]
pub struct MemoryRecommendationStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    rows: BTreeMap<i64, Recommendation>,
    last_id: i64,
}

impl MemoryInner {
    /// Rejects `rec` if another row already holds its product_id or rec_id
    fn check_unique(&self, rec: &Recommendation, own_id: Option<i64>) -> AppResult<()> {
        for (id, row) in &self.rows {
            if Some(*id) == own_id {
                continue;
            }
            if row.product_id == rec.product_id {
                return Err(AppError::Conflict(format!(
                    "A recommendation for product_id '{}' already exists.",
                    rec.product_id
                )));
            }
            if row.rec_id == rec.rec_id {
                return Err(AppError::Conflict(format!(
                    "A recommendation with rec_id '{}' already exists.",
                    rec.rec_id
                )));
            }
        }
        Ok(())
    }

    fn modify(
        &mut self,
        id: i64,
        change: impl FnOnce(&mut Recommendation),
    ) -> Option<Recommendation> {
        let row = self.rows.get_mut(&id)?;
        change(row);
        Some(row.clone())
    }
}

impl MemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl RecommendationStore for MemoryRecommendationStore {
    async fn create(&self, rec: &Recommendation) -> AppResult<Recommendation> {
        let mut inner = self.inner.write().await;
        inner.check_unique(rec, None)?;

        inner.last_id += 1;
        let id = inner.last_id;
        let mut row = rec.clone();
        row.id = Some(id);
        inner.rows.insert(id, row.clone());

        Ok(row)
    }

    async fn update(&self, rec: &Recommendation) -> AppResult<Recommendation> {
        let id = rec.id.ok_or_else(|| {
            AppError::DataValidation("Update called with empty ID field".to_string())
        })?;

        let mut inner = self.inner.write().await;
        if !inner.rows.contains_key(&id) {
            return Err(AppError::recommendation_not_found(id));
        }
        inner.check_unique(rec, Some(id))?;
        inner.rows.insert(id, rec.clone());

        Ok(rec.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }

    async fn find(&self, id: i64) -> AppResult<Option<Recommendation>> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn all(&self) -> AppResult<Vec<Recommendation>> {
        Ok(self.inner.read().await.rows.values().cloned().collect())
    }

    async fn filter(&self, filter: &RecommendationFilter) -> AppResult<Vec<Recommendation>> {
        let inner = self.inner.read().await;
        Ok(inner
            .rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn like(&self, id: i64) -> AppResult<Option<Recommendation>> {
        Ok(self.inner.write().await.modify(id, Recommendation::like))
    }

    async fn unlike(&self, id: i64) -> AppResult<Option<Recommendation>> {
        Ok(self.inner.write().await.modify(id, Recommendation::unlike))
    }
}
