use serde_json::Value;

use crate::{
    db::RecommendationStore,
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationFilter},
};

/// Persists a new recommendation
///
/// Any id supplied by the caller is discarded; the store assigns a fresh one.
pub async fn create_recommendation(
    store: &dyn RecommendationStore,
    mut rec: Recommendation,
) -> AppResult<Recommendation> {
    tracing::info!(
        product_id = rec.product_id,
        rec_id = rec.rec_id,
        rec_type = %rec.rec_type,
        "Creating recommendation"
    );
    rec.id = None;
    let created = store.create(&rec).await?;
    tracing::info!(id = ?created.id, "Recommendation created");
    Ok(created)
}

pub async fn get_recommendation(
    store: &dyn RecommendationStore,
    id: i64,
) -> AppResult<Recommendation> {
    tracing::info!(id, "Reading recommendation");
    store.find_or_not_found(id).await
}

/// Lists recommendations.
///
/// With no criteria every row is returned, possibly none. When criteria are
/// given and nothing matches, the result is a not-found error.
pub async fn list_recommendations(
    store: &dyn RecommendationStore,
    filter: &RecommendationFilter,
) -> AppResult<Vec<Recommendation>> {
    if filter.is_empty() {
        tracing::info!("Listing all recommendations");
        return store.all().await;
    }

    tracing::info!(?filter, "Listing filtered recommendations");
    let rows = store.filter(filter).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(
            "No recommendations were found matching the given filters.".to_string(),
        ));
    }
    Ok(rows)
}

/// Replaces the mutable fields of an existing recommendation from a JSON body
pub async fn update_recommendation(
    store: &dyn RecommendationStore,
    id: i64,
    body: &Value,
) -> AppResult<Recommendation> {
    tracing::info!(id, "Updating recommendation");
    let mut rec = store.find_or_not_found(id).await?;
    rec.update_from_json(body)?;
    rec.id = Some(id);
    store.update(&rec).await
}

/// Removes a recommendation; an absent id is not an error
pub async fn delete_recommendation(store: &dyn RecommendationStore, id: i64) -> AppResult<()> {
    tracing::info!(id, "Deleting recommendation");
    if store.find(id).await?.is_some() {
        store.delete(id).await?;
    } else {
        tracing::debug!(id, "Recommendation already absent");
    }
    Ok(())
}

pub async fn like_recommendation(
    store: &dyn RecommendationStore,
    id: i64,
) -> AppResult<Recommendation> {
    tracing::info!(id, "Liking recommendation");
    store
        .like(id)
        .await?
        .ok_or_else(|| AppError::recommendation_not_found(id))
}

/// Withdraws a like; the counter never drops below zero
pub async fn unlike_recommendation(
    store: &dyn RecommendationStore,
    id: i64,
) -> AppResult<Recommendation> {
    tracing::info!(id, "Unliking recommendation");
    store
        .unlike(id)
        .await?
        .ok_or_else(|| AppError::recommendation_not_found(id))
}
