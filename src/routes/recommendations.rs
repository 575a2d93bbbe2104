use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecType, Recommendation, RecommendationFilter},
    routes::{extract::JsonBody, AppState},
    services::recommendations,
};

/// Optional list filters; every supplied criterion must match
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub product_id: Option<i64>,
    pub product_name: Option<String>,
    pub rec_name: Option<String>,
    pub rec_type: Option<String>,
}

impl TryFrom<ListQuery> for RecommendationFilter {
    type Error = crate::error::AppError;

    fn try_from(query: ListQuery) -> Result<Self, Self::Error> {
        let rec_type = query.rec_type.as_deref().map(str::parse::<RecType>).transpose()?;

        Ok(RecommendationFilter {
            product_id: query.product_id,
            product_name: query.product_name,
            rec_id: None,
            rec_name: query.rec_name,
            rec_type,
        })
    }
}

/// Path of the resource served for `id`
pub fn location_for(id: i64) -> String {
    format!("/recommendations/{}", id)
}

/// GET /recommendations
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Recommendation>>> {
    let Query(query) = query?;
    let filter = RecommendationFilter::try_from(query)?;
    let rows = recommendations::list_recommendations(state.store.as_ref(), &filter).await?;
    tracing::info!(count = rows.len(), "Returning recommendations");
    Ok(Json(rows))
}

/// POST /recommendations
pub async fn create(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    JsonBody(body): JsonBody,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<Recommendation>)> {
    tracing::info!(request_id = %request_id, "Request to create a recommendation");

    let rec = Recommendation::from_json(&body)?;
    let created = recommendations::create_recommendation(state.store.as_ref(), rec).await?;

    let location = created.id.map(location_for).unwrap_or_default();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// GET /recommendations/:id
pub async fn read(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = path?;
    let rec = recommendations::get_recommendation(state.store.as_ref(), id).await?;
    Ok(Json(rec))
}

/// PUT /recommendations/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<i64>, PathRejection>,
    JsonBody(body): JsonBody,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = path?;
    tracing::info!(request_id = %request_id, id, "Request to update a recommendation");

    let rec = recommendations::update_recommendation(state.store.as_ref(), id, &body).await?;
    Ok(Json(rec))
}

/// DELETE /recommendations/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = path?;
    recommendations::delete_recommendation(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /recommendations/:id/like
pub async fn like(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = path?;
    let rec = recommendations::like_recommendation(state.store.as_ref(), id).await?;
    Ok(Json(rec))
}

/// PUT /recommendations/:id/unlike
pub async fn unlike(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Recommendation>> {
    let Path(id) = path?;
    let rec = recommendations::unlike_recommendation(state.store.as_ref(), id).await?;
    Ok(Json(rec))
}
