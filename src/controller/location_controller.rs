use std::sync::Arc;

use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::controller::AppState;
use crate::helpers::geo::GeoQuery;
use crate::repositories::postgres_repo::{PostgresConnectionRepo, StoreError};

pub fn router(app_state: AppState) -> Router {
    let postgres_repo = Arc::new(PostgresConnectionRepo::new(app_state.postgres_connection));

    Router::new()
        .route("/location", get(search_by_location))
        .route_layer(Extension(postgres_repo))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LocationSearchParam {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

pub async fn search_by_location(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Query(query): Query<LocationSearchParam>,
) -> impl IntoResponse {
    // Validation happens before any store round-trip.
    let geo_query = match GeoQuery::from_params(
        query.lat.as_deref(),
        query.lng.as_deref(),
        query.radius.as_deref(),
    ) {
        Ok(geo_query) => geo_query,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": message })))
                .into_response();
        }
    };

    return match postgres_repo.search_within_radius(&geo_query).await {
        Ok(entries) if entries.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No restaurants found in this area." })),
        )
            .into_response(),
        Ok(entries) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": entries })),
        )
            .into_response(),
        Err(StoreError::NotReady(e)) => {
            warn!("Store not ready for location search due to: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "message": "Database connection not established" })),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Error in location search: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal Server Error" })),
            )
                .into_response()
        }
    };
}
