use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::controller::AppState;
use crate::repositories::postgres_repo::{PostgresConnectionRepo, StoreError};

pub const PAGE_LIMIT: i64 = 9;

pub fn router(app_state: AppState) -> Router {
    let postgres_repo = Arc::new(PostgresConnectionRepo::new(app_state.postgres_connection));

    Router::new()
        .route("/", get(list_restaurants))
        .route("/:id", get(retrieve_restaurant_by_id))
        .route_layer(Extension(postgres_repo))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ListRestaurantsParam {
    pub page: Option<String>,
}

pub async fn list_restaurants(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Query(query): Query<ListRestaurantsParam>,
) -> impl IntoResponse {
    let page = normalize_page(query.page.as_deref());
    let skip = (page - 1) * PAGE_LIMIT;

    let total_results = match postgres_repo.count_list_documents().await {
        Ok(total) => total,
        Err(e) => {
            warn!("Something went wrong counting restaurants due to: {}", e);
            return fetch_failure_response(e);
        }
    };

    let documents = match postgres_repo.fetch_page(skip, PAGE_LIMIT).await {
        Ok(documents) => documents,
        Err(e) => {
            warn!("Something went wrong fetching restaurants due to: {}", e);
            return fetch_failure_response(e);
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "page": page,
            "limit": PAGE_LIMIT,
            "total_results": total_results,
            "total_pages": total_pages(total_results, PAGE_LIMIT),
            "data": documents,
        })),
    )
        .into_response()
}

pub async fn retrieve_restaurant_by_id(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Path(res_id): Path<i64>,
) -> impl IntoResponse {
    return match postgres_repo.find_restaurant_by_res_id(res_id).await {
        Ok(Some(restaurant)) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": restaurant })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "error": "Restaurant not found" })),
        )
            .into_response(),
        Err(e) => {
            warn!(
                "Something went wrong retrieving restaurant with id: {}, due to: {}",
                res_id, e
            );
            fetch_failure_response(e)
        }
    };
}

fn fetch_failure_response(error: StoreError) -> axum::response::Response {
    match error {
        StoreError::NotReady(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "error": "Database connection not established" })),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": "Failed to fetch restaurants" })),
        )
            .into_response(),
    }
}

/// Page defaults to 1 and is floored at 1; anything unparseable means the
/// first page, matching the lenient query handling the client relies on.
/// The upper bound keeps `(page - 1) * PAGE_LIMIT` inside i64.
fn normalize_page(page: Option<&str>) -> i64 {
    page.and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, i64::MAX / PAGE_LIMIT)
}

fn total_pages(total_results: i64, limit: i64) -> i64 {
    (total_results + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some("")), 1);
        assert_eq!(normalize_page(Some("abc")), 1);
    }

    #[test]
    fn page_is_floored_at_one() {
        assert_eq!(normalize_page(Some("0")), 1);
        assert_eq!(normalize_page(Some("-3")), 1);
        assert_eq!(normalize_page(Some("4")), 4);
    }

    #[test]
    fn huge_page_values_do_not_overflow_the_skip() {
        let page = normalize_page(Some("9223372036854775807"));
        assert_eq!(page, i64::MAX / PAGE_LIMIT);

        let skip = (page - 1) * PAGE_LIMIT;
        assert!(skip > 0);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, PAGE_LIMIT), 0);
        assert_eq!(total_pages(1, PAGE_LIMIT), 1);
        assert_eq!(total_pages(9, PAGE_LIMIT), 1);
        assert_eq!(total_pages(10, PAGE_LIMIT), 2);
        assert_eq!(total_pages(27, PAGE_LIMIT), 3);
    }
}
