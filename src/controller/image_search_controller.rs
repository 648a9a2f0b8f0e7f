use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json, Router};
use reqwest::StatusCode;
use serde_json::json;
use tracing::warn;

use crate::controller::AppState;
use crate::models::cuisine::top_cuisines;
use crate::repositories::postgres_repo::{PostgresConnectionRepo, StoreError};
use crate::services::food_classifier::FoodClassifier;

/// Upload cap; the whole image is buffered in memory for the request.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn router(app_state: AppState) -> Router {
    let postgres_repo = Arc::new(PostgresConnectionRepo::new(app_state.postgres_connection));
    let food_classifier = Arc::new(FoodClassifier::new(
        app_state.config.inference_api_url.clone(),
        app_state.config.inference_api_key.clone(),
    ));

    Router::new()
        .route("/image-search", post(search_by_image))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES))
        .route_layer(Extension(postgres_repo))
        .route_layer(Extension(food_classifier))
}

/// Linear pipeline: accept image, classify, rank and map labels to
/// cuisines, query the store, project. All-or-nothing per request.
pub async fn search_by_image(
    Extension(postgres_repo): Extension<Arc<PostgresConnectionRepo>>,
    Extension(food_classifier): Extension<Arc<FoodClassifier>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let image = match read_image_field(&mut multipart).await {
        Ok(Some(image)) => image,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No image uploaded" })),
            )
                .into_response();
        }
        Err(e) => {
            warn!("Rejecting malformed multipart upload due to: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No image uploaded" })),
            )
                .into_response();
        }
    };

    let labels = match food_classifier.classify(image).await {
        Ok(labels) if !labels.is_empty() => labels,
        Ok(_) => {
            warn!("Food detection returned no labels");
            return inference_failure_response();
        }
        Err(e) => {
            warn!("Food detection failed due to: {}", e);
            return inference_failure_response();
        }
    };

    let cuisines = top_cuisines(labels);
    if cuisines.is_empty() {
        // Valid outcome, not an error: nothing recognizable mapped to a
        // cuisine, so the store is never queried.
        return (
            StatusCode::OK,
            Json(json!({ "message": "No cuisines identified", "restaurants": [] })),
        )
            .into_response();
    }

    return match postgres_repo.search_by_cuisines(&cuisines).await {
        Ok(restaurants) if restaurants.is_empty() => (
            StatusCode::OK,
            Json(json!({ "message": "No matching restaurants found", "restaurants": [] })),
        )
            .into_response(),
        Ok(restaurants) => {
            (StatusCode::OK, Json(json!({ "restaurants": restaurants }))).into_response()
        }
        Err(StoreError::NotReady(e)) => {
            warn!("Store not ready for image search due to: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Database connection not established" })),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Error querying restaurants for inferred cuisines: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    };
}

/// Upstream classifier failures are reported distinctly from store errors.
fn inference_failure_response() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Food detection failed" })),
    )
        .into_response()
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            return field.bytes().await.map(Some);
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use bb8_postgres::bb8::Pool;
    use bb8_postgres::tokio_postgres::NoTls;
    use bb8_postgres::PostgresConnectionManager;
    use tower::ServiceExt;

    use crate::config::Config;

    // Pool and classifier both point at unreachable endpoints: a request
    // that gets past the accept step would come back as a 500, not a 400.
    fn test_app_state() -> AppState {
        let manager = PostgresConnectionManager::new_from_stringlike(
            "postgresql://postgres@127.0.0.1:1/unused",
            NoTls,
        )
        .unwrap();

        AppState {
            postgres_connection: Pool::builder().build_unchecked(manager),
            config: Config {
                database_url: "postgresql://postgres@127.0.0.1:1/unused".to_string(),
                inference_api_url: "http://127.0.0.1:9/unreachable".to_string(),
                inference_api_key: "test-key".to_string(),
                port: 0,
                origin_urls: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn upload_without_image_field_is_rejected_before_classification() {
        let body = concat!(
            "--BOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"photo\"; filename=\"food.jpg\"\r\n",
            "Content-Type: image/jpeg\r\n",
            "\r\n",
            "not-really-an-image\r\n",
            "--BOUNDARY--\r\n"
        );

        let request = Request::builder()
            .method("POST")
            .uri("/image-search")
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUNDARY",
            )
            .body(Body::from(body))
            .unwrap();

        let response = router(test_app_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_multipart_body_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/image-search")
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=BOUNDARY",
            )
            .body(Body::from("--BOUNDARY--\r\n"))
            .unwrap();

        let response = router(test_app_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
