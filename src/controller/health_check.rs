use axum::routing::get;
use axum::Router;

pub fn router() -> Router {
    Router::new().route("/", get(get_liveness))
}

/// Plain-text liveness probe.
async fn get_liveness() -> &'static str {
    "Restaurant discovery backend is running..."
}
