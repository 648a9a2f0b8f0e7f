use anyhow::{bail, Context};
use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::models::classification::ClassificationLabel;

/// Client for the external image-classification service. One attempt per
/// request, no timeout, no retry: a failure here is the request's failure.
pub struct FoodClassifier {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl FoodClassifier {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    /// Posts raw image bytes and returns the ranked labels.
    pub async fn classify(&self, image: Bytes) -> anyhow::Result<Vec<ClassificationLabel>> {
        let response = self
            .http_client
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .context("inference service unreachable")?;

        let status = response.status();
        if !status.is_success() {
            bail!("inference service responded with status: {}", status);
        }

        response
            .json::<Vec<ClassificationLabel>>()
            .await
            .context("malformed inference response")
    }
}
