use serde::{Deserialize, Serialize};

/// One ranked label from the image-classification service.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ClassificationLabel {
    pub label: String,
    pub score: f64,
}
