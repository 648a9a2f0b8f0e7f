use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One store row: a bulk-imported document holding a batch of restaurants.
/// The API only ever reads these; writes happen through an offline import.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RestaurantListDocument {
    pub restaurants: Vec<RestaurantEntry>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RestaurantEntry {
    pub restaurant: Restaurant,
}

/// `res_id` is the only externally addressable identifier.
///
/// Coordinates and ratings come from the imported dataset as either JSON
/// strings or numbers, so they stay as raw values here and get cast to
/// floating point at query time.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Restaurant {
    pub res_id: i64,
    pub name: String,
    #[serde(default)]
    pub cuisines: String,
    pub location: Location,
    #[serde(default)]
    pub user_rating: Value,
    #[serde(default)]
    pub price_range: Value,
    #[serde(default)]
    pub featured_image: String,
    #[serde(default)]
    pub menu_url: String,
    #[serde(default)]
    pub book_url: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Location {
    #[serde(default)]
    pub latitude: Value,
    #[serde(default)]
    pub longitude: Value,
    #[serde(default)]
    pub address: String,
}

/// Projection returned by the image-search pipeline.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ReducedRestaurant {
    pub name: String,
    pub location: Location,
    pub cuisines: String,
    pub user_rating: Value,
    pub price_range: Value,
    pub featured_image: String,
    pub menu_url: String,
    pub url: String,
}

impl From<&Restaurant> for ReducedRestaurant {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            location: restaurant.location.clone(),
            cuisines: restaurant.cuisines.clone(),
            user_rating: restaurant.user_rating.clone(),
            price_range: restaurant.price_range.clone(),
            featured_image: restaurant.featured_image.clone(),
            menu_url: restaurant.menu_url.clone(),
            url: restaurant.url.clone(),
        }
    }
}
