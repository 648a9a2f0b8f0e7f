use bb8_postgres::bb8::{Pool, PooledConnection, RunError};
use bb8_postgres::tokio_postgres::{Error as PostgresError, NoTls};
use bb8_postgres::PostgresConnectionManager;
use serde_json::{json, Value};
use thiserror::Error;

use crate::helpers::geo::{coordinate, GeoQuery};
use crate::models::cuisine::cuisines_match;
use crate::models::restaurant::{
    ReducedRestaurant, Restaurant, RestaurantEntry, RestaurantListDocument,
};

/// Store failures the handlers need to tell apart: a connection that cannot
/// be handed out yet is retryable (503), everything else is a plain 500.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection not ready: {0}")]
    NotReady(#[from] RunError<PostgresError>),

    #[error("store query failed: {0}")]
    Query(#[from] PostgresError),

    #[error("malformed restaurant document: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct PostgresConnectionRepo {
    postgres_connection: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresConnectionRepo {
    pub fn new(postgres_connection: Pool<PostgresConnectionManager<NoTls>>) -> Self {
        Self {
            postgres_connection,
        }
    }

    // Single attempt: a request that arrives before the store is ready gets
    // rejected, never parked behind a retry loop.
    async fn get_postgres_connection(
        &self,
    ) -> Result<PooledConnection<'_, PostgresConnectionManager<NoTls>>, StoreError> {
        Ok(self.postgres_connection.get().await?)
    }

    pub async fn count_list_documents(&self) -> Result<i64, StoreError> {
        let conn = self.get_postgres_connection().await?;
        let row = conn
            .query_one("SELECT COUNT(*) FROM restaurant_lists;", &[])
            .await?;
        Ok(row.get::<_, i64>(0))
    }

    /// One page of list documents, ordered by the best aggregate rating in
    /// each document, descending.
    pub async fn fetch_page(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<RestaurantListDocument>, StoreError> {
        let conn = self.get_postgres_connection().await?;
        let stmt = build_page_statement(skip, limit);

        let rows = conn.query(&stmt, &[]).await?;
        rows.into_iter()
            .map(|row| parse_row_into_list_document(row.get::<_, Value>(0)))
            .collect()
    }

    /// Two-step point lookup: jsonb containment finds the owning document,
    /// then a linear scan of its nested list picks the entry. O(n) in one
    /// document, not in the corpus.
    pub async fn find_restaurant_by_res_id(
        &self,
        res_id: i64,
    ) -> Result<Option<Restaurant>, StoreError> {
        let conn = self.get_postgres_connection().await?;
        let predicate = json!([{ "restaurant": { "res_id": res_id } }]);
        let stmt = format!(
            "SELECT document FROM restaurant_lists \
             WHERE document->'restaurants' @> '{}'::jsonb LIMIT 1;",
            predicate
        );

        let rows = conn.query(&stmt, &[]).await?;
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let document = parse_row_into_list_document(row.get::<_, Value>(0))?;
        Ok(find_entry_in_document(document, res_id))
    }

    /// Unwinds every list document and keeps the entries whose coordinates
    /// fall inside the query's spherical cap. The store has no native
    /// geospatial filter over these documents, so the cap test runs here.
    pub async fn search_within_radius(
        &self,
        query: &GeoQuery,
    ) -> Result<Vec<RestaurantEntry>, StoreError> {
        let documents = self.fetch_all_documents().await?;

        Ok(documents
            .into_iter()
            .flat_map(|document| document.restaurants)
            .filter(|entry| {
                let location = &entry.restaurant.location;
                match (coordinate(&location.longitude), coordinate(&location.latitude)) {
                    (Some(longitude), Some(latitude)) => query.contains(longitude, latitude),
                    _ => false,
                }
            })
            .collect())
    }

    pub async fn search_by_cuisines(
        &self,
        cuisines: &[String],
    ) -> Result<Vec<ReducedRestaurant>, StoreError> {
        let documents = self.fetch_all_documents().await?;

        Ok(documents
            .iter()
            .flat_map(|document| document.restaurants.iter())
            .filter(|entry| cuisines_match(&entry.restaurant.cuisines, cuisines))
            .map(|entry| ReducedRestaurant::from(&entry.restaurant))
            .collect())
    }

    async fn fetch_all_documents(&self) -> Result<Vec<RestaurantListDocument>, StoreError> {
        let conn = self.get_postgres_connection().await?;
        let rows = conn
            .query("SELECT document FROM restaurant_lists;", &[])
            .await?;

        rows.into_iter()
            .map(|row| parse_row_into_list_document(row.get::<_, Value>(0)))
            .collect()
    }
}

// The cast only runs on rating strings that look numeric; a document with a
// garbage rating sorts as NULL instead of failing the whole page query.
fn build_page_statement(skip: i64, limit: i64) -> String {
    format!(
        "SELECT document FROM restaurant_lists \
         ORDER BY ( \
             SELECT MAX(CASE \
                 WHEN entry->'restaurant'->'user_rating'->>'aggregate_rating' ~ '^-?[0-9]+(\\.[0-9]+)?$' \
                 THEN (entry->'restaurant'->'user_rating'->>'aggregate_rating')::float8 \
             END) \
             FROM jsonb_array_elements(document->'restaurants') AS entry \
         ) DESC NULLS LAST \
         OFFSET {} LIMIT {};",
        skip, limit
    )
}

fn parse_row_into_list_document(document: Value) -> Result<RestaurantListDocument, StoreError> {
    Ok(serde_json::from_value(document)?)
}

fn find_entry_in_document(
    document: RestaurantListDocument,
    res_id: i64,
) -> Option<Restaurant> {
    document
        .restaurants
        .into_iter()
        .find(|entry| entry.restaurant.res_id == res_id)
        .map(|entry| entry.restaurant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> RestaurantListDocument {
        serde_json::from_value(json!({
            "restaurants": [
                {
                    "restaurant": {
                        "res_id": 100,
                        "name": "First",
                        "location": { "latitude": "1.0", "longitude": "2.0" }
                    }
                },
                {
                    "restaurant": {
                        "res_id": 200,
                        "name": "Second",
                        "location": { "latitude": "3.0", "longitude": "4.0" }
                    }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn finds_matching_entry_in_nested_list() {
        let restaurant = find_entry_in_document(sample_document(), 200).unwrap();
        assert_eq!(restaurant.name, "Second");
    }

    #[test]
    fn missing_entry_is_a_clean_none() {
        assert!(find_entry_in_document(sample_document(), 999).is_none());
    }

    #[test]
    fn page_statement_guards_the_rating_cast() {
        let stmt = build_page_statement(18, 9);
        assert!(stmt.contains("OFFSET 18 LIMIT 9"));
        assert!(stmt.contains("CASE"));
        assert!(stmt.contains("NULLS LAST"));
        // Only numeric-looking strings reach the float cast.
        assert!(stmt.contains("~ '^-?[0-9]+(\\.[0-9]+)?$'"));
    }

    #[test]
    fn rejects_documents_with_the_wrong_shape() {
        let result = parse_row_into_list_document(json!({ "eateries": [] }));
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }
}
