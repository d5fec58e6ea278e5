use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitRatingRequest {
    pub store_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRatingRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct UserStoreRating {
    pub rating: i32,
    pub comment: Option<String>,
}

/// One rater of a store, as shown to the store's owner.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct StoreRatingEntry {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingEntryList {
    pub items: Vec<StoreRatingEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AverageRating {
    pub average_rating: Option<f64>,
}
