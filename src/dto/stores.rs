use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<Uuid>,
}

/// Store row joined with its on-demand average rating; `avg_rating` is
/// absent when nobody has rated the store yet.
#[derive(Debug, Serialize, ToSchema)]
pub struct StoreWithRating {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub address: String,
    pub owner_user_id: Option<Uuid>,
    pub avg_rating: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreList {
    pub items: Vec<StoreWithRating>,
}
