use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Role, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

/// Breakdown of a cascading user deletion. Store-side ratings and ratings
/// authored by the user are counted separately even though both come out of
/// the same table.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteUserSummary {
    pub user_name: String,
    pub role: Role,
    pub stores_deleted: u64,
    pub ratings_deleted: u64,
    pub user_ratings_deleted: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
}
