use axum::{Json, Router, extract::State, routing::{get, post}};

use crate::{
    dto::auth::ChangePasswordRequest,
    dto::ratings::{AverageRating, RatingEntryList},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_owner},
    models::Store,
    response::ApiResponse,
    services::{auth_service, owner_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/store", get(my_store))
        .route("/average", get(average))
        .route("/ratings", get(ratings))
        .route("/update-password", post(update_password))
}

#[utoipa::path(
    get,
    path = "/api/owner/store",
    responses(
        (status = 200, description = "The caller's store", body = ApiResponse<Store>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No store found for this owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn my_store(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = owner_service::my_store(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/average",
    responses(
        (status = 200, description = "Average rating, null when unrated", body = ApiResponse<AverageRating>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No store found for this owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn average(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AverageRating>>> {
    let resp = owner_service::average_rating(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/owner/ratings",
    responses(
        (status = 200, description = "Raters of the caller's store", body = ApiResponse<RatingEntryList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No store found for this owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn ratings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RatingEntryList>>> {
    let resp = owner_service::store_ratings(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/owner/update-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Old password is incorrect"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Owner"
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_owner(&user)?;
    let resp = auth_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}
