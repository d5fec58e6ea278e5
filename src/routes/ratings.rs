use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::auth::ChangePasswordRequest,
    dto::ratings::{SubmitRatingRequest, UpdateRatingRequest, UserStoreRating},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_role},
    models::{Rating, Role},
    response::ApiResponse,
    services::{auth_service, rating_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ratings", post(submit_rating))
        .route("/ratings/{store_id}", put(update_rating).get(get_rating))
        // Aliases kept for older clients.
        .route("/user/rate", post(submit_rating))
        .route("/user/rate/{store_id}", get(get_rating))
        .route("/user/update-password", post(update_password))
}

#[utoipa::path(
    post,
    path = "/api/ratings",
    request_body = SubmitRatingRequest,
    responses(
        (status = 201, description = "Rating submitted", body = ApiResponse<Rating>),
        (status = 404, description = "Store not found"),
        (status = 409, description = "Already rated; use update")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitRatingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Rating>>)> {
    let resp = rating_service::submit_rating(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/ratings/{store_id}",
    params(("store_id" = Uuid, Path, description = "Store ID")),
    request_body = UpdateRatingRequest,
    responses(
        (status = 200, description = "Rating updated", body = ApiResponse<UserStoreRating>),
        (status = 404, description = "No existing rating")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn update_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<UpdateRatingRequest>,
) -> AppResult<Json<ApiResponse<UserStoreRating>>> {
    let resp = rating_service::update_rating(&state, &user, store_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/ratings/{store_id}",
    params(("store_id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "The caller's rating for the store", body = ApiResponse<UserStoreRating>),
        (status = 404, description = "No rating found")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn get_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<UserStoreRating>>> {
    let resp = rating_service::get_user_store_rating(&state, &user, store_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/user/update-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Old password is incorrect"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_role(&user, Role::User)?;
    let resp = auth_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}
