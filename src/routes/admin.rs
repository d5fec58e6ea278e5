use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::auth::{ChangePasswordRequest, RegisterRequest},
    dto::stores::{CreateStoreRequest, StoreList, UpdateStoreRequest},
    dto::users::{DashboardCounts, DeleteUserSummary, UpdateUserRequest, UserList},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{Store, User},
    response::ApiResponse,
    routes::params::{StoreListQuery, UserListQuery},
    services::{admin_service, auth_service, store_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/stores", post(create_store).get(list_stores))
        .route("/stores/{id}", put(update_store).delete(delete_store))
        .route("/dashboard", get(dashboard))
        .route("/update-password", post(update_password))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created (admin only)", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = admin_service::create_user(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(
        ("name" = Option<String>, Query, description = "Substring filter on name"),
        ("email" = Option<String>, Query, description = "Substring filter on email"),
        ("role" = Option<String>, Query, description = "Exact role filter"),
        ("sort_by" = Option<String>, Query, description = "name or email; anything else sorts by name"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default asc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List users (admin only)", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = admin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = admin_service::update_user(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted with cascade summary", body = ApiResponse<DeleteUserSummary>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeleteUserSummary>>> {
    let resp = admin_service::delete_user(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created", body = ApiResponse<Store>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Store email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_store(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateStoreRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Store>>)> {
    let resp = store_service::create_store(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/admin/stores",
    params(
        ("name" = Option<String>, Query, description = "Substring filter on store name"),
        ("email" = Option<String>, Query, description = "Substring filter on store email"),
        ("sort_by" = Option<String>, Query, description = "name or email; anything else sorts by name"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default asc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List stores with average ratings (admin only)", body = ApiResponse<StoreList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<StoreListQuery>,
) -> AppResult<Json<ApiResponse<StoreList>>> {
    ensure_admin(&user)?;
    let resp = store_service::list_stores(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/stores/{id}",
    params(("id" = Uuid, Path, description = "Store ID")),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated", body = ApiResponse<Store>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_store(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStoreRequest>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let resp = store_service::update_store(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/stores/{id}",
    params(("id" = Uuid, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Store and its ratings deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Store not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_store(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = store_service::delete_store(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Entity counts", body = ApiResponse<DashboardCounts>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardCounts>>> {
    let resp = admin_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/update-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 401, description = "Old password is incorrect"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    ensure_admin(&user)?;
    let resp = auth_service::change_password(&state, &user, payload).await?;
    Ok(Json(resp))
}
