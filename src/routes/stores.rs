use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::stores::StoreList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::StoreListQuery,
    services::store_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/stores", get(list_stores))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    params(
        ("name" = Option<String>, Query, description = "Substring filter on store name"),
        ("email" = Option<String>, Query, description = "Substring filter on store email"),
        ("sort_by" = Option<String>, Query, description = "name or email; anything else sorts by name"),
        ("sort_order" = Option<String>, Query, description = "asc or desc, default asc"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Stores with average ratings", body = ApiResponse<StoreList>),
        (status = 401, description = "Unauthenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn list_stores(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<StoreListQuery>,
) -> AppResult<Json<ApiResponse<StoreList>>> {
    let resp = store_service::list_stores(&state, query).await?;
    Ok(Json(resp))
}
