use crate::{
    dto::ratings::{AverageRating, RatingEntryList},
    entity::stores::Model as StoreModel,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner},
    models::Store,
    response::{ApiResponse, Meta},
    services::{rating_service, store_service},
    state::AppState,
};

/// The store shown on the owner dashboard. Owners with several stores get
/// their oldest one, matching the single-store assumption of the dashboard.
pub async fn my_store(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Store>> {
    ensure_owner(user)?;
    let store = resolve_store(state, user).await?;
    Ok(ApiResponse::success(
        "Store",
        store_service::store_from_entity(store),
        None,
    ))
}

pub async fn average_rating(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AverageRating>> {
    ensure_owner(user)?;
    let store = resolve_store(state, user).await?;
    let average = rating_service::average_rating(&state.pool, store.id).await?;
    Ok(ApiResponse::success(
        "Average rating",
        AverageRating {
            average_rating: average,
        },
        Some(Meta::empty()),
    ))
}

pub async fn store_ratings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RatingEntryList>> {
    ensure_owner(user)?;
    let store = resolve_store(state, user).await?;
    let ratings = rating_service::get_ratings_for_store(&state.pool, store.id).await?;
    Ok(ApiResponse::success("Ratings", ratings, Some(Meta::empty())))
}

async fn resolve_store(state: &AppState, user: &AuthUser) -> AppResult<StoreModel> {
    let mut stores = store_service::find_stores_for_owner(state, user.user_id).await?;
    if stores.is_empty() {
        return Err(AppError::NotFound("No store found for this owner.".into()));
    }
    Ok(stores.remove(0))
}
