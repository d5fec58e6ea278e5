use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::ratings::{
        RatingEntryList, StoreRatingEntry, SubmitRatingRequest, UpdateRatingRequest,
        UserStoreRating,
    },
    error::{AppError, AppResult, on_unique_violation},
    middleware::auth::{AuthUser, ensure_role},
    models::{Rating, Role},
    response::{ApiResponse, Meta},
    state::AppState,
    validation,
};

const ALREADY_RATED: &str = "You have already rated this store. Use update instead.";

/// First-time rating for a (user, store) pair. The existence checks and the
/// insert share one transaction, with the pair's unique constraint as the
/// final arbiter under concurrency.
pub async fn submit_rating(
    state: &AppState,
    user: &AuthUser,
    payload: SubmitRatingRequest,
) -> AppResult<ApiResponse<Rating>> {
    ensure_role(user, Role::User)?;
    validation::validate_rating_value(payload.rating)?;

    let mut tx = state.pool.begin().await?;

    let store: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stores WHERE id = $1")
        .bind(payload.store_id)
        .fetch_optional(&mut *tx)
        .await?;
    if store.is_none() {
        return Err(AppError::NotFound("Store not found.".into()));
    }

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM ratings WHERE user_id = $1 AND store_id = $2")
            .bind(user.user_id)
            .bind(payload.store_id)
            .fetch_optional(&mut *tx)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(ALREADY_RATED.to_string()));
    }

    let id = Uuid::new_v4();
    let (created_at,): (DateTime<Utc>,) = sqlx::query_as(
        r#"
        INSERT INTO ratings (id, user_id, store_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(payload.store_id)
    .bind(payload.rating)
    .bind(payload.comment.as_deref())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| on_unique_violation(e, ALREADY_RATED))?;

    tx.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "rating_submit",
        Some("ratings"),
        Some(serde_json::json!({ "store_id": payload.store_id, "rating": payload.rating })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let rating = Rating {
        id,
        user_id: user.user_id,
        store_id: payload.store_id,
        rating: payload.rating,
        comment: payload.comment,
        created_at,
    };

    Ok(ApiResponse::success(
        "Rating submitted successfully.",
        rating,
        Some(Meta::empty()),
    ))
}

pub async fn update_rating(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
    payload: UpdateRatingRequest,
) -> AppResult<ApiResponse<UserStoreRating>> {
    ensure_role(user, Role::User)?;
    validation::validate_rating_value(payload.rating)?;

    let result = sqlx::query(
        "UPDATE ratings SET rating = $1, comment = $2 WHERE user_id = $3 AND store_id = $4",
    )
    .bind(payload.rating)
    .bind(payload.comment.as_deref())
    .bind(user.user_id)
    .bind(store_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "No existing rating to update for this store.".into(),
        ));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "rating_update",
        Some("ratings"),
        Some(serde_json::json!({ "store_id": store_id, "rating": payload.rating })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let data = UserStoreRating {
        rating: payload.rating,
        comment: payload.comment,
    };

    Ok(ApiResponse::success(
        "Rating updated successfully.",
        data,
        Some(Meta::empty()),
    ))
}

pub async fn get_user_store_rating(
    state: &AppState,
    user: &AuthUser,
    store_id: Uuid,
) -> AppResult<ApiResponse<UserStoreRating>> {
    let rating: Option<UserStoreRating> = sqlx::query_as(
        "SELECT rating, comment FROM ratings WHERE user_id = $1 AND store_id = $2",
    )
    .bind(user.user_id)
    .bind(store_id)
    .fetch_optional(&state.pool)
    .await?;

    let rating = match rating {
        Some(r) => r,
        None => return Err(AppError::NotFound("No rating found for this store.".into())),
    };

    Ok(ApiResponse::success("Rating", rating, None))
}

/// Everyone who rated the given store, joined with their account details.
pub async fn get_ratings_for_store(
    pool: &DbPool,
    store_id: Uuid,
) -> AppResult<RatingEntryList> {
    let items = sqlx::query_as::<_, StoreRatingEntry>(
        r#"
        SELECT u.id AS user_id, u.name, u.email, r.rating, r.comment
        FROM ratings r
        JOIN users u ON u.id = r.user_id
        WHERE r.store_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    Ok(RatingEntryList { items })
}

/// Mean rating for one store, rounded to two decimals in SQL. `None` when the
/// store has no ratings; a true zero average cannot occur since ratings start
/// at 1.
pub async fn average_rating(pool: &DbPool, store_id: Uuid) -> AppResult<Option<f64>> {
    let (avg,): (Option<f64>,) = sqlx::query_as(
        "SELECT ROUND(AVG(rating)::numeric, 2)::float8 FROM ratings WHERE store_id = $1",
    )
    .bind(store_id)
    .fetch_one(pool)
    .await?;
    Ok(avg)
}

/// Batched averages for a page of stores; stores with no ratings are absent
/// from the map.
pub async fn average_ratings_for(
    pool: &DbPool,
    store_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, f64>> {
    if store_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT store_id, ROUND(AVG(rating)::numeric, 2)::float8
        FROM ratings
        WHERE store_id = ANY($1)
        GROUP BY store_id
        "#,
    )
    .bind(store_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, avg)| avg.map(|a| (id, a)))
        .collect())
}
