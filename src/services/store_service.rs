use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::stores::{CreateStoreRequest, StoreList, StoreWithRating, UpdateStoreRequest},
    entity::{
        Users,
        ratings::Column as RatingCol,
        ratings::Entity as Ratings,
        stores::{ActiveModel as StoreActive, Column, Entity as Stores, Model as StoreModel},
    },
    error::{AppError, AppResult, on_orm_unique_violation},
    middleware::auth::{AuthUser, ensure_admin},
    models::Store,
    response::{ApiResponse, Meta},
    routes::params::{ListSortBy, SortOrder, StoreListQuery},
    services::rating_service,
    state::AppState,
};

const STORE_EMAIL_TAKEN: &str = "Store email already registered.";

/// List stores with their average ratings, filtered and sorted.
///
/// Sorting on the nullable email column follows Postgres defaults: ascending
/// puts stores without an email last, descending puts them first.
pub async fn list_stores(
    state: &AppState,
    query: StoreListQuery,
) -> AppResult<ApiResponse<StoreList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(name) = query.name.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{name}%")));
    }
    if let Some(email) = query.email.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Email).ilike(format!("%{email}%")));
    }

    let (sort_by, sort_order) = query.sort();
    let sort_col = match sort_by {
        ListSortBy::Name => Column::Name,
        ListSortBy::Email => Column::Email,
    };

    let mut finder = Stores::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let stores = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let ids: Vec<Uuid> = stores.iter().map(|s| s.id).collect();
    let averages = rating_service::average_ratings_for(&state.pool, &ids).await?;

    let items = stores
        .into_iter()
        .map(|model| {
            let avg_rating = averages.get(&model.id).copied();
            StoreWithRating {
                id: model.id,
                name: model.name,
                email: model.email,
                address: model.address,
                owner_user_id: model.owner_user_id,
                avg_rating,
                created_at: model.created_at.with_timezone(&Utc),
            }
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Stores", StoreList { items }, Some(meta)))
}

pub async fn create_store(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin(user)?;

    crate::validation::validate_store_name(&payload.name)?;
    crate::validation::validate_store_address(&payload.address)?;
    if let Some(email) = payload.email.as_deref() {
        crate::validation::validate_email(email)?;

        let existing = Stores::find()
            .filter(Column::Email.eq(email))
            .one(&state.orm)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(STORE_EMAIL_TAKEN.to_string()));
        }
    }

    if let Some(owner_id) = payload.owner_id {
        ensure_user_exists(state, owner_id).await?;
    }

    let id = Uuid::new_v4();
    let active = StoreActive {
        id: Set(id),
        name: Set(payload.name),
        email: Set(payload.email),
        address: Set(payload.address),
        owner_user_id: Set(payload.owner_id),
        created_at: NotSet,
    };
    let store = active
        .insert(&state.orm)
        .await
        .map_err(|e| on_orm_unique_violation(e, STORE_EMAIL_TAKEN))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "store_create",
        Some("stores"),
        Some(serde_json::json!({ "store_id": store.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Store created successfully.",
        store_from_entity(store),
        Some(Meta::empty()),
    ))
}

pub async fn update_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStoreRequest,
) -> AppResult<ApiResponse<Store>> {
    ensure_admin(user)?;

    let existing = Stores::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound("Store not found.".into())),
    };

    let mut active: StoreActive = existing.into();
    if let Some(name) = payload.name {
        crate::validation::validate_store_name(&name)?;
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        crate::validation::validate_email(&email)?;
        active.email = Set(Some(email));
    }
    if let Some(address) = payload.address {
        crate::validation::validate_store_address(&address)?;
        active.address = Set(address);
    }
    if let Some(owner_id) = payload.owner_id {
        ensure_user_exists(state, owner_id).await?;
        active.owner_user_id = Set(Some(owner_id));
    }

    let store = active
        .update(&state.orm)
        .await
        .map_err(|e| on_orm_unique_violation(e, STORE_EMAIL_TAKEN))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "store_update",
        Some("stores"),
        Some(serde_json::json!({ "store_id": store.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Store updated successfully.",
        store_from_entity(store),
        Some(Meta::empty()),
    ))
}

/// Delete a store and its ratings in one transaction; ratings must not
/// outlive the store they reference.
pub async fn delete_store(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let existing = Stores::find_by_id(id).one(&txn).await?;
    if existing.is_none() {
        return Err(AppError::NotFound("Store not found.".into()));
    }

    let ratings_deleted = Ratings::delete_many()
        .filter(RatingCol::StoreId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    Stores::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "store_delete",
        Some("stores"),
        Some(serde_json::json!({ "store_id": id, "ratings_deleted": ratings_deleted })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Store deleted successfully.",
        serde_json::json!({ "ratings_deleted": ratings_deleted }),
        Some(Meta::empty()),
    ))
}

/// All stores owned by the given user, oldest first. Empty when the user
/// owns nothing; callers decide whether that is an error.
pub async fn find_stores_for_owner(
    state: &AppState,
    owner_id: Uuid,
) -> AppResult<Vec<StoreModel>> {
    let stores = Stores::find()
        .filter(Column::OwnerUserId.eq(owner_id))
        .order_by_asc(Column::CreatedAt)
        .all(&state.orm)
        .await?;
    Ok(stores)
}

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> AppResult<()> {
    let exists = Users::find_by_id(user_id).one(&state.orm).await?;
    if exists.is_none() {
        return Err(AppError::BadRequest("Owner user not found.".into()));
    }
    Ok(())
}

pub fn store_from_entity(model: StoreModel) -> Store {
    Store {
        id: model.id,
        name: model.name,
        email: model.email,
        address: model.address,
        owner_user_id: model.owner_user_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
