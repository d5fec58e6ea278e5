use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::RegisterRequest,
    dto::users::{DashboardCounts, DeleteUserSummary, UpdateUserRequest, UserList},
    entity::{
        Ratings, Stores,
        ratings::Column as RatingCol,
        stores::Column as StoreCol,
        users::{ActiveModel as UserActive, Column, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult, on_orm_unique_violation},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Role, User},
    response::{ApiResponse, Meta},
    routes::params::{ListSortBy, SortOrder, UserListQuery},
    services::auth_service,
    state::AppState,
    validation,
};

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    // Same pipeline as self-registration; admins may pick any role.
    auth_service::register_user(state, payload).await
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(name) = query.name.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{name}%")));
    }
    if let Some(email) = query.email.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Email).ilike(format!("%{email}%")));
    }
    if let Some(role) = query.role {
        condition = condition.add(Column::Role.eq(role.as_str()));
    }

    let (sort_by, sort_order) = query.sort();
    let sort_col = match sort_by {
        ListSortBy::Name => Column::Name,
        ListSortBy::Email => Column::Email,
    };

    let mut finder = Users::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound("User not found.".into())),
    };

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        validation::validate_user_name(&name)?;
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        validation::validate_email(&email)?;
        active.email = Set(email);
    }
    if let Some(address) = payload.address {
        validation::validate_user_address(&address)?;
        active.address = Set(address);
    }
    if let Some(role) = payload.role {
        active.role = Set(role.as_str().to_string());
    }

    let updated = active
        .update(&state.orm)
        .await
        .map_err(|e| on_orm_unique_violation(e, "Email already registered."))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "user_update",
        Some("users"),
        Some(serde_json::json!({ "target_user_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User updated successfully.",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Cascading user deletion in a single transaction.
///
/// Owners lose their stores and every rating on those stores before the
/// account itself goes; ratings authored by the user are removed for every
/// role and counted in their own bucket.
pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<DeleteUserSummary>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let target = Users::find_by_id(id).one(&txn).await?;
    let target = match target {
        Some(u) => u,
        None => return Err(AppError::NotFound("User not found.".into())),
    };
    let role = Role::parse(&target.role).unwrap_or(Role::User);

    let mut stores_deleted = 0u64;
    let mut ratings_deleted = 0u64;

    if role == Role::Owner {
        let stores = Stores::find()
            .filter(StoreCol::OwnerUserId.eq(id))
            .all(&txn)
            .await?;

        for store in &stores {
            ratings_deleted += Ratings::delete_many()
                .filter(RatingCol::StoreId.eq(store.id))
                .exec(&txn)
                .await?
                .rows_affected;
        }

        stores_deleted = Stores::delete_many()
            .filter(StoreCol::OwnerUserId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;
    }

    let user_ratings_deleted = Ratings::delete_many()
        .filter(RatingCol::UserId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    Users::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    let summary = DeleteUserSummary {
        user_name: target.name.clone(),
        role,
        stores_deleted,
        ratings_deleted,
        user_ratings_deleted,
    };

    let mut message = format!(
        "User \"{}\" ({}) deleted successfully.",
        summary.user_name, summary.role
    );
    if role == Role::Owner {
        message.push_str(&format!(
            " Also deleted: {} stores, {} store ratings, and {} user ratings.",
            summary.stores_deleted, summary.ratings_deleted, summary.user_ratings_deleted
        ));
    } else {
        message.push_str(&format!(
            " Also deleted: {} user ratings.",
            summary.user_ratings_deleted
        ));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "user_delete",
        Some("users"),
        Some(serde_json::json!({
            "target_user_id": id,
            "stores_deleted": summary.stores_deleted,
            "ratings_deleted": summary.ratings_deleted,
            "user_ratings_deleted": summary.user_ratings_deleted,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(message, summary, Some(Meta::empty())))
}

/// Three independent full-table counts, recomputed per call.
pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardCounts>> {
    ensure_admin(user)?;

    let total_users = Users::find().count(&state.orm).await?;
    let total_stores = Stores::find().count(&state.orm).await?;
    let total_ratings = Ratings::find().count(&state.orm).await?;

    let data = DashboardCounts {
        total_users,
        total_stores,
        total_ratings,
    };

    Ok(ApiResponse::success("Dashboard", data, Some(Meta::empty())))
}

pub fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        address: model.address,
        role: Role::parse(&model.role).unwrap_or(Role::User),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
