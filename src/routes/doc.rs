use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, UserInfo},
        ratings::{
            AverageRating, RatingEntryList, StoreRatingEntry, SubmitRatingRequest,
            UpdateRatingRequest, UserStoreRating,
        },
        stores::{CreateStoreRequest, StoreList, StoreWithRating, UpdateStoreRequest},
        users::{DashboardCounts, DeleteUserSummary, UpdateUserRequest, UserList},
    },
    models::{Rating, Role, Store, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, owner, params, ratings, stores},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        stores::list_stores,
        ratings::submit_rating,
        ratings::update_rating,
        ratings::get_rating,
        ratings::update_password,
        admin::create_user,
        admin::list_users,
        admin::update_user,
        admin::delete_user,
        admin::create_store,
        admin::list_stores,
        admin::update_store,
        admin::delete_store,
        admin::dashboard,
        admin::update_password,
        owner::my_store,
        owner::average,
        owner::ratings,
        owner::update_password
    ),
    components(
        schemas(
            Role,
            User,
            Store,
            Rating,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UserInfo,
            ChangePasswordRequest,
            UpdateUserRequest,
            UserList,
            DeleteUserSummary,
            DashboardCounts,
            CreateStoreRequest,
            UpdateStoreRequest,
            StoreWithRating,
            StoreList,
            SubmitRatingRequest,
            UpdateRatingRequest,
            UserStoreRating,
            StoreRatingEntry,
            RatingEntryList,
            AverageRating,
            params::Pagination,
            params::UserListQuery,
            params::StoreListQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<UserList>,
            ApiResponse<StoreList>,
            ApiResponse<Rating>,
            ApiResponse<DeleteUserSummary>,
            ApiResponse<DashboardCounts>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Stores", description = "Store listing for authenticated users"),
        (name = "Ratings", description = "Rating submission and lookup"),
        (name = "Admin", description = "User and store administration"),
        (name = "Owner", description = "Store owner dashboard"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
