use sea_orm::ConnectionTrait;
use store_rating_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::{ChangePasswordRequest, LoginRequest, RegisterRequest},
    error::AppError,
    middleware::auth::AuthUser,
    models::Role,
    services::auth_service,
    state::AppState,
};

// Integration flow: register -> duplicate conflict -> login -> undifferentiated
// failures -> password change.
#[tokio::test]
async fn register_login_and_change_password_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    unsafe { std::env::set_var("JWT_SECRET", "integration-test-secret") };

    let state = setup_state(&database_url).await?;

    // Register
    let resp = auth_service::register_user(
        &state,
        register_request("Alice Example Longform Name", "alice@example.com", "Valid#123"),
    )
    .await?;
    let alice = resp.data.expect("registered user");
    assert_eq!(alice.role, Role::User);
    assert_eq!(alice.email, "alice@example.com");

    // Same email again must conflict
    let err = auth_service::register_user(
        &state,
        register_request("Alice Example Longform Name", "alice@example.com", "Valid#123"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");

    // A distinct email still works
    auth_service::register_user(
        &state,
        register_request("Robert Example Longform Name", "bob@example.com", "Valid#123"),
    )
    .await?;

    // Short or weak passwords never reach the database
    let err = auth_service::register_user(
        &state,
        register_request("Carol Example Longform Name", "carol@example.com", "weak"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Login succeeds with the right password
    let resp = auth_service::login_user(
        &state,
        LoginRequest {
            email: "alice@example.com".into(),
            password: "Valid#123".into(),
        },
    )
    .await?;
    let login = resp.data.expect("login payload");
    assert!(!login.token.is_empty());
    assert_eq!(login.user.id, alice.id);
    assert_eq!(login.user.role, Role::User);

    // Wrong password and unknown email are indistinguishable
    let wrong_password = auth_service::login_user(
        &state,
        LoginRequest {
            email: "alice@example.com".into(),
            password: "Wrong#123".into(),
        },
    )
    .await
    .unwrap_err();
    let unknown_email = auth_service::login_user(
        &state,
        LoginRequest {
            email: "nobody@example.com".into(),
            password: "Valid#123".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(wrong_password, AppError::Unauthorized(_)));
    assert!(matches!(unknown_email, AppError::Unauthorized(_)));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());

    // Change password: wrong old password is rejected
    let auth = AuthUser {
        user_id: alice.id,
        role: Role::User,
        name: alice.name.clone(),
        email: alice.email.clone(),
    };
    let err = auth_service::change_password(
        &state,
        &auth,
        ChangePasswordRequest {
            old_password: "Wrong#123".into(),
            new_password: "Fresh#456".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // ...and the right one goes through
    auth_service::change_password(
        &state,
        &auth,
        ChangePasswordRequest {
            old_password: "Valid#123".into(),
            new_password: "Fresh#456".into(),
        },
    )
    .await?;

    // Old credential is dead, new one works
    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "alice@example.com".into(),
            password: "Valid#123".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    auth_service::login_user(
        &state,
        LoginRequest {
            email: "alice@example.com".into(),
            password: "Fresh#456".into(),
        },
    )
    .await?;

    Ok(())
}

fn register_request(name: &str, email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        name: name.into(),
        email: email.into(),
        password: password.into(),
        address: None,
        role: None,
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(sea_orm::Statement::from_string(
        backend,
        "TRUNCATE TABLE ratings, stores, audit_logs, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState { pool, orm })
}
