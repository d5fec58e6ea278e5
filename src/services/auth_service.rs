use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::auth::{
        ChangePasswordRequest, Claims, LoginRequest, LoginResponse, RegisterRequest, UserInfo,
    },
    error::{AppError, AppResult, on_unique_violation},
    middleware::auth::AuthUser,
    models::{Role, User},
    response::{ApiResponse, Meta},
    state::AppState,
    validation,
};

const EMAIL_TAKEN: &str = "Email already registered.";

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        password,
        address,
        role,
    } = payload;

    validation::validate_user_name(&name)?;
    validation::validate_email(&email)?;
    validation::validate_password(&password)?;
    let address = address.unwrap_or_default();
    validation::validate_user_address(&address)?;
    let role = role.unwrap_or(Role::User);

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();

    // The unique constraint on email closes the race behind the check above.
    let (created_at,): (DateTime<Utc>,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, address, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING created_at
        "#,
    )
    .bind(id)
    .bind(name.as_str())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(address.as_str())
    .bind(role.as_str())
    .fetch_one(&state.pool)
    .await
    .map_err(|e| on_unique_violation(e, EMAIL_TAKEN))?;

    let user = User {
        id,
        name,
        email,
        address,
        role,
        created_at,
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": user.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User registered successfully.",
        user,
        None,
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;

    let row: Option<(Uuid, String, String, String, String)> = sqlx::query_as(
        "SELECT id, name, email, password_hash, role FROM users WHERE email = $1",
    )
    .bind(email.as_str())
    .fetch_optional(&state.pool)
    .await?;

    // Unknown email and wrong password are deliberately indistinguishable.
    let (id, name, email, stored_hash, role) = match row {
        Some(r) => r,
        None => return Err(AppError::Unauthorized("Invalid email or password.".into())),
    };

    let parsed_hash = PasswordHash::new(&stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid email or password.".into()));
    }

    let role = Role::parse(&role).unwrap_or(Role::User);
    let token = issue_token(id, role, &name, &email)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let resp = LoginResponse {
        token,
        user: UserInfo {
            id,
            name,
            email,
            role,
        },
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn change_password(
    state: &AppState,
    user: &AuthUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let ChangePasswordRequest {
        old_password,
        new_password,
    } = payload;

    if old_password.is_empty() || new_password.is_empty() {
        return Err(AppError::BadRequest(
            "Old and new passwords are required.".into(),
        ));
    }

    let row: Option<(String,)> = sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;

    let (stored_hash,) = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound("User not found.".into())),
    };

    let parsed_hash = PasswordHash::new(&stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(old_password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Old password is incorrect.".into()));
    }

    validation::validate_password(&new_password)?;
    let new_hash = hash_password(&new_password)?;

    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(new_hash)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "password_change",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Password updated successfully.",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn issue_token(id: Uuid, role: Role, name: &str, email: &str) -> AppResult<String> {
    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: id.to_string(),
        role: role.as_str().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}
