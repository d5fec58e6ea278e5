use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use store_rating_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        "Administrator Example Account",
        "admin@example.com",
        "Admin#1234",
        "Admin",
    )
    .await?;
    let user_id = ensure_user(
        &pool,
        "Ordinary Example User Account",
        "user@example.com",
        "User#12345",
        "User",
    )
    .await?;
    let owner_id = ensure_user(
        &pool,
        "Store Owner Example Account",
        "owner@example.com",
        "Owner#1234",
        "Owner",
    )
    .await?;

    seed_stores(&pool, owner_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}, Owner ID: {owner_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_stores(pool: &sqlx::PgPool, owner_id: Uuid) -> anyhow::Result<()> {
    let stores = vec![
        (
            "Ferris Groceries",
            Some("owner@example.com"),
            "12 Harbor Street",
            Some(owner_id),
        ),
        ("Corner Books", None, "3 Library Lane", None),
        (
            "Crab Shack Coffee",
            Some("coffee@example.com"),
            "77 Dockside Avenue",
            None,
        ),
    ];

    for (name, email, address, owner) in stores {
        // NULL emails never collide under the unique constraint, so keep the
        // seed idempotent by name instead.
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM stores WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO stores (id, name, email, address, owner_user_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(address)
        .bind(owner)
        .execute(pool)
        .await?;
    }

    println!("Seeded stores");
    Ok(())
}
