/// User database operations
///
/// Usernames and emails are unique regardless of case, so every lookup on
/// them compares lowercased values.
use crate::error::Result;
use crate::models::{User, UserSummary, DEFAULT_ROLE};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, username, email, password, role, created_at";

/// Optional fields for profile updates; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct UpdateUserFields {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = LOWER($1)"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn exists(pool: &PgPool, id: i32) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

/// Whether either the username or the email is already taken
pub async fn username_or_email_taken(pool: &PgPool, username: &str, email: &str) -> Result<bool> {
    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM users
            WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($2)
        )
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;

    Ok(taken)
}

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, password, role)
        VALUES ($1, $2, $3, $4)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(DEFAULT_ROLE)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn list_users(pool: &PgPool) -> Result<Vec<UserSummary>> {
    let users =
        sqlx::query_as::<_, UserSummary>("SELECT id, username, role FROM users ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(users)
}

/// Returns `None` when the user does not exist
pub async fn update_user(
    pool: &PgPool,
    id: i32,
    fields: UpdateUserFields,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET username = COALESCE($1, username),
            email = COALESCE($2, email),
            password = COALESCE($3, password)
        WHERE id = $4
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(fields.username)
    .bind(fields.email)
    .bind(fields.password_hash)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
