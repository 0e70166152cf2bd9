/// Auth handlers - registration and login
use actix_web::{web, HttpResponse};
use crypto_core::jwt;
use sqlx::PgPool;
use validator::Validate;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse, User};
use crate::security::{hash_password, validate_password_strength, verify_password};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn issue_token(user: &User) -> Result<String> {
    Ok(jwt::generate_access_token(
        user.id,
        &user.email,
        &user.username,
        &user.role,
    )?)
}

/// Create an account and log it in
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing fields, invalid email, weak password or taken username/email", body = error_types::ErrorResponse)
    )
)]
pub async fn register(
    pool: web::Data<PgPool>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    if !req.has_all_fields() {
        return Err(AppError::BadRequest("All fields are required.".to_string()));
    }
    req.validate()?;
    validate_password_strength(&req.password)?;

    let username = req.username.trim();
    let email = req.email.trim();

    if user_repo::username_or_email_taken(pool.get_ref(), username, email).await? {
        return Err(AppError::BadRequest(
            "Username or email already exists.".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = user_repo::create_user(pool.get_ref(), username, email, &password_hash)
        .await
        .map_err(|e| match e {
            // lost a race with a concurrent registration
            AppError::Conflict(_) => {
                AppError::BadRequest("Username or email already exists.".to_string())
            }
            other => other,
        })?;

    let token = issue_token(&user)?;
    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User registered successfully.".to_string(),
        user: PublicUser::from(user),
        token,
    }))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid email or password", body = error_types::ErrorResponse)
    )
)]
pub async fn login(pool: web::Data<PgPool>, req: web::Json<LoginRequest>) -> Result<HttpResponse> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let user = user_repo::find_by_email(pool.get_ref(), req.email.trim())
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&req.password, &user.password)? {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = issue_token(&user)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: PublicUser::from(user),
    }))
}
