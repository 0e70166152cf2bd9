/// User handlers - profiles, account updates, uploaded content and followers
use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use super::sections::to_items;
use crate::config::Config;
use crate::db::user_repo::{self, UpdateUserFields};
use crate::db::media_repo;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    AddFollowerRequest, AddFollowerResponse, MediaItem, ProfileResponse, PublicUser,
    UpdateUserRequest, UserRef, UserSummary,
};
use crate::security::hash_password;
use crate::services::FollowService;

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

async fn ensure_user_exists(pool: &PgPool, id: i32) -> Result<()> {
    if user_repo::exists(pool, id).await? {
        Ok(())
    } else {
        Err(user_not_found())
    }
}

/// Either side of a follow relationship (or an admin) may change it.
fn ensure_can_manage_follow(caller: &AuthUser, follower_id: i32, followee_id: i32) -> Result<()> {
    if caller.id == follower_id || caller.can_act_for(followee_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You can only manage your own follow relationships".to_string(),
        ))
    }
}

/// Public profile with follower lists
#[utoipa::path(
    get,
    path = "/api/users/profile/{username}",
    tag = "users",
    params(("username" = String, Path, description = "Username, matched case-insensitively")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "User not found", body = error_types::ErrorResponse)
    )
)]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    username: web::Path<String>,
) -> Result<HttpResponse> {
    let user = user_repo::find_by_username(pool.get_ref(), &username)
        .await?
        .ok_or_else(user_not_found)?;

    let follows = FollowService::new(pool.get_ref().clone());
    let followers = follows.followers(user.id).await?;
    let following = follows.following(user.id).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        user: PublicUser::from(user),
        followers,
        following,
    }))
}

/// Directory of all users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses((status = 200, description = "All users", body = [UserSummary]))
)]
pub async fn list_users(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let users = user_repo::list_users(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Change username, email or password
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = PublicUser),
        (status = 400, description = "Invalid field", body = error_types::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = error_types::ErrorResponse),
        (status = 403, description = "Not allowed to edit this user", body = error_types::ErrorResponse),
        (status = 404, description = "User not found", body = error_types::ErrorResponse),
        (status = 409, description = "Username or email already taken", body = error_types::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    pool: web::Data<PgPool>,
    caller: AuthUser,
    id: web::Path<i32>,
    req: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let id = id.into_inner();
    if !caller.can_act_for(id) {
        return Err(AppError::Forbidden(
            "You can only update your own account".to_string(),
        ));
    }
    let req = req.into_inner().trimmed();
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let fields = UpdateUserFields {
        username: req.username,
        email: req.email,
        password_hash,
    };

    let user = user_repo::update_user(pool.get_ref(), id, fields)
        .await
        .map_err(|e| match e {
            AppError::Conflict(_) => {
                AppError::Conflict("Username or email already exists.".to_string())
            }
            other => other,
        })?
        .ok_or_else(user_not_found)?;

    tracing::info!(user_id = id, updated_by = caller.id, "User updated");
    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// Media uploaded by a user, newest first
#[utoipa::path(
    get,
    path = "/api/users/{id}/content",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Uploaded media", body = [MediaItem]),
        (status = 404, description = "No media found for this user", body = error_types::ErrorResponse)
    )
)]
pub async fn get_user_content(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    id: web::Path<i32>,
) -> Result<HttpResponse> {
    let media = media_repo::list_by_uploader(pool.get_ref(), id.into_inner()).await?;
    if media.is_empty() {
        return Err(AppError::NotFound("No media found for this user".to_string()));
    }

    Ok(HttpResponse::Ok().json(to_items(&config, media)))
}

/// Make the named user a follower of `{id}`
#[utoipa::path(
    post,
    path = "/api/users/{id}/followers",
    tag = "users",
    params(("id" = i32, Path, description = "User being followed")),
    request_body = AddFollowerRequest,
    responses(
        (status = 200, description = "Follower added", body = AddFollowerResponse),
        (status = 400, description = "Missing username or self-follow", body = error_types::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = error_types::ErrorResponse),
        (status = 403, description = "Caller is on neither side of the relationship", body = error_types::ErrorResponse),
        (status = 404, description = "User not found", body = error_types::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_follower(
    pool: web::Data<PgPool>,
    caller: AuthUser,
    id: web::Path<i32>,
    req: web::Json<AddFollowerRequest>,
) -> Result<HttpResponse> {
    let followee_id = id.into_inner();
    let username = req
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("Username is required".to_string()))?;

    ensure_user_exists(pool.get_ref(), followee_id).await?;
    let follower = user_repo::find_by_username(pool.get_ref(), username)
        .await?
        .ok_or_else(user_not_found)?;

    if follower.id == followee_id {
        return Err(AppError::BadRequest("Users cannot follow themselves".to_string()));
    }
    ensure_can_manage_follow(&caller, follower.id, followee_id)?;

    let created = FollowService::new(pool.get_ref().clone())
        .create_follow(follower.id, followee_id)
        .await?;
    tracing::info!(
        follower_id = follower.id,
        followee_id,
        created,
        requested_by = caller.id,
        "Follower added"
    );

    Ok(HttpResponse::Ok().json(AddFollowerResponse {
        message: "Follower added successfully".to_string(),
        follower_id: follower.id,
    }))
}

/// Remove `{follower_id}` from the followers of `{id}`
#[utoipa::path(
    delete,
    path = "/api/users/{id}/followers/{follower_id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User being followed"),
        ("follower_id" = i32, Path, description = "Follower to remove")
    ),
    responses(
        (status = 200, description = "Follower removed"),
        (status = 401, description = "Missing or invalid token", body = error_types::ErrorResponse),
        (status = 403, description = "Caller is on neither side of the relationship", body = error_types::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_follower(
    pool: web::Data<PgPool>,
    caller: AuthUser,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse> {
    let (followee_id, follower_id) = path.into_inner();
    ensure_can_manage_follow(&caller, follower_id, followee_id)?;

    let removed = FollowService::new(pool.get_ref().clone())
        .delete_follow(follower_id, followee_id)
        .await?;
    tracing::info!(follower_id, followee_id, removed, requested_by = caller.id, "Follower removed");

    Ok(HttpResponse::Ok().json(json!({ "message": "Follower removed successfully" })))
}

/// Users following `{id}`
#[utoipa::path(
    get,
    path = "/api/users/{id}/followers",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Followers", body = [UserRef]),
        (status = 404, description = "User not found", body = error_types::ErrorResponse)
    )
)]
pub async fn get_followers(pool: web::Data<PgPool>, id: web::Path<i32>) -> Result<HttpResponse> {
    let id = id.into_inner();
    ensure_user_exists(pool.get_ref(), id).await?;

    let followers = FollowService::new(pool.get_ref().clone()).followers(id).await?;
    Ok(HttpResponse::Ok().json(followers))
}

/// Users `{id}` follows
#[utoipa::path(
    get,
    path = "/api/users/{id}/following",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Followed users", body = [UserRef]),
        (status = 404, description = "User not found", body = error_types::ErrorResponse)
    )
)]
pub async fn get_following(pool: web::Data<PgPool>, id: web::Path<i32>) -> Result<HttpResponse> {
    let id = id.into_inner();
    ensure_user_exists(pool.get_ref(), id).await?;

    let following = FollowService::new(pool.get_ref().clone()).following(id).await?;
    Ok(HttpResponse::Ok().json(following))
}
