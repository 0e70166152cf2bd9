/// Media handlers - upload signing, metadata, listing, deletion and layout
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use std::time::Duration;

use super::sections::to_items;
use crate::config::Config;
use crate::db::media_repo;
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;
use crate::models::{
    DeleteMediaRequest, DeleteMediaResponse, LayoutQuery, LayoutResponse, Media, MediaFilter,
    MediaItem, MediaQuery, PresignRequest, PresignResponse, PresignedUpload, SaveMediaRequest,
};
use crate::services::{object_key, ObjectStorage};

/// Issue pre-signed PUT URLs for a batch of files
#[utoipa::path(
    post,
    path = "/api/media/presigned-urls",
    tag = "media",
    request_body = PresignRequest,
    responses(
        (status = 200, description = "One upload URL per file", body = PresignResponse),
        (status = 400, description = "Files and sectionPath are required", body = error_types::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = error_types::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_presigned_urls(
    config: web::Data<Config>,
    storage: web::Data<dyn ObjectStorage>,
    user: AuthUser,
    req: web::Json<PresignRequest>,
) -> Result<HttpResponse> {
    let section_path = req
        .section_path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let Some(section_path) = section_path.filter(|_| !req.files.is_empty()) else {
        return Err(AppError::BadRequest(
            "Files and sectionPath are required".to_string(),
        ));
    };

    let expires_in = Duration::from_secs(config.s3.presigned_url_expiry_secs);
    let mut urls = Vec::with_capacity(req.files.len());
    for file in &req.files {
        let key = object_key(section_path, &file.file_name)?;
        let url = storage.presign_put(&key, &file.file_type, expires_in).await?;
        urls.push(PresignedUpload {
            file_name: file.file_name.clone(),
            url,
            key,
        });
    }

    tracing::info!(user_id = user.id, count = urls.len(), section_path, "Issued upload URLs");
    Ok(HttpResponse::Ok().json(PresignResponse { urls }))
}

/// Record metadata for uploaded objects
#[utoipa::path(
    post,
    path = "/api/media/metadata",
    tag = "media",
    request_body = SaveMediaRequest,
    responses(
        (status = 201, description = "Saved media rows", body = [Media]),
        (status = 400, description = "No media metadata provided", body = error_types::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = error_types::ErrorResponse),
        (status = 409, description = "A key is already recorded", body = error_types::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn save_media_metadata(
    pool: web::Data<PgPool>,
    user: AuthUser,
    req: web::Json<SaveMediaRequest>,
) -> Result<HttpResponse> {
    if req.media.is_empty() {
        return Err(AppError::BadRequest("No media metadata provided".to_string()));
    }
    for item in &req.media {
        item.validate()?;
    }

    let saved = media_repo::insert_many(pool.get_ref(), &req.media, user.id).await?;
    tracing::info!(user_id = user.id, count = saved.len(), "Saved media metadata");

    Ok(HttpResponse::Created().json(saved))
}

/// Media of a section, optionally filtered and sorted
#[utoipa::path(
    get,
    path = "/api/media/section",
    tag = "media",
    params(MediaQuery),
    responses(
        (status = 200, description = "Matching media", body = [MediaItem]),
        (status = 400, description = "Missing sectionPath or invalid sorting parameters", body = error_types::ErrorResponse)
    )
)]
pub async fn get_media_by_section(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    query: web::Query<MediaQuery>,
) -> Result<HttpResponse> {
    let filter = MediaFilter::from_query(&query)?;
    let media = media_repo::list_by_section_path(pool.get_ref(), &filter).await?;
    Ok(HttpResponse::Ok().json(to_items(&config, media)))
}

/// Delete media rows and their stored objects
#[utoipa::path(
    post,
    path = "/api/media/delete",
    tag = "media",
    request_body = DeleteMediaRequest,
    responses(
        (status = 200, description = "Media deleted", body = DeleteMediaResponse),
        (status = 400, description = "No media IDs provided", body = error_types::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = error_types::ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_media(
    pool: web::Data<PgPool>,
    storage: web::Data<dyn ObjectStorage>,
    user: AuthUser,
    req: web::Json<DeleteMediaRequest>,
) -> Result<HttpResponse> {
    if req.ids.is_empty() {
        return Err(AppError::BadRequest("No media IDs provided".to_string()));
    }

    let keys = media_repo::keys_for_ids(pool.get_ref(), &req.ids).await?;
    // objects go first, a failure leaves the rows in place for a retry
    for key in &keys {
        storage.delete_object(key).await?;
    }
    let deleted = media_repo::delete_by_ids(pool.get_ref(), &req.ids).await?;

    tracing::info!(user_id = user.id, requested = req.ids.len(), deleted, "Deleted media");
    Ok(HttpResponse::Ok().json(DeleteMediaResponse {
        message: "Media deleted successfully".to_string(),
        deleted,
    }))
}

/// Row layout of a section's media for a given container width
#[utoipa::path(
    get,
    path = "/api/media/layout",
    tag = "media",
    params(LayoutQuery),
    responses(
        (status = 200, description = "Rows of placed tiles"),
        (status = 400, description = "Missing sectionPath or invalid dimensions", body = error_types::ErrorResponse)
    )
)]
pub async fn media_layout(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    query: web::Query<LayoutQuery>,
) -> Result<HttpResponse> {
    let filter = query.media_filter()?;
    let container_width = query
        .container_width
        .ok_or_else(|| AppError::BadRequest("containerWidth is required".to_string()))?;
    let mode = query.mode.unwrap_or_default();

    // reject bad dimensions before touching the database
    tile_layout::layout::<MediaItem>(&[], container_width, mode, query.target_row_height)?;

    let media = media_repo::list_by_section_path(pool.get_ref(), &filter).await?;
    let items = to_items(&config, media);
    let rows = tile_layout::layout(&items, container_width, mode, query.target_row_height)?;

    Ok(HttpResponse::Ok().json(LayoutResponse {
        mode,
        container_width,
        rows,
    }))
}
