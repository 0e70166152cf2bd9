/// Section handlers - browsing the section hierarchy and its media
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::config::Config;
use crate::db::{media_repo, section_repo};
use crate::error::{AppError, Result};
use crate::models::{
    build_section_tree, Media, MediaItem, Section, SectionIdQuery, SectionNode, SectionPathQuery,
};

pub(crate) fn to_items(config: &Config, media: Vec<Media>) -> Vec<MediaItem> {
    media
        .into_iter()
        .map(|m| {
            let url = config.s3.object_url(&m.s3_key);
            MediaItem::from_media(m, url)
        })
        .collect()
}

fn required_section_id(query: &SectionIdQuery) -> Result<i32> {
    query
        .section_id
        .ok_or_else(|| AppError::BadRequest("sectionId is required".to_string()))
}

/// List every section
#[utoipa::path(
    get,
    path = "/api/sections",
    tag = "sections",
    responses((status = 200, description = "All sections", body = [Section]))
)]
pub async fn list_sections(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let sections = section_repo::list_sections(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(sections))
}

/// Sections nested by parent
#[utoipa::path(
    get,
    path = "/api/sections/tree",
    tag = "sections",
    responses((status = 200, description = "Section forest", body = [SectionNode]))
)]
pub async fn section_tree(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let sections = section_repo::list_sections(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(build_section_tree(sections)))
}

/// Look a section up by its full path
#[utoipa::path(
    get,
    path = "/api/sections/path",
    tag = "sections",
    params(SectionPathQuery),
    responses(
        (status = 200, description = "The section", body = Section),
        (status = 400, description = "path is required", body = error_types::ErrorResponse),
        (status = 404, description = "Section not found", body = error_types::ErrorResponse)
    )
)]
pub async fn get_section_by_path(
    pool: web::Data<PgPool>,
    query: web::Query<SectionPathQuery>,
) -> Result<HttpResponse> {
    let path = query
        .path
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("path is required".to_string()))?;

    let section = section_repo::find_by_path(pool.get_ref(), path)
        .await?
        .ok_or_else(|| AppError::NotFound("Section not found".to_string()))?;

    Ok(HttpResponse::Ok().json(section))
}

/// Media stored under a section's path prefix, including its subsections
#[utoipa::path(
    get,
    path = "/api/sections/section",
    tag = "sections",
    params(SectionIdQuery),
    responses(
        (status = 200, description = "Media under the section path", body = [MediaItem]),
        (status = 400, description = "sectionId is required", body = error_types::ErrorResponse),
        (status = 404, description = "Section not found", body = error_types::ErrorResponse)
    )
)]
pub async fn get_media_under_section(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    query: web::Query<SectionIdQuery>,
) -> Result<HttpResponse> {
    let section_id = required_section_id(&query)?;

    let section = section_repo::find_by_id(pool.get_ref(), section_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Section not found".to_string()))?;

    let media = media_repo::list_by_key_prefix(pool.get_ref(), &section.path).await?;
    tracing::debug!(section_id, path = %section.path, count = media.len(), "Fetched media by prefix");

    Ok(HttpResponse::Ok().json(to_items(&config, media)))
}

/// Media attached directly to a section
#[utoipa::path(
    get,
    path = "/api/sections/media",
    tag = "sections",
    params(SectionIdQuery),
    responses(
        (status = 200, description = "Media of the section", body = [MediaItem]),
        (status = 400, description = "sectionId is required", body = error_types::ErrorResponse)
    )
)]
pub async fn get_section_media(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    query: web::Query<SectionIdQuery>,
) -> Result<HttpResponse> {
    let section_id = required_section_id(&query)?;
    let media = media_repo::list_by_section_id(pool.get_ref(), section_id).await?;
    Ok(HttpResponse::Ok().json(to_items(&config, media)))
}

/// Direct children of a section
#[utoipa::path(
    get,
    path = "/api/sections/{id}/children",
    tag = "sections",
    params(("id" = i32, Path, description = "Parent section id")),
    responses(
        (status = 200, description = "Child sections", body = [Section]),
        (status = 404, description = "Section not found", body = error_types::ErrorResponse)
    )
)]
pub async fn list_children(pool: web::Data<PgPool>, id: web::Path<i32>) -> Result<HttpResponse> {
    let id = id.into_inner();
    if section_repo::find_by_id(pool.get_ref(), id).await?.is_none() {
        return Err(AppError::NotFound("Section not found".to_string()));
    }

    let children = section_repo::list_children(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(children))
}
