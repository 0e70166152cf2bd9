use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
/// OpenAPI documentation for the portfolio service
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Portfolio Service API",
        version = "1.0.0",
        description = "Backend for a personal media portfolio: a path-addressable section hierarchy, media uploaded straight to object storage through pre-signed URLs, row tiling for galleries, user accounts and followers.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Development server"),
    ),
    paths(
        handlers::sections::list_sections,
        handlers::sections::section_tree,
        handlers::sections::get_section_by_path,
        handlers::sections::get_media_under_section,
        handlers::sections::get_section_media,
        handlers::sections::list_children,
        handlers::media::generate_presigned_urls,
        handlers::media::save_media_metadata,
        handlers::media::get_media_by_section,
        handlers::media::delete_media,
        handlers::media::media_layout,
        handlers::auth::register,
        handlers::auth::login,
        handlers::users::get_profile,
        handlers::users::list_users,
        handlers::users::update_user,
        handlers::users::get_user_content,
        handlers::users::add_follower,
        handlers::users::remove_follower,
        handlers::users::get_followers,
        handlers::users::get_following,
    ),
    components(schemas(
        error_types::ErrorResponse,
        models::Section,
        models::SectionNode,
        models::Media,
        models::MediaItem,
        models::MediaType,
        models::FileToSign,
        models::PresignRequest,
        models::PresignedUpload,
        models::PresignResponse,
        models::NewMedia,
        models::SaveMediaRequest,
        models::DeleteMediaRequest,
        models::DeleteMediaResponse,
        models::PublicUser,
        models::UserSummary,
        models::UserRef,
        models::ProfileResponse,
        models::RegisterRequest,
        models::RegisterResponse,
        models::LoginRequest,
        models::LoginResponse,
        models::UpdateUserRequest,
        models::AddFollowerRequest,
        models::AddFollowerResponse,
    )),
    tags(
        (name = "sections", description = "Section hierarchy and section media"),
        (name = "media", description = "Uploads, metadata, listing and layout"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Profiles, accounts and followers"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("RS256 access token from /api/auth/login"))
                        .build(),
                ),
            )
        }
    }
}
