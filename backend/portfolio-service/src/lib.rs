//! Portfolio Service
//!
//! HTTP backend for a personal media portfolio: sections, media metadata,
//! pre-signed uploads, gallery layout, accounts and followers.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod security;
pub mod services;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};

use actix_web::web;

/// Register every route plus the extractor error handlers.
///
/// The caller provides `web::Data<PgPool>`, `web::Data<Config>` and
/// `web::Data<dyn ObjectStorage>`, and sets [`handlers::not_found`] as the
/// default service.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid path parameter: {err}")).into()
    }))
    .route("/api/health", web::get().to(handlers::health))
    .route("/api/health/ready", web::get().to(handlers::ready))
    .route("/api/health/live", web::get().to(handlers::live))
    .route("/api/openapi.json", web::get().to(handlers::openapi_json))
    .route("/metrics", web::get().to(handlers::metrics))
    .service(
        web::scope("/api")
            .wrap(middleware::JwtAuthMiddleware)
            .wrap(middleware::MetricsMiddleware)
            .service(
                web::scope("/sections")
                    .route("", web::get().to(handlers::list_sections))
                    .route("/tree", web::get().to(handlers::section_tree))
                    .route("/path", web::get().to(handlers::get_section_by_path))
                    .route("/section", web::get().to(handlers::get_media_under_section))
                    .route("/media", web::get().to(handlers::get_section_media))
                    .route("/{id}/children", web::get().to(handlers::list_children)),
            )
            .service(
                web::scope("/media")
                    .route(
                        "/presigned-urls",
                        web::post().to(handlers::generate_presigned_urls),
                    )
                    .route("/metadata", web::post().to(handlers::save_media_metadata))
                    .route("/section", web::get().to(handlers::get_media_by_section))
                    .route("/delete", web::post().to(handlers::delete_media))
                    .route("/layout", web::get().to(handlers::media_layout)),
            )
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::register))
                    .route("/login", web::post().to(handlers::login)),
            )
            .service(
                web::scope("/users")
                    .route("", web::get().to(handlers::list_users))
                    .route("/profile/{username}", web::get().to(handlers::get_profile))
                    .route("/{id}", web::put().to(handlers::update_user))
                    .route("/{id}/content", web::get().to(handlers::get_user_content))
                    .route("/{id}/followers", web::get().to(handlers::get_followers))
                    .route("/{id}/followers", web::post().to(handlers::add_follower))
                    .route(
                        "/{id}/followers/{follower_id}",
                        web::delete().to(handlers::remove_follower),
                    )
                    .route("/{id}/following", web::get().to(handlers::get_following)),
            ),
    );
}
