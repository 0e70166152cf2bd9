/// Health, metrics and fallback handlers
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use sqlx::PgPool;

use crate::config::SERVICE_NAME;
use crate::error::{AppError, Result};
use error_types::{error_codes, error_types as kinds, ErrorResponse};

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

pub async fn live() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Ready once a pooled connection answers a query
pub async fn ready(pool: web::Data<PgPool>) -> HttpResponse {
    let check = async {
        let mut conn = db_pool::acquire_with_metrics(pool.get_ref(), SERVICE_NAME).await?;
        sqlx::query("SELECT 1").execute(&mut *conn).await?;
        Ok::<_, sqlx::Error>(())
    };

    match check.await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ready" })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                "Service Unavailable",
                "Database unavailable",
                503,
                kinds::SERVICE_UNAVAILABLE_ERROR,
                error_codes::SERVICE_UNAVAILABLE,
            ))
        }
    }
}

pub async fn metrics() -> Result<HttpResponse> {
    let body = crate::metrics::render()
        .map_err(|e| AppError::Internal(format!("Failed to encode metrics: {e}")))?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

pub async fn openapi_json() -> HttpResponse {
    use utoipa::OpenApi;
    HttpResponse::Ok().json(crate::openapi::ApiDoc::openapi())
}

/// Fallback for requests no route matched
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    tracing::warn!(
        "404 Error: No matching route for {} {}",
        req.method(),
        req.path()
    );
    HttpResponse::NotFound().body("Not Found")
}
