/// Error types for portfolio-service
///
/// Every handler returns [`Result`]; failures are rendered as the shared
/// `error_types::ErrorResponse` JSON body.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use std::fmt;

/// Result type for portfolio-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug)]
pub enum AppError {
    /// Database operation failed
    DatabaseError(String),

    /// Object storage operation failed
    StorageError(String),

    ValidationError(String),

    BadRequest(String),

    NotFound(String),

    /// Missing, malformed or expired credentials
    Unauthorized(String),

    Forbidden(String),

    /// Duplicate resource
    Conflict(String),

    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The message shown to API clients. Server-side failures never leak
    /// their underlying cause.
    pub fn client_message(&self) -> &str {
        match self {
            AppError::DatabaseError(_) | AppError::StorageError(_) | AppError::Internal(_) => {
                "Internal server error"
            }
            AppError::ValidationError(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => msg,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) | AppError::StorageError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = match self {
            AppError::DatabaseError(_) => (kinds::SERVER_ERROR, error_codes::DATABASE_ERROR),
            AppError::StorageError(_) => (kinds::SERVER_ERROR, error_codes::STORAGE_ERROR),
            AppError::ValidationError(_) => (kinds::VALIDATION_ERROR, error_codes::VALIDATION_ERROR),
            AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_REQUEST),
            AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::NOT_FOUND),
            AppError::Unauthorized(_) => {
                (kinds::AUTHENTICATION_ERROR, error_codes::INVALID_CREDENTIALS)
            }
            AppError::Forbidden(_) => (kinds::AUTHORIZATION_ERROR, error_codes::FORBIDDEN),
            AppError::Conflict(_) => (kinds::CONFLICT_ERROR, error_codes::CONFLICT),
            AppError::Internal(_) => (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            self.client_message(),
            status.as_u16(),
            error_type,
            code,
        );

        HttpResponse::build(status).json(response)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                AppError::Conflict("Resource already exists".to_string())
            }
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
            {
                AppError::BadRequest(foreign_key_message(db_err.constraint()))
            }
            _ => AppError::DatabaseError(err.to_string()),
        }
    }
}

fn foreign_key_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(name) if name.contains("uploaded_by") => "uploaded_by does not name a user".to_string(),
        Some(name) if name.contains("section_id") => "Referenced section does not exist".to_string(),
        _ => "Referenced resource does not exist".to_string(),
    }
}

impl From<tile_layout::LayoutError> for AppError {
    fn from(err: tile_layout::LayoutError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<crypto_core::jwt::JwtError> for AppError {
    fn from(err: crypto_core::jwt::JwtError) -> Self {
        use crypto_core::jwt::JwtError;
        match err {
            JwtError::Expired => AppError::Unauthorized("Token expired".to_string()),
            JwtError::Invalid(_) => AppError::Unauthorized("Invalid or expired token".to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                errs.first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
            .collect();
        fields.sort();
        AppError::ValidationError(fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_client_error_message_is_passed_through() {
        let body = body_json(AppError::BadRequest("path is required".to_string())).await;
        assert_eq!(body["message"], "path is required");
        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["code"], error_codes::INVALID_REQUEST);
    }

    #[actix_rt::test]
    async fn test_server_error_message_is_hidden() {
        let body = body_json(AppError::DatabaseError("relation \"media\" does not exist".into())).await;
        assert_eq!(body["status"], 500);
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["code"], error_codes::DATABASE_ERROR);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::StorageError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_foreign_key_messages_name_the_reference() {
        assert_eq!(
            foreign_key_message(Some("media_uploaded_by_fkey")),
            "uploaded_by does not name a user"
        );
        assert_eq!(
            foreign_key_message(Some("media_section_id_fkey")),
            "Referenced section does not exist"
        );
        assert_eq!(foreign_key_message(None), "Referenced resource does not exist");
    }

    #[test]
    fn test_layout_error_maps_to_400() {
        let err: AppError = tile_layout::LayoutError::InvalidContainerWidth(0.0).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_expired_token_maps_to_401() {
        let err: AppError = crypto_core::jwt::JwtError::Expired.into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.client_message(), "Token expired");
    }
}
