use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_ROLE: &str = "user";

/// User database entity. Holds the password hash, so it is never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// User as exposed to API clients
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PublicUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Entry of the user directory
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub role: String,
}

/// Minimal reference used in follower lists
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct UserRef {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub followers: Vec<UserRef>,
    pub following: Vec<UserRef>,
}

// ========================================
// Auth
// ========================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "Username must be at most 50 characters."))]
    pub username: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format."))]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    pub fn has_all_fields(&self) -> bool {
        [&self.username, &self.email, &self.password]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

// ========================================
// Profile updates and follows
// ========================================

/// Absent fields keep their stored value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "Username must be 1 to 50 characters."))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format."))]
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// Trim username and email so whitespace-only values fail validation.
    pub fn trimmed(self) -> Self {
        Self {
            username: self.username.map(|u| u.trim().to_string()),
            email: self.email.map(|e| e.trim().to_string()),
            password: self.password,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddFollowerRequest {
    pub username: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFollowerResponse {
    pub message: String,
    pub follower_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 1,
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password: "$argon2id$v=19$...".to_string(),
            role: DEFAULT_ROLE.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_public_user_hides_password() {
        let json = serde_json::to_value(PublicUser::from(user())).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "ana");
    }

    #[test]
    fn test_profile_flattens_user() {
        let profile = ProfileResponse {
            user: PublicUser::from(user()),
            followers: vec![UserRef {
                id: 2,
                username: "ben".to_string(),
            }],
            following: Vec::new(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["followers"][0]["username"], "ben");
    }

    #[test]
    fn test_register_request_validation() {
        let request: RegisterRequest =
            serde_json::from_value(serde_json::json!({"username": "ana", "email": "ana"}))
                .unwrap();
        assert!(!request.has_all_fields());

        let request = RegisterRequest {
            username: "ana".to_string(),
            email: "not-an-email".to_string(),
            password: "longenough".to_string(),
        };
        assert!(request.has_all_fields());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        let request = UpdateUserRequest {
            email: Some("ana@example.com".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_ok());

        let request = UpdateUserRequest {
            username: Some(String::new()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_rejects_blank_values_after_trim() {
        let request = UpdateUserRequest {
            username: Some("   ".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.trimmed().validate().is_err());

        let request = UpdateUserRequest {
            email: Some("  ".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.trimmed().validate().is_err());

        let request = UpdateUserRequest {
            username: Some(" ana.k ".to_string()),
            email: Some(" ana@example.com ".to_string()),
            password: None,
        }
        .trimmed();
        assert!(request.validate().is_ok());
        assert_eq!(request.username.as_deref(), Some("ana.k"));
        assert_eq!(request.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn test_add_follower_response_is_camel_case() {
        let json = serde_json::to_value(AddFollowerResponse {
            message: "Follower added successfully".to_string(),
            follower_id: 9,
        })
        .unwrap();
        assert_eq!(json["followerId"], 9);
    }
}
