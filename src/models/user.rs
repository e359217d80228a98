//! User model and authentication types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short user representation embedded in borrowing responses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_password_confirmation"))]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required"))]
    pub name: String,
    #[validate(email(message = "The email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "The password must be at least 8 characters"))]
    pub password: String,
    pub password_confirmation: String,
}

fn validate_password_confirmation(req: &RegisterRequest) -> Result<(), ValidationError> {
    if req.password != req.password_confirmation {
        let mut err = ValidationError::new("password");
        err.message = Some("The password confirmation does not match".into());
        return Err(err);
    }
    Ok(())
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// JWT claims carried by every authenticated request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Email of the authenticated user
    pub sub: String,
    pub user_id: i32,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_token_round_trip() {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: "alice@example.org".to_string(),
            user_id: 42,
            name: "Alice".to_string(),
            exp: now + 3600,
            iat: now,
        };

        let token = claims.create_token("test-secret").unwrap();
        let parsed = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(parsed.user_id, 42);
        assert_eq!(parsed.sub, "alice@example.org");

        assert!(UserClaims::from_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn test_register_password_confirmation() {
        let req = RegisterRequest {
            name: "Alice".to_string(),
            email: "alice@example.org".to_string(),
            password: "correcthorse".to_string(),
            password_confirmation: "correcthorsE".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
