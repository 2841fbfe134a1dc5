use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AuthenticatedUser, Claims};

/// Validates bearer tokens minted by the external identity provider.
///
/// Tokens are HS256-signed with a shared secret; the claims (`sub`, `email`,
/// `role`) are taken at face value.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(AuthenticatedUser {
            id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use jsonwebtoken::{EncodingKey, Header};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn encode(claims: &Claims, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn unix_now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn accepts_valid_token() {
        let validator = JwtValidator::new(&test_config());
        let token = encode(
            &Claims {
                sub: "user-1".to_string(),
                email: "Alice@Example.com".to_string(),
                role: Role::Admin,
                exp: unix_now() + 3600,
            },
            "test-secret",
        );

        let user = validator.validate_token(&token).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.email, "Alice@Example.com");
        assert!(user.is_admin());
    }

    #[test]
    fn rejects_expired_token() {
        let validator = JwtValidator::new(&test_config());
        let token = encode(
            &Claims {
                sub: "user-1".to_string(),
                email: "alice@example.com".to_string(),
                role: Role::Member,
                exp: unix_now() - 3600,
            },
            "test-secret",
        );

        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let validator = JwtValidator::new(&test_config());
        let token = encode(
            &Claims {
                sub: "user-1".to_string(),
                email: "alice@example.com".to_string(),
                role: Role::Member,
                exp: unix_now() + 3600,
            },
            "another-secret",
        );

        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        let validator = JwtValidator::new(&test_config());
        assert!(validator.validate_token("not-a-jwt").is_err());
    }
}
