use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role carried in the identity provider's token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Admin,
}

/// Identity attached to every authorized request.
///
/// The token issuer is external; these claims are trusted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Email lowercased, the form share entries are stored and matched in
    pub fn normalized_email(&self) -> String {
        self.email.to_lowercase()
    }
}

/// JWT claims expected from the identity provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    pub exp: u64,
}
