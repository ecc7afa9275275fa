//! Session models for identity-provider authentication.

use serde::{Deserialize, Serialize};

/// Claims carried by an identity-provider session JWT.
///
/// `sub` is the user id shared with `profiles.id` and every owned row's
/// `user_id`. The optional profile claims feed lazy profile creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iss: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// The authenticated caller, produced by the session extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl AuthenticatedUser {
    /// Ownership check used by every per-resource handler.
    pub fn owns(&self, owner_id: &str) -> bool {
        self.user_id == owner_id
    }
}

impl From<SessionClaims> for AuthenticatedUser {
    fn from(c: SessionClaims) -> Self {
        AuthenticatedUser {
            user_id: c.sub,
            email: c.email,
            name: c.name,
            avatar_url: c.picture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_is_exact_string_equality() {
        let user = AuthenticatedUser {
            user_id: "user_abc".into(),
            email: None,
            name: None,
            avatar_url: None,
        };

        assert!(user.owns("user_abc"));
        assert!(!user.owns("user_abd"));
        assert!(!user.owns("USER_ABC"));
    }
}
