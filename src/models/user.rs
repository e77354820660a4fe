use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::Claims;

/// A user as known to the identity provider. `id` is the provider's subject.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
}

fn default_active() -> bool {
    true
}

/// Profile data handed over by the login flow.
#[derive(Deserialize, Clone, Debug)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub profile_picture: Option<String>,
}

impl NewUser {
    /// Profile for a caller seen for the first time. Falls back to the local
    /// part of the email when the token carries no display name.
    pub fn from_claims(claims: &Claims) -> Self {
        let name = claims
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| claims.email.split('@').next().filter(|n| !n.is_empty()))
            .unwrap_or(claims.sub.as_str())
            .to_string();

        NewUser {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            name,
            profile_picture: claims.picture.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub profile_picture: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub profile_picture: Option<String>,
    pub created_at: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            email: u.email,
            name: u.name,
            profile_picture: u.profile_picture,
            created_at: u.created_at.to_rfc3339(),
            is_admin: u.is_admin,
        }
    }
}
