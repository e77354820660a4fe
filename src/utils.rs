use jsonwebtoken::{decode, encode, errors::Error as JwtError, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct Claims {
    pub sub: String, // user id (identity provider subject)
    pub email: String,
    /// Display name and avatar from the identity provider, used when the
    /// caller is seen for the first time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Issues the bearer token handed to a user once the login flow has verified them.
pub fn generate_jwt(user_id: &str, email: &str, secret: &str, expire_minutes: i64) -> Result<String, JwtError> {
    let now = chrono::Utc::now();
    let expiration = now + chrono::Duration::minutes(expire_minutes);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        name: None,
        picture: None,
        exp: expiration.timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))
}

pub fn validate_jwt(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_subject() {
        let token = generate_jwt("google-123", "fan@example.com", "s3cret", 60).unwrap();
        let claims = validate_jwt(&token, "s3cret").unwrap();
        assert_eq!(claims.sub, "google-123");
        assert_eq!(claims.email, "fan@example.com");
    }

    #[test]
    fn profile_claims_are_optional() {
        let claims = Claims {
            sub: "google-123".to_string(),
            email: "fan@example.com".to_string(),
            name: Some("Fan".to_string()),
            picture: None,
            exp: (chrono::Utc::now().timestamp() + 600) as usize,
            iat: chrono::Utc::now().timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"s3cret")).unwrap();
        let decoded = validate_jwt(&token, "s3cret").unwrap();
        assert_eq!(decoded.name.as_deref(), Some("Fan"));
        assert!(decoded.picture.is_none());

        let plain = validate_jwt(&generate_jwt("google-123", "fan@example.com", "s3cret", 60).unwrap(), "s3cret").unwrap();
        assert!(plain.name.is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_jwt("google-123", "fan@example.com", "s3cret", 60).unwrap();
        assert!(validate_jwt(&token, "other").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_jwt("google-123", "fan@example.com", "s3cret", -120).unwrap();
        assert!(validate_jwt(&token, "s3cret").is_none());
    }
}
