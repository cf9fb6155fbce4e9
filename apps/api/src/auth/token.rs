use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Owning user's id.
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// Issues an HS256 session token for the given user.
pub fn create_token(
    user_id: Uuid,
    secret: &[u8],
    expires_in_seconds: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::seconds(expires_in_seconds)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Decodes and validates a session token, returning the user id it names.
/// Expiry is checked by `Validation::new`. Any failure is an opaque 401.
pub fn decode_token(token: &str, secret: &[u8]) -> Result<Uuid, AppError> {
    let decoded = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::Unauthorized)?;

    Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn test_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, SECRET, 60).unwrap();
        assert_eq!(decode_token(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(Uuid::new_v4(), SECRET, 60).unwrap();
        assert!(decode_token(&token, b"other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_token(Uuid::new_v4(), SECRET, -120).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_token("not.a.jwt", SECRET).is_err());
    }
}
