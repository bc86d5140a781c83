//! JWT access tokens. Subject is the user id; expiry comes from config.

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Issues a bearer token for the given user id.
pub fn create_access_token(user_id: i64, secret: &str, ttl_minutes: i64) -> Result<String> {
    let exp = (Utc::now() + Duration::minutes(ttl_minutes)).timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to encode access token")
}

/// Validates a bearer token and returns the user id it was issued for.
/// Fails on bad signature, malformed subject, or expiry.
pub fn decode_access_token(token: &str, secret: &str) -> Result<i64> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| anyhow!("invalid access token: {e}"))?;

    data.claims
        .sub
        .parse::<i64>()
        .context("access token subject is not a user id")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = create_access_token(42, SECRET, 60).unwrap();
        assert_eq!(decode_access_token(&token, SECRET).unwrap(), 42);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token(42, SECRET, 60).unwrap();
        assert!(decode_access_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Expiry far enough in the past to clear the default validation leeway.
        let token = create_access_token(42, SECRET, -5).unwrap();
        assert!(decode_access_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(decode_access_token("not.a.jwt", SECRET).is_err());
    }
}
