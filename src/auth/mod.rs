pub mod oauth;
pub mod pkce;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::types::Rol;

/// Session token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: Rol,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, name: String, role: Rol) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            name,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid session token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

fn secret() -> Result<&'static [u8], JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret.as_bytes())
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret()?);
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the embedded claims
pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret()?);
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Rol) -> Claims {
        Claims::new(Uuid::new_v4(), "tecnico@accesspoint.cl".into(), "Técnico".into(), role)
    }

    #[test]
    fn round_trips_role_claim() {
        let original = claims(Rol::Admin);
        let token = generate_jwt(&original).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, original.sub);
        assert_eq!(decoded.role, Rol::Admin);
        assert_eq!(decoded.email, "tecnico@accesspoint.cl");
    }

    #[test]
    fn rejects_tampered_token() {
        let token = generate_jwt(&claims(Rol::Tecnico)).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "c2lnbmF0dXJl";
        assert!(validate_jwt(&parts.join(".")).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let mut expired = claims(Rol::Tecnico);
        expired.exp = Utc::now().timestamp() - 3600;
        let token = generate_jwt(&expired).unwrap();
        assert!(matches!(validate_jwt(&token), Err(JwtError::InvalidToken(_))));
    }
}
