use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// Payload of a bearer token. `id` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

/// HMAC-SHA256 signing and verification keys for bearer tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_hours: u64,
}

impl TokenKeys {
    pub fn new(secret: &[u8], lifetime_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime_hours,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        match auth.token_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Self::new(secret.as_bytes(), auth.token_hours),
            _ => {
                tracing::warn!(
                    "No token secret configured; using a random one. Tokens will not survive a restart."
                );
                Self::new(generate_secret().as_bytes(), auth.token_hours)
            }
        }
    }

    /// Issue a signed token for a user.
    pub fn issue(&self, user_id: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = i64::try_from(self.lifetime_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Token lifetime of {} hours is out of range",
                    self.lifetime_hours
                ))
            })?;
        let claims = Claims {
            id: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> AppResult<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("Rejected bearer token: {}", e);
                AppError::Unauthorized
            })
    }
}

/// Generate a cryptographically random 32-byte hex secret.
fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
