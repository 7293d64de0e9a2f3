use crate::error::AppError;
use crate::models::{Role, User};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Lifetime of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: String,
    /// Username at issuance.
    pub usr: String,
    /// Role at issuance.
    pub role: Role,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and validates HS256-signed bearer tokens.
///
/// The signing secret is injected once at startup. Validation pins the algorithm to
/// HS256, so a token declaring any other `alg` is rejected before its signature is
/// looked at.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Creates a token service for `secret`.
    ///
    /// Returns `AppError::Unconfigured` if the secret is empty.
    pub fn new(secret: &str) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Unconfigured("JWT_SECRET not set".into()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Generates a token for `user`, expiring 24 hours from now.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::hours(TOKEN_TTL_HOURS))
            .ok_or_else(|| AppError::Infrastructure("token expiry out of range".into()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            usr: user.username.clone(),
            role: user.role,
            exp: expiration,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Infrastructure(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature, algorithm and expiry and returns its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("rejected bearer token: {:?}", e.kind());
                AppError::from(e)
            })
    }
}
