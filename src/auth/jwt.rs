use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::{auth::claims::Claims, config::Config, errors::AppError};

/// Everything that can go wrong while minting or checking a token. Callers
/// match on this instead of digging through jsonwebtoken's error kinds.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
    #[error("token invalid")]
    Invalid,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(e) => AppError::InternalError(format!("Failed to sign JWT: {}", e)),
            TokenError::Expired => AppError::ExpiredToken,
            TokenError::Invalid => AppError::InvalidToken,
        }
    }
}

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }
}

/// Issues and verifies the two token kinds. Access and refresh tokens are
/// signed with distinct secrets, so one can never pass for the other.
#[derive(Clone)]
pub struct TokenService {
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

impl TokenService {
    pub fn new(
        access_secret: &SecretString,
        refresh_secret: &SecretString,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        Self {
            access_keys: KeyPair::from_secret(access_secret),
            refresh_keys: KeyPair::from_secret(refresh_secret),
            validation: Validation::default(),
            access_ttl_minutes,
            refresh_ttl_days,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_access_secret,
            &config.jwt_refresh_secret,
            config.access_token_ttl_minutes,
            config.refresh_token_ttl_days,
        )
    }

    pub fn issue_access_token(&self, user_id: &str, email: &str) -> Result<String, TokenError> {
        self.issue(
            &self.access_keys,
            user_id,
            email,
            Duration::minutes(self.access_ttl_minutes),
        )
    }

    pub fn issue_refresh_token(&self, user_id: &str, email: &str) -> Result<String, TokenError> {
        self.issue(
            &self.refresh_keys,
            user_id,
            email,
            Duration::days(self.refresh_ttl_days),
        )
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(&self.access_keys, token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(&self.refresh_keys, token)
    }

    pub fn refresh_ttl_days(&self) -> i64 {
        self.refresh_ttl_days
    }

    fn issue(
        &self,
        keys: &KeyPair,
        user_id: &str,
        email: &str,
        validity: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, email, validity);

        encode(&Header::default(), &claims, &keys.encoding).map_err(TokenError::Signing)
    }

    fn verify(&self, keys: &KeyPair, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
