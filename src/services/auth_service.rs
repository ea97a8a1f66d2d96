use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::TokenService,
    errors::{AppError, AppResult},
    models::{
        domain::user::{hash_token, RefreshTokenRecord, User},
        dto::request::{LoginRequest, RegisterRequest},
    },
    repositories::UserRepository,
};

/// Tokens and user returned from register/login. The refresh token travels
/// to the client in a cookie, not in the response body.
#[derive(Debug)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    hash_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>, hash_cost: u32) -> Self {
        Self {
            users,
            tokens,
            hash_cost,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthSession> {
        let mut request = request;
        request.email = normalize_email(&request.email);
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = bcrypt::hash(&request.password, self.hash_cost)
            .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))?;

        let mut user = User::new(
            &request.first_name,
            &request.last_name,
            &request.email,
            &password_hash,
            &request.phone_number,
        );
        user.birthdate = request.birthdate;
        user.profile_picture_url = request.profile_picture_url.clone();

        // Losing an insert race past the pre-check still surfaces as
        // DuplicateEmail via the unique email index.
        let user = self.users.create(user).await?;

        self.issue_session(user).await
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthSession> {
        let mut request = request;
        request.email = normalize_email(&request.email);
        request.validate()?;

        // Unknown email and wrong password produce the same error, so the
        // response never reveals whether an account exists.
        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_ok = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Failed to verify password: {}", e)))?;
        if !password_ok {
            return Err(AppError::InvalidCredentials);
        }

        self.issue_session(user).await
    }

    /// Rotate a presented refresh token: the old one leaves the user's list
    /// and a fresh pair is issued. A token that is valid but absent from the
    /// list (logged out, or already rotated by a parallel request) is
    /// rejected as not recognized.
    pub async fn refresh(&self, presented_token: &str) -> AppResult<RefreshedTokens> {
        let claims = self.tokens.verify_refresh_token(presented_token)?;
        let old_hash = hash_token(presented_token);

        let user = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::TokenNotRecognized)?;

        if !user.has_refresh_token(&old_hash) {
            return Err(AppError::TokenNotRecognized);
        }

        let user_id = user.id_hex();
        let access_token = self.tokens.issue_access_token(&user_id, &user.email)?;
        let refresh_token = self.tokens.issue_refresh_token(&user_id, &user.email)?;

        let rotated = self
            .users
            .rotate_refresh_token(&user_id, &old_hash, RefreshTokenRecord::new(&refresh_token))
            .await?;
        if !rotated {
            // Another request rotated this token between the read and the
            // swap; that request is the single winner.
            return Err(AppError::TokenNotRecognized);
        }

        Ok(RefreshedTokens {
            access_token,
            refresh_token,
        })
    }

    /// Revoke a refresh token. Idempotent: an already-removed, expired, or
    /// garbled token leaves the store unchanged.
    pub async fn logout(&self, presented_token: &str) -> AppResult<()> {
        let claims = match self.tokens.verify_refresh_token(presented_token) {
            Ok(claims) => claims,
            // A token that no longer verifies cannot be matched to a user
            Err(_) => return Ok(()),
        };

        self.users
            .remove_refresh_token(&claims.sub, &hash_token(presented_token))
            .await
    }

    async fn issue_session(&self, user: User) -> AppResult<AuthSession> {
        let user_id = user.id_hex();
        let access_token = self.tokens.issue_access_token(&user_id, &user.email)?;
        let refresh_token = self.tokens.issue_refresh_token(&user_id, &user.email)?;

        self.users
            .append_refresh_token(&user_id, RefreshTokenRecord::new(&refresh_token))
            .await?;

        Ok(AuthSession {
            access_token,
            refresh_token,
            user,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
