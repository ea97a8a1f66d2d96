//! Shared fixtures for the integration tests: in-memory repositories that
//! honor the same atomicity contract as the MongoDB implementations, and an
//! application builder that mounts the production route table.

#![allow(dead_code)] // each test binary uses a different slice of this module

use std::{collections::HashMap, sync::Arc};

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::Client;
use tokio::sync::RwLock;

use mathsprint_server::{
    app_state::AppState,
    auth::AuthMiddleware,
    config::Config,
    db::Database,
    errors::{AppError, AppResult},
    handlers,
    models::domain::{GameSession, RefreshTokenRecord, User},
    repositories::{AnswerOutcome, GameSessionRepository, UserRepository},
};

pub struct InMemoryUserRepository {
    users_by_email: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users_by_email: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users_by_email.write().await;
        if users.contains_key(&user.email) {
            return Err(AppError::DuplicateEmail);
        }

        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users_by_email.read().await;
        Ok(users.get(email).cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<User>> {
        let users = self.users_by_email.read().await;
        Ok(users.values().find(|u| u.id_hex() == user_id).cloned())
    }

    async fn append_refresh_token(
        &self,
        user_id: &str,
        record: RefreshTokenRecord,
    ) -> AppResult<()> {
        let mut users = self.users_by_email.write().await;
        if let Some(user) = users.values_mut().find(|u| u.id_hex() == user_id) {
            // Appending an already-stored digest is a no-op, mirroring the
            // $ne guard in the Mongo implementation.
            if !user.has_refresh_token(&record.token_hash) {
                user.refresh_tokens.push(record);
                user.modified_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn remove_refresh_token(&self, user_id: &str, token_hash: &str) -> AppResult<()> {
        let mut users = self.users_by_email.write().await;
        if let Some(user) = users.values_mut().find(|u| u.id_hex() == user_id) {
            user.refresh_tokens.retain(|r| r.token_hash != token_hash);
            user.modified_at = Utc::now();
        }
        Ok(())
    }

    async fn has_refresh_token(&self, user_id: &str, token_hash: &str) -> AppResult<bool> {
        let users = self.users_by_email.read().await;
        Ok(users
            .values()
            .find(|u| u.id_hex() == user_id)
            .map(|u| u.has_refresh_token(token_hash))
            .unwrap_or(false))
    }

    async fn rotate_refresh_token(
        &self,
        user_id: &str,
        old_token_hash: &str,
        replacement: RefreshTokenRecord,
    ) -> AppResult<bool> {
        let mut users = self.users_by_email.write().await;
        let Some(user) = users.values_mut().find(|u| u.id_hex() == user_id) else {
            return Ok(false);
        };

        // Same compare-and-swap contract as the Mongo implementation: the
        // swap only happens while the old digest is still in the list.
        let position = user
            .refresh_tokens
            .iter()
            .position(|r| r.token_hash == old_token_hash);

        match position {
            Some(index) => {
                user.refresh_tokens[index] = replacement;
                user.modified_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryGameSessionRepository {
    sessions: Arc<RwLock<HashMap<String, GameSession>>>,
}

impl InMemoryGameSessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl GameSessionRepository for InMemoryGameSessionRepository {
    async fn create(&self, session: GameSession) -> AppResult<GameSession> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id_hex(), session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, game_id: &str) -> AppResult<Option<GameSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(game_id).cloned())
    }

    async fn apply_answer(
        &self,
        game_id: &str,
        question_id: &str,
        outcome: AnswerOutcome,
    ) -> AppResult<bool> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(game_id) else {
            return Ok(false);
        };
        let Some(question) = session.questions.iter_mut().find(|q| q.id == question_id) else {
            return Ok(false);
        };

        // A settled question never settles again, same as the guarded
        // positional update in the Mongo implementation.
        if question.is_settled() {
            return Ok(false);
        }

        question.selected = outcome.selected;
        question.is_correct = outcome.is_correct;
        question.timed_out = outcome.timed_out;
        session.modified_at = Utc::now();
        Ok(true)
    }

    async fn save_score(&self, game_id: &str, score: i32) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(game_id) {
            session.score = score;
            session.modified_at = Utc::now();
        }
        Ok(())
    }
}

/// Application state wired onto in-memory repositories. The MongoDB client
/// is built but never connected; it only satisfies the state's database
/// handle, which these tests never exercise.
pub async fn test_state() -> (
    Arc<AppState>,
    Arc<InMemoryUserRepository>,
    Arc<InMemoryGameSessionRepository>,
) {
    let client = Client::with_uri_str("mongodb://localhost:27017")
        .await
        .expect("client options should parse");
    let db = Database::from_client(client, "mathsprint-test");

    let users = Arc::new(InMemoryUserRepository::new());
    let games = Arc::new(InMemoryGameSessionRepository::new());
    let state = AppState::build(Config::test_config(), db, users.clone(), games.clone());

    (Arc::new(state), users, games)
}

/// The same route table the production server mounts in `main`.
pub fn build_app(
    state: Arc<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state.clone()))
        .app_data(web::Data::from(state.token_service.clone()))
        .service(handlers::health_check)
        .service(handlers::health_check_ready)
        .service(handlers::health_check_live)
        .service(
            web::scope("/api/auth")
                .service(handlers::register)
                .service(handlers::login)
                .service(handlers::refresh_token)
                .service(handlers::logout),
        )
        .service(
            web::scope("/api/game")
                .wrap(AuthMiddleware)
                .service(handlers::start_game)
                .service(handlers::submit_answer)
                .service(handlers::get_questions)
                .service(handlers::get_result),
        )
}

pub fn make_user(email: &str) -> User {
    User::new("Test", "User", email, "$2b$04$not-a-real-hash", "9876543210")
}
