use std::sync::Arc;

use crate::{
    auth::TokenService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        GameSessionRepository, MongoGameSessionRepository, MongoUserRepository, UserRepository,
    },
    services::{AuthService, GameService},
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub game_service: Arc<GameService>,
    pub token_service: Arc<TokenService>,
    pub config: Arc<Config>,
    pub db: Database,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db));
        user_repository.ensure_indexes().await?;

        let game_repository = Arc::new(MongoGameSessionRepository::new(&db));

        Ok(Self::build(config, db, user_repository, game_repository))
    }

    /// Wire services onto the given repositories. Tests use this with
    /// in-memory repositories instead of a live database.
    pub fn build(
        config: Config,
        db: Database,
        users: Arc<dyn UserRepository>,
        games: Arc<dyn GameSessionRepository>,
    ) -> Self {
        let token_service = Arc::new(TokenService::from_config(&config));
        let auth_service = Arc::new(AuthService::new(
            users,
            token_service.clone(),
            config.bcrypt_cost,
        ));
        let game_service = Arc::new(GameService::new(games));

        Self {
            auth_service,
            game_service,
            token_service,
            config: Arc::new(config),
            db,
        }
    }
}
