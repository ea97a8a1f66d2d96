pub mod game_repository;
pub mod user_repository;

pub use game_repository::{AnswerOutcome, GameSessionRepository, MongoGameSessionRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
