pub mod auth_service;
pub mod game_service;
pub mod question_generator;

pub use auth_service::{AuthService, AuthSession, RefreshedTokens};
pub use game_service::GameService;
pub use question_generator::QuestionGenerator;
