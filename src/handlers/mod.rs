pub mod auth_handler;
pub mod game_handler;
pub mod health_handler;

pub use auth_handler::{login, logout, refresh_token, register};
pub use game_handler::{get_questions, get_result, start_game, submit_answer};
pub use health_handler::{health_check, health_check_live, health_check_ready};
