pub mod game_session;
pub mod question;
pub mod user;

pub use game_session::GameSession;
pub use question::{Operator, Question};
pub use user::{RefreshTokenRecord, User};
