use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by both access and refresh tokens. The two token kinds are
/// told apart by which secret signed them, not by a payload marker.
///
/// Timestamps are whole seconds, so two tokens minted for the same user
/// within one second are byte-identical. The stored token list deduplicates
/// digests for exactly this reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub email: String,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn new(user_id: &str, email: &str, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}
