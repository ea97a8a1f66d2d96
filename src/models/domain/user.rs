use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One entry in a user's active refresh-token list. Only the SHA-256 digest
/// of the JWT is stored; the raw token never reaches the database.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn new(raw_token: &str) -> Self {
        Self {
            token_hash: hash_token(raw_token),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub refresh_tokens: Vec<RefreshTokenRecord>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        phone_number: &str,
    ) -> Self {
        let now = Utc::now();

        User {
            // Generated app side so the id is known before the insert
            id: Some(ObjectId::new()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            phone_number: phone_number.to_string(),
            profile_picture_url: None,
            birthdate: None,
            refresh_tokens: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.as_ref().map(|oid| oid.to_hex()).unwrap_or_default()
    }

    pub fn has_refresh_token(&self, token_hash: &str) -> bool {
        self.refresh_tokens
            .iter()
            .any(|record| record.token_hash == token_hash)
    }
}

pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
impl User {
    pub fn test_user(email: &str) -> Self {
        User::new("Test", "User", email, "$2b$04$test-hash", "9876543210")
    }
}
