use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::domain::question::Question;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameSession {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub questions: Vec<Question>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl GameSession {
    pub fn new(user_id: &str, questions: Vec<Question>) -> Self {
        let now = Utc::now();

        GameSession {
            // Generated app side so the id is known before the insert
            id: Some(ObjectId::new()),
            user_id: user_id.to_string(),
            questions,
            score: 0,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.as_ref().map(|oid| oid.to_hex()).unwrap_or_default()
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    /// Score derived from the stored answers rather than the cached field.
    pub fn computed_score(&self) -> i32 {
        self.questions.iter().filter(|q| q.is_correct).count() as i32
    }
}
