use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, to_bson},
    Collection,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::GameSession,
};

/// How a question was settled. Written into the session document by
/// `apply_answer`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerOutcome {
    pub selected: Option<f64>,
    pub is_correct: bool,
    pub timed_out: bool,
}

impl AnswerOutcome {
    pub fn answered(selected: f64, is_correct: bool) -> Self {
        Self {
            selected: Some(selected),
            is_correct,
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            selected: None,
            is_correct: false,
            timed_out: true,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameSessionRepository: Send + Sync {
    async fn create(&self, session: GameSession) -> AppResult<GameSession>;
    async fn find_by_id(&self, game_id: &str) -> AppResult<Option<GameSession>>;
    /// Write an outcome into one question, but only while that question is
    /// still unsettled. Returns false when another request got there first.
    async fn apply_answer(
        &self,
        game_id: &str,
        question_id: &str,
        outcome: AnswerOutcome,
    ) -> AppResult<bool>;
    async fn save_score(&self, game_id: &str, score: i32) -> AppResult<()>;
}

pub struct MongoGameSessionRepository {
    collection: Collection<GameSession>,
}

impl MongoGameSessionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("game_sessions");
        Self { collection }
    }
}

#[async_trait]
impl GameSessionRepository for MongoGameSessionRepository {
    async fn create(&self, session: GameSession) -> AppResult<GameSession> {
        self.collection.insert_one(&session).await?;
        Ok(session)
    }

    async fn find_by_id(&self, game_id: &str) -> AppResult<Option<GameSession>> {
        let oid = match ObjectId::parse_str(game_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let session = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(session)
    }

    async fn apply_answer(
        &self,
        game_id: &str,
        question_id: &str,
        outcome: AnswerOutcome,
    ) -> AppResult<bool> {
        let oid = match ObjectId::parse_str(game_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };

        // Matches only while the question is unanswered and not timed out,
        // so a question settles exactly once under concurrent submissions.
        let filter = doc! {
            "_id": oid,
            "questions": {
                "$elemMatch": {
                    "id": question_id,
                    "selected": null,
                    "timed_out": false,
                },
            },
        };
        let update = doc! {
            "$set": {
                "questions.$.selected": to_bson(&outcome.selected)?,
                "questions.$.is_correct": outcome.is_correct,
                "questions.$.timed_out": outcome.timed_out,
                "modified_at": to_bson(&Utc::now())?,
            },
        };

        let result = self.collection.update_one(filter, update).await?;
        Ok(result.matched_count > 0)
    }

    async fn save_score(&self, game_id: &str, score: i32) -> AppResult<()> {
        let oid = match ObjectId::parse_str(game_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(()),
        };

        let update = doc! {
            "$set": {
                "score": score,
                "modified_at": to_bson(&Utc::now())?,
            },
        };

        self.collection.update_one(doc! { "_id": oid }, update).await?;
        Ok(())
    }
}
