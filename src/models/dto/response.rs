use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::domain::{GameSession, Question, User};

/// The client-facing view of a user. Password hash and refresh-token list
/// never leave the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    pub phone_number: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id_hex(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            profile_picture_url: user.profile_picture_url.clone(),
            birthdate: user.birthdate,
            phone_number: user.phone_number.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub success: bool,
}

/// One question as shown while the game is running: no correct answer, no
/// grading state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPrompt {
    pub id: String,
    pub a: u8,
    pub op: String,
    pub b: u8,
    pub choices: Vec<f64>,
}

impl From<&Question> for QuestionPrompt {
    fn from(question: &Question) -> Self {
        QuestionPrompt {
            id: question.id.clone(),
            a: question.a,
            op: question.op.symbol().to_string(),
            b: question.b,
            choices: question.choices.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStartResponse {
    pub game_id: String,
    pub questions: Vec<QuestionPrompt>,
}

impl From<&GameSession> for GameStartResponse {
    fn from(session: &GameSession) -> Self {
        GameStartResponse {
            game_id: session.id_hex(),
            questions: session.questions.iter().map(QuestionPrompt::from).collect(),
        }
    }
}

/// Mid-game progress for one question: how it was answered, but never what
/// the right answer is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionProgress {
    pub id: String,
    pub a: u8,
    pub op: String,
    pub b: u8,
    pub choices: Vec<f64>,
    pub selected: Option<f64>,
    pub is_correct: bool,
    pub timed_out: bool,
}

impl From<&Question> for QuestionProgress {
    fn from(question: &Question) -> Self {
        QuestionProgress {
            id: question.id.clone(),
            a: question.a,
            op: question.op.symbol().to_string(),
            b: question.b,
            choices: question.choices.clone(),
            selected: question.selected,
            is_correct: question.is_correct,
            timed_out: question.timed_out,
        }
    }
}

/// Full question detail, including grading state. Used once a session is
/// being reviewed rather than played.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub id: String,
    pub a: u8,
    pub op: String,
    pub b: u8,
    pub choices: Vec<f64>,
    pub correct_answer: f64,
    pub selected: Option<f64>,
    pub is_correct: bool,
    pub timed_out: bool,
}

impl From<&Question> for QuestionDetail {
    fn from(question: &Question) -> Self {
        QuestionDetail {
            id: question.id.clone(),
            a: question.a,
            op: question.op.symbol().to_string(),
            b: question.b,
            choices: question.choices.clone(),
            correct_answer: question.correct_answer,
            selected: question.selected,
            is_correct: question.is_correct,
            timed_out: question.timed_out,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameProgressView {
    pub id: String,
    pub user_id: String,
    pub questions: Vec<QuestionProgress>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&GameSession> for GameProgressView {
    fn from(session: &GameSession) -> Self {
        GameProgressView {
            id: session.id_hex(),
            user_id: session.user_id.clone(),
            questions: session
                .questions
                .iter()
                .map(QuestionProgress::from)
                .collect(),
            score: session.score,
            created_at: session.created_at,
            modified_at: session.modified_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSessionView {
    pub id: String,
    pub user_id: String,
    pub questions: Vec<QuestionDetail>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&GameSession> for GameSessionView {
    fn from(session: &GameSession) -> Self {
        GameSessionView {
            id: session.id_hex(),
            user_id: session.user_id.clone(),
            questions: session.questions.iter().map(QuestionDetail::from).collect(),
            score: session.score,
            created_at: session.created_at,
            modified_at: session.modified_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameQuestionsResponse {
    pub game: GameProgressView,
}

#[derive(Debug, Serialize)]
pub struct GameResultResponse {
    pub game: GameSessionView,
    pub score: i32,
}
