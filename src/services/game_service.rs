use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{GameSession, Question},
        dto::request::AnswerRequest,
    },
    repositories::{AnswerOutcome, GameSessionRepository},
    services::question_generator::QuestionGenerator,
};

pub struct GameService {
    repository: Arc<dyn GameSessionRepository>,
}

impl GameService {
    pub fn new(repository: Arc<dyn GameSessionRepository>) -> Self {
        Self { repository }
    }

    pub async fn start_game(&self, user_id: &str) -> AppResult<GameSession> {
        let questions = {
            // ThreadRng is not Send, so it must not live across the await
            let mut rng = rand::rng();
            QuestionGenerator::generate_set(&mut rng)?
        };

        let session = GameSession::new(user_id, questions);
        self.repository.create(session).await
    }

    /// Grade one answer. A question settles exactly once: later submissions
    /// fail with `AlreadyAnswered`, including ones racing the winner.
    pub async fn submit_answer(
        &self,
        game_id: &str,
        question_id: &str,
        request: &AnswerRequest,
    ) -> AppResult<Question> {
        request.validate()?;

        let session = self
            .repository
            .find_by_id(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

        let question = session
            .question(question_id)
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

        if question.is_settled() {
            return Err(AppError::AlreadyAnswered);
        }

        let outcome = if request.timed_out {
            AnswerOutcome::timed_out()
        } else {
            let selected = request.selected.ok_or_else(|| {
                AppError::ValidationError("Selected answer required unless timed out".to_string())
            })?;
            AnswerOutcome::answered(selected, selected == question.correct_answer)
        };

        let applied = self
            .repository
            .apply_answer(game_id, question_id, outcome.clone())
            .await?;
        if !applied {
            // Lost the settle race against a parallel submission
            return Err(AppError::AlreadyAnswered);
        }

        let mut updated = question.clone();
        updated.selected = outcome.selected;
        updated.is_correct = outcome.is_correct;
        updated.timed_out = outcome.timed_out;
        Ok(updated)
    }

    pub async fn get_game(&self, game_id: &str) -> AppResult<GameSession> {
        self.repository
            .find_by_id(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))
    }

    /// Recompute the score from stored answers, persist it, and return the
    /// session with the fresh value.
    pub async fn get_result(&self, game_id: &str) -> AppResult<(GameSession, i32)> {
        let mut session = self.get_game(game_id).await?;

        let score = session.computed_score();
        self.repository.save_score(&session.id_hex(), score).await?;
        session.score = score;

        Ok((session, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::Operator,
        repositories::game_repository::MockGameSessionRepository,
    };

    fn session_with_questions() -> GameSession {
        let questions = vec![
            Question::new(7, Operator::Add, 5, vec![12.0, 3.0, 8.0, 17.0]),
            Question::new(6, Operator::Divide, 4, vec![1.5, 2.0, 5.0, 9.0]),
        ];
        GameSession::new("64f0c9e2a1b2c3d4e5f60718", questions)
    }

    fn answer(selected: f64) -> AnswerRequest {
        AnswerRequest {
            selected: Some(selected),
            timed_out: false,
        }
    }

    #[tokio::test]
    async fn test_start_game_persists_ten_questions() {
        let mut repo = MockGameSessionRepository::new();
        repo.expect_create()
            .withf(|session: &GameSession| session.questions.len() == 10 && session.score == 0)
            .returning(|session| Ok(session));

        let service = GameService::new(Arc::new(repo));
        let session = service.start_game("user-1").await.unwrap();

        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.questions.len(), 10);
    }

    #[tokio::test]
    async fn test_submit_correct_answer() {
        let session = session_with_questions();
        let game_id = session.id_hex();
        let question_id = session.questions[0].id.clone();

        let mut repo = MockGameSessionRepository::new();
        let found = session.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_apply_answer()
            .withf(|_, _, outcome| {
                outcome.selected == Some(12.0) && outcome.is_correct && !outcome.timed_out
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let service = GameService::new(Arc::new(repo));
        let updated = service
            .submit_answer(&game_id, &question_id, &answer(12.0))
            .await
            .unwrap();

        assert_eq!(updated.selected, Some(12.0));
        assert!(updated.is_correct);
    }

    #[tokio::test]
    async fn test_submit_wrong_answer() {
        let session = session_with_questions();
        let game_id = session.id_hex();
        let question_id = session.questions[0].id.clone();

        let mut repo = MockGameSessionRepository::new();
        let found = session.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_apply_answer()
            .withf(|_, _, outcome| outcome.selected == Some(99.0) && !outcome.is_correct)
            .returning(|_, _, _| Ok(true));

        let service = GameService::new(Arc::new(repo));
        // Grading compares values, not choice membership: 99 is simply wrong
        let updated = service
            .submit_answer(&game_id, &question_id, &answer(99.0))
            .await
            .unwrap();

        assert!(!updated.is_correct);
    }

    #[tokio::test]
    async fn test_submit_grades_rounded_division() {
        let session = session_with_questions();
        let game_id = session.id_hex();
        // 6 / 4 = 1.5
        let question_id = session.questions[1].id.clone();

        let mut repo = MockGameSessionRepository::new();
        let found = session.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_apply_answer()
            .withf(|_, _, outcome| outcome.is_correct)
            .returning(|_, _, _| Ok(true));

        let service = GameService::new(Arc::new(repo));
        let updated = service
            .submit_answer(&game_id, &question_id, &answer(1.5))
            .await
            .unwrap();

        assert!(updated.is_correct);
    }

    #[tokio::test]
    async fn test_submit_timed_out() {
        let session = session_with_questions();
        let game_id = session.id_hex();
        let question_id = session.questions[0].id.clone();

        let mut repo = MockGameSessionRepository::new();
        let found = session.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_apply_answer()
            .withf(|_, _, outcome| {
                outcome.selected.is_none() && !outcome.is_correct && outcome.timed_out
            })
            .returning(|_, _, _| Ok(true));

        let service = GameService::new(Arc::new(repo));
        let updated = service
            .submit_answer(
                &game_id,
                &question_id,
                &AnswerRequest {
                    selected: None,
                    timed_out: true,
                },
            )
            .await
            .unwrap();

        assert!(updated.timed_out);
        assert_eq!(updated.selected, None);
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_body() {
        let service = GameService::new(Arc::new(MockGameSessionRepository::new()));

        let err = service
            .submit_answer(
                "any",
                "any",
                &AnswerRequest {
                    selected: None,
                    timed_out: false,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_submit_unknown_game() {
        let mut repo = MockGameSessionRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = GameService::new(Arc::new(repo));
        let err = service
            .submit_answer("missing", "q", &answer(1.0))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(err.to_string(), "Game not found");
    }

    #[tokio::test]
    async fn test_submit_unknown_question() {
        let session = session_with_questions();
        let game_id = session.id_hex();

        let mut repo = MockGameSessionRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));

        let service = GameService::new(Arc::new(repo));
        let err = service
            .submit_answer(&game_id, "no-such-question", &answer(1.0))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Question not found");
    }

    #[tokio::test]
    async fn test_submit_rejects_settled_question() {
        let mut session = session_with_questions();
        session.questions[0].selected = Some(3.0);
        let game_id = session.id_hex();
        let question_id = session.questions[0].id.clone();

        let mut repo = MockGameSessionRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));

        let service = GameService::new(Arc::new(repo));
        let err = service
            .submit_answer(&game_id, &question_id, &answer(12.0))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyAnswered));
    }

    #[tokio::test]
    async fn test_submit_rejects_timed_out_question() {
        let mut session = session_with_questions();
        session.questions[0].timed_out = true;
        let game_id = session.id_hex();
        let question_id = session.questions[0].id.clone();

        let mut repo = MockGameSessionRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(session.clone())));

        let service = GameService::new(Arc::new(repo));
        let err = service
            .submit_answer(&game_id, &question_id, &answer(12.0))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyAnswered));
    }

    #[tokio::test]
    async fn test_submit_loses_settle_race() {
        let session = session_with_questions();
        let game_id = session.id_hex();
        let question_id = session.questions[0].id.clone();

        let mut repo = MockGameSessionRepository::new();
        let found = session.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        // The question looked open at read time but settled underneath us
        repo.expect_apply_answer().returning(|_, _, _| Ok(false));

        let service = GameService::new(Arc::new(repo));
        let err = service
            .submit_answer(&game_id, &question_id, &answer(12.0))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyAnswered));
    }

    #[tokio::test]
    async fn test_result_recomputes_and_saves_score() {
        let mut session = session_with_questions();
        session.questions[0].selected = Some(12.0);
        session.questions[0].is_correct = true;
        session.questions[1].selected = Some(9.0);
        session.questions[1].is_correct = false;
        session.score = 0; // stale cached value
        let game_id = session.id_hex();

        let mut repo = MockGameSessionRepository::new();
        let found = session.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_save_score()
            .withf(|_, score| *score == 1)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = GameService::new(Arc::new(repo));
        let (result_session, score) = service.get_result(&game_id).await.unwrap();

        assert_eq!(score, 1);
        assert_eq!(result_session.score, 1);
    }

    #[tokio::test]
    async fn test_result_unknown_game() {
        let mut repo = MockGameSessionRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = GameService::new(Arc::new(repo));
        let err = service.get_result("missing").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
