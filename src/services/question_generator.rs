use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Operator, Question},
};

pub const QUESTIONS_PER_GAME: usize = 10;
pub const CHOICES_PER_QUESTION: usize = 4;
pub const OPERAND_MAX: u8 = 9;

// Generous upper bound on sampling loops. The sample spaces are small enough
// that hitting this indicates a broken RNG, not bad luck.
const MAX_GENERATION_ATTEMPTS: usize = 1000;

pub struct QuestionGenerator;

impl QuestionGenerator {
    /// Produce the ten questions of one game. Equations are distinct by
    /// their `(a, op, b)` triple; collisions are resampled.
    pub fn generate_set<R: Rng + ?Sized>(rng: &mut R) -> AppResult<Vec<Question>> {
        let mut questions = Vec::with_capacity(QUESTIONS_PER_GAME);
        let mut seen: HashSet<(u8, Operator, u8)> = HashSet::new();
        let mut attempts = 0;

        while questions.len() < QUESTIONS_PER_GAME {
            attempts += 1;
            if attempts > MAX_GENERATION_ATTEMPTS {
                return Err(AppError::InternalError(
                    "Question generation failed to converge".to_string(),
                ));
            }

            let question = Self::generate_one(rng)?;
            if seen.insert(question.equation()) {
                questions.push(question);
            }
        }

        Ok(questions)
    }

    fn generate_one<R: Rng + ?Sized>(rng: &mut R) -> AppResult<Question> {
        let a = rng.random_range(0..=OPERAND_MAX);
        let mut b = rng.random_range(0..=OPERAND_MAX);
        let op = Operator::ALL[rng.random_range(0..Operator::ALL.len())];

        // A zero divisor is coerced to one rather than resampled
        if op == Operator::Divide && b == 0 {
            b = 1;
        }

        let correct = op.apply(a, b);
        let choices = Self::build_choices(rng, correct)?;

        Ok(Question::new(a, op, b, choices))
    }

    /// The correct answer plus distractors drawn from [0,19], kept distinct,
    /// in shuffled order.
    fn build_choices<R: Rng + ?Sized>(rng: &mut R, correct: f64) -> AppResult<Vec<f64>> {
        let mut choices = vec![correct];
        let mut attempts = 0;

        while choices.len() < CHOICES_PER_QUESTION {
            attempts += 1;
            if attempts > MAX_GENERATION_ATTEMPTS {
                return Err(AppError::InternalError(
                    "Choice generation failed to converge".to_string(),
                ));
            }

            let candidate = f64::from(rng.random_range(0..20u8));
            if !choices.contains(&candidate) {
                choices.push(candidate);
            }
        }

        choices.shuffle(rng);
        Ok(choices)
    }
}
