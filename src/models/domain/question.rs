use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The four arithmetic operators a question can use. Serialized with the
/// symbols the web client renders, including "x" for multiplication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "x")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "x",
            Operator::Divide => "/",
        }
    }

    /// Apply the operator to two operands. Division results are rounded to
    /// two decimal places; the caller must rule out division by zero.
    pub fn apply(self, a: u8, b: u8) -> f64 {
        let (a, b) = (f64::from(a), f64::from(b));

        match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => round2(a / b),
        }
    }
}

/// Round to two decimal places, ties away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Question {
    pub id: String, // assigned at generation, addressed by the answer route
    pub a: u8,
    pub op: Operator,
    pub b: u8,
    pub choices: Vec<f64>,
    pub correct_answer: f64,
    pub selected: Option<f64>,
    pub is_correct: bool,
    pub timed_out: bool,
}

impl Question {
    pub fn new(a: u8, op: Operator, b: u8, choices: Vec<f64>) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            a,
            op,
            b,
            correct_answer: op.apply(a, b),
            choices,
            selected: None,
            is_correct: false,
            timed_out: false,
        }
    }

    /// A question is settled once it has been answered or timed out. Settled
    /// questions take no further answers.
    pub fn is_settled(&self) -> bool {
        self.selected.is_some() || self.timed_out
    }

    pub fn equation(&self) -> (u8, Operator, u8) {
        (self.a, self.op, self.b)
    }
}
