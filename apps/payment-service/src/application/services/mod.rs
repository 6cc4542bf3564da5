//! Application services.

mod evaluator;

pub use evaluator::{EvaluationOutcome, EvaluatorStats, PaymentEvaluator};
