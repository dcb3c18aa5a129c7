//! Open Condition Bounded Context
//!
//! Decides whether a new opening order may be submitted this cycle.

mod evaluator;
mod settings;

pub use evaluator::OpenConditionEvaluator;
pub use settings::OpenSettings;
