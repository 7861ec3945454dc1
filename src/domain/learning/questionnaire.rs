//! Self-report questionnaire scoring.
//!
//! A shortened Index of Learning Styles: five two-option questions per
//! axis, each answer worth +1 (first pole) or -1 (second pole). The sum is
//! scaled to the ±11 range.

use serde::{Deserialize, Serialize};

use super::dimensions::{DimensionConfidence, DimensionScores, FslsmDimension, StyleEstimate, SCORE_BOUND};
use crate::domain::foundation::ValidationError;

/// Questions asked per axis.
pub const QUESTIONS_PER_DIMENSION: usize = 5;

/// One answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireAnswer {
    pub dimension: FslsmDimension,
    /// +1 for the first pole, -1 for the second.
    pub value: i8,
}

/// A validated set of answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionnaireResponses {
    answers: Vec<QuestionnaireAnswer>,
}

impl QuestionnaireResponses {
    /// Validates answers: at least one, each ±1, at most five per axis.
    pub fn new(answers: Vec<QuestionnaireAnswer>) -> Result<Self, ValidationError> {
        if answers.is_empty() {
            return Err(ValidationError::empty_field("answers"));
        }
        if let Some(bad) = answers.iter().find(|a| a.value != 1 && a.value != -1) {
            return Err(ValidationError::out_of_range("value", -1, 1, i64::from(bad.value)));
        }
        for dimension in FslsmDimension::ALL {
            let count = answers.iter().filter(|a| a.dimension == dimension).count();
            if count > QUESTIONS_PER_DIMENSION {
                return Err(ValidationError::invalid_format(
                    "answers",
                    format!(
                        "{} has {} answers, at most {} allowed",
                        dimension.key(),
                        count,
                        QUESTIONS_PER_DIMENSION
                    ),
                ));
            }
        }
        Ok(Self { answers })
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Scales each axis sum by `11 / 5`; self-report gets full confidence.
    pub fn score(&self) -> StyleEstimate {
        let scale = f64::from(SCORE_BOUND) / QUESTIONS_PER_DIMENSION as f64;
        let axis = |dimension: FslsmDimension| -> f64 {
            let sum: i32 = self
                .answers
                .iter()
                .filter(|a| a.dimension == dimension)
                .map(|a| i32::from(a.value))
                .sum();
            f64::from(sum) * scale
        };

        StyleEstimate {
            dimensions: DimensionScores::from_raw(
                axis(FslsmDimension::ActiveReflective),
                axis(FslsmDimension::SensingIntuitive),
                axis(FslsmDimension::VisualVerbal),
                axis(FslsmDimension::SequentialGlobal),
            ),
            confidence: DimensionConfidence::uniform(1.0),
        }
    }
}
