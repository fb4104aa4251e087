use serde::{Deserialize, Serialize};

/// Expected "not yet" outcomes of a scoring call. These are values, not faults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringRejection {
    #[error("Please answer at least {required} questions.")]
    InsufficientAnswers { required: usize, answered: usize },
    #[error("No questions.")]
    NoQuestions,
    #[error("No results.")]
    NoResults,
}

impl ScoringRejection {
    pub fn reason(&self) -> String {
        self.to_string()
    }

    /// Questions still needed before the quiz can be scored, when that is the blocker.
    pub fn remaining(&self) -> Option<usize> {
        match self {
            ScoringRejection::InsufficientAnswers { required, answered } => {
                Some(required.saturating_sub(*answered))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_match_wire_contract() {
        assert_eq!(ScoringRejection::NoQuestions.reason(), "No questions.");
        let rejection = ScoringRejection::InsufficientAnswers {
            required: 5,
            answered: 3,
        };
        assert_eq!(rejection.reason(), "Please answer at least 5 questions.");
        assert_eq!(rejection.remaining(), Some(2));
        assert_eq!(ScoringRejection::NoResults.remaining(), None);
    }
}
