//! Deterministic quiz scoring: weighted tally, display normalization, winner resolution,
//! and dual-axis ranking.

mod config;
pub mod normalize;
mod policy;
mod quiz;
pub mod resolve;
mod result;
pub mod tally;
pub mod vector;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{QuizShape, ResolutionMode, ScoringProfile};
pub use normalize::{Normalizer, PerceptualCurve, DEFAULT_DISPLAY_SCALE};
pub use policy::ScoringRejection;
pub use quiz::{
    AnswerSet, Question, Quiz, QuizContent, QuizOption, QuizProgress, ResultEntry, ScoreMap,
};
pub use resolve::{leading_key, Resolution, TieBreak, WinnerResolver};
pub use result::{AxisBreakdown, ScoreOutcome, ScoredResult};
pub use tally::Tally;
pub use vector::{rank, ranked_summary, split_by_prefix, LabelLookup, RankedEntry, SplitVectors};

/// Stateless scorer turning a quiz and an answer set into a [`ScoreOutcome`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    normalizer: Normalizer,
}

impl ScoringEngine {
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn score(&self, quiz: &Quiz, answers: &AnswerSet) -> ScoreOutcome {
        let tally = match tally::tally(quiz, answers) {
            Ok(tally) => tally,
            Err(rejection) => return ScoreOutcome::Rejected(rejection),
        };

        let Some(resolution) = WinnerResolver::new(quiz).resolve(&tally, answers) else {
            return ScoreOutcome::Rejected(ScoringRejection::NoResults);
        };

        let result_totals = self.display_totals(quiz, &tally);
        ScoreOutcome::Scored(ScoredResult::assemble(
            quiz,
            tally,
            resolution,
            result_totals,
        ))
    }

    /// Chart totals for a tally, following the quiz's shape.
    pub fn display_totals(&self, quiz: &Quiz, tally: &Tally) -> ScoreMap {
        let keys = quiz.result_keys();
        match quiz.scoring.shape {
            QuizShape::Preference => {
                self.normalizer
                    .linear(&tally.totals_raw, &tally.max_raw, &keys)
            }
            QuizShape::SingleAxis | QuizShape::DualAxis { .. } => {
                self.normalizer
                    .to_object_keyed(&tally.totals_raw, Some(&tally.max_raw), &keys)
            }
        }
    }
}
