use serde::{Deserialize, Serialize};

use super::policy::ScoringRejection;
use super::quiz::{AnswerSet, Quiz, ScoreMap};

/// Raw per-key totals and per-key ceilings accumulated from one answer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub totals_raw: ScoreMap,
    pub max_raw: ScoreMap,
    pub answered_core: usize,
}

/// Gate on the quiz's minimum, then accumulate.
///
/// The gate is evaluated before any totals are built, so a rejected answer set never
/// produces partial scores.
pub fn tally(quiz: &Quiz, answers: &AnswerSet) -> Result<Tally, ScoringRejection> {
    if quiz.questions().is_empty() {
        return Err(ScoringRejection::NoQuestions);
    }

    let progress = quiz.progress(answers);
    if !progress.is_complete() {
        return Err(ScoringRejection::InsufficientAnswers {
            required: progress.required,
            answered: progress.answered_core,
        });
    }

    Ok(accumulate(quiz, answers))
}

/// Ungated accumulation over every answered question.
///
/// Every declared key is present in both maps. Weights toward undeclared keys are ignored.
/// Only answered questions add to `max_raw`, each contributing its own per-key ceiling.
pub fn accumulate(quiz: &Quiz, answers: &AnswerSet) -> Tally {
    let keys = quiz.result_keys();
    let mut totals_raw: ScoreMap = keys.iter().map(|key| (key.to_string(), 0.0)).collect();
    let mut max_raw = totals_raw.clone();
    let mut answered_core = 0;

    for (question, option) in quiz.answered(answers) {
        if !question.optional {
            answered_core += 1;
        }

        for (key, weight) in &option.weights {
            if !weight.is_finite() {
                continue;
            }
            if let Some(total) = totals_raw.get_mut(key) {
                *total += weight;
            }
        }

        for key in &keys {
            if let Some(ceiling) = max_raw.get_mut(*key) {
                *ceiling += question.ceiling(key);
            }
        }
    }

    Tally {
        totals_raw,
        max_raw,
        answered_core,
    }
}
