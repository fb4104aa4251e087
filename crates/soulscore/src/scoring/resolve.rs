use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::config::ResolutionMode;
use super::normalize::ratio_of_max;
use super::quiz::{AnswerSet, Quiz, ScoreMap};
use super::tally::Tally;

/// Values closer than this are treated as tied.
const TIE_EPSILON: f64 = 1e-9;

/// Which rule settled the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// A single key held the top value.
    Clear,
    /// Tied keys were separated by how many core answers pushed toward each.
    CoreHits,
    /// The quiz's configured priority list decided.
    Priority,
    /// Nothing else separated the keys; first declared key won.
    DeclaredOrder,
}

/// Winner, its confidence, and every resolvable key ranked best-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub result_key: String,
    pub confidence: f64,
    pub order: Vec<String>,
    pub tie_break: TieBreak,
}

/// Picks the authoritative result for one quiz.
pub struct WinnerResolver<'a> {
    quiz: &'a Quiz,
}

impl<'a> WinnerResolver<'a> {
    pub fn new(quiz: &'a Quiz) -> Self {
        Self { quiz }
    }

    /// Resolve with the quiz's configured mode.
    pub fn resolve(&self, tally: &Tally, answers: &AnswerSet) -> Option<Resolution> {
        self.resolve_with_mode(
            &tally.totals_raw,
            &tally.max_raw,
            answers,
            self.quiz.scoring.mode,
        )
    }

    /// Resolve over the quiz's resolvable keys. `None` only when the quiz declares none.
    pub fn resolve_with_mode(
        &self,
        totals: &ScoreMap,
        max_raw: &ScoreMap,
        answers: &AnswerSet,
        mode: ResolutionMode,
    ) -> Option<Resolution> {
        let metrics: Vec<(&str, f64)> = self
            .quiz
            .resolvable_keys()
            .into_iter()
            .map(|key| (key, metric(totals, max_raw, key, mode)))
            .collect();

        let (top, candidates) = top_candidates(&metrics)?;
        let (winner, tie_break) = self.break_tie(candidates, answers);

        let mut ranked: Vec<(&str, f64)> = metrics
            .iter()
            .copied()
            .filter(|(key, _)| *key != winner)
            .collect();
        ranked.sort_by(|a, b| descending(a.1, b.1));

        let runner_up = ranked.first().map(|(_, value)| *value).unwrap_or(0.0);
        let margin = (top - runner_up).max(0.0);
        let confidence = match mode {
            ResolutionMode::Raw => {
                ratio_of_max(margin, max_raw.get(winner).copied().unwrap_or(0.0))
            }
            ResolutionMode::Ratio => margin,
        }
        .clamp(0.0, 1.0);

        let mut order = Vec::with_capacity(metrics.len());
        order.push(winner.to_string());
        order.extend(ranked.into_iter().map(|(key, _)| key.to_string()));

        Some(Resolution {
            result_key: winner.to_string(),
            confidence,
            order,
            tie_break,
        })
    }

    fn break_tie<'k>(&self, candidates: Vec<&'k str>, answers: &AnswerSet) -> (&'k str, TieBreak) {
        if let [only] = candidates.as_slice() {
            return (*only, TieBreak::Clear);
        }

        let hits: Vec<(&str, usize)> = candidates
            .iter()
            .map(|candidate| (*candidate, self.core_hits(candidate, answers)))
            .collect();
        let most = hits.iter().map(|(_, count)| *count).max().unwrap_or(0);
        let remaining: Vec<&str> = hits
            .into_iter()
            .filter(|(_, count)| *count == most)
            .map(|(key, _)| key)
            .collect();

        if let [only] = remaining.as_slice() {
            return (*only, TieBreak::CoreHits);
        }

        let priority = &self.quiz.scoring.tie_break;
        let prioritized = remaining
            .iter()
            .copied()
            .filter_map(|key| {
                priority
                    .iter()
                    .position(|listed| listed == key)
                    .map(|rank| (rank, key))
            })
            .min_by_key(|(rank, _)| *rank);

        match prioritized {
            Some((_, key)) => (key, TieBreak::Priority),
            // Candidates arrive in declared order.
            None => (remaining[0], TieBreak::DeclaredOrder),
        }
    }

    /// Core questions whose chosen option carries any nonzero weight toward `key`.
    fn core_hits(&self, key: &str, answers: &AnswerSet) -> usize {
        self.quiz
            .answered(answers)
            .filter(|(question, _)| !question.optional)
            .filter(|(_, option)| {
                option
                    .weights
                    .get(key)
                    .is_some_and(|weight| weight.is_finite() && *weight != 0.0)
            })
            .count()
    }
}

/// Key holding the highest value, first in iteration order on ties.
///
/// Used where only a totals map is available and no quiz context applies.
pub fn leading_key(values: &ScoreMap) -> Option<&str> {
    let metrics: Vec<(&str, f64)> = values
        .iter()
        .map(|(key, value)| (key.as_str(), finite_or_zero(*value)))
        .collect();
    top_candidates(&metrics).map(|(_, candidates)| candidates[0])
}

/// Top value and every key within [`TIE_EPSILON`] of it, in input order.
fn top_candidates<'k>(metrics: &[(&'k str, f64)]) -> Option<(f64, Vec<&'k str>)> {
    let top = metrics
        .iter()
        .map(|(_, value)| *value)
        .reduce(f64::max)?;
    let candidates = metrics
        .iter()
        .filter(|(_, value)| top - value <= TIE_EPSILON)
        .map(|(key, _)| *key)
        .collect();
    Some((top, candidates))
}

fn metric(totals: &ScoreMap, max_raw: &ScoreMap, key: &str, mode: ResolutionMode) -> f64 {
    let total = finite_or_zero(totals.get(key).copied().unwrap_or(0.0));
    match mode {
        ResolutionMode::Raw => total,
        ResolutionMode::Ratio => ratio_of_max(total, max_raw.get(key).copied().unwrap_or(0.0)),
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
