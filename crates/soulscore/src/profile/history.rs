use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{
    leading_key, AnswerSet, Quiz, ResolutionMode, ScoreMap, ScoredResult, WinnerResolver,
};

/// Persisted shape of one quiz result as the aggregator reads it.
///
/// Older rows may lack an explicit winner and carry only totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_key: Option<String>,
    #[serde(default)]
    pub result_totals: ScoreMap,
    #[serde(default)]
    pub totals_raw: ScoreMap,
    #[serde(default, skip_serializing_if = "ScoreMap::is_empty")]
    pub max_raw: ScoreMap,
}

impl ResultSnapshot {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            result_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn from_totals(totals: ScoreMap) -> Self {
        Self {
            result_totals: totals,
            ..Self::default()
        }
    }

    /// Totals to read when no explicit winner exists: display totals first, raw otherwise.
    pub fn totals(&self) -> &ScoreMap {
        if self.result_totals.is_empty() {
            &self.totals_raw
        } else {
            &self.result_totals
        }
    }

    /// Explicit winner when present, otherwise the highest total.
    ///
    /// Without a quiz this cannot honor resolution mode or tie priority; prefer
    /// [`ResultSnapshot::primary_key_for`] whenever the quiz is known.
    pub fn primary_key(&self) -> Option<&str> {
        self.explicit_key().or_else(|| leading_key(self.totals()))
    }

    /// Explicit winner when present, otherwise the quiz's own resolver over the stored totals.
    ///
    /// Answers are not persisted, so the core-hit step of the tie cascade sees no hits and
    /// ties fall through to the quiz's priority list.
    pub fn primary_key_for(&self, quiz: &Quiz) -> Option<String> {
        if let Some(key) = self.explicit_key() {
            return Some(key.to_string());
        }

        let resolver = WinnerResolver::new(quiz);
        let answers = AnswerSet::new();
        let resolution = match quiz.scoring.mode {
            ResolutionMode::Raw if !self.totals_raw.is_empty() => resolver.resolve_with_mode(
                &self.totals_raw,
                &self.max_raw,
                &answers,
                ResolutionMode::Raw,
            ),
            ResolutionMode::Ratio if !self.totals_raw.is_empty() => {
                let ceilings = if self.max_raw.is_empty() {
                    quiz.core_ceilings()
                } else {
                    self.max_raw.clone()
                };
                resolver.resolve_with_mode(
                    &self.totals_raw,
                    &ceilings,
                    &answers,
                    ResolutionMode::Ratio,
                )
            }
            // Display totals are already scaled against each key's ceiling.
            _ if !self.result_totals.is_empty() => resolver.resolve_with_mode(
                &self.result_totals,
                &self.max_raw,
                &answers,
                ResolutionMode::Raw,
            ),
            _ => None,
        };

        resolution.map(|resolution| resolution.result_key)
    }

    fn explicit_key(&self) -> Option<&str> {
        self.result_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl From<&ScoredResult> for ResultSnapshot {
    fn from(result: &ScoredResult) -> Self {
        Self {
            result_key: Some(result.result_key.clone()),
            result_totals: result.result_totals.clone(),
            totals_raw: result.totals_raw.clone(),
            max_raw: result.max_raw.clone(),
        }
    }
}

/// One stored quiz attempt. Attempts are insert-only; a retake is a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_id: String,
    pub user_id: String,
    pub quiz_slug: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub snapshot: ResultSnapshot,
}

/// Latest attempt per quiz slug, by `(created_at, attempt_id)`.
///
/// The ordering key is total, so the pick does not depend on input order.
pub fn latest_by_slug(attempts: &[AttemptRecord]) -> BTreeMap<String, ResultSnapshot> {
    let mut latest: BTreeMap<&str, &AttemptRecord> = BTreeMap::new();

    for attempt in attempts {
        let newer = match latest.get(attempt.quiz_slug.as_str()) {
            Some(current) => {
                (attempt.created_at, attempt.attempt_id.as_str())
                    > (current.created_at, current.attempt_id.as_str())
            }
            None => true,
        };
        if newer {
            latest.insert(attempt.quiz_slug.as_str(), attempt);
        }
    }

    latest
        .into_iter()
        .map(|(slug, attempt)| (slug.to_string(), attempt.snapshot.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::tally::accumulate;
    use crate::scoring::test_support::two_key_quiz;
    use chrono::TimeZone;

    fn two_key_quiz_in(mode: ResolutionMode) -> Quiz {
        let mut quiz = two_key_quiz();
        quiz.scoring.mode = mode;
        quiz
    }

    fn attempt(id: &str, slug: &str, hour: u32, key: &str) -> AttemptRecord {
        AttemptRecord {
            attempt_id: id.to_string(),
            user_id: "user-1".to_string(),
            quiz_slug: slug.to_string(),
            created_at: Utc
                .with_ymd_and_hms(2025, 3, 14, hour, 0, 0)
                .single()
                .expect("valid timestamp"),
            snapshot: ResultSnapshot::with_key(key),
        }
    }

    #[test]
    fn keeps_newest_attempt_per_slug() {
        let attempts = vec![
            attempt("a1", "attachment-style", 9, "anxious"),
            attempt("a2", "attachment-style", 11, "secure"),
            attempt("a3", "ambiversion", 10, "introvert"),
        ];

        let latest = latest_by_slug(&attempts);

        assert_eq!(latest.len(), 2);
        assert_eq!(latest["attachment-style"].primary_key(), Some("secure"));
        assert_eq!(latest["ambiversion"].primary_key(), Some("introvert"));
    }

    #[test]
    fn same_timestamp_is_settled_by_attempt_id_regardless_of_order() {
        let forward = vec![
            attempt("a1", "ambiversion", 10, "introvert"),
            attempt("a2", "ambiversion", 10, "extrovert"),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(latest_by_slug(&forward), latest_by_slug(&backward));
        assert_eq!(
            latest_by_slug(&forward)["ambiversion"].primary_key(),
            Some("extrovert")
        );
    }

    #[test]
    fn primary_key_falls_back_to_totals() {
        let mut totals = ScoreMap::new();
        totals.insert("avoidant".to_string(), 3.0);
        totals.insert("secure".to_string(), 7.0);

        let snapshot = ResultSnapshot::from_totals(totals.clone());
        assert_eq!(snapshot.primary_key(), Some("secure"));

        let raw_only = ResultSnapshot {
            result_key: Some("  ".to_string()),
            totals_raw: totals,
            ..ResultSnapshot::default()
        };
        assert_eq!(raw_only.primary_key(), Some("secure"));
        assert_eq!(ResultSnapshot::default().primary_key(), None);
    }

    #[test]
    fn quiz_aware_fallback_follows_ratio_mode() {
        let quiz = two_key_quiz_in(ResolutionMode::Ratio);
        let answers = AnswerSet::new().with("Q1", "x").with("Q2", "y");
        let tally = accumulate(&quiz, &answers);

        let snapshot = ResultSnapshot {
            totals_raw: tally.totals_raw.clone(),
            max_raw: tally.max_raw.clone(),
            ..ResultSnapshot::default()
        };
        // Raw leader is B; ratio leader is A.
        assert_eq!(snapshot.primary_key(), Some("B"));
        assert_eq!(snapshot.primary_key_for(&quiz).as_deref(), Some("A"));

        let without_ceilings = ResultSnapshot {
            max_raw: ScoreMap::new(),
            ..snapshot
        };
        assert_eq!(without_ceilings.primary_key_for(&quiz).as_deref(), Some("A"));
    }

    #[test]
    fn quiz_aware_fallback_uses_priority_on_ties() {
        let mut quiz = two_key_quiz_in(ResolutionMode::Raw);
        quiz.scoring.tie_break = vec!["B".to_string()];
        let mut totals = ScoreMap::new();
        totals.insert("A".to_string(), 2.0);
        totals.insert("B".to_string(), 2.0);

        let snapshot = ResultSnapshot {
            totals_raw: totals,
            ..ResultSnapshot::default()
        };
        assert_eq!(snapshot.primary_key(), Some("A"));
        assert_eq!(snapshot.primary_key_for(&quiz).as_deref(), Some("B"));
        assert_eq!(ResultSnapshot::default().primary_key_for(&quiz), None);
        assert_eq!(
            ResultSnapshot::with_key("A").primary_key_for(&quiz).as_deref(),
            Some("A")
        );
    }

    #[test]
    fn attempt_record_flattens_snapshot_fields() {
        let record = attempt("a1", "ambiversion", 10, "introvert");
        let payload = serde_json::to_value(&record).expect("serializes");
        assert_eq!(payload["result_key"], "introvert");
        assert_eq!(payload["created_at"], "2025-03-14T10:00:00Z");

        let parsed: AttemptRecord = serde_json::from_value(payload).expect("parses");
        assert_eq!(parsed, record);
    }
}
