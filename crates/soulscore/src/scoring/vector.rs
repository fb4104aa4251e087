use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::quiz::{Quiz, ScoreMap};

/// Second-place entries below this share of the leader are left out of summaries.
const RUNNER_UP_MIN_PERCENT: f64 = 50.0;

/// The two axes of a dual-axis totals map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitVectors {
    pub primary: ScoreMap,
    pub secondary: ScoreMap,
}

/// Partition `totals` by key prefix. Keys are kept whole; keys matching neither prefix are dropped.
///
/// When one prefix is itself a prefix of the other, the longer match wins.
pub fn split_by_prefix(totals: &ScoreMap, primary: &str, secondary: &str) -> SplitVectors {
    let mut split = SplitVectors::default();
    let primary_first = primary.len() >= secondary.len();

    for (key, value) in totals {
        let in_primary = key.starts_with(primary);
        let in_secondary = key.starts_with(secondary);
        let target = match (in_primary, in_secondary) {
            (true, true) if primary_first => &mut split.primary,
            (true, true) => &mut split.secondary,
            (true, false) => &mut split.primary,
            (false, true) => &mut split.secondary,
            (false, false) => continue,
        };
        target.insert(key.clone(), *value);
    }

    split
}

/// One ranked entry of a score vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub key: String,
    pub score: f64,
    pub percent_of_max: f64,
}

/// Sort entries by score, highest first. Equal scores keep their input order.
///
/// `percent_of_max` is relative to the top score: the leader reads 100, or every entry
/// reads 0 when the vector is empty or has no positive score.
pub fn rank<'a, I>(entries: I) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = (&'a String, &'a f64)>,
{
    let mut ranked: Vec<(&String, f64)> = entries
        .into_iter()
        .map(|(key, score)| (key, if score.is_finite() { *score } else { 0.0 }))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let top = ranked.first().map(|(_, score)| *score).unwrap_or(0.0);

    ranked
        .into_iter()
        .map(|(key, score)| RankedEntry {
            key: key.clone(),
            score,
            percent_of_max: if top > 0.0 {
                (score / top * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            },
        })
        .collect()
}

/// Source of display labels for result keys.
pub trait LabelLookup {
    fn label_for(&self, key: &str) -> Option<&str>;
}

impl LabelLookup for Quiz {
    fn label_for(&self, key: &str) -> Option<&str> {
        self.result(key).map(|entry| entry.display_title())
    }
}

impl LabelLookup for BTreeMap<String, String> {
    fn label_for(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Short sentence naming the top one or two entries of each axis, e.g.
/// "Architect with a touch of Healer, grounded in Fire and Water".
pub fn ranked_summary(
    primary: &[RankedEntry],
    secondary: &[RankedEntry],
    labels: &dyn LabelLookup,
) -> String {
    let lead = leading_labels(primary, labels);
    let ground = leading_labels(secondary, labels);

    let mut summary = match lead.as_slice() {
        [first, second] => format!("{first} with a touch of {second}"),
        [first] => first.clone(),
        _ => String::new(),
    };

    let grounding = match ground.as_slice() {
        [first, second] => format!("grounded in {first} and {second}"),
        [first] => format!("grounded in {first}"),
        _ => String::new(),
    };

    if !grounding.is_empty() {
        if summary.is_empty() {
            summary = grounding;
        } else {
            summary = format!("{summary}, {grounding}");
        }
    }

    summary
}

fn leading_labels(entries: &[RankedEntry], labels: &dyn LabelLookup) -> Vec<String> {
    entries
        .iter()
        .take(2)
        .enumerate()
        .filter(|(index, entry)| {
            entry.score > 0.0 && (*index == 0 || entry.percent_of_max >= RUNNER_UP_MIN_PERCENT)
        })
        .map(|(_, entry)| {
            labels
                .label_for(&entry.key)
                .unwrap_or(entry.key.as_str())
                .to_string()
        })
        .collect()
}
