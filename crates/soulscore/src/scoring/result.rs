use serde::{Deserialize, Serialize, Serializer};

use super::config::ResolutionMode;
use super::policy::ScoringRejection;
use super::quiz::{Quiz, ScoreMap};
use super::resolve::{Resolution, TieBreak};
use super::tally::Tally;
use super::vector::{rank, ranked_summary, split_by_prefix, RankedEntry};

/// Output of one completed quiz attempt. Immutable; a retake produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub quiz_slug: String,
    pub result_key: String,
    pub result_title: String,
    pub result_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_guidance: Option<String>,
    /// Display-range totals for charts.
    pub result_totals: ScoreMap,
    pub totals_raw: ScoreMap,
    pub max_raw: ScoreMap,
    pub confidence: f64,
    pub resolution_mode: ResolutionMode,
    pub tie_break: TieBreak,
    pub order: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<AxisBreakdown>,
}

/// Per-axis rankings for dual-axis quizzes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBreakdown {
    pub primary: Vec<RankedEntry>,
    pub secondary: Vec<RankedEntry>,
    pub summary: String,
}

impl AxisBreakdown {
    pub(crate) fn from_totals(quiz: &Quiz, totals: &ScoreMap) -> Option<Self> {
        let (primary, secondary) = quiz.scoring.shape.axis_prefixes()?;
        let split = split_by_prefix(totals, primary, secondary);
        let primary = rank(&split.primary);
        let secondary = rank(&split.secondary);
        let summary = ranked_summary(&primary, &secondary, quiz);

        Some(Self {
            primary,
            secondary,
            summary,
        })
    }
}

impl ScoredResult {
    pub(crate) fn assemble(
        quiz: &Quiz,
        tally: Tally,
        resolution: Resolution,
        result_totals: ScoreMap,
    ) -> Self {
        let entry = quiz.result(&resolution.result_key);
        let result_title = entry
            .map(|entry| entry.display_title().to_string())
            .unwrap_or_else(|| resolution.result_key.clone());
        let result_summary = entry.map(|entry| entry.render_summary()).unwrap_or_default();
        let result_guidance = entry.and_then(|entry| entry.guidance.clone());
        let axes = AxisBreakdown::from_totals(quiz, &tally.totals_raw);

        Self {
            quiz_slug: quiz.slug.clone(),
            result_key: resolution.result_key,
            result_title,
            result_summary,
            result_guidance,
            result_totals,
            totals_raw: tally.totals_raw,
            max_raw: tally.max_raw,
            confidence: resolution.confidence,
            resolution_mode: quiz.scoring.mode,
            tie_break: resolution.tie_break,
            order: resolution.order,
            axes,
        }
    }
}

/// Success-or-rejection envelope. Serializes as `{ok: true, ...result}` or
/// `{ok: false, reason, ...}` so callers branch on `ok` before reading anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    Scored(ScoredResult),
    Rejected(ScoringRejection),
}

impl ScoreOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ScoreOutcome::Scored(_))
    }

    pub fn scored(&self) -> Option<&ScoredResult> {
        match self {
            ScoreOutcome::Scored(result) => Some(result),
            ScoreOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&ScoringRejection> {
        match self {
            ScoreOutcome::Scored(_) => None,
            ScoreOutcome::Rejected(rejection) => Some(rejection),
        }
    }

    pub fn into_result(self) -> Result<ScoredResult, ScoringRejection> {
        match self {
            ScoreOutcome::Scored(result) => Ok(result),
            ScoreOutcome::Rejected(rejection) => Err(rejection),
        }
    }
}

#[derive(Serialize)]
struct ScoredWire<'a> {
    ok: bool,
    #[serde(flatten)]
    result: &'a ScoredResult,
}

#[derive(Serialize)]
struct RejectedWire {
    ok: bool,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answered: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remaining: Option<usize>,
}

impl Serialize for ScoreOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScoreOutcome::Scored(result) => ScoredWire { ok: true, result }.serialize(serializer),
            ScoreOutcome::Rejected(rejection) => {
                let (required, answered) = match rejection {
                    ScoringRejection::InsufficientAnswers { required, answered } => {
                        (Some(*required), Some(*answered))
                    }
                    _ => (None, None),
                };
                RejectedWire {
                    ok: false,
                    reason: rejection.reason(),
                    required,
                    answered,
                    remaining: rejection.remaining(),
                }
                .serialize(serializer)
            }
        }
    }
}
