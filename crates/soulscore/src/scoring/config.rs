use serde::{Deserialize, Serialize};

/// Per-quiz scoring configuration, resolved once when the quiz definition is loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    #[serde(default)]
    pub mode: ResolutionMode,
    /// Explicit priority order applied to ties that survive the core-hit heuristic.
    #[serde(default)]
    pub tie_break: Vec<String>,
    #[serde(default)]
    pub shape: QuizShape,
}

/// Which figure decides the winning result key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMode {
    /// Highest raw total wins; confidence is the margin as a fraction of the winner's maximum.
    #[default]
    Raw,
    /// Highest total-to-maximum ratio wins; confidence is the ratio margin.
    Ratio,
}

impl ResolutionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionMode::Raw => "raw",
            ResolutionMode::Ratio => "ratio",
        }
    }
}

/// Structural variant of a quiz. Each shape is configuration over the same tally/resolve core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizShape {
    #[default]
    SingleAxis,
    /// Two scored axes packed into one totals map and told apart by key prefix.
    DualAxis { primary: String, secondary: String },
    /// Unweighted preference quiz: display totals are linear percentages, not reshaped.
    Preference,
}

impl QuizShape {
    pub fn axis_prefixes(&self) -> Option<(&str, &str)> {
        match self {
            QuizShape::DualAxis { primary, secondary } => Some((primary, secondary)),
            _ => None,
        }
    }
}
