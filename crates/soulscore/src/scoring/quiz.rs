use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::config::{QuizShape, ScoringProfile};

/// Result-key keyed numeric map. Ordered so every iteration over it is reproducible.
pub type ScoreMap = BTreeMap<String, f64>;

/// Static quiz definition as authored in content. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "questions", default)]
    pub content: QuizContent,
    #[serde(default)]
    pub scoring: ScoringProfile,
}

/// The `questions` object of a quiz definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizContent {
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub results: Vec<ResultEntry>,
    #[serde(default)]
    pub min_required: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub options: Vec<QuizOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub weights: ScoreMap,
}

/// Display metadata for one possible outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Summary template; `{title}` is replaced with the resolved title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl ResultEntry {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.key)
    }

    pub fn render_summary(&self) -> String {
        match &self.summary {
            Some(template) => template.replace("{title}", self.display_title()),
            None => String::new(),
        }
    }
}

impl Quiz {
    pub fn questions(&self) -> &[Question] {
        &self.content.questions
    }

    pub fn min_required(&self) -> usize {
        self.content.min_required
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.slug)
    }

    /// Declared result keys in catalog order, first occurrence wins.
    pub fn result_keys(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.content
            .results
            .iter()
            .map(|entry| entry.key.as_str())
            .filter(|key| seen.insert(*key))
            .collect()
    }

    /// Keys eligible to win. Dual-axis quizzes resolve over their primary axis only.
    pub fn resolvable_keys(&self) -> Vec<&str> {
        let keys = self.result_keys();
        match &self.scoring.shape {
            QuizShape::DualAxis { primary, .. } => keys
                .into_iter()
                .filter(|key| key.starts_with(primary.as_str()))
                .collect(),
            _ => keys,
        }
    }

    pub fn declares(&self, key: &str) -> bool {
        self.content.results.iter().any(|entry| entry.key == key)
    }

    pub fn result(&self, key: &str) -> Option<&ResultEntry> {
        self.content.results.iter().find(|entry| entry.key == key)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.content
            .questions
            .iter()
            .find(|question| question.id == id)
    }

    /// Questions paired with the option the answer set selected for them.
    /// Unanswered questions and unknown option keys are skipped.
    pub fn answered<'a>(
        &'a self,
        answers: &'a AnswerSet,
    ) -> impl Iterator<Item = (&'a Question, &'a QuizOption)> + 'a {
        self.content.questions.iter().filter_map(move |question| {
            answers
                .get(&question.id)
                .and_then(|option_key| question.option(option_key))
                .map(|option| (question, option))
        })
    }

    /// Per-key ceilings summed over the core questions.
    ///
    /// Stands in for `max_raw` when only totals were kept for an attempt.
    pub fn core_ceilings(&self) -> ScoreMap {
        self.result_keys()
            .into_iter()
            .map(|key| {
                let ceiling: f64 = self
                    .questions()
                    .iter()
                    .filter(|question| !question.optional)
                    .map(|question| question.ceiling(key))
                    .sum();
                (key.to_string(), ceiling)
            })
            .collect()
    }

    pub fn progress(&self, answers: &AnswerSet) -> QuizProgress {
        let answered_core = self
            .answered(answers)
            .filter(|(question, _)| !question.optional)
            .count();
        let required = self.min_required();

        QuizProgress {
            answered_core,
            required,
            remaining: required.saturating_sub(answered_core),
        }
    }
}

impl Question {
    pub fn option(&self, key: &str) -> Option<&QuizOption> {
        self.options.iter().find(|option| option.key == key)
    }

    /// Largest absolute weight any option on this question offers toward `key`.
    pub fn ceiling(&self, key: &str) -> f64 {
        self.options
            .iter()
            .filter_map(|option| option.weights.get(key))
            .filter(|weight| weight.is_finite())
            .fold(0.0_f64, |ceiling, weight| ceiling.max(weight.abs()))
    }
}

/// How far an answer set is from clearing the minimum-answers gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizProgress {
    pub answered_core: usize,
    pub required: usize,
    pub remaining: usize,
}

impl QuizProgress {
    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }
}

/// Question id to chosen option key. At most one answer per question by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, question_id: impl Into<String>, option_key: impl Into<String>) -> Self {
        self.0.insert(question_id.into(), option_key.into());
        self
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.0.get(question_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(question, option)| (question.as_str(), option.as_str()))
    }

    /// Copy of this answer set with one question's answer removed.
    pub fn without(&self, question_id: &str) -> Self {
        let mut answers = self.0.clone();
        answers.remove(question_id);
        Self(answers)
    }
}

impl<Q, O> FromIterator<(Q, O)> for AnswerSet
where
    Q: Into<String>,
    O: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (Q, O)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(question, option)| (question.into(), option.into()))
                .collect(),
        )
    }
}
