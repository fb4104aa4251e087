use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{CatalogError, QuizCatalog, QuizSummary};
use crate::config::ScoringConfig;
use crate::profile::{
    AttemptRecord, AuxiliaryContext, CompositeProfile, ProfileAggregator, QuizKind,
    ResultSnapshot,
};
use crate::scoring::{AnswerSet, Quiz, QuizProgress, ScoreOutcome, ScoringEngine};

/// Service composing the quiz catalog, scoring engine, and profile aggregator.
pub struct QuizScoringService {
    catalog: Arc<QuizCatalog>,
    engine: ScoringEngine,
    aggregator: ProfileAggregator,
}

impl QuizScoringService {
    pub fn new(catalog: Arc<QuizCatalog>, engine: ScoringEngine) -> Self {
        let aggregator = ProfileAggregator::with_catalog(Arc::clone(&catalog));
        Self {
            catalog,
            engine,
            aggregator,
        }
    }

    /// Seeded catalog plus any overrides from `config.quiz_dir`.
    pub fn from_config(config: &ScoringConfig) -> Result<Self, CatalogError> {
        let mut catalog = QuizCatalog::seeded()?;
        if let Some(dir) = &config.quiz_dir {
            catalog = catalog.with_overrides(dir)?;
            info!(dir = %dir.display(), "applied quiz content overrides");
        }
        info!(quizzes = catalog.len(), "quiz catalog loaded");

        Ok(Self::new(
            Arc::new(catalog),
            ScoringEngine::new(config.normalizer()),
        ))
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn quizzes(&self) -> Vec<QuizSummary> {
        self.catalog.summaries()
    }

    pub fn quiz(&self, slug: &str) -> Result<Arc<Quiz>, ScoringServiceError> {
        self.catalog
            .get(slug)
            .ok_or_else(|| ScoringServiceError::UnknownQuiz(slug.to_string()))
    }

    pub fn progress(
        &self,
        slug: &str,
        answers: &AnswerSet,
    ) -> Result<QuizProgress, ScoringServiceError> {
        Ok(self.quiz(slug)?.progress(answers))
    }

    /// Score one attempt. Policy rejections are a successful call with `ok: false`.
    pub fn score(
        &self,
        slug: &str,
        answers: &AnswerSet,
    ) -> Result<ScoreOutcome, ScoringServiceError> {
        let quiz = self.quiz(slug)?;
        debug!(quiz = %quiz.slug, answers = answers.len(), "scoring quiz attempt");

        let outcome = self.engine.score(&quiz, answers);
        match &outcome {
            ScoreOutcome::Scored(result) => debug!(
                quiz = %quiz.slug,
                result = %result.result_key,
                confidence = result.confidence,
                "quiz scored"
            ),
            ScoreOutcome::Rejected(rejection) => info!(
                quiz = %quiz.slug,
                reason = %rejection,
                required = quiz.min_required(),
                "quiz attempt rejected"
            ),
        }

        Ok(outcome)
    }

    pub fn profile(
        &self,
        results: &BTreeMap<String, ResultSnapshot>,
        context: &AuxiliaryContext,
    ) -> CompositeProfile {
        for slug in results.keys() {
            if QuizKind::from_slug(slug).is_none() {
                debug!(quiz = %slug, "ignoring result with no profile facet");
            }
        }
        self.aggregator.aggregate(results, context)
    }

    /// Profile over an attempt history, using the latest attempt per quiz.
    pub fn profile_from_attempts(
        &self,
        attempts: &[AttemptRecord],
        context: &AuxiliaryContext,
    ) -> CompositeProfile {
        debug!(attempts = attempts.len(), "building profile from attempt history");
        self.profile(&crate::profile::latest_by_slug(attempts), context)
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error("unknown quiz `{0}`")]
    UnknownQuiz(String),
}
