//! Quiz scoring, display normalization and cross-quiz profile aggregation.

pub mod catalog;
pub mod config;
pub mod error;
pub mod import;
pub mod profile;
pub mod router;
pub mod scoring;
pub mod service;
pub mod telemetry;

pub use catalog::{CatalogError, QuizCatalog, QuizSummary};
pub use error::AppError;
pub use import::{read_answers, AnswersFileError, AttemptImportError, AttemptImporter};
pub use profile::{
    AttemptRecord, AuxiliaryContext, CompositeProfile, Facet, ProfileAggregator, ProfileNotes,
    QuizKind, ResultSnapshot,
};
pub use router::scoring_router;
pub use scoring::{AnswerSet, Quiz, ScoreOutcome, ScoredResult, ScoringEngine};
pub use service::{QuizScoringService, ScoringServiceError};
