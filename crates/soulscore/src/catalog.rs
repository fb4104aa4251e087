use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::scoring::{LabelLookup, Quiz, ResolutionMode};

/// Quiz definitions compiled into the crate, keyed by file stem.
const SEEDED: &[(&str, &str)] = &[
    (
        "love-language-receiving",
        include_str!("../content/love-language-receiving.json"),
    ),
    (
        "attachment-style",
        include_str!("../content/attachment-style.json"),
    ),
    ("ambiversion", include_str!("../content/ambiversion.json")),
    (
        "soul-connection",
        include_str!("../content/soul-connection.json"),
    ),
    ("apology-style", include_str!("../content/apology-style.json")),
    (
        "forgiveness-style",
        include_str!("../content/forgiveness-style.json"),
    ),
];

/// Loaded quiz definitions, owned by whoever builds it and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct QuizCatalog {
    quizzes: BTreeMap<String, Arc<Quiz>>,
}

/// Listing row for a catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSummary {
    pub slug: String,
    pub title: String,
    pub question_count: usize,
    pub min_required: usize,
    pub resolution_mode: ResolutionMode,
    pub result_keys: Vec<String>,
}

impl QuizCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the quizzes shipped with the crate.
    pub fn seeded() -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (stem, source) in SEEDED {
            catalog.insert(parse_quiz(stem, source)?);
        }
        Ok(catalog)
    }

    /// Catalog of every `*.json` file in `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        Self::new().with_overrides(dir)
    }

    /// Layer `*.json` definitions from `dir` over this catalog; same slug replaces.
    pub fn with_overrides(mut self, dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let source = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            self.insert(parse_quiz(stem, &source)?);
        }

        Ok(self)
    }

    /// Add or replace a quiz, returning the previous definition for that slug.
    pub fn insert(&mut self, quiz: Quiz) -> Option<Arc<Quiz>> {
        self.quizzes.insert(quiz.slug.clone(), Arc::new(quiz))
    }

    pub fn get(&self, slug: &str) -> Option<Arc<Quiz>> {
        self.quizzes.get(slug.trim()).cloned()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.quizzes.keys().map(String::as_str)
    }

    pub fn summaries(&self) -> Vec<QuizSummary> {
        self.quizzes
            .values()
            .map(|quiz| QuizSummary {
                slug: quiz.slug.clone(),
                title: quiz.display_title().to_string(),
                question_count: quiz.questions().len(),
                min_required: quiz.min_required(),
                resolution_mode: quiz.scoring.mode,
                result_keys: quiz.result_keys().into_iter().map(str::to_string).collect(),
            })
            .collect()
    }
}

/// Labels resolve against the first quiz, in slug order, that declares the key.
impl LabelLookup for QuizCatalog {
    fn label_for(&self, key: &str) -> Option<&str> {
        self.quizzes
            .values()
            .find_map(|quiz| quiz.result(key).map(|entry| entry.display_title()))
    }
}

/// Parse one definition; an empty or missing `slug` falls back to `stem`.
pub fn parse_quiz(stem: &str, source: &str) -> Result<Quiz, CatalogError> {
    let mut quiz: Quiz = serde_json::from_str(source).map_err(|source| CatalogError::Parse {
        slug: stem.to_string(),
        source,
    })?;
    if quiz.slug.trim().is_empty() {
        quiz.slug = stem.to_string();
    } else {
        quiz.slug = quiz.slug.trim().to_string();
    }
    Ok(quiz)
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read quiz content at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("quiz definition `{slug}` is not valid: {source}")]
    Parse {
        slug: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::QuizKind;
    use crate::scoring::QuizShape;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("soulscore-{label}-{nanos}"));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn seeded_catalog_covers_every_quiz_kind() {
        let catalog = QuizCatalog::seeded().expect("seeded content parses");

        assert_eq!(catalog.len(), QuizKind::ALL.len());
        for kind in QuizKind::ALL {
            let quiz = catalog.get(kind.slug()).expect("seeded quiz present");
            assert!(!quiz.questions().is_empty(), "{} has questions", kind.slug());
            assert!(
                quiz.min_required() <= quiz.questions().len(),
                "{} is answerable",
                kind.slug()
            );
        }
    }

    #[test]
    fn seeded_quizzes_carry_their_scoring_profiles() {
        let catalog = QuizCatalog::seeded().expect("seeded content parses");

        let attachment = catalog.get("attachment-style").expect("attachment");
        assert_eq!(attachment.scoring.mode, ResolutionMode::Ratio);

        let soul = catalog.get("soul-connection").expect("soul connection");
        assert_eq!(soul.scoring.shape.axis_prefixes(), Some(("role_", "element_")));

        let ambiversion = catalog.get("ambiversion").expect("ambiversion");
        assert_eq!(ambiversion.scoring.shape, QuizShape::Preference);
    }

    #[test]
    fn summaries_are_listed_in_slug_order() {
        let catalog = QuizCatalog::seeded().expect("seeded content parses");
        let slugs: Vec<String> = catalog
            .summaries()
            .into_iter()
            .map(|summary| summary.slug)
            .collect();
        let mut sorted = slugs.clone();
        sorted.sort();
        assert_eq!(slugs, sorted);
    }

    #[test]
    fn missing_slug_defaults_to_stem() {
        let quiz = parse_quiz("custom", r#"{"questions": {"questions": []}}"#).expect("parses");
        assert_eq!(quiz.slug, "custom");
    }

    #[test]
    fn parse_error_names_the_quiz() {
        let error = parse_quiz("broken", "{ not json").expect_err("invalid json");
        assert!(matches!(error, CatalogError::Parse { ref slug, .. } if slug == "broken"));
        assert!(error.to_string().contains("`broken`"));
    }

    #[test]
    fn overrides_replace_seeded_definitions() {
        let dir = scratch_dir("overrides");
        fs::write(
            dir.join("ambiversion.json"),
            r#"{"title": "Energy Check", "questions": {"questions": [], "results": [{"key": "introvert"}]}}"#,
        )
        .expect("write override");
        fs::write(dir.join("notes.txt"), "ignored").expect("write stray file");

        let catalog = QuizCatalog::seeded()
            .expect("seeded")
            .with_overrides(&dir)
            .expect("overrides load");

        let quiz = catalog.get("ambiversion").expect("overridden quiz");
        assert_eq!(quiz.display_title(), "Energy Check");
        assert_eq!(catalog.len(), QuizKind::ALL.len());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let error = QuizCatalog::from_dir("/definitely/not/a/quiz/dir").expect_err("no dir");
        assert!(matches!(error, CatalogError::Io { .. }));
    }

    #[test]
    fn catalog_resolves_labels_across_quizzes() {
        let catalog = QuizCatalog::seeded().expect("seeded content parses");
        assert_eq!(catalog.label_for("element_water"), Some("Water"));
        assert_eq!(catalog.label_for("gifts"), Some("Receiving Gifts"));
        assert_eq!(catalog.label_for("time"), Some("Forgiving in Time"));
        assert_eq!(catalog.label_for("unknown"), None);
    }
}
