//! Cross-quiz composite profile built from each quiz's latest result.

mod history;
mod tables;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::QuizCatalog;
use crate::scoring::rank;

pub use history::{latest_by_slug, AttemptRecord, ResultSnapshot};
pub use tables::{FacetEntry, FacetTable, QuizKind};

use tables::ELEMENT_PREFIX;

/// Caller-supplied facts that are not derived from quiz results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryContext {
    /// Explicit element; wins over the soul-connection element axis.
    #[serde(default)]
    pub element: Option<String>,
}

impl AuxiliaryContext {
    pub fn with_element(element: impl Into<String>) -> Self {
        Self {
            element: Some(element.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub key: String,
    pub label: String,
}

impl From<&FacetEntry> for Facet {
    fn from(entry: &FacetEntry) -> Self {
        Self {
            key: entry.key.to_string(),
            label: entry.label.to_string(),
        }
    }
}

/// Untranslated winning keys carried alongside the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileNotes {
    pub apology: Option<String>,
    pub forgiveness: Option<String>,
}

/// Composite personality record. Every facet is `None` unless its source quiz was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeProfile {
    pub element: Option<String>,
    pub role: Option<Facet>,
    pub romantic: Option<Facet>,
    pub mystic: Option<Facet>,
    pub notes: ProfileNotes,
}

impl CompositeProfile {
    pub fn is_empty(&self) -> bool {
        self == &CompositeProfile::default()
    }
}

/// Builds composite profiles. With a catalog, results stored without a winner are resolved
/// by their quiz's own mode and tie priority.
#[derive(Debug, Clone, Default)]
pub struct ProfileAggregator {
    catalog: Option<Arc<QuizCatalog>>,
}

impl ProfileAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Arc<QuizCatalog>) -> Self {
        Self {
            catalog: Some(catalog),
        }
    }

    /// Merge per-slug results into one profile. Slugs outside [`QuizKind`] are ignored and
    /// winning keys missing from a facet table leave that facet unset.
    pub fn aggregate(
        &self,
        results: &BTreeMap<String, ResultSnapshot>,
        context: &AuxiliaryContext,
    ) -> CompositeProfile {
        let mut profile = CompositeProfile::default();

        for (slug, snapshot) in results {
            let Some(kind) = QuizKind::from_slug(slug) else {
                continue;
            };

            match kind {
                QuizKind::LoveLanguageReceiving => {
                    profile.romantic = facet(kind, self.primary_key(slug, snapshot))
                }
                QuizKind::AttachmentStyle => {
                    profile.mystic = facet(kind, self.primary_key(slug, snapshot))
                }
                QuizKind::Ambiversion => {
                    profile.role = facet(kind, self.primary_key(slug, snapshot))
                }
                QuizKind::SoulConnection => profile.element = element_from(snapshot),
                QuizKind::ApologyStyle => {
                    profile.notes.apology = self.primary_key(slug, snapshot)
                }
                QuizKind::ForgivenessStyle => {
                    profile.notes.forgiveness = self.primary_key(slug, snapshot)
                }
            }
        }

        if let Some(element) = context
            .element
            .as_deref()
            .map(str::trim)
            .filter(|element| !element.is_empty())
        {
            profile.element = Some(element.to_string());
        }

        profile
    }

    /// Aggregate over a user's attempt history, using the latest attempt of each quiz.
    pub fn aggregate_attempts(
        &self,
        attempts: &[AttemptRecord],
        context: &AuxiliaryContext,
    ) -> CompositeProfile {
        self.aggregate(&latest_by_slug(attempts), context)
    }

    fn primary_key(&self, slug: &str, snapshot: &ResultSnapshot) -> Option<String> {
        match self.catalog.as_ref().and_then(|catalog| catalog.get(slug)) {
            Some(quiz) => snapshot.primary_key_for(&quiz),
            None => snapshot.primary_key().map(str::to_string),
        }
    }
}

fn facet(kind: QuizKind, key: Option<String>) -> Option<Facet> {
    kind.facet_table()?.lookup(&key?).map(Facet::from)
}

fn element_from(snapshot: &ResultSnapshot) -> Option<String> {
    let leader = rank(
        snapshot
            .totals()
            .iter()
            .filter(|(key, _)| key.starts_with(ELEMENT_PREFIX)),
    )
    .into_iter()
    .next()
    .filter(|entry| entry.score > 0.0)?;

    let element = leader.key[ELEMENT_PREFIX.len()..].trim();
    (!element.is_empty()).then(|| element.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreMap;
    use serde_json::json;

    fn results(entries: &[(&str, ResultSnapshot)]) -> BTreeMap<String, ResultSnapshot> {
        entries
            .iter()
            .map(|(slug, snapshot)| (slug.to_string(), snapshot.clone()))
            .collect()
    }

    fn totals(entries: &[(&str, f64)]) -> ScoreMap {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn empty_input_yields_all_null_profile() {
        let profile = ProfileAggregator::new().aggregate(&BTreeMap::new(), &AuxiliaryContext::default());

        assert!(profile.is_empty());
        assert_eq!(
            serde_json::to_value(&profile).expect("serializes"),
            json!({
                "element": null,
                "role": null,
                "romantic": null,
                "mystic": null,
                "notes": {"apology": null, "forgiveness": null}
            })
        );
    }

    #[test]
    fn partial_input_sets_only_supplied_facets() {
        let input = results(&[
            ("love-language-receiving", ResultSnapshot::with_key("quality_time")),
            ("apology-style", ResultSnapshot::with_key("restitution")),
        ]);

        let profile = ProfileAggregator::new().aggregate(&input, &AuxiliaryContext::default());

        assert_eq!(
            profile.romantic,
            Some(Facet {
                key: "companion".to_string(),
                label: "The Companion".to_string()
            })
        );
        assert_eq!(profile.notes.apology.as_deref(), Some("restitution"));
        assert!(profile.role.is_none());
        assert!(profile.mystic.is_none());
        assert!(profile.element.is_none());
        assert!(profile.notes.forgiveness.is_none());
    }

    #[test]
    fn unknown_slug_is_ignored() {
        let with_stray = results(&[
            ("attachment-style", ResultSnapshot::with_key("secure")),
            ("enneagram", ResultSnapshot::with_key("type_4")),
        ]);
        let without = results(&[("attachment-style", ResultSnapshot::with_key("secure"))]);

        let aggregator = ProfileAggregator::new();
        let context = AuxiliaryContext::default();
        assert_eq!(
            aggregator.aggregate(&with_stray, &context),
            aggregator.aggregate(&without, &context)
        );
        assert_eq!(
            aggregator.aggregate(&with_stray, &context).mystic.map(|f| f.key),
            Some("lantern".to_string())
        );
    }

    #[test]
    fn unrecognized_winning_key_degrades_to_null() {
        let input = results(&[("ambiversion", ResultSnapshot::with_key("omnivert"))]);
        let profile = ProfileAggregator::new().aggregate(&input, &AuxiliaryContext::default());
        assert!(profile.role.is_none());
    }

    #[test]
    fn totals_only_snapshot_uses_leading_key() {
        let input = results(&[(
            "ambiversion",
            ResultSnapshot::from_totals(totals(&[("introvert", 2.0), ("extrovert", 7.5)])),
        )]);
        let profile = ProfileAggregator::new().aggregate(&input, &AuxiliaryContext::default());
        assert_eq!(profile.role.map(|facet| facet.key), Some("spark".to_string()));
    }

    #[test]
    fn element_comes_from_soul_connection_axis_unless_context_overrides() {
        let soul = ResultSnapshot {
            result_key: Some("role_architect".to_string()),
            totals_raw: totals(&[
                ("role_architect", 9.0),
                ("element_fire", 2.0),
                ("element_water", 5.0),
            ]),
            ..ResultSnapshot::default()
        };
        let input = results(&[("soul-connection", soul)]);
        let aggregator = ProfileAggregator::new();

        let derived = aggregator.aggregate(&input, &AuxiliaryContext::default());
        assert_eq!(derived.element.as_deref(), Some("water"));

        let overridden = aggregator.aggregate(&input, &AuxiliaryContext::with_element("Earth"));
        assert_eq!(overridden.element.as_deref(), Some("Earth"));

        let blank = aggregator.aggregate(&input, &AuxiliaryContext::with_element("  "));
        assert_eq!(blank.element.as_deref(), Some("water"));
    }

    #[test]
    fn zeroed_element_axis_leaves_element_unset() {
        let input = results(&[(
            "soul-connection",
            ResultSnapshot::from_totals(totals(&[("element_fire", 0.0), ("role_healer", 4.0)])),
        )]);
        let profile = ProfileAggregator::new().aggregate(&input, &AuxiliaryContext::default());
        assert!(profile.element.is_none());
    }
}
