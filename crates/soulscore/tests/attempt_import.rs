use std::io::Cursor;
use std::sync::Arc;

use soulscore::scoring::{AnswerSet, ScoringEngine};
use soulscore::{
    AttemptImporter, AuxiliaryContext, ProfileAggregator, QuizCatalog, ResultSnapshot,
};

const EXPORT: &str = "\
attempt_id,user_id,quiz_slug,created_at,result_key,result_totals
a-01,user-7,love-language-receiving,2025-02-01T08:00:00Z,words,
a-02,user-7,love-language-receiving,2025-02-20T08:00:00Z,quality time,
a-03,user-7,attachment-style,2025-02-03 09:15:00+00,,\"{\"\"secure\"\": 0.4, \"\"avoidant\"\": 0.7}\"
a-04,user-7,soul-connection,2025-02-04,role_healer,\"{\"\"role_healer\"\": 5, \"\"element_fire\"\": 1, \"\"element_air\"\": 3}\"
a-05,user-7,apology-style,2025-02-05T10:00:00Z,restitution,
a-06,user-7,enneagram,2025-02-06T10:00:00Z,type_4,
a-07,user-9,ambiversion,2025-02-07T10:00:00Z,introvert,
";

#[test]
fn csv_history_builds_a_composite_profile() {
    let attempts = AttemptImporter::from_reader(Cursor::new(EXPORT)).expect("export parses");
    let history = AttemptImporter::for_user(&attempts, "user-7");
    assert_eq!(history.len(), 6);

    let profile = ProfileAggregator::new().aggregate_attempts(&history, &AuxiliaryContext::default());

    assert_eq!(profile.romantic.map(|facet| facet.key), Some("companion".to_string()));
    assert_eq!(profile.mystic.map(|facet| facet.label), Some("Mist Walker".to_string()));
    assert_eq!(profile.element.as_deref(), Some("air"));
    assert_eq!(profile.notes.apology.as_deref(), Some("restitution"));
    assert!(profile.role.is_none());
    assert!(profile.notes.forgiveness.is_none());
}

#[test]
fn catalog_backed_aggregation_agrees_on_imported_rows() {
    let attempts = AttemptImporter::from_reader(Cursor::new(EXPORT)).expect("export parses");
    let history = AttemptImporter::for_user(&attempts, "user-7");
    let catalog = Arc::new(QuizCatalog::seeded().expect("seeded content parses"));

    let context = AuxiliaryContext::default();
    let plain = ProfileAggregator::new().aggregate_attempts(&history, &context);
    let backed = ProfileAggregator::with_catalog(catalog).aggregate_attempts(&history, &context);

    assert_eq!(plain, backed);
}

#[test]
fn context_element_overrides_imported_axis() {
    let attempts = AttemptImporter::from_reader(Cursor::new(EXPORT)).expect("export parses");
    let history = AttemptImporter::for_user(&attempts, "user-7");

    let profile =
        ProfileAggregator::new().aggregate_attempts(&history, &AuxiliaryContext::with_element("earth"));

    assert_eq!(profile.element.as_deref(), Some("earth"));
}

#[test]
fn freshly_scored_results_and_imported_rows_agree() {
    let catalog = QuizCatalog::seeded().expect("seeded content parses");
    let quiz = catalog.get("ambiversion").expect("ambiversion");
    let answers: AnswerSet = [("q1", "a"), ("q2", "a"), ("q3", "a")].into_iter().collect();
    let scored = ScoringEngine::default()
        .score(&quiz, &answers)
        .into_result()
        .expect("scored");

    let attempts = AttemptImporter::from_reader(Cursor::new(EXPORT)).expect("export parses");
    let imported = AttemptImporter::by_user(attempts);
    let from_csv = ProfileAggregator::new()
        .aggregate_attempts(&imported["user-9"], &AuxiliaryContext::default());

    let mut fresh = std::collections::BTreeMap::new();
    fresh.insert("ambiversion".to_string(), ResultSnapshot::from(&scored));
    let from_scoring = ProfileAggregator::new().aggregate(&fresh, &AuxiliaryContext::default());

    assert_eq!(from_csv, from_scoring);
    assert_eq!(from_csv.role.map(|facet| facet.key), Some("sage".to_string()));
}
