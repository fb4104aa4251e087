use serde_json::json;

use super::quiz::Quiz;

/// Two keys, two core questions, both required. Q1 `x` pushes A, Q2 `y` pushes B hardest.
pub(crate) fn two_key_quiz() -> Quiz {
    serde_json::from_value(json!({
        "slug": "two-key",
        "questions": {
            "questions": [
                {"id": "Q1", "options": [
                    {"key": "x", "weights": {"A": 2}},
                    {"key": "y", "weights": {"B": 2}}
                ]},
                {"id": "Q2", "options": [
                    {"key": "x", "weights": {"A": 1, "B": 1}},
                    {"key": "y", "weights": {"B": 3}}
                ]}
            ],
            "results": [
                {"key": "A", "title": "Alpha"},
                {"key": "B", "title": "Beta"}
            ],
            "min_required": 2
        }
    }))
    .expect("fixture quiz parses")
}

/// Three keys where B and C can be driven to an exact tie.
pub(crate) fn three_key_quiz() -> Quiz {
    serde_json::from_value(json!({
        "slug": "three-key",
        "questions": {
            "questions": [
                {"id": "core1", "options": [
                    {"key": "b", "weights": {"B": 2}},
                    {"key": "c", "weights": {"C": 2}},
                    {"key": "bc", "weights": {"B": 1, "C": 1}}
                ]},
                {"id": "core2", "options": [
                    {"key": "b", "weights": {"B": 2}},
                    {"key": "c", "weights": {"C": 2}}
                ]},
                {"id": "bonus", "optional": true, "options": [
                    {"key": "b", "weights": {"B": 2}},
                    {"key": "c", "weights": {"C": 2}}
                ]}
            ],
            "results": [
                {"key": "A"},
                {"key": "B"},
                {"key": "C"}
            ],
            "min_required": 1
        }
    }))
    .expect("fixture quiz parses")
}
