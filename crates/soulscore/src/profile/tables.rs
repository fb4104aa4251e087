use serde::{Deserialize, Serialize};

/// Prefix marking the element axis of the soul-connection quiz.
pub(crate) const ELEMENT_PREFIX: &str = "element_";

/// Quiz families the aggregator understands, resolved once from a slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizKind {
    LoveLanguageReceiving,
    AttachmentStyle,
    Ambiversion,
    SoulConnection,
    ApologyStyle,
    ForgivenessStyle,
}

impl QuizKind {
    pub const ALL: [QuizKind; 6] = [
        QuizKind::LoveLanguageReceiving,
        QuizKind::AttachmentStyle,
        QuizKind::Ambiversion,
        QuizKind::SoulConnection,
        QuizKind::ApologyStyle,
        QuizKind::ForgivenessStyle,
    ];

    pub fn from_slug(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(slug))
    }

    pub fn slug(&self) -> &'static str {
        match self {
            QuizKind::LoveLanguageReceiving => "love-language-receiving",
            QuizKind::AttachmentStyle => "attachment-style",
            QuizKind::Ambiversion => "ambiversion",
            QuizKind::SoulConnection => "soul-connection",
            QuizKind::ApologyStyle => "apology-style",
            QuizKind::ForgivenessStyle => "forgiveness-style",
        }
    }

    /// Lookup table translating this quiz's winning key into a named facet, if it has one.
    pub fn facet_table(&self) -> Option<&'static FacetTable> {
        match self {
            QuizKind::LoveLanguageReceiving => Some(&ROMANTIC),
            QuizKind::AttachmentStyle => Some(&MYSTIC),
            QuizKind::Ambiversion => Some(&ROLE),
            QuizKind::SoulConnection | QuizKind::ApologyStyle | QuizKind::ForgivenessStyle => None,
        }
    }
}

pub struct FacetEntry {
    /// Raw result keys (current and legacy spellings) that map to this facet.
    pub raw: &'static [&'static str],
    pub key: &'static str,
    pub label: &'static str,
}

pub struct FacetTable {
    entries: &'static [FacetEntry],
}

impl FacetTable {
    pub fn lookup(&self, raw_key: &str) -> Option<&'static FacetEntry> {
        let normalized = normalize_key(raw_key);
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.raw.iter().any(|raw| *raw == normalized))
    }

    pub fn entries(&self) -> &'static [FacetEntry] {
        self.entries
    }
}

/// Lowercase, trim, and fold spaces and hyphens into underscores.
pub(crate) fn normalize_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|ch| match ch {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

static ROMANTIC: FacetTable = FacetTable {
    entries: &[
        FacetEntry {
            raw: &["words", "words_of_affirmation", "affirmation"],
            key: "poet",
            label: "The Poet",
        },
        FacetEntry {
            raw: &["acts", "acts_of_service", "service"],
            key: "devotee",
            label: "The Devotee",
        },
        FacetEntry {
            raw: &["gifts", "receiving_gifts"],
            key: "curator",
            label: "The Curator",
        },
        FacetEntry {
            raw: &["time", "quality_time"],
            key: "companion",
            label: "The Companion",
        },
        FacetEntry {
            raw: &["touch", "physical_touch"],
            key: "ember",
            label: "The Ember",
        },
    ],
};

static MYSTIC: FacetTable = FacetTable {
    entries: &[
        FacetEntry {
            raw: &["secure"],
            key: "lantern",
            label: "Lantern Keeper",
        },
        FacetEntry {
            raw: &["anxious", "preoccupied", "anxious_preoccupied"],
            key: "tide",
            label: "Tide Caller",
        },
        FacetEntry {
            raw: &["avoidant", "dismissive", "dismissive_avoidant"],
            key: "mist",
            label: "Mist Walker",
        },
        FacetEntry {
            raw: &["fearful", "fearful_avoidant", "disorganized"],
            key: "storm",
            label: "Storm Reader",
        },
    ],
};

static ROLE: FacetTable = FacetTable {
    entries: &[
        FacetEntry {
            raw: &["introvert", "introverted"],
            key: "sage",
            label: "Inward Sage",
        },
        FacetEntry {
            raw: &["ambivert", "ambiverted"],
            key: "bridge",
            label: "Bridge Builder",
        },
        FacetEntry {
            raw: &["extrovert", "extroverted", "extravert", "extraverted"],
            key: "spark",
            label: "Outward Spark",
        },
    ],
};
