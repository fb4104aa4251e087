use serde::{Deserialize, Serialize};

use super::quiz::ScoreMap;

pub const DEFAULT_DISPLAY_SCALE: f64 = 10.0;

const DEFAULT_GAMMA: f64 = 0.8;
const DEFAULT_BOOST: f64 = 1.12;
const DEFAULT_FLOOR: f64 = 0.6;

/// Perceptual reshape applied after rescaling: gamma expansion, boost, then a visibility floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerceptualCurve {
    pub gamma: f64,
    pub boost: f64,
    pub floor: f64,
}

impl Default for PerceptualCurve {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            boost: DEFAULT_BOOST,
            floor: DEFAULT_FLOOR,
        }
    }
}

impl PerceptualCurve {
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            gamma: positive_or(self.gamma, defaults.gamma),
            boost: positive_or(self.boost, defaults.boost),
            floor: if self.floor.is_finite() && self.floor >= 0.0 {
                self.floor
            } else {
                defaults.floor
            },
        }
    }
}

/// Maps raw scores into a bounded `0..=max_value` display range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    max_value: f64,
    curve: PerceptualCurve,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_SCALE, PerceptualCurve::default())
    }
}

impl Normalizer {
    pub fn new(max_value: f64, curve: PerceptualCurve) -> Self {
        Self {
            max_value: positive_or(max_value, DEFAULT_DISPLAY_SCALE),
            curve: curve.sanitized(),
        }
    }

    pub fn with_scale(max_value: f64) -> Self {
        Self::new(max_value, PerceptualCurve::default())
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn curve(&self) -> PerceptualCurve {
        self.curve
    }

    /// Linear step. Values in `[0, 1]` are probabilities, `(1, 100]` percentages, anything
    /// else is taken as display units and clamped.
    pub fn rescale(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }

        if (0.0..=1.0).contains(&value) {
            value * self.max_value
        } else if value > 1.0 && value <= 100.0 {
            value / 100.0 * self.max_value
        } else {
            value.clamp(0.0, self.max_value)
        }
    }

    /// Perceptual step over a value already in display units.
    pub fn reshape(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }

        let unit = value.clamp(0.0, self.max_value) / self.max_value;
        let mut shaped = unit.powf(self.curve.gamma) * self.max_value * self.curve.boost;
        if shaped > 0.0 && shaped < self.curve.floor {
            shaped = self.curve.floor;
        }
        shaped.clamp(0.0, self.max_value)
    }

    pub fn display_value(&self, value: f64) -> f64 {
        self.reshape(self.rescale(value))
    }

    /// Chart-ready `(key, value)` pairs in the order of `keys`. Absent keys read as zero.
    ///
    /// With `max_raw`, each total is first expressed as a ratio of its own ceiling.
    pub fn for_display(
        &self,
        totals: &ScoreMap,
        max_raw: Option<&ScoreMap>,
        keys: &[&str],
    ) -> Vec<(String, f64)> {
        keys.iter()
            .map(|key| {
                let value = input_value(totals, max_raw, key);
                (key.to_string(), self.display_value(value))
            })
            .collect()
    }

    /// Same transform as [`Normalizer::for_display`], keyed by result key.
    pub fn to_object_keyed(
        &self,
        totals: &ScoreMap,
        max_raw: Option<&ScoreMap>,
        keys: &[&str],
    ) -> ScoreMap {
        self.for_display(totals, max_raw, keys).into_iter().collect()
    }

    /// Percentage-of-maximum mapped linearly onto the display range, without reshaping.
    pub fn linear(&self, totals: &ScoreMap, max_raw: &ScoreMap, keys: &[&str]) -> ScoreMap {
        percent_of_max(totals, max_raw, keys)
            .into_iter()
            .map(|(key, percent)| (key, percent / 100.0 * self.max_value))
            .collect()
    }
}

/// `value / max`, or zero when the ceiling is zero, negative, or not finite.
pub fn ratio_of_max(value: f64, max: f64) -> f64 {
    if !value.is_finite() || !max.is_finite() || max <= 0.0 {
        return 0.0;
    }
    value / max
}

/// Plain percentage of each key's ceiling, clamped to `0..=100`.
pub fn percent_of_max(totals: &ScoreMap, max_raw: &ScoreMap, keys: &[&str]) -> ScoreMap {
    keys.iter()
        .map(|key| {
            let total = totals.get(*key).copied().unwrap_or(0.0);
            let max = max_raw.get(*key).copied().unwrap_or(0.0);
            let percent = (ratio_of_max(total, max) * 100.0).clamp(0.0, 100.0);
            (key.to_string(), percent)
        })
        .collect()
}

fn input_value(totals: &ScoreMap, max_raw: Option<&ScoreMap>, key: &str) -> f64 {
    let total = totals.get(key).copied().unwrap_or(0.0);
    match max_raw {
        Some(max_raw) => ratio_of_max(total, max_raw.get(key).copied().unwrap_or(0.0)),
        None => total,
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
