use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::AttemptImportError;
use crate::profile::{AttemptRecord, ResultSnapshot};
use crate::scoring::ScoreMap;

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<AttemptRecord>, AttemptImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, record) in csv_reader.deserialize::<AttemptRow>().enumerate() {
        let row_number = index + 1;
        let row = record.map_err(|source| AttemptImportError::Csv {
            row: row_number,
            source,
        })?;
        records.push(row.into_record(row_number)?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct AttemptRow {
    attempt_id: String,
    user_id: String,
    quiz_slug: String,
    created_at: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    result_key: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    result_totals: Option<String>,
}

impl AttemptRow {
    fn into_record(self, row: usize) -> Result<AttemptRecord, AttemptImportError> {
        let created_at =
            parse_datetime(&self.created_at).ok_or_else(|| AttemptImportError::Timestamp {
                row,
                value: self.created_at.clone(),
            })?;

        let result_totals = match self.result_totals.as_deref() {
            Some(raw) => serde_json::from_str::<ScoreMap>(raw)
                .map_err(|source| AttemptImportError::Totals { row, source })?,
            None => ScoreMap::new(),
        };

        Ok(AttemptRecord {
            attempt_id: self.attempt_id,
            user_id: self.user_id,
            quiz_slug: self.quiz_slug,
            created_at,
            snapshot: ResultSnapshot {
                result_key: self.result_key,
                result_totals,
                totals_raw: ScoreMap::new(),
                max_raw: ScoreMap::new(),
            },
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts RFC 3339, database exports with a short offset (`2025-03-14 10:00:00+00`),
/// zone-less timestamps (read as UTC), and bare dates.
fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    None
}

#[cfg(test)]
pub(crate) fn parse_datetime_for_tests(value: &str) -> Option<DateTime<Utc>> {
    parse_datetime(value)
}
