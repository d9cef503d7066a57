//! Item-level dataset writer.

use std::path::Path;

use serde::Serialize;

use crate::error::{WrangleError, WrangleResult};
use crate::participant::Participant;
use crate::records::ItemRecord;

/// Output header, in column order.
pub const OUTPUT_COLUMNS: [&str; 24] = [
    "ID",
    "item",
    "item_number",
    "estimate",
    "example_sentence",
    "repetition",
    "order",
    "platform",
    "list",
    "gender",
    "age",
    "country",
    "education",
    "L1",
    "monoling",
    "lang_dis",
    "read_dis",
    "sight",
    "children",
    "child_age",
    "time",
    "time_sum",
    "finished",
    "violation",
];

/// Flat, serialisable view of an [`ItemRecord`]. Field order matches
/// [`OUTPUT_COLUMNS`]; `None` becomes an empty cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow<'a> {
    #[serde(rename = "ID")]
    pub id: &'a str,
    pub item: &'a str,
    pub item_number: Option<u32>,
    pub estimate: Option<i64>,
    pub example_sentence: Option<&'a str>,
    pub repetition: u8,
    pub order: Option<u32>,
    pub platform: Option<&'static str>,
    pub list: Option<&'static str>,
    pub gender: Option<&'static str>,
    pub age: Option<i64>,
    pub country: Option<&'static str>,
    pub education: Option<i64>,
    #[serde(rename = "L1")]
    pub first_language: Option<u8>,
    #[serde(rename = "monoling")]
    pub monolingual: Option<u8>,
    #[serde(rename = "lang_dis")]
    pub language_disorder: Option<u8>,
    #[serde(rename = "read_dis")]
    pub reading_disorder: Option<u8>,
    pub sight: Option<&'static str>,
    pub children: Option<u8>,
    pub child_age: String,
    pub time: Option<f64>,
    pub time_sum: i64,
    pub finished: u8,
    pub violation: u8,
}

impl<'a> OutputRow<'a> {
    pub fn from_record(record: &'a ItemRecord) -> Self {
        let p: &'a Participant = &record.participant;
        Self {
            id: &p.id,
            item: &record.word,
            item_number: record.item_number,
            estimate: record.estimate,
            example_sentence: record.sentence.as_deref(),
            repetition: record.repetition,
            order: record.order,
            platform: p.platform.map(|v| v.as_str()),
            list: p.list.map(|v| v.as_str()),
            gender: p.gender.map(|v| v.as_str()),
            age: p.age,
            country: p.country.map(|v| v.as_str()),
            education: p.education,
            first_language: p.first_language.map(u8::from),
            monolingual: p.monolingual.map(u8::from),
            language_disorder: p.language_disorder.map(u8::from),
            reading_disorder: p.reading_disorder.map(u8::from),
            sight: p.sight.map(|v| v.as_str()),
            children: p.children.map(u8::from),
            child_age: p.child_age_label(),
            time: record.time,
            time_sum: p.time_sum,
            finished: u8::from(p.finished),
            violation: u8::from(p.violation),
        }
    }
}

/// Write `records` as CSV to `path`, creating parent directories.
///
/// The header is always written, even when there are no records.
pub fn write_records(path: &Path, records: &[ItemRecord]) -> WrangleResult<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| WrangleError::io(parent, e))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| WrangleError::csv(path, e))?;
    writer.write_record(OUTPUT_COLUMNS).map_err(|e| WrangleError::csv(path, e))?;
    for record in records {
        writer.serialize(OutputRow::from_record(record)).map_err(|e| WrangleError::csv(path, e))?;
    }
    writer.flush().map_err(|e| WrangleError::io(path, e))?;
    Ok(records.len())
}
