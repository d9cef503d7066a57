//! Per-participant metadata derived from the survey-phase export.
//!
//! Eligibility problems never drop a participant. They set `violation` and
//! leave filtering to the analysis stage.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::columns::{lists, survey};
use crate::error::{WrangleError, WrangleResult};
use crate::model::{Country, Gender, ListId, Platform, Sight};
use crate::recode::{self, Decoded, Recoding};
use crate::table::{Row, Table};

/// Metadata of one participant, denormalised onto each of their output rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: String,
    pub platform: Option<Platform>,
    pub list: Option<ListId>,
    pub gender: Option<Gender>,
    pub age: Option<i64>,
    pub country: Option<Country>,
    pub education: Option<i64>,
    /// German is the first language.
    pub first_language: Option<bool>,
    pub monolingual: Option<bool>,
    pub language_disorder: Option<bool>,
    pub reading_disorder: Option<bool>,
    pub sight: Option<Sight>,
    pub children: Option<bool>,
    pub child_ages: Vec<Option<i64>>,
    /// Survey-phase plus list-phase seconds.
    pub time_sum: i64,
    pub finished: bool,
    pub violation: bool,
    /// Row of the survey-phase export.
    #[serde(skip)]
    pub survey_row: usize,
    /// Row of the list-phase export, if the participant reached it.
    #[serde(skip)]
    pub lists_row: Option<usize>,
}

impl Participant {
    /// Child ages rendered as a bracketed list, e.g. `[4, 7]`.
    pub fn child_age_label(&self) -> String {
        let ages: Vec<String> = self
            .child_ages
            .iter()
            .map(|age| age.map(|a| a.to_string()).unwrap_or_else(|| "nan".to_string()))
            .collect();
        format!("[{}]", ages.join(", "))
    }
}

/// Index of list-phase records by `REF`.
#[derive(Debug, Clone, Default)]
pub struct ListRecordIndex {
    rows: HashMap<String, usize>,
}

impl ListRecordIndex {
    pub fn build(table: &Table) -> WrangleResult<Self> {
        let mut rows = HashMap::with_capacity(table.len());
        for row in table.rows() {
            let Some(id) = row.key(lists::REF)? else {
                continue;
            };
            if rows.insert(id.clone(), row.position()).is_some() {
                return Err(WrangleError::DuplicateParticipant {
                    table: table.name().to_string(),
                    id,
                });
            }
        }
        Ok(Self { rows })
    }

    pub fn row_of(&self, id: &str) -> Option<usize> {
        self.rows.get(id).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }
}

/// Derive every participant of the survey-phase export, in file order.
pub fn derive_participants(
    survey_table: &Table,
    lists_table: &Table,
) -> WrangleResult<Vec<Participant>> {
    survey_table.require_columns(&[survey::CASE, survey::TIME_SUM])?;
    lists_table.require_columns(&[lists::REF, lists::TIME_SUM])?;

    let list_index = ListRecordIndex::build(lists_table)?;
    let mut seen = HashMap::with_capacity(survey_table.len());
    let mut participants = Vec::with_capacity(survey_table.len());

    for row in survey_table.rows() {
        let id = row.key(survey::CASE)?.ok_or_else(|| WrangleError::MissingValue {
            table: survey_table.name().to_string(),
            column: survey::CASE.to_string(),
            row: row.position() + 1,
        })?;
        if seen.insert(id.clone(), row.position()).is_some() {
            return Err(WrangleError::DuplicateParticipant {
                table: survey_table.name().to_string(),
                id,
            });
        }

        let lists_row = list_index.row_of(&id).and_then(|position| lists_table.row(position));
        let participant = derive_participant(id, &row, lists_row.as_ref())?;
        debug!(
            id = %participant.id,
            list = ?participant.list,
            violation = participant.violation,
            "derived participant"
        );
        participants.push(participant);
    }

    let orphans = list_index.ids().filter(|id| !seen.contains_key(*id)).count();
    if orphans > 0 {
        warn!(orphans, "list-phase records without a matching survey-phase participant");
    }

    Ok(participants)
}

/// Derive one participant from their survey row and optional list-phase row.
pub fn derive_participant(
    id: String,
    row: &Row<'_>,
    lists_row: Option<&Row<'_>>,
) -> WrangleResult<Participant> {
    let mut flags = Flags { finished: true, violation: false };

    let platform = flags.decode(&recode::PLATFORM, row)?;
    let list = flags.decode(&recode::LIST, row)?;
    if list.is_none() {
        flags.finished = false;
    }
    let gender = flags.decode(&recode::GENDER, row)?;
    let age = row.int(survey::AGE)?;
    let country = flags.decode(&recode::COUNTRY, row)?;
    let education = row.int(survey::EDUCATION)?;
    let first_language = flags.decode(&recode::FIRST_LANGUAGE, row)?;
    let monolingual = flags.decode(&recode::MONOLINGUAL, row)?;
    let language_disorder = flags.decode(&recode::LANGUAGE_DISORDER, row)?;
    let reading_disorder = flags.decode(&recode::READING_DISORDER, row)?;
    let sight = flags.decode(&recode::SIGHT, row)?;
    let children = flags.decode(&recode::CHILDREN, row)?;
    let child_ages = if children == Some(true) { child_ages(&id, row)? } else { Vec::new() };

    let survey_time = row.require_int(survey::TIME_SUM)?;
    let time_sum = match lists_row {
        Some(lists_row) => survey_time + lists_row.require_int(lists::TIME_SUM)?,
        None => {
            warn!(id = %id, "no list-phase record; marking unfinished");
            flags.finished = false;
            flags.violation = true;
            survey_time
        }
    };

    Ok(Participant {
        id,
        platform,
        list,
        gender,
        age,
        country,
        education,
        first_language,
        monolingual,
        language_disorder,
        reading_disorder,
        sight,
        children,
        child_ages,
        time_sum,
        finished: flags.finished,
        violation: flags.violation,
        survey_row: row.position(),
        lists_row: lists_row.map(|r| r.position()),
    })
}

struct Flags {
    finished: bool,
    violation: bool,
}

impl Flags {
    fn decode<T: Copy + 'static>(
        &mut self,
        recoding: &Recoding<T>,
        row: &Row<'_>,
    ) -> WrangleResult<Option<T>> {
        let Decoded { value, violation } = recoding.decode(row.int(recoding.column)?);
        self.violation |= violation;
        Ok(value)
    }
}

fn child_ages(id: &str, row: &Row<'_>) -> WrangleResult<Vec<Option<i64>>> {
    let count = row.int(survey::CHILD_COUNT)?.unwrap_or(0).max(0);
    let columns = usize::try_from(count)
        .ok()
        .and_then(|n| survey::CHILD_AGES.get(..n))
        .ok_or_else(|| WrangleError::ChildCountOutOfRange {
            participant: id.to_string(),
            count,
            available: survey::CHILD_AGES.len(),
        })?;
    columns.iter().map(|column| row.int(column)).collect()
}
