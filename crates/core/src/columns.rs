//! Column families of the two survey exports.
//!
//! Fixed variables are named constants. Families whose members are numbered
//! per item (ratings, rotations, times) are selected by prefix in header
//! order, except the repeated-item ratings which are enumerated explicitly.
//! Every family is checked against the [`PageLayout`] when discovered.

use crate::error::{WrangleError, WrangleResult};
use crate::model::ListId;
use crate::pages::PageLayout;
use crate::table::Table;

/// Survey-phase export (`data_survey_start.csv`).
pub mod survey {
    pub const TABLE_NAME: &str = "survey";

    /// Anonymised participant id.
    pub const CASE: &str = "CASE";
    pub const TIME_SUM: &str = "TIME_SUM";
    pub const AGE: &str = "SD02_01";
    pub const EDUCATION: &str = "SD10";
    /// Number of children.
    pub const CHILD_COUNT: &str = "SD23";
    /// Age of the n-th child lives in `CHILD_AGES[n - 1]`.
    pub const CHILD_AGES: [&str; 9] = [
        "SD23x01", "SD23x02", "SD23x03", "SD23x04", "SD23x05", "SD23x06", "SD23x07", "SD23x08",
        "SD23x09",
    ];

    /// Familiarization page rotation.
    pub const FAMILIARIZATION_ROTATION: &str = "RA03";
    pub const LIST_A_ROTATION: &str = "RA02";
    pub const LIST_B_ROTATION: &str = "RA04";
    pub const LIST_C_ROTATION: &str = "RA05";

    /// Familiarization ratings.
    pub const FAMILIARIZATION_RATING: &str = "WF";
}

/// List-phase export (`data_lists.csv`).
pub mod lists {
    pub const TABLE_NAME: &str = "lists";

    /// Survey-phase `CASE` the list-phase record belongs to.
    pub const REF: &str = "REF";
    pub const TIME_SUM: &str = "TIME_SUM";

    /// Shared/control item ratings.
    pub const CONTROL_RATING: &str = "WS";
    pub const LIST_A_RATING: [&str; 3] = ["W1", "W2", "W3"];
    pub const LIST_B_RATING: [&str; 3] = ["W4", "W5", "W6"];
    pub const LIST_C_RATING: [&str; 3] = ["W7", "W8", "W9"];

    pub const REPEATED_A: [&str; 25] = [
        "WR01_01", "WR02_01", "WR03_01", "WR04_01", "WR05_01", "WR06_01", "WR07_01", "WR08_01",
        "WR09_01", "WR10_01", "WR11_01", "WR12_01", "WR13_01", "WR14_01", "WR15_01", "WR16_01",
        "WR17_01", "WR18_01", "WR19_01", "WR20_01", "WR21_01", "WR22_01", "WR23_01", "WR24_01",
        "WR25_01",
    ];
    pub const REPEATED_B: [&str; 25] = [
        "WR26_01", "WR27_01", "WR28_01", "WR29_01", "WR30_01", "WR31_01", "WR32_01", "WR33_01",
        "WR34_01", "WR35_01", "WR36_01", "WR37_01", "WR38_01", "WR39_01", "WR40_01", "WR41_01",
        "WR42_01", "WR43_01", "WR44_01", "WR45_01", "WR46_01", "WR47_01", "WR48_01", "WR49_01",
        "WR50_01",
    ];
    pub const REPEATED_C: [&str; 25] = [
        "WR51_01", "WR52_01", "WR53_01", "WR54_01", "WR55_01", "WR56_01", "WR57_01", "WR58_01",
        "WR59_01", "WR60_01", "WR61_01", "WR62_01", "WR63_01", "WR64_01", "WR65_01", "WR66_01",
        "WR67_01", "WR68_01", "WR69_01", "WR70_01", "WR71_01", "WR72_01", "WR73_01", "WR74_01",
        "WR75_01",
    ];
}

/// Page-timing columns in both exports.
pub const TIME_PREFIX: &str = "TIME";
/// Auxiliary timing columns that are not per-page.
pub const TIME_AUX_SUFFIXES: [&str; 2] = ["SUM", "RSI"];
/// Rotation helper columns (`RA02_CP`) that are not positions.
pub const ROTATION_AUX_SUFFIX: &str = "CP";
/// Auxiliary rating columns (`W101_01a`) that are not ratings.
pub const RATING_AUX_SUFFIX: &str = "a";

/// Rotation, rating and repeated-rating columns of one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListColumns {
    pub list: ListId,
    pub rotation: Vec<String>,
    pub items: Vec<String>,
    pub repeated: Vec<String>,
}

/// All per-item column families, validated against a page layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyColumns {
    pub familiarization_rotation: Vec<String>,
    pub familiarization_ratings: Vec<String>,
    /// Survey-phase time columns with the demographic pages removed.
    pub familiarization_times: Vec<String>,
    pub control_ratings: Vec<String>,
    /// All list-phase page time columns in page order.
    pub item_times: Vec<String>,
    lists: [ListColumns; 3],
}

impl SurveyColumns {
    /// Select every column family from the two export headers.
    pub fn discover(
        survey_table: &Table,
        lists_table: &Table,
        pages: &PageLayout,
    ) -> WrangleResult<Self> {
        survey_table.require_columns(&[survey::CASE, survey::TIME_SUM])?;
        lists_table.require_columns(&[lists::REF, lists::TIME_SUM])?;

        let familiarization_rotation =
            rotation_columns(survey_table.headers(), survey::FAMILIARIZATION_ROTATION);
        expect_count(
            "familiarization rotation",
            pages.familiarization_items,
            &familiarization_rotation,
        )?;

        let familiarization_ratings =
            rating_columns(survey_table.headers(), &[survey::FAMILIARIZATION_RATING]);
        expect_count(
            "familiarization ratings",
            pages.familiarization_items,
            &familiarization_ratings,
        )?;

        let survey_times = time_columns(survey_table.headers());
        expect_count("survey time", pages.survey_time_columns(), &survey_times)?;
        let familiarization_times = survey_times[pages.demographic_time_pages..].to_vec();

        let control_ratings = rating_columns(lists_table.headers(), &[lists::CONTROL_RATING]);
        expect_count("control ratings", pages.control_pages, &control_ratings)?;

        let item_times = time_columns(lists_table.headers());
        expect_count("list time", pages.list_phase_pages(), &item_times)?;

        let lists_columns = [
            list_columns(survey_table, lists_table, pages, ListId::A)?,
            list_columns(survey_table, lists_table, pages, ListId::B)?,
            list_columns(survey_table, lists_table, pages, ListId::C)?,
        ];

        Ok(Self {
            familiarization_rotation,
            familiarization_ratings,
            familiarization_times,
            control_ratings,
            item_times,
            lists: lists_columns,
        })
    }

    pub fn list(&self, list: ListId) -> &ListColumns {
        &self.lists[list.index()]
    }
}

fn list_columns(
    survey_table: &Table,
    lists_table: &Table,
    pages: &PageLayout,
    list: ListId,
) -> WrangleResult<ListColumns> {
    let (rotation_prefix, rating_prefixes, repeated): (&str, &[&str], &[&str]) = match list {
        ListId::A => (survey::LIST_A_ROTATION, &lists::LIST_A_RATING[..], &lists::REPEATED_A[..]),
        ListId::B => (survey::LIST_B_ROTATION, &lists::LIST_B_RATING[..], &lists::REPEATED_B[..]),
        ListId::C => (survey::LIST_C_ROTATION, &lists::LIST_C_RATING[..], &lists::REPEATED_C[..]),
    };

    let rotation = rotation_columns(survey_table.headers(), rotation_prefix);
    expect_count(&format!("list {list} rotation"), pages.list_phase_pages(), &rotation)?;

    let items = rating_columns(lists_table.headers(), rating_prefixes);
    expect_count(&format!("list {list} ratings"), pages.list_pages, &items)?;

    lists_table.require_columns(repeated)?;
    let repeated: Vec<String> = repeated.iter().map(|c| c.to_string()).collect();
    expect_count(&format!("list {list} repeated ratings"), pages.repeated_pages, &repeated)?;

    Ok(ListColumns { list, rotation, items, repeated })
}

fn rotation_columns(headers: &[String], prefix: &str) -> Vec<String> {
    headers
        .iter()
        .filter(|h| h.starts_with(prefix) && !h.ends_with(ROTATION_AUX_SUFFIX))
        .cloned()
        .collect()
}

fn rating_columns(headers: &[String], prefixes: &[&str]) -> Vec<String> {
    headers
        .iter()
        .filter(|h| prefixes.iter().any(|p| h.starts_with(p)) && !h.ends_with(RATING_AUX_SUFFIX))
        .cloned()
        .collect()
}

fn time_columns(headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .filter(|h| {
            h.starts_with(TIME_PREFIX) && !TIME_AUX_SUFFIXES.iter().any(|s| h.ends_with(s))
        })
        .cloned()
        .collect()
}

fn expect_count(family: &str, expected: usize, columns: &[String]) -> WrangleResult<()> {
    if columns.len() == expected {
        Ok(())
    } else {
        Err(WrangleError::ColumnCount {
            family: family.to_string(),
            expected,
            found: columns.len(),
        })
    }
}
