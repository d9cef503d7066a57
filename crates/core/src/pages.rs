//! Page layout of the survey instrument.
//!
//! Time columns in the exports carry no item key; an item's time column is
//! found purely by page position. The list-phase questionnaire is one page
//! sequence shared by all three lists:
//!
//! ```text
//! list A:    [ control | list items | repeated items ]
//! lists B/C: [ control | repeated items | list items ]
//! ```
//!
//! The survey-phase export starts with the demographic pages, followed by one
//! page per familiarization item.
//!
//! These counts MUST match the instrument that produced the export. They are
//! validated against the discovered columns before any row is built.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::model::ListId;

/// Demographic pages at the start of the survey phase.
pub const DEMOGRAPHIC_TIME_PAGES: usize = 5;
/// Familiarization items (and pages) in the survey phase.
pub const FAMILIARIZATION_ITEMS: usize = 10;
/// Shared/control item pages opening every list.
pub const CONTROL_PAGES: usize = 31;
/// List-specific item pages per list.
pub const LIST_PAGES: usize = 228;
/// Repeated (reliability) item pages per list.
pub const REPEATED_PAGES: usize = 25;

/// Where a list's repeated block sits relative to its item block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOrder {
    ItemsThenRepeated,
    RepeatedThenItems,
}

impl PageOrder {
    pub fn of(list: ListId) -> Self {
        match list {
            ListId::A => PageOrder::ItemsThenRepeated,
            ListId::B | ListId::C => PageOrder::RepeatedThenItems,
        }
    }
}

/// Page counts of the survey instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub demographic_time_pages: usize,
    pub familiarization_items: usize,
    pub control_pages: usize,
    pub list_pages: usize,
    pub repeated_pages: usize,
}

/// Time-column ranges of one list within the list-phase time columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTimeSlices {
    pub items: Range<usize>,
    pub repeated: Range<usize>,
}

impl PageLayout {
    /// Layout of the age-of-acquisition instrument.
    pub const STUDY: PageLayout = PageLayout {
        demographic_time_pages: DEMOGRAPHIC_TIME_PAGES,
        familiarization_items: FAMILIARIZATION_ITEMS,
        control_pages: CONTROL_PAGES,
        list_pages: LIST_PAGES,
        repeated_pages: REPEATED_PAGES,
    };

    /// Pages (and rotation positions) in the list phase.
    pub fn list_phase_pages(&self) -> usize {
        self.control_pages + self.list_pages + self.repeated_pages
    }

    /// Survey-phase time columns, demographic pages included.
    pub fn survey_time_columns(&self) -> usize {
        self.demographic_time_pages + self.familiarization_items
    }

    /// Presentation position of the first list-phase page.
    ///
    /// Familiarization items occupy positions `1..=familiarization_items`.
    pub fn first_list_position(&self) -> u32 {
        self.familiarization_items as u32 + 1
    }

    /// Output rows a participant on any list produces.
    pub fn rows_per_participant(&self) -> usize {
        self.familiarization_items + self.list_phase_pages()
    }

    pub fn control_time_slice(&self) -> Range<usize> {
        0..self.control_pages
    }

    pub fn list_time_slices(&self, list: ListId) -> ListTimeSlices {
        let start = self.control_pages;
        match PageOrder::of(list) {
            PageOrder::ItemsThenRepeated => {
                let items = start..start + self.list_pages;
                let repeated = items.end..items.end + self.repeated_pages;
                ListTimeSlices { items, repeated }
            }
            PageOrder::RepeatedThenItems => {
                let repeated = start..start + self.repeated_pages;
                let items = repeated.end..repeated.end + self.list_pages;
                ListTimeSlices { items, repeated }
            }
        }
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::STUDY
    }
}
