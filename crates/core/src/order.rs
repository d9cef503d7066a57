//! Reconstruction of each participant's item presentation order.
//!
//! Familiarization rotation cells hold page numbers directly. List rotation
//! cells hold page numbers of a randomised questionnaire whose pages are only
//! named in the value legend (`VAR`, `RESPONSE` → `MEANING`):
//!
//! - `17`   list item 17
//! - `s3`   third shared/control item, i.e. `control[2]`
//! - `r17`  repeated presentation of item 17

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::{WrangleError, WrangleResult};
use crate::table::{parse_int, Row, Table};

/// Value legend columns.
pub const LEGEND_VARIABLE: &str = "VAR";
pub const LEGEND_RESPONSE: &str = "RESPONSE";
pub const LEGEND_MEANING: &str = "MEANING";

const SHARED_PREFIX: char = 's';
const REPEATED_PREFIX: char = 'r';

/// Key of one presented page. Repeated presentations live in their own
/// namespace so they never collide with the first presentation of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKey {
    Familiarization(u32),
    Item(u32),
    Repeated(u32),
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKey::Familiarization(page) => write!(f, "familiarization page {page}"),
            OrderKey::Item(item) => write!(f, "item {item}"),
            OrderKey::Repeated(item) => write!(f, "repeated item {item}"),
        }
    }
}

/// A list-rotation page label from the value legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationLabel {
    Item(u32),
    /// 1-based index into the control item list.
    Shared(usize),
    Repeated(u32),
}

impl RotationLabel {
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Some(rest) = label.strip_prefix(SHARED_PREFIX) {
            rest.parse::<usize>().ok().filter(|&n| n > 0).map(RotationLabel::Shared)
        } else if let Some(rest) = label.strip_prefix(REPEATED_PREFIX) {
            rest.parse::<u32>().ok().map(RotationLabel::Repeated)
        } else {
            label.parse::<u32>().ok().map(RotationLabel::Item)
        }
    }
}

/// `(variable, response code)` → meaning, first entry wins.
#[derive(Debug, Clone, Default)]
pub struct ValueLegend {
    entries: HashMap<(String, i64), String>,
}

impl ValueLegend {
    pub fn from_table(table: &Table) -> WrangleResult<Self> {
        table.require_columns(&[LEGEND_VARIABLE, LEGEND_RESPONSE, LEGEND_MEANING])?;
        let mut entries = HashMap::new();
        for row in table.rows() {
            // Free-text variables have no numeric response codes.
            let response = row.text(LEGEND_RESPONSE)?.and_then(parse_int);
            let (Some(variable), Some(response)) = (row.text(LEGEND_VARIABLE)?, response) else {
                continue;
            };
            let meaning = row.text(LEGEND_MEANING)?.unwrap_or_default().trim().to_string();
            entries.entry((variable.trim().to_string(), response)).or_insert(meaning);
        }
        Ok(Self { entries })
    }

    pub fn meaning(&self, variable: &str, response: i64) -> Option<&str> {
        self.entries.get(&(variable.to_string(), response)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Presentation positions of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresentationOrder {
    positions: HashMap<OrderKey, u32>,
    complete: bool,
}

impl PresentationOrder {
    pub fn position(&self, key: OrderKey) -> Option<u32> {
        self.positions.get(&key).copied()
    }

    /// Whether every rotation cell of the participant was filled.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of `key`. A gap is an error in a complete order and `None` in
    /// a partial one.
    pub fn resolve(&self, participant: &str, key: OrderKey) -> WrangleResult<Option<u32>> {
        match self.position(key) {
            Some(position) => Ok(Some(position)),
            None if self.complete => {
                Err(WrangleError::MissingOrder { participant: participant.to_string(), key })
            }
            None => Ok(None),
        }
    }

    fn insert(&mut self, participant: &str, key: OrderKey, position: u32) -> WrangleResult<()> {
        if let Some(&first) = self.positions.get(&key) {
            return Err(WrangleError::DuplicateOrderKey {
                participant: participant.to_string(),
                key,
                first,
                second: position,
            });
        }
        self.positions.insert(key, position);
        Ok(())
    }
}

/// Read-only context for rebuilding presentation orders.
#[derive(Debug, Clone, Copy)]
pub struct OrderReconstructor<'a> {
    legend: &'a ValueLegend,
    control_items: &'a [u32],
    first_list_position: u32,
}

impl<'a> OrderReconstructor<'a> {
    pub fn new(
        legend: &'a ValueLegend,
        control_items: &'a [u32],
        first_list_position: u32,
    ) -> Self {
        Self { legend, control_items, first_list_position }
    }

    /// Rebuild the order of a participant from their survey row.
    pub fn reconstruct(
        &self,
        participant: &str,
        row: &Row<'_>,
        familiarization_rotation: &[String],
        list_rotation: &[String],
    ) -> WrangleResult<PresentationOrder> {
        let mut order = PresentationOrder { positions: HashMap::new(), complete: true };

        for (position, column) in (1u32..).zip(familiarization_rotation) {
            let Some(page) = row.int(column)? else {
                order.complete = false;
                continue;
            };
            let page = u32::try_from(page).map_err(|_| WrangleError::UnknownRotationPage {
                column: column.clone(),
                page,
            })?;
            order.insert(participant, OrderKey::Familiarization(page), position)?;
        }

        for (position, column) in (self.first_list_position..).zip(list_rotation) {
            let Some(page) = row.int(column)? else {
                order.complete = false;
                continue;
            };
            let key = self.list_key(column, page)?;
            order.insert(participant, key, position)?;
        }

        Ok(order)
    }

    /// Resolve one list rotation cell to the key of the item shown there.
    pub fn list_key(&self, column: &str, page: i64) -> WrangleResult<OrderKey> {
        let label = self.legend.meaning(column, page).ok_or_else(|| {
            WrangleError::UnknownRotationPage { column: column.to_string(), page }
        })?;

        match RotationLabel::parse(label) {
            Some(RotationLabel::Item(item)) => Ok(OrderKey::Item(item)),
            Some(RotationLabel::Repeated(item)) => Ok(OrderKey::Repeated(item)),
            Some(RotationLabel::Shared(index)) => self
                .control_items
                .get(index - 1)
                .map(|&item| OrderKey::Item(item))
                .ok_or_else(|| WrangleError::SharedIndexOutOfRange {
                    label: label.to_string(),
                    control_items: self.control_items.len(),
                }),
            None => Err(WrangleError::InvalidRotationLabel {
                column: column.to_string(),
                label: label.to_string(),
            }),
        }
    }
}
