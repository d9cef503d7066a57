//! Item-level record emission.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::columns::{survey, SurveyColumns};
use crate::error::{WrangleError, WrangleResult};
use crate::lookup::{ItemLookup, LookupTables};
use crate::model::{ItemCategory, ListId};
use crate::order::{OrderKey, OrderReconstructor, PresentationOrder};
use crate::participant::Participant;
use crate::table::{Row, Table};

/// One participant × item observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub participant: Rc<Participant>,
    pub category: ItemCategory,
    pub word: String,
    /// Reference item number; familiarization items have none.
    pub item_number: Option<u32>,
    pub estimate: Option<i64>,
    pub sentence: Option<String>,
    pub repetition: u8,
    pub order: Option<u32>,
    pub time: Option<f64>,
}

/// Read-only context that turns one participant into their item records.
pub struct RowEmitter<'a> {
    pub survey: &'a Table,
    pub lists: &'a Table,
    pub columns: &'a SurveyColumns,
    pub lookups: &'a LookupTables,
    pub reconstructor: OrderReconstructor<'a>,
}

impl<'a> RowEmitter<'a> {
    /// Rebuild the presentation order of a participant assigned to `list`.
    pub fn order_of(
        &self,
        participant: &Participant,
        list: ListId,
    ) -> WrangleResult<PresentationOrder> {
        let row = self.survey_row(participant)?;
        let order = self.reconstructor.reconstruct(
            &participant.id,
            &row,
            &self.columns.familiarization_rotation,
            &self.columns.list(list).rotation,
        )?;
        if !order.is_complete() {
            warn!(
                id = %participant.id,
                positions = order.len(),
                "partial rotation; missing orders left empty"
            );
        }
        Ok(order)
    }

    /// Append every record of `participant` to `out`, returning how many were added.
    ///
    /// Participants without a list emit nothing.
    pub fn emit(
        &self,
        participant: &Rc<Participant>,
        out: &mut Vec<ItemRecord>,
    ) -> WrangleResult<usize> {
        let Some(list) = participant.list else {
            debug!(id = %participant.id, "no list assigned; skipping");
            return Ok(0);
        };

        let order = self.order_of(participant, list)?;
        let survey_row = self.survey_row(participant)?;
        let lists_row = participant.lists_row.and_then(|position| self.lists.row(position));
        let before = out.len();

        for entry in &self.lookups.familiarization {
            out.push(ItemRecord {
                participant: Rc::clone(participant),
                category: ItemCategory::Familiarization,
                word: entry.word.clone(),
                item_number: None,
                estimate: survey_row.int(&entry.column)?,
                sentence: entry.sentence.clone(),
                repetition: 0,
                order: order.resolve(&participant.id, OrderKey::Familiarization(entry.page))?,
                time: survey_row.number(&entry.time_column)?,
            });
        }

        let list_lookups = self.lookups.list(list);
        let blocks = [
            (ItemCategory::List, list_lookups.items.entries()),
            (ItemCategory::Control, self.lookups.control.entries()),
            (ItemCategory::Repeated, list_lookups.repeated.entries()),
        ];
        for (category, entries) in blocks {
            for entry in entries {
                let record =
                    self.list_record(participant, category, entry, &order, lists_row.as_ref())?;
                out.push(record);
            }
        }

        let emitted = out.len() - before;
        debug!(id = %participant.id, list = %list, rows = emitted, "emitted participant");
        Ok(emitted)
    }

    fn list_record(
        &self,
        participant: &Rc<Participant>,
        category: ItemCategory,
        entry: &ItemLookup,
        order: &PresentationOrder,
        lists_row: Option<&Row<'_>>,
    ) -> WrangleResult<ItemRecord> {
        let (key, repetition) = match category {
            ItemCategory::Repeated => (OrderKey::Repeated(entry.item), 1),
            _ => (OrderKey::Item(entry.item), 0),
        };
        let (estimate, time) = match lists_row {
            Some(row) => (row.int(&entry.column)?, row.number(&entry.time_column)?),
            None => (None, None),
        };

        Ok(ItemRecord {
            participant: Rc::clone(participant),
            category,
            word: entry.word.clone(),
            item_number: Some(entry.item),
            estimate,
            sentence: entry.sentence.clone(),
            repetition,
            order: order.resolve(&participant.id, key)?,
            time,
        })
    }

    fn survey_row(&self, participant: &Participant) -> WrangleResult<Row<'a>> {
        self.survey.row(participant.survey_row).ok_or_else(|| WrangleError::MissingValue {
            table: self.survey.name().to_string(),
            column: survey::CASE.to_string(),
            row: participant.survey_row + 1,
        })
    }
}
