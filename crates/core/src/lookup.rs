//! Column → item lookup tables.
//!
//! Built once per run from the reference data and the discovered column
//! families, then shared read-only by every participant.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::columns::SurveyColumns;
use crate::error::{WrangleError, WrangleResult};
use crate::model::ListId;
use crate::pages::PageLayout;
use crate::reference::{ItemReference, ReferenceData};

/// Identity of the item behind one list-phase rating column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLookup {
    pub column: String,
    pub item: u32,
    pub word: String,
    pub sentence: Option<String>,
    pub time_column: String,
}

/// Identity of the item behind one familiarization rating column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamiliarizationLookup {
    pub column: String,
    /// 1-based page number, as recorded by the familiarization rotation.
    pub page: u32,
    pub word: String,
    pub sentence: Option<String>,
    pub time_column: String,
}

/// Lookup entries of one item category, in rating-column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLookup {
    pub name: String,
    entries: Vec<ItemLookup>,
    #[serde(skip)]
    by_column: HashMap<String, usize>,
}

impl CategoryLookup {
    /// Zip reference rows belonging to `members` (in reference order) with the
    /// category's rating and time columns.
    pub fn build(
        name: impl Into<String>,
        references: &[ItemReference],
        members: &[u32],
        columns: &[String],
        time_columns: &[String],
    ) -> WrangleResult<Self> {
        let name = name.into();
        let members: HashSet<u32> = members.iter().copied().collect();
        let matched: Vec<&ItemReference> =
            references.iter().filter(|r| members.contains(&r.item)).collect();

        if matched.len() != columns.len() {
            return Err(WrangleError::LookupLength {
                category: name,
                items: matched.len(),
                columns: columns.len(),
            });
        }
        if time_columns.len() != columns.len() {
            return Err(WrangleError::ColumnCount {
                family: format!("{name} time"),
                expected: columns.len(),
                found: time_columns.len(),
            });
        }

        let entries: Vec<ItemLookup> = matched
            .into_iter()
            .zip(columns)
            .zip(time_columns)
            .map(|((reference, column), time_column)| ItemLookup {
                column: column.clone(),
                item: reference.item,
                word: reference.word.clone(),
                sentence: reference.sentence.clone(),
                time_column: time_column.clone(),
            })
            .collect();
        let by_column =
            entries.iter().enumerate().map(|(i, entry)| (entry.column.clone(), i)).collect();

        Ok(Self { name, entries, by_column })
    }

    pub fn entries(&self) -> &[ItemLookup] {
        &self.entries
    }

    pub fn get(&self, column: &str) -> Option<&ItemLookup> {
        self.by_column.get(column).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Item and repeated-item lookups of one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListLookups {
    pub list: ListId,
    pub items: CategoryLookup,
    pub repeated: CategoryLookup,
}

/// Every lookup table of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupTables {
    pub familiarization: Vec<FamiliarizationLookup>,
    pub control: CategoryLookup,
    lists: [ListLookups; 3],
}

impl LookupTables {
    pub fn build(
        references: &ReferenceData,
        columns: &SurveyColumns,
        pages: &PageLayout,
    ) -> WrangleResult<Self> {
        let familiarization = familiarization_lookup(references, columns, pages)?;

        let control = CategoryLookup::build(
            "control",
            &references.items,
            &references.item_lists.control,
            &columns.control_ratings,
            &columns.item_times[pages.control_time_slice()],
        )?;

        let lists = [
            list_lookups(references, columns, pages, ListId::A)?,
            list_lookups(references, columns, pages, ListId::B)?,
            list_lookups(references, columns, pages, ListId::C)?,
        ];

        Ok(Self { familiarization, control, lists })
    }

    pub fn list(&self, list: ListId) -> &ListLookups {
        &self.lists[list.index()]
    }

    /// Output rows a participant assigned to `list` produces.
    pub fn rows_for(&self, list: ListId) -> usize {
        let lookups = self.list(list);
        self.familiarization.len()
            + lookups.items.len()
            + self.control.len()
            + lookups.repeated.len()
    }
}

fn familiarization_lookup(
    references: &ReferenceData,
    columns: &SurveyColumns,
    pages: &PageLayout,
) -> WrangleResult<Vec<FamiliarizationLookup>> {
    let sheet = &references.familiarization;
    if sheet.len() != pages.familiarization_items {
        return Err(WrangleError::LookupLength {
            category: "familiarization".to_string(),
            items: sheet.len(),
            columns: columns.familiarization_ratings.len(),
        });
    }

    Ok(sheet
        .iter()
        .zip(&columns.familiarization_ratings)
        .zip(&columns.familiarization_times)
        .enumerate()
        .map(|(i, ((entry, column), time_column))| FamiliarizationLookup {
            column: column.clone(),
            page: i as u32 + 1,
            word: entry.word.clone(),
            sentence: entry.sentence.clone(),
            time_column: time_column.clone(),
        })
        .collect())
}

fn list_lookups(
    references: &ReferenceData,
    columns: &SurveyColumns,
    pages: &PageLayout,
    list: ListId,
) -> WrangleResult<ListLookups> {
    let members = references.item_lists.list(list);
    let list_columns = columns.list(list);
    let slices = pages.list_time_slices(list);

    let items = CategoryLookup::build(
        format!("list {list}"),
        &references.items,
        &members.items,
        &list_columns.items,
        &columns.item_times[slices.items],
    )?;
    let repeated = CategoryLookup::build(
        format!("list {list} repeated"),
        &references.items,
        &members.repeated,
        &list_columns.repeated,
        &columns.item_times[slices.repeated],
    )?;

    Ok(ListLookups { list, items, repeated })
}
