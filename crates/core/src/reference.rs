//! Study-setup reference data: item-number lists and example-sentence sheets.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};

use crate::error::{WrangleError, WrangleResult};
use crate::model::ListId;
use crate::table::{Row, Table, TextEncoding};

/// Item-reference sheet columns.
pub const ITEM_COLUMN: &str = "ITEM";
pub const ITEM_WORD_COLUMN: &str = "NAME1";
pub const EXAMPLE_COLUMN: &str = "EXAMPLE";

/// Familiarization sheet word column.
pub const FAMILIARIZATION_WORD_COLUMN: &str = "NAME";

/// One row of the picture-naming item reference sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReference {
    pub item: u32,
    pub word: String,
    pub sentence: Option<String>,
}

/// One row of the familiarization sheet. Its page number is its 1-based row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamiliarizationReference {
    pub word: String,
    pub sentence: Option<String>,
}

/// Read a whitespace-separated list of item numbers. `#` starts a comment.
pub fn read_item_list(path: &Path) -> WrangleResult<Vec<u32>> {
    let body = std::fs::read_to_string(path).map_err(|e| WrangleError::io(path, e))?;
    parse_item_list(&body, path)
}

/// Parse item-list text; `origin` is only used in errors.
pub fn parse_item_list(body: &str, origin: &Path) -> WrangleResult<Vec<u32>> {
    let mut items = Vec::new();
    for (line_no, line) in body.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        for token in content.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            let item = crate::table::parse_int(token)
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| WrangleError::InvalidItemList {
                    path: origin.to_path_buf(),
                    line: line_no + 1,
                    value: token.to_string(),
                })?;
            items.push(item);
        }
    }
    Ok(items)
}

/// Load one sheet as a [`Table`].
///
/// Spreadsheet files (`.ods`, `.xlsx`, `.xls`, ...) are read through calamine;
/// `.csv`/`.tsv`/`.txt` files are treated as a single exported sheet and the
/// sheet name is ignored.
pub fn read_sheet(
    path: &Path,
    sheet: &str,
    delimiter: u8,
    encoding: TextEncoding,
) -> WrangleResult<Table> {
    let extension =
        path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "csv" | "txt" => Table::read_path(sheet, path, delimiter, encoding),
        "tsv" => Table::read_path(sheet, path, b'\t', encoding),
        _ => read_workbook_sheet(path, sheet),
    }
}

fn read_workbook_sheet(path: &Path, sheet: &str) -> WrangleResult<Table> {
    let sheet_error = |message: String| WrangleError::Sheet {
        path: path.to_path_buf(),
        sheet: sheet.to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| sheet_error(e.to_string()))?;
    let range = workbook.worksheet_range(sheet).map_err(|e| sheet_error(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| sheet_error("sheet is empty".to_string()))?
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();
    let body = rows.map(|row| row.iter().map(cell_text).collect()).collect();

    Ok(Table::new(sheet, headers, body))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        other => other.to_string(),
    }
}

/// Interpret the item reference sheet, keeping sheet order.
pub fn item_references(table: &Table) -> WrangleResult<Vec<ItemReference>> {
    table.require_columns(&[ITEM_COLUMN, ITEM_WORD_COLUMN, EXAMPLE_COLUMN])?;
    let mut items = Vec::with_capacity(table.len());
    for row in table.rows() {
        // Trailing blank spreadsheet rows carry no item number.
        let Some(item) = row.int(ITEM_COLUMN)? else {
            continue;
        };
        let item = u32::try_from(item).map_err(|_| WrangleError::InvalidNumber {
            table: table.name().to_string(),
            column: ITEM_COLUMN.to_string(),
            row: row.position() + 1,
            value: item.to_string(),
        })?;
        items.push(ItemReference {
            item,
            word: required_text(table, &row, ITEM_WORD_COLUMN)?,
            sentence: row.text(EXAMPLE_COLUMN)?.map(str::to_string),
        });
    }
    Ok(items)
}

/// Interpret the familiarization sheet, keeping sheet order.
pub fn familiarization_references(
    table: &Table,
) -> WrangleResult<Vec<FamiliarizationReference>> {
    table.require_columns(&[FAMILIARIZATION_WORD_COLUMN, EXAMPLE_COLUMN])?;
    let mut entries = Vec::with_capacity(table.len());
    for row in table.rows() {
        let blank =
            row.text(FAMILIARIZATION_WORD_COLUMN)?.is_none() && row.text(EXAMPLE_COLUMN)?.is_none();
        if blank {
            continue;
        }
        entries.push(FamiliarizationReference {
            word: required_text(table, &row, FAMILIARIZATION_WORD_COLUMN)?,
            sentence: row.text(EXAMPLE_COLUMN)?.map(str::to_string),
        });
    }
    Ok(entries)
}

fn required_text(table: &Table, row: &Row<'_>, column: &str) -> WrangleResult<String> {
    row.text(column)?.map(|s| s.trim().to_string()).ok_or_else(|| WrangleError::MissingValue {
        table: table.name().to_string(),
        column: column.to_string(),
        row: row.position() + 1,
    })
}

/// Item numbers of one list and of its repeated subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItems {
    pub items: Vec<u32>,
    pub repeated: Vec<u32>,
}

/// Item membership of every category, as enumerated by the study setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLists {
    /// Shared/control items in presentation-label order (`s1` is `control[0]`).
    pub control: Vec<u32>,
    pub lists: [ListItems; 3],
}

impl ItemLists {
    pub fn list(&self, list: ListId) -> &ListItems {
        &self.lists[list.index()]
    }
}

/// All study-setup reference data needed to resolve item identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceData {
    pub items: Vec<ItemReference>,
    pub familiarization: Vec<FamiliarizationReference>,
    pub item_lists: ItemLists,
}
