//! End-to-end wrangling: load, validate, reshape, persist.

use std::rc::Rc;

use serde::Serialize;
use tracing::{info, warn};

use crate::columns::{lists, survey, SurveyColumns};
use crate::config::{InputFormat, WrangleConfig};
use crate::error::{WrangleError, WrangleResult};
use crate::layout::StudyLayout;
use crate::lookup::{CategoryLookup, LookupTables};
use crate::manifest::{digest_inputs, timestamp, ParticipantCounts, RunManifest};
use crate::model::ListId;
use crate::order::{OrderReconstructor, ValueLegend};
use crate::output::write_records;
use crate::pages::PageLayout;
use crate::participant::{derive_participants, Participant};
use crate::records::{ItemRecord, RowEmitter};
use crate::reference::{
    familiarization_references, item_references, read_item_list, read_sheet, ItemLists,
    ListItems, ReferenceData,
};
use crate::table::Table;

/// Name of the value-legend table in errors.
const LEGEND_TABLE: &str = "legend";

/// Both survey exports, as read from disk.
#[derive(Debug, Clone)]
pub struct SurveyExports {
    pub survey: Table,
    pub lists: Table,
}

impl SurveyExports {
    pub fn load(layout: &StudyLayout, format: &InputFormat) -> WrangleResult<Self> {
        let delimiter = format.delimiter_byte()?;
        let encoding = format.encoding;
        let survey = Table::read_path(survey::TABLE_NAME, &layout.survey, delimiter, encoding)?;
        let lists = Table::read_path(lists::TABLE_NAME, &layout.lists, delimiter, encoding)?;
        info!(survey_rows = survey.len(), list_rows = lists.len(), "loaded survey exports");
        Ok(Self { survey, lists })
    }

    pub fn participants(&self) -> WrangleResult<Vec<Participant>> {
        derive_participants(&self.survey, &self.lists)
    }
}

/// Every input of a run.
#[derive(Debug, Clone)]
pub struct StudyInputs {
    pub exports: SurveyExports,
    pub legend: ValueLegend,
    pub references: ReferenceData,
}

impl StudyInputs {
    pub fn load(layout: &StudyLayout, format: &InputFormat) -> WrangleResult<Self> {
        let exports = SurveyExports::load(layout, format)?;
        let delimiter = format.delimiter_byte()?;

        let legend_table =
            Table::read_path(LEGEND_TABLE, &layout.legend, delimiter, format.encoding)?;
        let legend = ValueLegend::from_table(&legend_table)?;

        let items_sheet =
            read_sheet(&layout.items.path, &layout.items.sheet, delimiter, format.encoding)?;
        let familiarization_sheet = read_sheet(
            &layout.familiarization.path,
            &layout.familiarization.sheet,
            delimiter,
            format.encoding,
        )?;

        let list_items = |list: ListId| -> WrangleResult<ListItems> {
            let (items, repeated) = layout.item_lists.list(list);
            Ok(ListItems { items: read_item_list(items)?, repeated: read_item_list(repeated)? })
        };
        let item_lists = ItemLists {
            control: read_item_list(&layout.item_lists.control)?,
            lists: [list_items(ListId::A)?, list_items(ListId::B)?, list_items(ListId::C)?],
        };

        let references = ReferenceData {
            items: item_references(&items_sheet)?,
            familiarization: familiarization_references(&familiarization_sheet)?,
            item_lists,
        };
        info!(
            legend_entries = legend.len(),
            items = references.items.len(),
            familiarization = references.familiarization.len(),
            control = references.item_lists.control.len(),
            "loaded reference data"
        );

        Ok(Self { exports, legend, references })
    }
}

/// Inputs with validated column families, lookups and participants.
#[derive(Debug, Clone)]
pub struct PreparedStudy {
    pub inputs: StudyInputs,
    pub pages: PageLayout,
    pub columns: SurveyColumns,
    pub lookups: LookupTables,
    pub participants: Vec<Rc<Participant>>,
}

impl PreparedStudy {
    /// Discover columns, build lookups and derive participants.
    pub fn prepare(inputs: StudyInputs, pages: PageLayout) -> WrangleResult<Self> {
        let exports = &inputs.exports;
        let columns = SurveyColumns::discover(&exports.survey, &exports.lists, &pages)?;
        let lookups = LookupTables::build(&inputs.references, &columns, &pages)?;
        let participants = exports.participants()?.into_iter().map(Rc::new).collect::<Vec<_>>();
        info!(
            participants = participants.len(),
            control = lookups.control.len(),
            "prepared lookup tables"
        );
        Ok(Self { inputs, pages, columns, lookups, participants })
    }

    fn emitter(&self) -> RowEmitter<'_> {
        let reconstructor = OrderReconstructor::new(
            &self.inputs.legend,
            &self.inputs.references.item_lists.control,
            self.pages.first_list_position(),
        );
        RowEmitter {
            survey: &self.inputs.exports.survey,
            lists: &self.inputs.exports.lists,
            columns: &self.columns,
            lookups: &self.lookups,
            reconstructor,
        }
    }

    /// Participant counts that do not depend on emission.
    pub fn counts(&self) -> ParticipantCounts {
        let mut counts = ParticipantCounts { seen: self.participants.len(), ..Default::default() };
        for participant in &self.participants {
            if participant.list.is_none() {
                counts.skipped += 1;
            }
            if participant.violation {
                counts.violating += 1;
            }
            if participant.lists_row.is_none() {
                counts.unmatched += 1;
            }
        }
        counts
    }

    /// Emit the item-level records of every participant, in participant order.
    pub fn records(&self) -> WrangleResult<(Vec<ItemRecord>, ParticipantCounts)> {
        let emitter = self.emitter();
        let mut counts = self.counts();
        let mut records = Vec::new();
        for participant in &self.participants {
            if emitter.emit(participant, &mut records)? > 0 {
                counts.emitted += 1;
            }
        }
        info!(rows = records.len(), participants = counts.emitted, "built item-level records");
        Ok((records, counts))
    }

    /// Validate every slice and every participant's order without emitting.
    pub fn check(&self) -> WrangleResult<CheckReport> {
        let emitter = self.emitter();
        let mut orders_checked = 0;
        let mut partial_orders = 0;
        for participant in &self.participants {
            let Some(list) = participant.list else {
                continue;
            };
            let order = emitter.order_of(participant, list)?;
            orders_checked += 1;
            if !order.is_complete() {
                partial_orders += 1;
            }
        }

        let mut lookups = vec![LookupReport::familiarization(&self.lookups)];
        lookups.push(LookupReport::category(&self.lookups.control));
        for list in ListId::ALL {
            let list_lookups = self.lookups.list(list);
            lookups.push(LookupReport::category(&list_lookups.items));
            lookups.push(LookupReport::category(&list_lookups.repeated));
        }

        let expected_rows = ListId::ALL
            .into_iter()
            .map(|list| RowsPerList { list, rows: self.lookups.rows_for(list) })
            .collect();

        Ok(CheckReport {
            participants: self.counts(),
            orders_checked,
            partial_orders,
            lookups,
            expected_rows,
        })
    }
}

/// Size and first/last mapped column of one lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupReport {
    pub name: String,
    pub entries: usize,
    pub first_column: Option<String>,
    pub last_column: Option<String>,
}

impl LookupReport {
    fn category(lookup: &CategoryLookup) -> Self {
        let entries = lookup.entries();
        Self {
            name: lookup.name.clone(),
            entries: entries.len(),
            first_column: entries.first().map(|e| e.column.clone()),
            last_column: entries.last().map(|e| e.column.clone()),
        }
    }

    fn familiarization(lookups: &LookupTables) -> Self {
        let entries = &lookups.familiarization;
        Self {
            name: "familiarization".to_string(),
            entries: entries.len(),
            first_column: entries.first().map(|e| e.column.clone()),
            last_column: entries.last().map(|e| e.column.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowsPerList {
    pub list: ListId,
    pub rows: usize,
}

/// Outcome of a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub participants: ParticipantCounts,
    pub orders_checked: usize,
    pub partial_orders: usize,
    pub lookups: Vec<LookupReport>,
    pub expected_rows: Vec<RowsPerList>,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub output: std::path::PathBuf,
    pub manifest: Option<std::path::PathBuf>,
    pub rows: usize,
    pub participants: ParticipantCounts,
}

/// Load, check and prepare a study.
pub fn prepare_study(
    layout: &StudyLayout,
    config: &WrangleConfig,
) -> WrangleResult<PreparedStudy> {
    ensure_inputs_exist(layout)?;
    let inputs = StudyInputs::load(layout, &config.format)?;
    PreparedStudy::prepare(inputs, config.pages)
}

/// Run the whole pipeline and write the item-level dataset.
pub fn run(layout: &StudyLayout, config: &WrangleConfig) -> WrangleResult<RunSummary> {
    let started_at = timestamp();
    let study = prepare_study(layout, config)?;
    let (records, participants) = study.records()?;
    if records.is_empty() {
        warn!("no participant was assigned a list; writing an empty dataset");
    }

    let rows = write_records(&layout.output, &records)?;
    info!(rows, output = %layout.output.display(), "wrote item-level dataset");

    if let Some(manifest_path) = &layout.manifest {
        let manifest = RunManifest {
            config_name: config.name.clone(),
            tool_version: crate::version().to_string(),
            started_at,
            finished_at: timestamp(),
            output: layout.output.clone(),
            rows,
            participants,
            inputs: digest_inputs(layout.inputs())?,
        };
        manifest.write(manifest_path)?;
        info!(manifest = %manifest_path.display(), "wrote run manifest");
    }

    Ok(RunSummary {
        output: layout.output.clone(),
        manifest: layout.manifest.clone(),
        rows,
        participants,
    })
}

/// Fail early with a readable error when an input file is missing.
pub fn ensure_inputs_exist(layout: &StudyLayout) -> WrangleResult<()> {
    for (_, path) in layout.inputs() {
        if !path.is_file() {
            return Err(WrangleError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "input file not found"),
            ));
        }
    }
    Ok(())
}
