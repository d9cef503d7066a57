#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use aoa_core::config::{SheetRef, WrangleConfig};
use aoa_core::layout::StudyLayout;
use aoa_core::model::ListId;
use aoa_core::pages::PageLayout;
use tempfile::TempDir;

/// A scaled-down instrument: full familiarization and repeated blocks, short lists.
pub const PAGES: PageLayout = PageLayout {
    demographic_time_pages: 5,
    familiarization_items: 10,
    control_pages: 3,
    list_pages: 30,
    repeated_pages: 25,
};

pub const SURVEY_TIME_SUM: i64 = 600;
pub const LISTS_TIME_SUM: i64 = 900;
pub const FAMILIARIZATION_RATING: i64 = 5;
pub const CONTROL_RATING: i64 = 4;
pub const LIST_RATING: i64 = 7;
pub const REPEATED_RATING: i64 = 8;

pub const CONTROL_ITEMS: [u32; 3] = [1, 2, 3];

/// Familiarization word whose export spelling needs Latin-1 decoding.
pub const UMLAUT_WORD: &str = "Bär";

pub fn list_items(list: ListId) -> Vec<u32> {
    let base = match list {
        ListId::A => 100,
        ListId::B => 200,
        ListId::C => 300,
    };
    (1..=PAGES.list_pages as u32).map(|k| base + k).collect()
}

pub fn repeated_items(list: ListId) -> Vec<u32> {
    list_items(list).into_iter().take(PAGES.repeated_pages).collect()
}

pub fn rotation_prefix(list: ListId) -> &'static str {
    match list {
        ListId::A => "RA02",
        ListId::B => "RA04",
        ListId::C => "RA05",
    }
}

fn rating_prefix(list: ListId) -> &'static str {
    match list {
        ListId::A => "W1",
        ListId::B => "W4",
        ListId::C => "W7",
    }
}

pub fn list_rating_columns(list: ListId) -> Vec<String> {
    (1..=PAGES.list_pages).map(|k| format!("{}{k:02}_01", rating_prefix(list))).collect()
}

pub fn rotation_columns(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|k| format!("{prefix}_{k:02}")).collect()
}

/// Legend label of a list-phase page.
pub fn page_label(list: ListId, page: usize) -> String {
    let control = PAGES.control_pages;
    let list_pages = PAGES.list_pages;
    let repeated = PAGES.repeated_pages;
    let items = list_items(list);
    if page <= control {
        return format!("s{page}");
    }
    match list {
        ListId::A if page <= control + list_pages => items[page - control - 1].to_string(),
        ListId::A => format!("r{}", items[page - control - list_pages - 1]),
        _ if page <= control + repeated => format!("r{}", items[page - control - 1]),
        _ => items[page - control - repeated - 1].to_string(),
    }
}

/// Every participant sees pages in reverse, so page `p` lands at the mirrored position.
pub fn list_position_of_page(page: usize) -> u32 {
    (PAGES.familiarization_items + PAGES.list_phase_pages() + 1 - page) as u32
}

pub fn familiarization_position_of_page(page: usize) -> u32 {
    (PAGES.familiarization_items + 1 - page) as u32
}

/// One participant of the generated exports.
#[derive(Debug, Clone)]
pub struct ParticipantFixture {
    pub id: String,
    pub list: Option<ListId>,
    pub survey: BTreeMap<String, String>,
    pub lists_record: bool,
    pub blank_lists: Vec<String>,
}

impl ParticipantFixture {
    /// An eligible participant (no violations) on `list`.
    pub fn new(id: &str, list: Option<ListId>) -> Self {
        let list_code = match list {
            Some(ListId::A) => "1",
            Some(ListId::B) => "2",
            Some(ListId::C) => "3",
            None => "",
        };
        let mut survey = BTreeMap::new();
        for (column, value) in [
            ("IN16", "1"),
            ("RA01", list_code),
            ("SD01", "1"),
            ("SD02_01", "31"),
            ("SD07", "1"),
            ("SD10", "4"),
            ("SD19", "1"),
            ("SD20", "2"),
            ("SD21", "2"),
            ("SD22", "1"),
            ("SD24", "2"),
            ("SD25", "2"),
        ] {
            survey.insert(column.to_string(), value.to_string());
        }
        Self { id: id.to_string(), list, survey, lists_record: true, blank_lists: Vec::new() }
    }

    /// Override (or blank with `""`) a survey-phase cell.
    pub fn survey(mut self, column: &str, value: &str) -> Self {
        self.survey.insert(column.to_string(), value.to_string());
        self
    }

    pub fn with_children(self, ages: &[&str]) -> Self {
        let mut fixture = self.survey("SD24", "1").survey("SD23", &ages.len().to_string());
        for (i, age) in ages.iter().enumerate() {
            fixture = fixture.survey(&format!("SD23x{:02}", i + 1), age);
        }
        fixture
    }

    pub fn without_lists_record(mut self) -> Self {
        self.lists_record = false;
        self
    }

    pub fn blank_lists(mut self, column: &str) -> Self {
        self.blank_lists.push(column.to_string());
        self
    }
}

/// A generated study root with exports, reference data and a config.
pub struct Study {
    pub dir: TempDir,
    pub config: WrangleConfig,
}

impl Study {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> StudyLayout {
        StudyLayout::new(self.root(), &self.config)
    }

    /// Persist the config as `aoa-wrangle.yaml` so the CLI discovers it.
    pub fn write_config(&self) -> PathBuf {
        let path = self.root().join("aoa-wrangle.yaml");
        self.config.save(&path).expect("save config");
        path
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }
}

pub fn fixture_config() -> WrangleConfig {
    let mut config = WrangleConfig::new("fixture");
    config.pages = PAGES;
    config.inputs.items = SheetRef {
        path: PathBuf::from("study_setup/data/multipic.csv"),
        sheet: "MultiPic".to_string(),
    };
    config.inputs.familiarization = SheetRef {
        path: PathBuf::from("study_setup/data/familiarisation.csv"),
        sheet: "Familiarisation".to_string(),
    };
    config
}

pub fn write_study(participants: &[ParticipantFixture]) -> Study {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = fixture_config();
    let layout = StudyLayout::new(dir.path(), &config);

    write_latin1(&layout.survey, &survey_csv(participants));
    write_latin1(&layout.lists, &lists_csv(participants));
    write_latin1(&layout.legend, &legend_csv());
    write_latin1(&layout.items.path, &items_csv());
    write_latin1(&layout.familiarization.path, &familiarization_csv());

    write_item_list(&layout.item_lists.control, &CONTROL_ITEMS);
    for list in ListId::ALL {
        let (items, repeated) = layout.item_lists.list(list);
        write_item_list(items, &list_items(list));
        write_item_list(repeated, &repeated_items(list));
    }

    Study { dir, config }
}

pub fn write_latin1(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    let bytes: Vec<u8> = text.chars().map(|c| u8::try_from(c).expect("latin1 char")).collect();
    fs::write(path, bytes).expect("write fixture");
}

fn write_item_list(path: &Path, items: &[u32]) {
    let body: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    write_latin1(path, &format!("{}\n", body.join("\n")));
}

fn csv_line(cells: &[String]) -> String {
    format!("{}\n", cells.join(","))
}

pub fn survey_headers() -> Vec<String> {
    let mut headers: Vec<String> = ["CASE", "IN16", "RA01", "SD01", "SD02_01", "SD07", "SD10"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for column in ["SD19", "SD20", "SD21", "SD22", "SD23"] {
        headers.push(column.to_string());
    }
    headers.extend((1..=9).map(|k| format!("SD23x{k:02}")));
    for column in ["SD24", "SD25"] {
        headers.push(column.to_string());
    }
    for list in ListId::ALL {
        headers.extend(rotation_columns(rotation_prefix(list), PAGES.list_phase_pages()));
        headers.push(format!("{}_CP", rotation_prefix(list)));
    }
    headers.extend(rotation_columns("RA03", PAGES.familiarization_items));
    headers.push("RA03_CP".to_string());
    headers.extend((1..=PAGES.familiarization_items).map(|k| format!("WF{k:02}_01")));
    headers.push("WF01_01a".to_string());
    headers.extend((1..=PAGES.survey_time_columns()).map(|k| format!("TIME{k:03}")));
    headers.push("TIME_SUM".to_string());
    headers.push("TIME_RSI".to_string());
    headers
}

fn survey_row(participant: &ParticipantFixture) -> BTreeMap<String, String> {
    let mut row = BTreeMap::new();
    row.insert("CASE".to_string(), participant.id.clone());
    for page in 1..=PAGES.familiarization_items {
        let position = familiarization_position_of_page(page) as usize;
        row.insert(format!("RA03_{position:02}"), page.to_string());
    }
    row.insert("RA03_CP".to_string(), "1".to_string());
    if let Some(list) = participant.list {
        let total = PAGES.list_phase_pages();
        for page in 1..=total {
            let position = total + 1 - page;
            row.insert(format!("{}_{position:02}", rotation_prefix(list)), page.to_string());
        }
    }
    for k in 1..=PAGES.familiarization_items {
        row.insert(format!("WF{k:02}_01"), FAMILIARIZATION_RATING.to_string());
    }
    row.insert("WF01_01a".to_string(), "1".to_string());
    for k in 1..=PAGES.survey_time_columns() {
        row.insert(format!("TIME{k:03}"), k.to_string());
    }
    row.insert("TIME_SUM".to_string(), SURVEY_TIME_SUM.to_string());
    row.insert("TIME_RSI".to_string(), "1.2".to_string());
    for (column, value) in &participant.survey {
        row.insert(column.clone(), value.clone());
    }
    row
}

pub fn survey_csv(participants: &[ParticipantFixture]) -> String {
    let headers = survey_headers();
    let mut body = csv_line(&headers);
    for participant in participants {
        let row = survey_row(participant);
        let cells: Vec<String> =
            headers.iter().map(|h| row.get(h).cloned().unwrap_or_default()).collect();
        body.push_str(&csv_line(&cells));
    }
    body
}

pub fn lists_headers() -> Vec<String> {
    let mut headers = vec!["REF".to_string()];
    headers.extend((1..=PAGES.control_pages).map(|k| format!("WS{k:02}_01")));
    for list in ListId::ALL {
        headers.extend(list_rating_columns(list));
    }
    headers.push("W101_01a".to_string());
    headers.extend((1..=75).map(|k| format!("WR{k:02}_01")));
    headers.extend((1..=PAGES.list_phase_pages()).map(|k| format!("TIME{k:03}")));
    headers.push("TIME_SUM".to_string());
    headers.push("TIME_RSI".to_string());
    headers
}

fn lists_row(participant: &ParticipantFixture) -> BTreeMap<String, String> {
    let mut row = BTreeMap::new();
    row.insert("REF".to_string(), participant.id.clone());
    for k in 1..=PAGES.control_pages {
        row.insert(format!("WS{k:02}_01"), CONTROL_RATING.to_string());
    }
    for list in ListId::ALL {
        for column in list_rating_columns(list) {
            row.insert(column, LIST_RATING.to_string());
        }
    }
    row.insert("W101_01a".to_string(), "1".to_string());
    for k in 1..=75 {
        row.insert(format!("WR{k:02}_01"), REPEATED_RATING.to_string());
    }
    for k in 1..=PAGES.list_phase_pages() {
        row.insert(format!("TIME{k:03}"), k.to_string());
    }
    row.insert("TIME_SUM".to_string(), LISTS_TIME_SUM.to_string());
    row.insert("TIME_RSI".to_string(), "0.5".to_string());
    for column in &participant.blank_lists {
        row.insert(column.clone(), String::new());
    }
    row
}

pub fn lists_csv(participants: &[ParticipantFixture]) -> String {
    let headers = lists_headers();
    let mut body = csv_line(&headers);
    for participant in participants.iter().filter(|p| p.lists_record) {
        let row = lists_row(participant);
        let cells: Vec<String> =
            headers.iter().map(|h| row.get(h).cloned().unwrap_or_default()).collect();
        body.push_str(&csv_line(&cells));
    }
    body
}

pub fn legend_csv() -> String {
    let mut body = String::from("VAR,RESPONSE,MEANING\n");
    body.push_str("SD01,1,weiblich\n");
    body.push_str("SD02_01,,free text\n");
    for list in ListId::ALL {
        for column in rotation_columns(rotation_prefix(list), PAGES.list_phase_pages()) {
            for page in 1..=PAGES.list_phase_pages() {
                body.push_str(&format!("{column},{page},{}\n", page_label(list, page)));
            }
        }
    }
    body
}

pub fn item_word(item: u32) -> String {
    format!("word{item}")
}

pub fn items_csv() -> String {
    let mut items: Vec<u32> = CONTROL_ITEMS.to_vec();
    for list in ListId::ALL {
        items.extend(list_items(list));
    }
    items.push(999);
    let mut body = String::from("ITEM,NAME1,EXAMPLE\n");
    for item in items {
        body.push_str(&format!("{item},{},Sentence about item {item}.\n", item_word(item)));
    }
    body.push_str(",,\n");
    body
}

pub fn familiarization_word(page: usize) -> String {
    if page == 1 {
        UMLAUT_WORD.to_string()
    } else {
        format!("fam{page}")
    }
}

pub fn familiarization_csv() -> String {
    let mut body = String::from("NAME,EXAMPLE\n");
    for page in 1..=PAGES.familiarization_items {
        body.push_str(&format!("{},Familiar sentence {page}.\n", familiarization_word(page)));
    }
    body
}
