use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{WrangleError, WrangleResult};
use crate::pages::PageLayout;
use crate::table::TextEncoding;

/// Config file names probed in the study root, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 3] =
    ["aoa-wrangle.yaml", "aoa-wrangle.yml", "aoa-wrangle.json"];

/// Current config format version.
pub const CONFIG_VERSION: &str = "0.1.0";

/// On-disk format of a config file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.json` is JSON; anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ConfigFormat::Yaml => CONFIG_FILE_NAMES[0],
            ConfigFormat::Json => CONFIG_FILE_NAMES[2],
        }
    }
}

/// A named sheet of a spreadsheet (or a CSV export of it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRef {
    pub path: PathBuf,
    pub sheet: String,
}

/// Item-number list files of the study setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemListPaths {
    pub list_a: PathBuf,
    pub list_a_repeated: PathBuf,
    pub list_b: PathBuf,
    pub list_b_repeated: PathBuf,
    pub list_c: PathBuf,
    pub list_c_repeated: PathBuf,
    pub control: PathBuf,
}

impl Default for ItemListPaths {
    fn default() -> Self {
        let dir = Path::new("study_setup/data/items_lists");
        Self {
            list_a: dir.join("list_A.csv"),
            list_a_repeated: dir.join("list_A_repeated.csv"),
            list_b: dir.join("list_B.csv"),
            list_b_repeated: dir.join("list_B_repeated.csv"),
            list_c: dir.join("list_C.csv"),
            list_c_repeated: dir.join("list_C_repeated.csv"),
            control: dir.join("control_items.csv"),
        }
    }
}

/// Input files. Relative paths are resolved against the study root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    /// Survey-phase export.
    pub survey: PathBuf,
    /// List-phase export.
    pub lists: PathBuf,
    /// Value legend of the survey-phase export.
    pub legend: PathBuf,
    pub items: SheetRef,
    pub familiarization: SheetRef,
    pub item_lists: ItemListPaths,
}

impl Default for InputPaths {
    fn default() -> Self {
        let survey_dir = Path::new("estimates/data/raw/survey");
        let sentences = PathBuf::from("study_setup/data/example_sentences.ods");
        Self {
            survey: survey_dir.join("data_survey_start.csv"),
            lists: survey_dir.join("data_lists.csv"),
            legend: survey_dir.join("values_survey_start.csv"),
            items: SheetRef { path: sentences.clone(), sheet: "MultiPic".to_string() },
            familiarization: SheetRef { path: sentences, sheet: "Familiarisation".to_string() },
            item_lists: ItemListPaths::default(),
        }
    }
}

/// Text format of the delimited exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFormat {
    pub delimiter: char,
    pub encoding: TextEncoding,
}

impl Default for InputFormat {
    fn default() -> Self {
        Self { delimiter: ',', encoding: TextEncoding::Latin1 }
    }
}

impl InputFormat {
    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> WrangleResult<u8> {
        u8::try_from(self.delimiter)
            .map_err(|_| WrangleError::InvalidDelimiter { delimiter: self.delimiter })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Write `<output>.manifest.json` alongside the dataset.
    pub manifest: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("estimates/data/raw/derivatives/item_based_data.csv"),
            manifest: true,
        }
    }
}

/// Serializable configuration of a wrangling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrangleConfig {
    /// Human-friendly study name.
    pub name: String,
    /// Config format version, not data release version.
    pub config_version: String,
    pub inputs: InputPaths,
    pub output: OutputConfig,
    pub format: InputFormat,
    pub pages: PageLayout,
}

impl Default for WrangleConfig {
    fn default() -> Self {
        Self::new("aoa-estimates")
    }
}

impl WrangleConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_version: CONFIG_VERSION.to_string(),
            inputs: InputPaths::default(),
            output: OutputConfig::default(),
            format: InputFormat::default(),
            pages: PageLayout::default(),
        }
    }

    /// Load a YAML or JSON config, choosing the format by extension.
    pub fn load(path: &Path) -> WrangleResult<Self> {
        let body = std::fs::read_to_string(path).map_err(|e| WrangleError::io(path, e))?;
        Self::parse(&body, ConfigFormat::from_path(path), path)
    }

    pub fn parse(body: &str, format: ConfigFormat, origin: &Path) -> WrangleResult<Self> {
        let parsed = match format {
            ConfigFormat::Json => serde_json::from_str(body).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yaml::from_str(body).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| WrangleError::Config { path: origin.to_path_buf(), message })
    }

    pub fn render(&self, format: ConfigFormat) -> WrangleResult<String> {
        let rendered = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| WrangleError::Config { path: PathBuf::new(), message })
    }

    /// Load the config for a study root.
    ///
    /// An explicit path must exist. Otherwise the first of [`CONFIG_FILE_NAMES`]
    /// present in `root` is used, falling back to defaults. Returns the file the
    /// config came from, if any.
    pub fn discover(
        root: &Path,
        explicit: Option<&Path>,
    ) -> WrangleResult<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let found = CONFIG_FILE_NAMES.iter().map(|name| root.join(name)).find(|p| p.is_file());
        match found {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn save(&self, path: &Path) -> WrangleResult<()> {
        let body = self.render(ConfigFormat::from_path(path))?;
        std::fs::write(path, body).map_err(|e| WrangleError::io(path, e))
    }
}
