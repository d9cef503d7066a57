use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{SheetRef, WrangleConfig, CONFIG_FILE_NAMES};
use crate::manifest::manifest_path;
use crate::model::ListId;

/// Resolved location of one reference sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetLocation {
    pub path: PathBuf,
    pub sheet: String,
}

/// Resolved item-list files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemListLocations {
    pub control: PathBuf,
    /// `(items, repeated)` per list, indexed by [`ListId::index`].
    pub lists: [(PathBuf, PathBuf); 3],
}

impl ItemListLocations {
    pub fn list(&self, list: ListId) -> (&Path, &Path) {
        let (items, repeated) = &self.lists[list.index()];
        (items.as_path(), repeated.as_path())
    }
}

/// Logical layout of a study on disk.
///
/// This is derived from a chosen root path and a config. It does *not* perform
/// any IO itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyLayout {
    /// Root directory of the study.
    pub root: PathBuf,
    pub survey: PathBuf,
    pub lists: PathBuf,
    pub legend: PathBuf,
    pub items: SheetLocation,
    pub familiarization: SheetLocation,
    pub item_lists: ItemListLocations,
    /// Item-level dataset.
    pub output: PathBuf,
    /// Run manifest, if enabled.
    pub manifest: Option<PathBuf>,
}

impl StudyLayout {
    /// Resolve every configured path against `root`. Absolute paths are kept.
    pub fn new(root: impl AsRef<Path>, config: &WrangleConfig) -> Self {
        let root = root.as_ref().to_path_buf();
        let resolve = |path: &Path| resolve_path(&root, path);
        let sheet = |sheet: &SheetRef| SheetLocation {
            path: resolve(&sheet.path),
            sheet: sheet.sheet.clone(),
        };

        let inputs = &config.inputs;
        let lists = &inputs.item_lists;
        let item_lists = ItemListLocations {
            control: resolve(&lists.control),
            lists: [
                (resolve(&lists.list_a), resolve(&lists.list_a_repeated)),
                (resolve(&lists.list_b), resolve(&lists.list_b_repeated)),
                (resolve(&lists.list_c), resolve(&lists.list_c_repeated)),
            ],
        };
        let output = resolve(&config.output.path);
        let manifest = config.output.manifest.then(|| manifest_path(&output));

        Self {
            survey: resolve(&inputs.survey),
            lists: resolve(&inputs.lists),
            legend: resolve(&inputs.legend),
            items: sheet(&inputs.items),
            familiarization: sheet(&inputs.familiarization),
            item_lists,
            output,
            manifest,
            root,
        }
    }

    /// Same layout with a different output file.
    pub fn with_output(mut self, output: impl AsRef<Path>) -> Self {
        self.output = resolve_path(&self.root, output.as_ref());
        if self.manifest.is_some() {
            self.manifest = Some(manifest_path(&self.output));
        }
        self
    }

    /// Config files probed in the root, in priority order.
    pub fn config_candidates(root: impl AsRef<Path>) -> Vec<PathBuf> {
        CONFIG_FILE_NAMES.iter().map(|name| root.as_ref().join(name)).collect()
    }

    /// Every input file with the role it plays, for digests and existence checks.
    pub fn inputs(&self) -> Vec<(&'static str, &Path)> {
        let mut inputs = vec![
            ("survey", self.survey.as_path()),
            ("lists", self.lists.as_path()),
            ("legend", self.legend.as_path()),
            ("items", self.items.path.as_path()),
            ("familiarization", self.familiarization.path.as_path()),
            ("control_items", self.item_lists.control.as_path()),
        ];
        for (list, roles) in ListId::ALL.into_iter().zip(LIST_ROLES) {
            let (items, repeated) = self.item_lists.list(list);
            inputs.push((roles[0], items));
            inputs.push((roles[1], repeated));
        }
        inputs
    }

    /// Render a path relative to the root when it lives below it.
    pub fn display_path(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => path.to_string_lossy().to_string(),
        }
    }
}

const LIST_ROLES: [[&str; 2]; 3] =
    [["list_a", "list_a_repeated"], ["list_b", "list_b_repeated"], ["list_c", "list_c_repeated"]];

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
