//! Run manifest written next to the item-level dataset.
//!
//! Records which inputs (by SHA-256) produced an output, so a derivative can be
//! traced back to the exact data release.

use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{WrangleError, WrangleResult};

/// Digest of one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigest {
    /// What the file is used as (`survey`, `lists`, `legend`, ...).
    pub role: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// Participant counts of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParticipantCounts {
    pub seen: usize,
    pub emitted: usize,
    /// Participants without a list assignment.
    pub skipped: usize,
    pub violating: usize,
    /// Participants without a list-phase record.
    pub unmatched: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub config_name: String,
    pub tool_version: String,
    pub started_at: String,
    pub finished_at: String,
    pub output: PathBuf,
    pub rows: usize,
    pub participants: ParticipantCounts,
    pub inputs: Vec<InputDigest>,
}

impl RunManifest {
    pub fn write(&self, path: &Path) -> WrangleResult<()> {
        let body = serde_json::to_string_pretty(self)
            .map_err(|source| WrangleError::Json { path: path.to_path_buf(), source })?;
        fs::write(path, body).map_err(|e| WrangleError::io(path, e))
    }

    pub fn read(path: &Path) -> WrangleResult<Self> {
        let body = fs::read_to_string(path).map_err(|e| WrangleError::io(path, e))?;
        serde_json::from_str(&body)
            .map_err(|source| WrangleError::Json { path: path.to_path_buf(), source })
    }
}

/// `<output>.manifest.json`, in the output's directory.
pub fn manifest_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".manifest.json");
    output.with_file_name(name)
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
pub fn sha256_file(path: &Path) -> WrangleResult<String> {
    let file = fs::File::open(path).map_err(|e| WrangleError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader.read(&mut buf).map_err(|e| WrangleError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest every `(role, path)` pair.
pub fn digest_inputs<'a>(
    inputs: impl IntoIterator<Item = (&'a str, &'a Path)>,
) -> WrangleResult<Vec<InputDigest>> {
    inputs
        .into_iter()
        .map(|(role, path)| {
            Ok(InputDigest {
                role: role.to_string(),
                path: path.to_path_buf(),
                sha256: sha256_file(path)?,
            })
        })
        .collect()
}

/// Current time as RFC 3339.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
