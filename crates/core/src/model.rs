//! Categorical values of the survey's coding scheme.
//!
//! Each enum's `as_str` is the spelling written to the item-level dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three counterbalanced item lists a participant is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ListId {
    A,
    B,
    C,
}

impl ListId {
    pub const ALL: [ListId; 3] = [ListId::A, ListId::B, ListId::C];

    pub fn as_str(self) -> &'static str {
        match self {
            ListId::A => "A",
            ListId::B => "B",
            ListId::C => "C",
        }
    }

    /// Stable index for per-list arrays.
    pub fn index(self) -> usize {
        match self {
            ListId::A => 0,
            ListId::B => 1,
            ListId::C => 2,
        }
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a participant was recruited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Prolific,
    #[serde(rename = "SONA")]
    Sona,
    #[serde(rename = "other")]
    Other,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Prolific => "Prolific",
            Platform::Sona => "SONA",
            Platform::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    Diverse,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
            Gender::Diverse => "diverse",
        }
    }
}

/// Country of residence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    Germany,
    Austria,
    Switzerland,
    #[serde(rename = "other")]
    Other,
}

impl Country {
    pub fn as_str(self) -> &'static str {
        match self {
            Country::Germany => "Germany",
            Country::Austria => "Austria",
            Country::Switzerland => "Switzerland",
            Country::Other => "other",
        }
    }
}

/// Eyesight: normal or corrected-to-normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sight {
    Normal,
    Corrected,
}

impl Sight {
    pub fn as_str(self) -> &'static str {
        match self {
            Sight::Normal => "normal",
            Sight::Corrected => "corrected",
        }
    }
}

/// Which block of the survey an output row was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Familiarization,
    List,
    Control,
    Repeated,
}
