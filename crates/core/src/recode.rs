//! Raw survey code → semantic category mapping tables.
//!
//! Each demographic question is described once as a [`Recoding`]: the survey
//! column it reads and the enumerated codes it accepts. A code that is part
//! of the table decodes to exactly one value and may itself be flagged as an
//! eligibility violation; any other code (including a missing answer) decodes
//! to `None` and is always a violation.

use crate::model::{Country, Gender, ListId, Platform, Sight};

/// One accepted code of a survey question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeEntry<T> {
    pub code: i64,
    pub value: T,
    /// Whether answering with this code breaches the study's eligibility criteria.
    pub violates: bool,
}

/// Result of decoding one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<T> {
    pub value: Option<T>,
    pub violation: bool,
}

/// Mapping table for one survey question.
#[derive(Debug, Clone, Copy)]
pub struct Recoding<T: 'static> {
    pub column: &'static str,
    pub entries: &'static [CodeEntry<T>],
}

impl<T: Copy + 'static> Recoding<T> {
    pub fn decode(&self, code: Option<i64>) -> Decoded<T> {
        match code.and_then(|c| self.entries.iter().find(|entry| entry.code == c)) {
            Some(entry) => Decoded { value: Some(entry.value), violation: entry.violates },
            None => Decoded { value: None, violation: true },
        }
    }

    /// Codes enumerated by this table, in declaration order.
    pub fn codes(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|entry| entry.code)
    }
}

const fn ok<T>(code: i64, value: T) -> CodeEntry<T> {
    CodeEntry { code, value, violates: false }
}

const fn violating<T>(code: i64, value: T) -> CodeEntry<T> {
    CodeEntry { code, value, violates: true }
}

pub const PLATFORM: Recoding<Platform> = Recoding {
    column: "IN16",
    entries: &[ok(1, Platform::Prolific), ok(2, Platform::Sona), ok(-1, Platform::Other)],
};

/// List assignment. An unassigned participant is also marked unfinished.
pub const LIST: Recoding<ListId> =
    Recoding { column: "RA01", entries: &[ok(1, ListId::A), ok(2, ListId::B), ok(3, ListId::C)] };

pub const GENDER: Recoding<Gender> = Recoding {
    column: "SD01",
    entries: &[ok(1, Gender::Female), ok(2, Gender::Male), ok(3, Gender::Diverse)],
};

/// Residence outside Germany is recorded but counts as a protocol deviation.
pub const COUNTRY: Recoding<Country> = Recoding {
    column: "SD07",
    entries: &[
        ok(1, Country::Germany),
        violating(2, Country::Austria),
        violating(3, Country::Switzerland),
        violating(4, Country::Other),
    ],
};

/// German as first language.
pub const FIRST_LANGUAGE: Recoding<bool> =
    Recoding { column: "SD19", entries: &[ok(1, true), violating(2, false)] };

/// Monolingual upbringing until age 6. Note the inverted coding (1 = no).
pub const MONOLINGUAL: Recoding<bool> =
    Recoding { column: "SD20", entries: &[violating(1, false), ok(2, true)] };

pub const LANGUAGE_DISORDER: Recoding<bool> =
    Recoding { column: "SD21", entries: &[violating(1, true), ok(2, false)] };

pub const READING_DISORDER: Recoding<bool> =
    Recoding { column: "SD25", entries: &[violating(1, true), ok(2, false)] };

pub const SIGHT: Recoding<Sight> =
    Recoding { column: "SD22", entries: &[ok(1, Sight::Normal), ok(2, Sight::Corrected)] };

pub const CHILDREN: Recoding<bool> =
    Recoding { column: "SD24", entries: &[ok(1, true), ok(2, false)] };
