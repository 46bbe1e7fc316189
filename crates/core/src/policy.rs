//! Keyword policy table: how many records a keyword owns.
//!
//! The table is plain immutable data. Build it once, then hand it to the
//! parser by reference; it is shared freely between independent parses.

use crate::error::DeckError;
use crate::lexer::is_keyword_shaped;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maximum width of a keyword name.
pub const MAX_KEYWORD_LENGTH: usize = 8;

/// Name of the file inclusion keyword.
pub const INCLUDE_KEYWORD: &str = "INCLUDE";

/// Record arity of a known keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arity {
    /// No records at all.
    Flag,
    /// Slash-terminated records until an empty `/` or the next keyword.
    DataRecords,
    /// At most this many records; closes early the same way as
    /// `DataRecords`.
    Fixed(usize),
}

/// Result of looking a name up in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Flag,
    DataRecords,
    Fixed(usize),
    /// Not in the table; parsed like `DataRecords`.
    Unknown,
}

impl From<Arity> for Policy {
    fn from(arity: Arity) -> Self {
        match arity {
            Arity::Flag => Policy::Flag,
            Arity::DataRecords => Policy::DataRecords,
            Arity::Fixed(n) => Policy::Fixed(n),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyTable {
    entries: HashMap<String, Arity>,
}

#[derive(Deserialize)]
struct PolicyFile {
    keywords: Vec<PolicyEntry>,
}

#[derive(Deserialize)]
struct PolicyEntry {
    name: String,
    arity: Arity,
}

const FLAGS: &[&str] = &[
    // sections
    "RUNSPEC", "GRID", "EDIT", "PROPS", "REGIONS", "SOLUTION", "SUMMARY", "SCHEDULE", "END",
    // phases and components
    "OIL", "WATER", "GAS", "DISGAS", "VAPOIL", "BRINE", "POLYMER",
    // unit systems
    "METRIC", "FIELD", "LAB",
    // run control
    "NOSIM", "ECHO", "NOECHO", "INIT", "NONNC", "IMPES",
    "UNIFIN", "UNIFOUT", "FMTIN", "FMTOUT",
    // summary vectors without arguments
    "FOPR", "FOPT", "FWPR", "FWPT", "FGPR", "FGPT", "FWIR", "FPR", "FGOR", "FWCT",
    "ALL", "EXCEL", "RPTONLY", "ENDBOX",
];

const SINGLE_RECORD: &[&str] = &[
    INCLUDE_KEYWORD,
    // RUNSPEC dimensions
    "DIMENS", "START", "TABDIMS", "WELLDIMS", "EQLDIMS", "REGDIMS", "VFPPDIMS", "VFPIDIMS",
    "AQUDIMS", "ENDSCALE", "NSTACK", "GRIDOPTS",
    // GRID
    "GRIDUNIT", "GRIDFILE", "SPECGRID", "MAPAXES", "COORD", "ZCORN", "DX", "DY", "DZ",
    "TOPS", "PORO", "PERMX", "PERMY", "PERMZ", "NTG", "ACTNUM", "MINPV", "PINCH", "RADFIN4",
    "BOX",
    // PROPS / REGIONS
    "PVTW", "DENSITY", "ROCK", "SATNUM", "PVTNUM", "EQLNUM", "FIPNUM",
    // SOLUTION / SCHEDULE
    "RPTSOL", "RPTSCHED", "RPTRST", "RESTART", "TSTEP",
];

const MULTI_RECORD: &[&str] = &[
    "EQUALS", "COPY", "ADD", "MULTIPLY", "SWOF", "SGOF", "SLGOF", "PVTO",
    "PVDG", "PVDO", "PVTG", "RSVD", "PBVD", "EQUIL", "WELSPECS", "COMPDAT", "WCONPROD",
    "WCONINJE", "WCONHIST", "WCONINJH", "WELOPEN", "DATES", "GRUPTREE", "COMPORD", "WBHP",
    "WOPR", "WWCT",
];

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Later insertions replace earlier ones.
    pub fn with(mut self, name: &str, arity: Arity) -> Self {
        self.entries.insert(name.to_owned(), arity);
        self
    }

    /// Built-in table for common ECLIPSE-style keywords.
    pub fn eclipse() -> Self {
        let mut entries = HashMap::new();
        for name in FLAGS {
            entries.insert((*name).to_owned(), Arity::Flag);
        }
        for name in SINGLE_RECORD {
            entries.insert((*name).to_owned(), Arity::Fixed(1));
        }
        for name in MULTI_RECORD {
            entries.insert((*name).to_owned(), Arity::DataRecords);
        }
        // three records: time stepping, convergence, iteration controls
        entries.insert("TUNING".to_owned(), Arity::Fixed(3));
        PolicyTable { entries }
    }

    /// Parse a table from JSON:
    ///
    /// ```json
    /// { "keywords": [ { "name": "OIL", "arity": "flag" },
    ///                 { "name": "DIMENS", "arity": { "fixed": 1 } } ] }
    /// ```
    ///
    /// `origin` names the source of the text in error messages.
    pub fn from_json(text: &str, origin: &str) -> Result<Self, DeckError> {
        let file: PolicyFile = serde_json::from_str(text).map_err(|e| {
            DeckError::invalid_policy(origin, format!("invalid policy table: {}", e))
        })?;

        let mut entries = HashMap::new();
        for entry in file.keywords {
            validate_keyword_name(&entry.name)
                .map_err(|msg| DeckError::invalid_policy(origin, msg))?;
            entries.insert(entry.name, entry.arity);
        }
        Ok(PolicyTable { entries })
    }

    /// Overlay `other` on this table; entries in `other` win.
    pub fn merge(mut self, other: PolicyTable) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn policy_for(&self, name: &str) -> Policy {
        self.entries
            .get(name)
            .map_or(Policy::Unknown, |arity| Policy::from(*arity))
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Check that `name` can be a keyword: keyword-shaped and at most
/// [`MAX_KEYWORD_LENGTH`] characters.
pub fn validate_keyword_name(name: &str) -> Result<(), String> {
    if !is_keyword_shaped(name) {
        return Err(format!(
            "'{}' is not a valid keyword name (expected uppercase letters and digits)",
            name
        ));
    }
    if name.len() > MAX_KEYWORD_LENGTH {
        return Err(format!(
            "keyword '{}' is longer than {} characters",
            name, MAX_KEYWORD_LENGTH
        ));
    }
    Ok(())
}
