//! Raw deck types produced by the parser.
//!
//! The deck owns its keywords and each keyword owns its records. Nothing
//! points back up the tree; callers navigate by name or position.

use crate::error::DeckError;
use serde::Serialize;
use std::fmt;

// ──────────────────────────────────────────────
// Source location
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ──────────────────────────────────────────────
// Records and keywords
// ──────────────────────────────────────────────

/// One slash-terminated record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    raw_text: String,
    elements: Vec<String>,
    location: SourceLocation,
}

impl RawRecord {
    pub fn new(raw_text: String, elements: Vec<String>, location: SourceLocation) -> Self {
        RawRecord {
            raw_text,
            elements,
            location,
        }
    }

    /// The record text without its terminator. Spacing inside a line is
    /// kept; lines are joined by a single space.
    pub fn record_string(&self) -> &str {
        &self.raw_text
    }

    /// Quote-aware tokens of the record, quotes retained.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawKeyword {
    name: String,
    records: Vec<RawRecord>,
    location: SourceLocation,
    recognized: bool,
}

impl RawKeyword {
    pub fn new(
        name: String,
        records: Vec<RawRecord>,
        location: SourceLocation,
        recognized: bool,
    ) -> Self {
        RawKeyword {
            name,
            records,
            location,
            recognized,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// False when the keyword was missing from the policy table and was
    /// parsed with the unknown-keyword fallback.
    pub fn is_recognized(&self) -> bool {
        self.recognized
    }
}

// ──────────────────────────────────────────────
// Deck
// ──────────────────────────────────────────────

/// A fully parsed, include-flattened deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawDeck {
    keywords: Vec<RawKeyword>,
}

impl RawDeck {
    pub fn new(keywords: Vec<RawKeyword>) -> Self {
        RawDeck { keywords }
    }

    /// Number of keywords in the deck.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// First keyword named `name`.
    pub fn keyword(&self, name: &str) -> Result<&RawKeyword, DeckError> {
        self.keywords
            .iter()
            .find(|k| k.name == name)
            .ok_or_else(|| DeckError::keyword_not_found(name))
    }

    pub fn has_keyword(&self, name: &str) -> bool {
        self.keywords.iter().any(|k| k.name == name)
    }

    /// Every occurrence of `name`, in source order.
    pub fn keywords_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawKeyword> {
        self.keywords.iter().filter(move |k| k.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawKeyword> {
        self.keywords.iter()
    }

    pub fn keywords(&self) -> &[RawKeyword] {
        &self.keywords
    }

    /// Keywords parsed with the unknown-keyword fallback.
    pub fn unrecognized_keywords(&self) -> impl Iterator<Item = &RawKeyword> {
        self.keywords.iter().filter(|k| !k.recognized)
    }
}

impl<'a> IntoIterator for &'a RawDeck {
    type Item = &'a RawKeyword;
    type IntoIter = std::slice::Iter<'a, RawKeyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

impl fmt::Display for RawDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for keyword in &self.keywords {
            let plural = if keyword.records.len() == 1 { "" } else { "s" };
            write!(
                f,
                "{} ({} record{})",
                keyword.name,
                keyword.records.len(),
                plural
            )?;
            if !keyword.recognized {
                write!(f, " [unrecognized]")?;
            }
            writeln!(f)?;
            for record in &keyword.records {
                writeln!(f, "    {}", record.raw_text)?;
            }
        }
        Ok(())
    }
}
