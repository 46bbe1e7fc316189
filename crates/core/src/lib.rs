//! rawdeck-core: structural parser for keyword/record deck files.
//!
//! Turns a root deck file and everything it `INCLUDE`s into a flat,
//! immutable [`RawDeck`]. Keyword semantics (units, value ranges,
//! cross-keyword checks) are left to the consumer.
//!
//! # Public API
//!
//! - [`DeckParser`] / [`parse_deck()`]: parse a deck from a root path
//! - [`PolicyTable`]: how many records each keyword owns
//! - [`RawDeck`], [`RawKeyword`], [`RawRecord`]: the parse result
//! - [`SourceProvider`]: file access seam ([`FileSystemProvider`],
//!   [`InMemoryProvider`])
//! - [`DeckError`] / [`ErrorKind`]
//!
//! The lexer and record parser are public for tooling that wants a single
//! file's tokens or items without include expansion.

pub mod builder;
pub mod deck;
pub mod error;
mod include;
pub mod lexer;
pub mod parser;
pub mod policy;
pub mod source;

// ── Convenience re-exports ───────────────────────────────────────────

pub use builder::{parse_deck, DeckParser, IncludeMode, ParseOptions};
pub use deck::{RawDeck, RawKeyword, RawRecord, SourceLocation};
pub use error::{DeckError, ErrorKind};
pub use policy::{Arity, Policy, PolicyTable, INCLUDE_KEYWORD, MAX_KEYWORD_LENGTH};
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
