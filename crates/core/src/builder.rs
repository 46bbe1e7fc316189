//! Deck builder: the single entry point from a root path to a [`RawDeck`].

use crate::deck::RawDeck;
use crate::error::DeckError;
use crate::include::Loader;
use crate::policy::PolicyTable;
use crate::source::{FileSystemProvider, SourceProvider};
use std::path::Path;
use tracing::info;

/// What to do with `INCLUDE` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncludeMode {
    /// Parse the target and splice its keywords in place.
    #[default]
    Expand,
    /// Keep `INCLUDE` as an ordinary keyword; the target is never opened.
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub includes: IncludeMode,
}

/// Parses deck files against an injected policy table.
///
/// A `DeckParser` holds only shared references, so one table can serve any
/// number of parsers.
pub struct DeckParser<'a> {
    policies: &'a PolicyTable,
    provider: &'a dyn SourceProvider,
    options: ParseOptions,
}

impl<'a> DeckParser<'a> {
    /// Parser reading from the local filesystem with default options.
    pub fn new(policies: &'a PolicyTable) -> Self {
        DeckParser {
            policies,
            provider: &FileSystemProvider,
            options: ParseOptions::default(),
        }
    }

    pub fn with_provider(mut self, provider: &'a dyn SourceProvider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the deck rooted at `root`, following includes.
    ///
    /// A missing or unreadable root fails with `InvalidInputPath` before
    /// anything is tokenized. Any error aborts the whole parse; no partial
    /// deck is ever returned.
    pub fn parse(&self, root: &Path) -> Result<RawDeck, DeckError> {
        let mut keywords = Vec::new();
        let mut loader = Loader::new(self.policies, self.provider, self.options);
        loader.load_file(root, None, &mut keywords)?;

        info!(file = %root.display(), keywords = keywords.len(), "deck parsed");
        Ok(RawDeck::new(keywords))
    }

    /// Parse in-memory text as though it were the file `name`. Relative
    /// includes resolve against `name`'s directory through the provider.
    pub fn parse_str(&self, src: &str, name: &Path) -> Result<RawDeck, DeckError> {
        let canon = self
            .provider
            .canonicalize(name)
            .unwrap_or_else(|_| name.to_owned());
        let mut keywords = Vec::new();
        let mut loader = Loader::new(self.policies, self.provider, self.options);
        loader.load_source(src, name, canon, &mut keywords)?;
        Ok(RawDeck::new(keywords))
    }
}

/// Parse `path` with the built-in keyword table, reading from the local
/// filesystem and expanding includes.
pub fn parse_deck(path: &Path) -> Result<RawDeck, DeckError> {
    let policies = PolicyTable::eclipse();
    DeckParser::new(&policies).parse(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::source::InMemoryProvider;

    #[test]
    fn missing_root_is_invalid_input() {
        let policies = PolicyTable::eclipse();
        let provider = InMemoryProvider::from_pairs([("/d/a.data", "OIL\n")]);
        let parser = DeckParser::new(&policies).with_provider(&provider);
        for root in ["/d/nonexistingfile.asdf", "/d/", "", "/nowhere/a.data"] {
            let err = parser.parse(Path::new(root)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInputPath, "root: {:?}", root);
        }
    }

    #[test]
    fn parse_uses_injected_provider_and_table() {
        let policies = PolicyTable::eclipse();
        let provider = InMemoryProvider::from_pairs([
            ("/d/main.data", "RUNSPEC\nOIL\nINCLUDE\n 'x.inc' /\n"),
            ("/d/x.inc", "TSTEP\n 1 2 3 /\n"),
        ]);
        let deck = DeckParser::new(&policies)
            .with_provider(&provider)
            .parse(Path::new("/d/main.data"))
            .unwrap();
        assert_eq!(deck.len(), 3);
        let tstep = deck.keyword("TSTEP").unwrap();
        assert_eq!(tstep.records()[0].elements().len(), 3);
        assert!(!deck.has_keyword("INCLUDE"));
    }

    #[test]
    fn parse_str_resolves_includes_next_to_name() {
        let policies = PolicyTable::eclipse();
        let provider = InMemoryProvider::from_pairs([("/d/grid.inc", "GRID\n")]);
        let deck = DeckParser::new(&policies)
            .with_provider(&provider)
            .parse_str("INCLUDE\n grid.inc /\nEDIT\n", Path::new("/d/inline.data"))
            .unwrap();
        let names: Vec<&str> = deck.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["GRID", "EDIT"]);
    }

    #[test]
    fn retain_option_is_honoured() {
        let policies = PolicyTable::eclipse();
        let provider = InMemoryProvider::from_pairs([("/d/main.data", "INCLUDE\n 'x.inc' /\n")]);
        let deck = DeckParser::new(&policies)
            .with_provider(&provider)
            .with_options(ParseOptions {
                includes: IncludeMode::Retain,
            })
            .parse(Path::new("/d/main.data"))
            .unwrap();
        assert_eq!(deck.keyword("INCLUDE").unwrap().records().len(), 1);
    }

    #[test]
    fn failure_returns_no_deck() {
        let policies = PolicyTable::eclipse();
        let provider =
            InMemoryProvider::from_pairs([("/d/main.data", "OIL\nWATER\nDIMENS\n 1 1 1\n")]);
        let result = DeckParser::new(&policies)
            .with_provider(&provider)
            .parse(Path::new("/d/main.data"));
        assert!(matches!(
            result,
            Err(DeckError {
                kind: ErrorKind::MalformedRecord,
                ..
            })
        ));
    }

    #[test]
    fn one_table_serves_parsers_on_several_threads() {
        let policies = PolicyTable::eclipse();
        std::thread::scope(|scope| {
            for i in 0..4 {
                let policies = &policies;
                scope.spawn(move || {
                    let provider = InMemoryProvider::from_pairs([(
                        "/t/deck.data",
                        format!("TSTEP\n {} /\n", i),
                    )]);
                    let deck = DeckParser::new(policies)
                        .with_provider(&provider)
                        .parse(Path::new("/t/deck.data"))
                        .unwrap();
                    let tstep = deck.keyword("TSTEP").unwrap();
                    assert_eq!(tstep.records()[0].elements()[0], i.to_string());
                });
            }
        });
    }
}
