//! Include resolution: read a file, parse it, and splice `INCLUDE` targets
//! in place, depth first.
//!
//! Every level resolves relative paths against the directory of the file
//! that holds the `INCLUDE`. Cycles are caught with an explicit stack of
//! canonical paths.

use crate::builder::{IncludeMode, ParseOptions};
use crate::deck::{RawKeyword, SourceLocation};
use crate::error::DeckError;
use crate::lexer;
use crate::parser::{self, FileItem};
use crate::policy::{PolicyTable, INCLUDE_KEYWORD};
use crate::source::SourceProvider;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files currently being parsed, outermost first.
///
/// The `Vec` keeps the order for error messages; the set gives O(1)
/// membership checks.
#[derive(Debug, Default)]
pub(crate) struct IncludeStack {
    order: Vec<PathBuf>,
    members: HashSet<PathBuf>,
}

impl IncludeStack {
    pub(crate) fn contains(&self, canon: &Path) -> bool {
        self.members.contains(canon)
    }

    pub(crate) fn push(&mut self, canon: PathBuf) {
        self.members.insert(canon.clone());
        self.order.push(canon);
    }

    pub(crate) fn pop(&mut self) {
        if let Some(canon) = self.order.pop() {
            self.members.remove(&canon);
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.order.len()
    }

    /// `a.data → b.data → target`, using file names only.
    pub(crate) fn chain_to(&self, target: &Path) -> String {
        self.order
            .iter()
            .map(|p| p.as_path())
            .chain(std::iter::once(target))
            .map(|p| {
                p.file_name()
                    .unwrap_or(p.as_os_str())
                    .to_string_lossy()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(" \u{2192} ")
    }
}

pub(crate) struct Loader<'a> {
    policies: &'a PolicyTable,
    provider: &'a dyn SourceProvider,
    options: ParseOptions,
    stack: IncludeStack,
}

impl<'a> Loader<'a> {
    pub(crate) fn new(
        policies: &'a PolicyTable,
        provider: &'a dyn SourceProvider,
        options: ParseOptions,
    ) -> Self {
        Loader {
            policies,
            provider,
            options,
            stack: IncludeStack::default(),
        }
    }

    /// Read and parse `path`, appending its flattened keywords to `out`.
    /// `origin` is the `INCLUDE` that requested the file, if any; errors
    /// about opening the file are reported there.
    pub(crate) fn load_file(
        &mut self,
        path: &Path,
        origin: Option<&SourceLocation>,
        out: &mut Vec<RawKeyword>,
    ) -> Result<(), DeckError> {
        let display = path.display().to_string();
        let open_error = |detail: String| match origin {
            Some(loc) => DeckError::invalid_input(
                &loc.file,
                loc.line,
                format!("cannot open included file '{}': {}", display, detail),
            ),
            None => DeckError::invalid_input(
                &display,
                0,
                format!("cannot open deck file '{}': {}", display, detail),
            ),
        };

        if !self.provider.exists(path) {
            return Err(open_error("no such file".to_owned()));
        }
        let canon = self
            .provider
            .canonicalize(path)
            .map_err(|e| open_error(e.to_string()))?;

        if self.stack.contains(&canon) {
            let chain = self.stack.chain_to(path);
            let (file, line) = origin.map_or((display.as_str(), 0), |loc| {
                (loc.file.as_str(), loc.line)
            });
            return Err(DeckError::cyclic_include(
                file,
                line,
                format!("include cycle detected: {}", chain),
            ));
        }

        let bytes = self
            .provider
            .read_source(path)
            .map_err(|e| open_error(e.to_string()))?;
        let text = String::from_utf8_lossy(&bytes);
        let src = text.strip_prefix('\u{feff}').unwrap_or(&*text);

        self.load_source(src, path, canon, out)
    }

    /// Parse already-read text as the file `path` (canonical form `canon`).
    pub(crate) fn load_source(
        &mut self,
        src: &str,
        path: &Path,
        canon: PathBuf,
        out: &mut Vec<RawKeyword>,
    ) -> Result<(), DeckError> {
        let filename = path.display().to_string();
        debug!(file = %filename, depth = self.stack.depth(), "parsing deck file");

        let tokens = lexer::lex(src, &filename)?;
        let items = parser::parse(&tokens, src, &filename, self.policies)?;

        let base_dir = self.provider.directory_of(path);
        self.stack.push(canon);
        for item in items {
            match item {
                FileItem::Keyword(keyword) => out.push(keyword),
                FileItem::Include {
                    record, location, ..
                } if self.options.includes == IncludeMode::Retain => {
                    out.push(RawKeyword::new(
                        INCLUDE_KEYWORD.to_owned(),
                        vec![record],
                        location,
                        true,
                    ));
                }
                FileItem::Include {
                    path: include_path,
                    location,
                    ..
                } => {
                    let target = self.provider.resolve(&base_dir, &include_path);
                    self.load_file(&target, Some(&location), out)?;
                }
            }
        }
        self.stack.pop();
        Ok(())
    }
}
