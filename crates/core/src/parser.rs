//! Record parser: turns one file's token stream into keywords.
//!
//! Keywords are closed as soon as their arity policy says so; nothing is
//! revisited once a keyword is done. `INCLUDE` is intercepted here and
//! handed back as a [`FileItem::Include`] so the include resolver can
//! splice the target in place.
use crate::deck::{RawKeyword, RawRecord, SourceLocation};
use crate::error::DeckError;
use crate::lexer::{Spanned, Token};
use crate::policy::{Policy, PolicyTable, INCLUDE_KEYWORD, MAX_KEYWORD_LENGTH};
use tracing::{trace, warn};

/// One top-level item of a deck file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileItem {
    Keyword(RawKeyword),
    /// An `INCLUDE` with its validated path argument (quotes removed).
    Include {
        path: String,
        record: RawRecord,
        location: SourceLocation,
    },
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    src: &'a str,
    pos: usize,
    filename: String,
    policies: &'a PolicyTable,
}

impl<'a> Parser<'a> {
    fn new(
        tokens: &'a [Spanned],
        src: &'a str,
        filename: &str,
        policies: &'a PolicyTable,
    ) -> Self {
        Parser {
            tokens,
            src,
            pos: 0,
            filename: filename.to_owned(),
            policies,
        }
    }

    fn cur(&self) -> &'a Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &'a Token {
        &self.cur().token
    }

    fn advance(&mut self) -> &'a Spanned {
        let t = self.cur();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn location(&self, line: u32) -> SourceLocation {
        SourceLocation {
            file: self.filename.clone(),
            line,
        }
    }

    /// Whether the parser sits at a line that opens a known keyword.
    fn at_known_keyword(&self) -> bool {
        matches!(self.peek(), Token::Keyword(name) if self.policies.is_known(name))
    }

    fn parse_file(&mut self) -> Result<Vec<FileItem>, DeckError> {
        let mut items = Vec::new();
        loop {
            let s = self.cur();
            match &s.token {
                Token::Eof => break,
                Token::Keyword(name) => {
                    self.advance();
                    items.push(self.parse_keyword(name, s.line)?);
                }
                Token::Terminator => {
                    return Err(DeckError::malformed(
                        &self.filename,
                        s.line,
                        "record terminator '/' outside of any keyword",
                    ));
                }
                Token::Quoted(text) | Token::Bare(text) => {
                    return Err(DeckError::malformed(
                        &self.filename,
                        s.line,
                        format!("data '{}' found outside of any keyword", text),
                    ));
                }
            }
        }
        Ok(items)
    }

    fn parse_keyword(&mut self, name: &str, line: u32) -> Result<FileItem, DeckError> {
        if name.len() > MAX_KEYWORD_LENGTH {
            return Err(DeckError::invalid_keyword(
                &self.filename,
                line,
                format!(
                    "keyword '{}' is longer than {} characters",
                    name, MAX_KEYWORD_LENGTH
                ),
            ));
        }

        if name == INCLUDE_KEYWORD {
            return self.parse_include(line);
        }

        let policy = self.policies.policy_for(name);
        let records = match policy {
            Policy::Flag => Vec::new(),
            Policy::DataRecords => self.parse_records(None)?,
            Policy::Fixed(n) => self.parse_records(Some(n))?,
            Policy::Unknown => {
                warn!(
                    keyword = name,
                    file = %self.filename,
                    line,
                    "unrecognized keyword, reading records until the next known keyword"
                );
                self.parse_records(None)?
            }
        };
        trace!(keyword = name, records = records.len(), "keyword closed");

        Ok(FileItem::Keyword(RawKeyword::new(
            name.to_owned(),
            records,
            self.location(line),
            policy != Policy::Unknown,
        )))
    }

    /// Read records until the data section ends. `limit` caps the number of
    /// records for fixed-arity keywords, where an empty `/` counts as one
    /// fully defaulted record.
    fn parse_records(&mut self, limit: Option<usize>) -> Result<Vec<RawRecord>, DeckError> {
        let mut records = Vec::new();
        loop {
            if limit.is_some_and(|n| records.len() >= n) {
                break;
            }
            match self.peek() {
                Token::Eof => break,
                // a bare slash ends open-ended data; for fixed counts it is a
                // defaulted record and falls through to parse_record
                Token::Terminator if limit.is_none() => {
                    self.advance();
                    break;
                }
                _ if self.at_known_keyword() => break,
                _ => records.push(self.parse_record()?),
            }
        }
        Ok(records)
    }

    /// Read one record: all tokens up to the next terminator.
    fn parse_record(&mut self) -> Result<RawRecord, DeckError> {
        let first_line = self.cur().line;
        let mut elements = Vec::new();
        let mut segments: Vec<(u32, usize, usize)> = Vec::new();

        loop {
            let s = self.advance();
            match &s.token {
                Token::Terminator => break,
                Token::Eof => {
                    return Err(DeckError::malformed(
                        &self.filename,
                        first_line,
                        "record is not terminated by '/' before end of input",
                    ));
                }
                Token::Keyword(text) | Token::Quoted(text) | Token::Bare(text) => {
                    elements.push(text.clone());
                    match segments.last_mut() {
                        Some((line, _, end)) if *line == s.line => *end = s.end,
                        _ => segments.push((s.line, s.start, s.end)),
                    }
                }
            }
        }

        let raw_text = segments
            .iter()
            .map(|(_, start, end)| &self.src[*start..*end])
            .collect::<Vec<_>>()
            .join(" ");

        Ok(RawRecord::new(raw_text, elements, self.location(first_line)))
    }

    /// `INCLUDE` takes exactly one record with exactly one token.
    fn parse_include(&mut self, line: u32) -> Result<FileItem, DeckError> {
        let mut records = self.parse_records(Some(1))?;
        let Some(record) = records.pop() else {
            return Err(DeckError::missing_include_argument(
                &self.filename,
                line,
                "INCLUDE requires a record holding the file path",
            ));
        };
        if record.elements().len() != 1 {
            return Err(DeckError::missing_include_argument(
                &self.filename,
                line,
                format!(
                    "INCLUDE expects exactly one file path, found {} tokens",
                    record.elements().len()
                ),
            ));
        }
        let path = unquote(&record.elements()[0]).to_owned();
        if path.is_empty() {
            return Err(DeckError::missing_include_argument(
                &self.filename,
                line,
                "INCLUDE file path is empty",
            ));
        }
        Ok(FileItem::Include {
            path,
            record,
            location: self.location(line),
        })
    }
}

/// Strip one pair of enclosing single quotes.
fn unquote(token: &str) -> &str {
    token
        .strip_prefix('\'')
        .and_then(|t| t.strip_suffix('\''))
        .unwrap_or(token)
}

/// Parse one file's tokens. `src` must be the text the tokens were lexed
/// from. An empty token slice yields no items.
pub fn parse(
    tokens: &[Spanned],
    src: &str,
    filename: &str,
    policies: &PolicyTable,
) -> Result<Vec<FileItem>, DeckError> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }
    let mut p = Parser::new(tokens, src, filename, policies);
    p.parse_file()
}
