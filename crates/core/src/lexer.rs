//! Deck lexer: one source text in, classified tokens out.
//!
//! The lexer works on bytes. Every character with syntactic meaning
//! (`'`, `/`, `-`, whitespace) is ASCII, so token boundaries always fall on
//! UTF-8 character boundaries and token text can be sliced straight out of
//! the source.

use crate::error::DeckError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keyword-shaped token standing alone on its line (trailing comments
    /// allowed). The parser decides whether it really opens a keyword or is
    /// record data.
    Keyword(String),
    /// Token starting with a single quote; quotes retained.
    Quoted(String),
    /// Any other token.
    Bare(String),
    /// `/` outside quotes
    Terminator,
    Eof,
}

impl Token {
    /// Token text as it appears in a record, if this token carries text.
    pub fn text(&self) -> Option<&str> {
        match self {
            Token::Keyword(s) | Token::Quoted(s) | Token::Bare(s) => Some(s),
            Token::Terminator | Token::Eof => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    /// Byte offsets of the token in its source.
    pub start: usize,
    pub end: usize,
}

/// Whether `word` has the shape of a keyword name: an ASCII uppercase
/// letter followed by ASCII uppercase letters or digits. Width is not
/// checked here.
pub fn is_keyword_shaped(word: &str) -> bool {
    let mut bytes = word.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_uppercase() => {
            bytes.all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        }
        _ => false,
    }
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\x0b' | b'\x0c')
}

/// Lazy token stream over one source text.
///
/// Yields `Eof` once at the end, then `None`. After an error the stream is
/// also exhausted.
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    filename: &'a str,
    pos: usize,
    line: u32,
    at_line_start: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, filename: &'a str) -> Self {
        Lexer {
            src,
            bytes: src.as_bytes(),
            filename,
            pos: 0,
            line: 1,
            at_line_start: true,
            finished: false,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_comment(&self) -> bool {
        self.peek_at(0) == Some(b'-') && self.peek_at(1) == Some(b'-')
    }

    /// Whether nothing but whitespace or a comment remains on the current
    /// line. Does not consume anything.
    fn rest_of_line_is_blank(&self) -> bool {
        let mut i = self.pos;
        while let Some(&b) = self.bytes.get(i) {
            if b == b'\n' {
                return true;
            }
            if !is_space(b) {
                return b == b'-' && self.bytes.get(i + 1) == Some(&b'-');
            }
            i += 1;
        }
        true
    }

    /// Move to the end of the current line without consuming the newline.
    fn skip_to_line_end(&mut self) {
        while let Some(b) = self.peek_at(0) {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<Spanned, DeckError> {
        loop {
            let Some(c) = self.peek_at(0) else {
                return Ok(Spanned {
                    token: Token::Eof,
                    line: self.line,
                    start: self.pos,
                    end: self.pos,
                });
            };

            if c == b'\n' {
                self.pos += 1;
                self.line += 1;
                self.at_line_start = true;
                continue;
            }

            if is_space(c) {
                self.pos += 1;
                continue;
            }

            if self.starts_comment() {
                self.skip_to_line_end();
                continue;
            }

            if c == b'/' {
                let start = self.pos;
                self.pos += 1;
                // anything after the slash on this line is commentary
                self.skip_to_line_end();
                self.at_line_start = false;
                return Ok(Spanned {
                    token: Token::Terminator,
                    line: self.line,
                    start,
                    end: start + 1,
                });
            }

            return self.word();
        }
    }

    fn word(&mut self) -> Result<Spanned, DeckError> {
        let start = self.pos;
        let tok_line = self.line;
        let mut in_quote = false;

        while let Some(b) = self.peek_at(0) {
            if in_quote {
                if b == b'\'' {
                    in_quote = false;
                } else if b == b'\n' {
                    self.line += 1;
                }
                self.pos += 1;
                continue;
            }
            if b == b'\n' || is_space(b) || b == b'/' || self.starts_comment() {
                break;
            }
            if b == b'\'' {
                in_quote = true;
            }
            self.pos += 1;
        }

        if in_quote {
            return Err(DeckError::unterminated_quote(self.filename, tok_line));
        }

        let text = &self.src[start..self.pos];
        let token = if text.starts_with('\'') {
            Token::Quoted(text.to_owned())
        } else if self.at_line_start
            && is_keyword_shaped(text)
            && self.rest_of_line_is_blank()
        {
            Token::Keyword(text.to_owned())
        } else {
            Token::Bare(text.to_owned())
        };
        self.at_line_start = false;

        Ok(Spanned {
            token,
            line: tok_line,
            start,
            end: self.pos,
        })
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Spanned, DeckError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        if matches!(result, Err(_) | Ok(Spanned { token: Token::Eof, .. })) {
            self.finished = true;
        }
        Some(result)
    }
}

/// Tokenize a whole source text. The returned vector always ends in `Eof`.
pub fn lex(src: &str, filename: &str) -> Result<Vec<Spanned>, DeckError> {
    Lexer::new(src, filename).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn tokens(src: &str) -> Vec<Token> {
        lex(src, "test.data")
            .expect("lex should succeed")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    fn kw(s: &str) -> Token {
        Token::Keyword(s.to_owned())
    }

    fn bare(s: &str) -> Token {
        Token::Bare(s.to_owned())
    }

    fn quoted(s: &str) -> Token {
        Token::Quoted(s.to_owned())
    }

    #[test]
    fn keyword_then_record() {
        assert_eq!(
            tokens("ENDSCALE\n'NODIR'  'REVERS'  1  20 /\n"),
            vec![
                kw("ENDSCALE"),
                quoted("'NODIR'"),
                quoted("'REVERS'"),
                bare("1"),
                bare("20"),
                Token::Terminator,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn blank_lines_and_comments_produce_nothing() {
        assert_eq!(
            tokens("\n\n-- a comment line\n   \nOIL -- trailing\n\n"),
            vec![kw("OIL"), Token::Eof]
        );
    }

    #[test]
    fn comment_marker_ends_token() {
        assert_eq!(
            tokens("DIMENS\n 10 10--comment\n 3 /\n"),
            vec![
                kw("DIMENS"),
                bare("10"),
                bare("10"),
                bare("3"),
                Token::Terminator,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn single_dash_is_data() {
        assert_eq!(
            tokens("X\n -1 /\n"),
            vec![kw("X"), bare("-1"), Token::Terminator, Token::Eof]
        );
    }

    #[test]
    fn slash_and_spaces_inside_quotes_are_literal() {
        assert_eq!(
            tokens("INCLUDE\n  'sti til fil/den er her' /\n"),
            vec![
                kw("INCLUDE"),
                quoted("'sti til fil/den er her'"),
                Token::Terminator,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn comment_marker_inside_quotes_is_literal() {
        assert_eq!(
            tokens("X\n'a--b' /\n"),
            vec![kw("X"), quoted("'a--b'"), Token::Terminator, Token::Eof]
        );
    }

    #[test]
    fn text_after_terminator_is_ignored() {
        assert_eq!(
            tokens("TSTEP\n 10 / ten days\n"),
            vec![kw("TSTEP"), bare("10"), Token::Terminator, Token::Eof]
        );
    }

    #[test]
    fn terminator_without_space_splits_token() {
        assert_eq!(
            tokens("X\n 1 2/\n"),
            vec![kw("X"), bare("1"), bare("2"), Token::Terminator, Token::Eof]
        );
    }

    #[test]
    fn only_line_leading_token_is_keyword_candidate() {
        assert_eq!(
            tokens("WELSPECS\n'P1' 'G1' OIL /\nOIL\n"),
            vec![
                kw("WELSPECS"),
                quoted("'P1'"),
                quoted("'G1'"),
                bare("OIL"),
                Token::Terminator,
                kw("OIL"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn keyword_shaped_leader_with_more_on_its_line_is_bare() {
        assert_eq!(
            tokens("COPY\n PERMX PERMY /\nGRIDUNIT\nFIELD /\n"),
            vec![
                kw("COPY"),
                bare("PERMX"),
                bare("PERMY"),
                Token::Terminator,
                kw("GRIDUNIT"),
                bare("FIELD"),
                Token::Terminator,
                Token::Eof,
            ]
        );
        assert_eq!(tokens("PORO 0.2\n")[0], bare("PORO"));
        assert_eq!(tokens("EDIT   -- section\n")[0], kw("EDIT"));
        assert_eq!(tokens("EDIT -1\n")[0], bare("EDIT"));
    }

    #[test]
    fn leading_quoted_string_is_never_keyword() {
        assert_eq!(tokens("'OIL' /\n")[0], quoted("'OIL'"));
    }

    #[test]
    fn lowercase_and_numeric_leaders_are_bare() {
        assert_eq!(
            tokens("oil\n1*\nRADFIN4\n"),
            vec![bare("oil"), bare("1*"), kw("RADFIN4"), Token::Eof]
        );
    }

    #[test]
    fn crlf_line_endings() {
        let spanned = lex("GRID\r\nDX\r\n 1 2 /\r\n", "crlf.data").unwrap();
        let toks: Vec<_> = spanned.iter().map(|s| s.token.clone()).collect();
        assert_eq!(
            toks,
            vec![
                kw("GRID"),
                kw("DX"),
                bare("1"),
                bare("2"),
                Token::Terminator,
                Token::Eof,
            ]
        );
        assert_eq!(spanned[2].line, 3);
    }

    #[test]
    fn tracks_lines_and_offsets() {
        let src = "OIL\n\nDIMENS\n 10 10 3 /\n";
        let spanned = lex(src, "pos.data").unwrap();
        assert_eq!(spanned[0].line, 1);
        assert_eq!(spanned[1].line, 3);
        assert_eq!(spanned[2].line, 4);
        assert_eq!(&src[spanned[2].start..spanned[2].end], "10");
    }

    #[test]
    fn unterminated_quote_at_eof_is_error() {
        let err = lex("X\n 'open /\n\n", "bad.data").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedQuotedString);
        assert_eq!(err.line, 2);
        assert_eq!(err.file, "bad.data");
    }

    #[test]
    fn iterator_stops_after_eof() {
        let mut lexer = Lexer::new("OIL\n", "it.data");
        assert!(matches!(lexer.next(), Some(Ok(Spanned { token: Token::Keyword(_), .. }))));
        assert!(matches!(lexer.next(), Some(Ok(Spanned { token: Token::Eof, .. }))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn iterator_stops_after_error() {
        let mut lexer = Lexer::new("'abc", "it.data");
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn non_ascii_inside_quotes_survives() {
        assert_eq!(tokens("X\n'Brønn' /\n")[1], quoted("'Brønn'"));
    }

    #[test]
    fn keyword_shape() {
        assert!(is_keyword_shaped("RADFIN4"));
        assert!(is_keyword_shaped("A"));
        assert!(!is_keyword_shaped("4RADFIN"));
        assert!(!is_keyword_shaped("Oil"));
        assert!(!is_keyword_shaped("WELL-1"));
        assert!(!is_keyword_shaped(""));
    }
}
