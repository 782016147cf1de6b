/*
 * Copyright Cedar Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      https://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Byte-accurate tokenizer for the textual schema format.
//!
//! Operates on the raw UTF-8 bytes of the source directly rather than going
//! through `char_indices`: every multi-byte character that can legally appear
//! outside a string literal (identifiers, keywords, punctuation) is ASCII,
//! and the only bytes we match on inside a string literal (`"` and `\`) are
//! themselves always single, unambiguous ASCII bytes in valid UTF-8, so a
//! byte scan never misreads a continuation byte as a delimiter.

use smol_str::SmolStr;

use super::err::ParseError;
use super::token::{Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a [u8],
    filename: Option<&'a str>,
    pos: usize,
    line: u32,
    /// Byte offset where the current line started.
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str, filename: Option<&'a str>) -> Self {
        Self {
            src: src.as_bytes(),
            filename,
            pos: 0,
            line: 1,
            line_start: 0,
        }
    }

    fn column(&self) -> u32 {
        (self.pos - self.line_start + 1) as u32
    }

    fn err(&self, line: u32, column: u32, message: impl Into<String>) -> ParseError {
        ParseError::new(self.filename, line, column, message)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(b)
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(b) if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let (line, column) = (self.line, self.column());
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(self.err(line, column, "unterminated block comment"))
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_string(&mut self) -> Result<Token, ParseError> {
        let (line, column) = (self.line, self.column());
        self.advance(); // opening quote
        let mut s = String::new();
        loop {
            match self.advance() {
                None => return Err(self.err(line, column, "unterminated string literal")),
                Some(b'"') => break,
                Some(b'\\') => {
                    let (eline, ecol) = (self.line, self.column());
                    match self.advance() {
                        Some(b'"') => s.push('"'),
                        Some(b'\\') => s.push('\\'),
                        Some(b'n') => s.push('\n'),
                        Some(b'r') => s.push('\r'),
                        Some(b't') => s.push('\t'),
                        Some(other) => {
                            return Err(self.err(
                                eline,
                                ecol,
                                format!("invalid escape sequence `\\{}`", other as char),
                            ))
                        }
                        None => return Err(self.err(eline, ecol, "unterminated string literal")),
                    }
                }
                Some(b) if b.is_ascii() => s.push(b as char),
                Some(lead) => {
                    // Multi-byte UTF-8 sequence: consume the continuation
                    // bytes and decode the whole sequence at once.
                    let start = self.pos - 1;
                    let extra = utf8_extra_bytes(lead);
                    for _ in 0..extra {
                        if self.advance().is_none() {
                            return Err(self.err(line, column, "unterminated string literal"));
                        }
                    }
                    let bytes = &self.src[start..self.pos];
                    match std::str::from_utf8(bytes) {
                        Ok(decoded) => s.push_str(decoded),
                        Err(_) => {
                            return Err(self.err(line, column, "invalid UTF-8 in string literal"))
                        }
                    }
                }
            }
        }
        Ok(Token {
            kind: TokenKind::Str(SmolStr::new(s)),
            line,
            column,
        })
    }

    fn lex_ident(&mut self) -> Token {
        let (line, column) = (self.line, self.column());
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b == b'_' || b.is_ascii_alphanumeric()) {
            self.advance();
        }
        let word = std::str::from_utf8(&self.src[start..self.pos])
            .expect("identifier bytes are always ASCII");
        let kind = TokenKind::keyword_for(word).unwrap_or_else(|| TokenKind::Ident(word.into()));
        Token { kind, line, column }
    }

    /// Lex and return the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column());
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        macro_rules! single {
            ($kind:expr) => {{
                self.advance();
                Token {
                    kind: $kind,
                    line,
                    column,
                }
            }};
        }
        let tok = match b {
            b'{' => single!(TokenKind::LBrace),
            b'}' => single!(TokenKind::RBrace),
            b'[' => single!(TokenKind::LBracket),
            b']' => single!(TokenKind::RBracket),
            b'(' => single!(TokenKind::LParen),
            b')' => single!(TokenKind::RParen),
            b'<' => single!(TokenKind::Lt),
            b'>' => single!(TokenKind::Gt),
            b',' => single!(TokenKind::Comma),
            b';' => single!(TokenKind::Semi),
            b'?' => single!(TokenKind::Question),
            b'=' => single!(TokenKind::Eq),
            b'@' => single!(TokenKind::At),
            b':' if self.peek_at(1) == Some(b':') => {
                self.advance();
                self.advance();
                Token {
                    kind: TokenKind::ColonColon,
                    line,
                    column,
                }
            }
            b':' => single!(TokenKind::Colon),
            b'"' => self.lex_string()?,
            b'_' => self.lex_ident(),
            b if b.is_ascii_alphabetic() => self.lex_ident(),
            other => {
                return Err(self.err(
                    line,
                    column,
                    format!("invalid token starting with `{}`", other as char),
                ))
            }
        };
        Ok(Some(tok))
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut out = Vec::new();
        while let Some(tok) = self.next_token()? {
            out.push(tok);
        }
        Ok(out)
    }

    /// Tokenize the whole input, also returning the `(line, column)` of the
    /// end of input, for parse errors that point past the last token (e.g.
    /// "unexpected end of input").
    pub fn tokenize_with_eof(mut self) -> Result<(Vec<Token>, (u32, u32)), ParseError> {
        let mut out = Vec::new();
        while let Some(tok) = self.next_token()? {
            out.push(tok);
        }
        Ok((out, (self.line, self.column())))
    }
}

/// Number of UTF-8 continuation bytes following a lead byte.
fn utf8_extra_bytes(lead: u8) -> usize {
    if lead & 0b1110_0000 == 0b1100_0000 {
        1
    } else if lead & 0b1111_0000 == 0b1110_0000 {
        2
    } else if lead & 0b1111_1000 == 0b1111_0000 {
        3
    } else {
        0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src, None)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_and_punctuation() {
        let k = kinds("entity User in [Group] { name: String };");
        assert_eq!(
            k,
            vec![
                TokenKind::Entity,
                TokenKind::Ident("User".into()),
                TokenKind::In,
                TokenKind::LBracket,
                TokenKind::Ident("Group".into()),
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::Ident("name".into()),
                TokenKind::Colon,
                TokenKind::String,
                TokenKind::RBrace,
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn double_colon_is_one_token() {
        assert_eq!(kinds("MyApp::User"), vec![
            TokenKind::Ident("MyApp".into()),
            TokenKind::ColonColon,
            TokenKind::Ident("User".into()),
        ]);
    }

    #[test]
    fn string_escapes() {
        let toks = kinds(r#""a\"b\\c\n\r\t""#);
        assert_eq!(toks, vec![TokenKind::Str("a\"b\\c\n\r\t".into())]);
    }

    #[test]
    fn invalid_escape_is_error() {
        let err = Lexer::new(r#""\q""#, Some("f.cedarschema")).tokenize().unwrap_err();
        assert_eq!(err.filename.as_deref(), Some("f.cedarschema"));
    }

    #[test]
    fn line_comment_and_block_comment_skipped() {
        assert_eq!(
            kinds("// hello\nentity /* mid */ User;"),
            vec![
                TokenKind::Entity,
                TokenKind::Ident("User".into()),
                TokenKind::Semi
            ]
        );
    }

    #[test]
    fn line_and_column_tracking() {
        let toks = Lexer::new("entity\n  User;", None).tokenize().unwrap();
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[0].column, 1);
        assert_eq!(toks[1].line, 2);
        assert_eq!(toks[1].column, 3);
    }

    #[test]
    fn invalid_token_byte() {
        let err = Lexer::new("entity %User;", None).tokenize().unwrap_err();
        assert!(err.message.contains("invalid token"));
    }
}
