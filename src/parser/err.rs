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

//! The single error type for both the lexer and the parser: one kind tag
//! (`Parse`), carrying position and a one-line message.

use smol_str::SmolStr;

/// A syntactic error raised while lexing or parsing the textual schema
/// format. `line`/`column` are 1-based; `column` counts bytes, giving
/// byte-accurate positions even across multi-byte UTF-8 characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
pub struct ParseError {
    pub filename: Option<SmolStr>,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(filename: Option<&str>, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            filename: filename.map(SmolStr::new),
            line,
            column,
            message: message.into(),
        }
    }

    /// Render the one-line, user-facing form: `file:line:col: message`.
    pub fn render(&self) -> String {
        match &self.filename {
            Some(f) => format!("{f}:{}:{}: {}", self.line, self.column, self.message),
            None => format!("{}:{}: {}", self.line, self.column, self.message),
        }
    }
}

impl std::fmt::Display for FormattedParseError<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.render())
    }
}

/// Wrapper used only to give [`ParseError`] an alternate, fully-rendered
/// `Display` without overriding the `thiserror`-derived one-line `message`.
pub struct FormattedParseError<'a>(pub &'a ParseError);
