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

//! The unified error type for the library surface.
//!
//! Each phase (lexer/parser, JSON bridge, resolver) raises its own narrow
//! error type so callers can match on it directly; [`Error`] just wraps all
//! of them behind one kind tag each, for the top-level functions that can
//! fail at any phase.

use crate::ast::{DuplicateError, ReservedNameError};
use crate::json_schema::err::JsonError;
use crate::parser::ParseError;
use crate::resolver::err::{CycleError, ShadowError, UndefinedTypeError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Syntactic error with position, from the lexer or parser.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Structural error in JSON input, from the JSON bridge.
    #[error(transparent)]
    InvalidJson(#[from] JsonError),
    /// Same-named declaration added twice in one namespace.
    #[error(transparent)]
    Duplicate(#[from] DuplicateError),
    /// `__cedar`/`__cedar::…` used as a declaration name or namespace.
    #[error(transparent)]
    ReservedName(#[from] ReservedNameError),
    /// A named namespace redeclares a name from the anonymous namespace
    /// (resolver phase 2, RFC 70).
    #[error(transparent)]
    Shadow(#[from] ShadowError),
    /// Common types form a dependency cycle (resolver phase 3).
    #[error(transparent)]
    Cycle(#[from] CycleError),
    /// A reference cannot be resolved (resolver phases 4-5).
    #[error(transparent)]
    UndefinedType(#[from] UndefinedTypeError),
}

pub type Result<T> = std::result::Result<T, Error>;
