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

//! Structural errors raised by the JSON bridge.
//! Duplicate-name and reserved-name errors from converting JSON into the AST
//! flow through [`crate::err::Error`] directly via the same
//! [`crate::ast::Namespace`] constructors the textual parser uses -- they are
//! not wrapped here.

use smol_str::SmolStr;

use crate::ast::InvalidIdentifierError;

#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    /// Malformed JSON, or JSON that doesn't match the expected object shape
    /// (wrong field type, duplicate object key, missing required field).
    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
    /// A name used as a namespace path, entity/common-type identifier, or
    /// extension name fails the lexical grammar.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifierError),
    /// A type-tagged object's `type` was a recognized tag that requires a
    /// field (`element` for `Set`, `name` for `Entity`/`Extension`/
    /// `EntityOrCommon`) that was missing.
    #[error("`{tag}` type is missing required field `{field}`")]
    MissingTypeField { tag: &'static str, field: &'static str },
    /// An `EnumDef`'s `enum` array was present but empty: `EnumDef.values`
    /// must have length >= 1.
    #[error("enum entity `{0}` has an empty `enum` array")]
    EmptyEnum(SmolStr),
    /// An entity's `shape` or an action's `context` resolved to something
    /// other than a `Record`: entity shapes and action contexts are always
    /// record-typed.
    #[error("`{0}`'s shape must be a record type")]
    ShapeNotRecord(SmolStr),
}
