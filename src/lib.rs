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

//! `cedar-schema-core`: the in-memory representation, textual/JSON surface
//! syntaxes, and resolver for Cedar authorization schemas.
//!
//! This crate has no I/O, no logging, and no CLI -- it is a pure computation
//! library, consistent with `cedar-policy-core`'s own architecture. Five
//! functions make up the public surface: [`parse_textual`]/[`print_textual`]
//! round-trip the human-readable format, [`parse_json`]/[`print_json`]
//! round-trip the JSON format, and [`resolve`] turns either AST into a
//! fully-qualified [`ResolvedSchema`].

pub mod ast;
pub mod err;
pub mod json_schema;
pub mod parser;
pub mod printer;
pub mod resolver;

pub use ast::{ResolvedSchema, Schema};
pub use err::{Error, Result};
pub use resolver::resolve;

/// Parse the human-readable textual schema format. `filename` is carried
/// only for error messages.
pub fn parse_textual(bytes: &[u8], filename: Option<&str>) -> Result<Schema> {
    let src = std::str::from_utf8(bytes).map_err(|e| {
        parser::ParseError::new(filename, 1, (e.valid_up_to() + 1) as u32, "invalid UTF-8")
    })?;
    parser::parse(src, filename)
}

/// Render the canonical textual form.
pub fn print_textual(schema: &Schema) -> Vec<u8> {
    printer::print(schema)
}

/// Parse the JSON schema format.
pub fn parse_json(bytes: &[u8]) -> Result<Schema> {
    json_schema::parse(bytes)
}

/// Render the canonical JSON form.
pub fn print_json(schema: &Schema) -> Vec<u8> {
    json_schema::print(schema)
}
