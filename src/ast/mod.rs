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

//! The in-memory Cedar schema representation: the unresolved AST, the
//! resolved model, and the programmatic construction API.

mod builder;
mod ident;
mod resolved;
mod schema;
mod types;

pub use builder::{add_namespace, new_schema};
pub use ident::{
    is_identifier_syntax, Identifier, InvalidIdentifierError, NamespaceId, Path, QuotedName,
    CEDAR_NAMESPACE,
};
pub use resolved::{
    EntityType, EntityUid, ResolvedAction, ResolvedAttribute, ResolvedEntity, ResolvedEnum,
    ResolvedNamespace, ResolvedRecordType, ResolvedSchema, ResolvedType,
};
pub use schema::{
    ActionDef, ActionRef, AppliesTo, CommonDef, DuplicateError, EntityDef, EnumDef, Namespace,
    ReservedNameError, Schema,
};
pub use types::{Annotations, Attribute, PrimitiveType, RecordType, Type};

/// The names pre-populated in every schema's built-in name table: the three
/// primitives plus the four standard extension types.
pub const BUILTIN_PRIMITIVE_NAMES: [&str; 3] = ["Long", "String", "Bool"];
pub const BUILTIN_EXTENSION_NAMES: [&str; 4] = ["ipaddr", "decimal", "datetime", "duration"];

/// Synthetic entity-type base name fabricated for every namespace that
/// declares at least one action.
pub const ACTION_ENTITY_TYPE_NAME: &str = "Action";
