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

//! The resolved model: fully-qualified, cycle-free,
//! shadow-free, with every common type inlined. Produced whole by
//! [`crate::resolver::resolve`] and immutable thereafter.

use std::collections::BTreeMap;

use nonempty::NonEmpty;

use super::ident::{NamespaceId, Path, QuotedName};
use super::types::{Annotations, PrimitiveType};

/// A fully-qualified entity type name, e.g. `MyApp::User`.
pub type EntityType = Path;

/// `(EntityType, name)`: identifies a specific entity, notably an action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityUid {
    pub entity_type: EntityType,
    pub id: QuotedName,
}

impl EntityUid {
    pub fn new(entity_type: EntityType, id: QuotedName) -> Self {
        Self { entity_type, id }
    }
}

impl std::fmt::Display for EntityUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::\"{}\"", self.entity_type, self.id)
    }
}

/// A resolved type. No `CommonRef`/`EntityOrCommonRef` variant exists here:
/// common types are inlined and ambiguous references are disambiguated
/// during resolution -- a resolved schema is total by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(PrimitiveType),
    Set(Box<ResolvedType>),
    Record(ResolvedRecordType),
    EntityRef(EntityType),
    Extension(super::ident::Identifier),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedRecordType {
    pub attributes: BTreeMap<QuotedName, ResolvedAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAttribute {
    pub ty: ResolvedType,
    pub required: bool,
    pub annotations: Annotations,
}

#[derive(Debug, Clone)]
pub struct ResolvedEntity {
    pub annotations: Annotations,
    pub member_of_types: Vec<EntityType>,
    pub shape: Option<ResolvedRecordType>,
    pub tags: Option<ResolvedType>,
}

#[derive(Debug, Clone)]
pub struct ResolvedEnum {
    pub annotations: Annotations,
    pub values: NonEmpty<QuotedName>,
}

#[derive(Debug, Clone)]
pub struct ResolvedAction {
    pub annotations: Annotations,
    pub member_of: Vec<EntityUid>,
    pub principal_types: Vec<EntityType>,
    pub resource_types: Vec<EntityType>,
    pub context: Option<ResolvedRecordType>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedNamespace {
    pub annotations: Annotations,
    pub entity_types: BTreeMap<EntityType, ResolvedEntity>,
    pub enum_types: BTreeMap<EntityType, ResolvedEnum>,
    pub actions: BTreeMap<EntityUid, ResolvedAction>,
}

/// The output of [`crate::resolver::resolve`]: immutable, self-contained,
/// freely shareable across threads for read-only consumption.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSchema {
    pub namespaces: BTreeMap<NamespaceId, ResolvedNamespace>,
}

impl ResolvedSchema {
    /// Look up an entity or enum type by its fully-qualified name, across
    /// whichever namespace it lives in.
    pub fn entity_type(&self, ty: &EntityType) -> Option<&ResolvedEntity> {
        let (ns, _) = ty.split_last();
        let ns_id = ns.map(NamespaceId::named).unwrap_or_default();
        self.namespaces.get(&ns_id)?.entity_types.get(ty)
    }

    pub fn action(&self, uid: &EntityUid) -> Option<&ResolvedAction> {
        let (ns, _) = uid.entity_type.split_last();
        let ns_id = ns.map(NamespaceId::named).unwrap_or_default();
        self.namespaces.get(&ns_id)?.actions.get(uid)
    }
}
