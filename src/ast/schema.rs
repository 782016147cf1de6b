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

//! The unresolved `Schema` AST. Populated by the textual
//! parser, the JSON bridge, or the programmatic builders in
//! [`crate::ast::builder`]; treated as read-only once handed to
//! [`crate::resolver::resolve`].

use std::collections::BTreeMap;

use nonempty::NonEmpty;
use smol_str::SmolStr;

use super::ident::{Identifier, NamespaceId, Path, QuotedName};
use super::types::{Annotations, RecordType, Type};

/// Raised when a name is declared twice in the same namespace's declaration
/// space (the four declaration maps are disjoint by name).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{name}` is declared more than once in namespace `{namespace}`")]
pub struct DuplicateError {
    pub name: SmolStr,
    pub namespace: NamespaceId,
}

/// Raised when `__cedar` or a `__cedar::`-prefixed path is used somewhere a
/// user declaration name is expected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservedNameError {
    #[error("`{0}` is reserved and cannot be used as a namespace name")]
    Namespace(Path),
    #[error("`{0}` is reserved and cannot be used as a declaration name")]
    DeclarationName(SmolStr),
}

/// A full schema: every namespace, keyed by [`NamespaceId`] (the anonymous
/// namespace uses the empty-string key).
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub namespaces: BTreeMap<NamespaceId, Namespace>,
    /// Carried only for error messages.
    pub filename: Option<SmolStr>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the namespace at `id` (§4.6 `addNamespace`).
    pub fn namespace_mut(&mut self, id: NamespaceId) -> Result<&mut Namespace, ReservedNameError> {
        if id.is_cedar_reserved() {
            return Err(ReservedNameError::Namespace(
                id.path().cloned().expect("is_cedar_reserved implies named"),
            ));
        }
        Ok(self.namespaces.entry(id).or_default())
    }
}

/// One namespace's declarations.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    pub annotations: Annotations,
    pub entity_types: BTreeMap<Identifier, EntityDef>,
    pub enum_types: BTreeMap<Identifier, EnumDef>,
    pub actions: BTreeMap<QuotedName, ActionDef>,
    pub common_types: BTreeMap<Identifier, CommonDef>,
}

impl Namespace {
    /// Is `name` already used by any of the four declaration maps? Checked
    /// against the declaration's string form so that e.g. an action named
    /// `"Foo"` collides with an entity type named `Foo` -- no exception is
    /// made between the quoted-name and identifier namespaces.
    fn name_in_use(&self, name: &str) -> bool {
        self.entity_types.keys().any(|k| k.as_str() == name)
            || self.enum_types.keys().any(|k| k.as_str() == name)
            || self.common_types.keys().any(|k| k.as_str() == name)
            || self.actions.keys().any(|k| k.as_str() == name)
    }

    /// Reject `__cedar` as a declaration name and reject re-use of `name`
    /// within this namespace's declaration space.
    fn check_declarable(&self, ns: &NamespaceId, name: &str) -> crate::err::Result<()> {
        if name == super::ident::CEDAR_NAMESPACE {
            return Err(ReservedNameError::DeclarationName(name.into()).into());
        }
        if self.name_in_use(name) {
            return Err(DuplicateError {
                name: name.into(),
                namespace: ns.clone(),
            }
            .into());
        }
        Ok(())
    }

    pub fn add_entity(
        &mut self,
        ns: &NamespaceId,
        name: Identifier,
    ) -> crate::err::Result<&mut EntityDef> {
        self.check_declarable(ns, name.as_str())?;
        Ok(self.entity_types.entry(name).or_insert_with(EntityDef::new))
    }

    pub fn add_enum(
        &mut self,
        ns: &NamespaceId,
        name: Identifier,
        values: NonEmpty<QuotedName>,
    ) -> crate::err::Result<&mut EnumDef> {
        self.check_declarable(ns, name.as_str())?;
        Ok(self
            .enum_types
            .entry(name)
            .or_insert_with(|| EnumDef::new(values)))
    }

    pub fn add_action(
        &mut self,
        ns: &NamespaceId,
        name: QuotedName,
    ) -> crate::err::Result<&mut ActionDef> {
        self.check_declarable(ns, name.as_str())?;
        Ok(self.actions.entry(name).or_insert_with(ActionDef::new))
    }

    pub fn add_common_type(
        &mut self,
        ns: &NamespaceId,
        name: Identifier,
        ty: Type,
    ) -> crate::err::Result<&mut CommonDef> {
        self.check_declarable(ns, name.as_str())?;
        Ok(self
            .common_types
            .entry(name)
            .or_insert_with(|| CommonDef::new(ty)))
    }
}

/// An entity-type declaration.
#[derive(Debug, Clone, Default)]
pub struct EntityDef {
    pub annotations: Annotations,
    pub member_of_types: Vec<Path>,
    /// Always a `Record` variant when present (Invariant 2); enforced by
    /// using [`RecordType`] directly rather than the general [`Type`].
    pub shape: Option<RecordType>,
    pub tags: Option<Type>,
}

impl EntityDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_of(&mut self, types: Vec<Path>) -> &mut Self {
        self.member_of_types = types;
        self
    }

    pub fn shape(&mut self, shape: RecordType) -> &mut Self {
        self.shape = Some(shape);
        self
    }

    pub fn tags(&mut self, tags: Type) -> &mut Self {
        self.tags = Some(tags);
        self
    }

    pub fn annotate(&mut self, key: Identifier, value: impl Into<SmolStr>) -> &mut Self {
        self.annotations.set(key, value);
        self
    }
}

/// An enum entity-type declaration: an entity type whose inhabitants are a
/// fixed, non-empty set of string ids.
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub annotations: Annotations,
    pub values: NonEmpty<QuotedName>,
}

impl EnumDef {
    pub fn new(values: NonEmpty<QuotedName>) -> Self {
        Self {
            annotations: Annotations::new(),
            values,
        }
    }

    pub fn annotate(&mut self, key: Identifier, value: impl Into<SmolStr>) -> &mut Self {
        self.annotations.set(key, value);
        self
    }
}

/// A reference to an action, possibly namespace-qualified.
/// `ns::Action::"name"`, `ns::"name"`, and bare `"name"` all parse to this
/// shape; the printer renders the same shape back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRef {
    pub namespace: Option<Path>,
    pub name: QuotedName,
}

impl ActionRef {
    pub fn unqualified(name: QuotedName) -> Self {
        Self {
            namespace: None,
            name,
        }
    }

    pub fn qualified(namespace: Path, name: QuotedName) -> Self {
        Self {
            namespace: Some(namespace),
            name,
        }
    }
}

/// `appliesTo { principal: ..., resource: ..., context: ... }`. Each field
/// is independently optional; an absent field means "any".
#[derive(Debug, Clone, Default)]
pub struct AppliesTo {
    pub principal_types: Vec<Path>,
    pub resource_types: Vec<Path>,
    pub context: Option<Type>,
}

/// An action declaration.
#[derive(Debug, Clone, Default)]
pub struct ActionDef {
    pub annotations: Annotations,
    pub member_of: Vec<ActionRef>,
    pub applies_to: Option<AppliesTo>,
}

impl ActionDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn member_of(&mut self, refs: Vec<ActionRef>) -> &mut Self {
        self.member_of = refs;
        self
    }

    pub fn applies_to(
        &mut self,
        principal_types: Vec<Path>,
        resource_types: Vec<Path>,
        context: Option<Type>,
    ) -> &mut Self {
        self.applies_to = Some(AppliesTo {
            principal_types,
            resource_types,
            context,
        });
        self
    }

    pub fn annotate(&mut self, key: Identifier, value: impl Into<SmolStr>) -> &mut Self {
        self.annotations.set(key, value);
        self
    }
}

/// A common-type alias declaration.
#[derive(Debug, Clone)]
pub struct CommonDef {
    pub annotations: Annotations,
    pub ty: Type,
}

impl CommonDef {
    pub fn new(ty: Type) -> Self {
        Self {
            annotations: Annotations::new(),
            ty,
        }
    }

    pub fn annotate(&mut self, key: Identifier, value: impl Into<SmolStr>) -> &mut Self {
        self.annotations.set(key, value);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn duplicate_across_categories_is_rejected() {
        let ns = NamespaceId::anonymous();
        let mut n = Namespace::default();
        n.add_entity(&ns, Identifier::new("Foo").unwrap()).unwrap();
        let err = n
            .add_common_type(
                &ns,
                Identifier::new("Foo").unwrap(),
                Type::Primitive(super::super::types::PrimitiveType::Long),
            )
            .unwrap_err();
        assert!(matches!(err, crate::err::Error::Duplicate(DuplicateError { name, .. }) if name == "Foo"));
    }

    #[test]
    fn multi_name_duplicate_is_rejected() {
        let ns = NamespaceId::anonymous();
        let mut n = Namespace::default();
        n.add_entity(&ns, Identifier::new("A").unwrap()).unwrap();
        assert!(n.add_entity(&ns, Identifier::new("A").unwrap()).is_err());
    }

    #[test]
    fn reserved_declaration_name_rejected() {
        let ns = NamespaceId::anonymous();
        let mut n = Namespace::default();
        let err = n
            .add_entity(&ns, Identifier::new("__cedar").unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::err::Error::ReservedName(ReservedNameError::DeclarationName(_))
        ));
    }

    #[test]
    fn reserved_namespace_rejected() {
        let mut schema = Schema::new();
        let err = schema
            .namespace_mut(NamespaceId::named(Path::parse("__cedar").unwrap()))
            .unwrap_err();
        assert!(matches!(err, ReservedNameError::Namespace(_)));
    }
}
