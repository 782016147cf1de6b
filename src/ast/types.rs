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

//! The unresolved type AST and annotations.

use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

use super::ident::{Identifier, Path, QuotedName};

/// One of the three Cedar primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Long,
    String,
    Bool,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Long => "Long",
            Self::String => "String",
            Self::Bool => "Bool",
        })
    }
}

/// An unresolved schema type. `EntityRef`/`CommonRef` are only ever
/// constructed by programmatic builders that already know which they mean;
/// the parser and JSON bridge always produce `EntityOrCommonRef` for an
/// ambiguous bare-name reference, leaving disambiguation to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Set(Box<Type>),
    Record(RecordType),
    /// A named extension type, e.g. `ipaddr`. Not restricted to the four
    /// built-ins -- an unrecognized extension name is accepted here and only
    /// rejected downstream if something actually needs to evaluate it.
    Extension(Identifier),
    /// An explicit, disambiguated entity-type reference.
    EntityRef(Path),
    /// An explicit, disambiguated common-type reference.
    CommonRef(Path),
    /// A reference that is syntactically ambiguous between an entity type
    /// and a common type until the resolver disambiguates it (RFC 24: common
    /// type wins).
    EntityOrCommonRef(Path),
}

impl Type {
    pub fn set_of(element: Type) -> Self {
        Self::Set(Box::new(element))
    }
}

/// `{ attr: Type, attr2?: Type, ... }`. Attribute names are [`QuotedName`]s
/// because the grammar allows either a bare identifier or a quoted string as
/// an attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordType {
    pub attributes: BTreeMap<QuotedName, Attribute>,
}

impl RecordType {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub ty: Type,
    pub required: bool,
    pub annotations: Annotations,
}

impl Attribute {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            required: true,
            annotations: Annotations::new(),
        }
    }
}

/// `@key("value")` pairs attached to a declaration. A bare `@key` is
/// equivalent to `@key("")` -- there is no tri-state absent/empty
/// distinction. Preserves first-seen order; a repeated key overwrites the
/// value in place rather than moving it to the end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotations(Vec<(Identifier, SmolStr)>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: Identifier, value: impl Into<SmolStr>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &Identifier) -> Option<&SmolStr> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &SmolStr)> {
        self.0.iter().map(|(k, v)| (k, v))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn annotations_repeated_key_keeps_latest_value_and_position() {
        let mut a = Annotations::new();
        a.set(Identifier::new("doc").unwrap(), "first");
        a.set(Identifier::new("other").unwrap(), "mid");
        a.set(Identifier::new("doc").unwrap(), "second");
        let collected: Vec<_> = a.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(collected, vec![("doc", "second"), ("other", "mid")]);
    }

    #[test]
    fn bare_annotation_is_empty_string() {
        let mut a = Annotations::new();
        a.set(Identifier::new("flag").unwrap(), "");
        assert_eq!(a.get(&Identifier::new("flag").unwrap()).unwrap(), "");
    }
}
