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

//! Lexical primitives: [`Identifier`], [`Path`], [`QuotedName`].

use std::fmt;
use std::str::FromStr;

use nonempty::NonEmpty;
use smol_str::SmolStr;

/// The name of the implicit namespace every schema reserves for itself
/// (`__cedar::Long`, `__cedar::ipaddr`, ...). No user declaration may use
/// this name or a path beginning with it.
pub const CEDAR_NAMESPACE: &str = "__cedar";

/// Returns whether `s` matches the identifier grammar `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier_syntax(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// An error produced when a string fails the [`Identifier`] grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a valid identifier")]
pub struct InvalidIdentifierError(pub SmolStr);

/// A validated identifier: `[A-Za-z_][A-Za-z0-9_]*`, non-empty.
///
/// This is the name carrier for entity type names, common-type names, record
/// attribute names, and annotation keys when they happen to be bare words.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(pub(crate) SmolStr);

impl Identifier {
    /// Validate and wrap `s`.
    pub fn new(s: impl Into<SmolStr>) -> Result<Self, InvalidIdentifierError> {
        let s = s.into();
        if is_identifier_syntax(&s) {
            Ok(Self(s))
        } else {
            Err(InvalidIdentifierError(s))
        }
    }

    /// Build an `Identifier` without checking the grammar. Callers must only
    /// use this for names known to already be valid (e.g. the hard-coded
    /// `"Action"` synthetic entity type name).
    pub(crate) fn new_unchecked(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is this the reserved `__cedar` identifier?
    pub fn is_cedar_reserved(&self) -> bool {
        self.0 == CEDAR_NAMESPACE
    }
}

impl FromStr for Identifier {
    type Err = InvalidIdentifierError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A non-empty, `::`-separated sequence of [`Identifier`]s, most-significant
/// first (so `A::B::C` has `first() == A` and `last() == C`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(NonEmpty<Identifier>);

impl Path {
    /// Build a `Path` from a single identifier.
    pub fn single(id: Identifier) -> Self {
        Self(NonEmpty::new(id))
    }

    /// Build a `Path` from a non-empty sequence, most-significant first.
    pub fn new(ids: NonEmpty<Identifier>) -> Self {
        Self(ids)
    }

    /// The first (outermost-namespace) component.
    pub fn first(&self) -> &Identifier {
        self.0.first()
    }

    /// The last (base-name) component.
    pub fn last(&self) -> &Identifier {
        self.0.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_single(&self) -> bool {
        self.0.len() == 1
    }

    /// Append `name` as a new final component, e.g. `qualify`-ing a base path
    /// with a namespace prefix already applied.
    pub fn pushed(&self, name: Identifier) -> Self {
        let mut ids = self.0.clone();
        ids.push(name);
        Self(ids)
    }

    /// Split into the leading namespace path (if any) and the trailing
    /// base name.
    pub fn split_last(&self) -> (Option<Path>, &Identifier) {
        if self.0.len() == 1 {
            return (None, self.0.last());
        }
        let mut ids: Vec<Identifier> = self.0.iter().cloned().collect();
        ids.pop();
        let mut iter = ids.into_iter();
        let mut ne = NonEmpty::new(iter.next().expect("len > 1 checked above"));
        for id in iter {
            ne.push(id);
        }
        (Some(Path(ne)), self.0.last())
    }

    /// Is this path equal to, or prefixed by, the reserved `__cedar`
    /// namespace? (Covers both `__cedar` itself and `__cedar::anything`.)
    pub fn is_cedar_reserved(&self) -> bool {
        self.0.first().is_cedar_reserved()
    }

    /// Parse a `::`-separated path. Each segment must be a valid identifier.
    pub fn parse(s: &str) -> Result<Self, InvalidIdentifierError> {
        let mut ids = s.split("::").map(Identifier::new);
        let first = ids
            .next()
            .expect("str::split always yields at least one element")?;
        let mut ne = NonEmpty::new(first);
        for id in ids {
            ne.push(id?);
        }
        Ok(Self(ne))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for id in self.0.iter() {
            if !first {
                write!(f, "::")?;
            }
            write!(f, "{id}")?;
            first = false;
        }
        Ok(())
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path {
    /// ASCII-ascending on the rendered `a::b::c` string, matching the
    /// printer's canonical-ordering requirement.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

/// The identifier of a namespace: either the anonymous namespace (the
/// empty-string key) or a named, dotted [`Path`].
///
/// `NamespaceId` sorts anonymous-first then ASCII-ascending by path, which is
/// exactly the canonical printer order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NamespaceId(Option<Path>);

impl NamespaceId {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn named(path: Path) -> Self {
        Self(Some(path))
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }

    pub fn path(&self) -> Option<&Path> {
        self.0.as_ref()
    }

    pub fn is_cedar_reserved(&self) -> bool {
        self.0.as_ref().is_some_and(Path::is_cedar_reserved)
    }

    /// `Qualify(ns, name)`: `name` if `ns` is anonymous, else `ns::name`.
    pub fn qualify(&self, name: &Identifier) -> Path {
        match &self.0 {
            None => Path::single(name.clone()),
            Some(p) => p.pushed(name.clone()),
        }
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => Ok(()),
            Some(p) => write!(f, "{p}"),
        }
    }
}

impl FromStr for NamespaceId {
    type Err = InvalidIdentifierError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            Ok(Self::anonymous())
        } else {
            Path::parse(s).map(Self::named)
        }
    }
}

/// An arbitrary name: an enum value, an action name, or a record attribute
/// name. Unlike [`Identifier`] this has no grammar restriction -- it is any
/// string -- but it prints quoted when it wouldn't lex back as a bare
/// identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuotedName(SmolStr);

impl QuotedName {
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does this name need double-quoting when printed in textual form?
    pub fn needs_quotes(&self) -> bool {
        !is_identifier_syntax(&self.0)
    }
}

impl From<Identifier> for QuotedName {
    fn from(id: Identifier) -> Self {
        Self(id.0)
    }
}

impl From<&str> for QuotedName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for QuotedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identifier_grammar() {
        assert!(Identifier::new("foo").is_ok());
        assert!(Identifier::new("_foo123").is_ok());
        assert!(Identifier::new("").is_err());
        assert!(Identifier::new("1foo").is_err());
        assert!(Identifier::new("foo-bar").is_err());
        assert!(Identifier::new("foo bar").is_err());
    }

    #[test]
    fn path_display_roundtrip() {
        let p = Path::parse("MyApp::Sub::User").unwrap();
        assert_eq!(p.to_string(), "MyApp::Sub::User");
        assert_eq!(p.last().as_str(), "User");
        assert_eq!(p.first().as_str(), "MyApp");
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn path_split_last() {
        let p = Path::parse("A::B::C").unwrap();
        let (prefix, base) = p.split_last();
        assert_eq!(prefix.unwrap().to_string(), "A::B");
        assert_eq!(base.as_str(), "C");

        let single = Path::parse("A").unwrap();
        let (prefix, base) = single.split_last();
        assert!(prefix.is_none());
        assert_eq!(base.as_str(), "A");
    }

    #[test]
    fn namespace_id_ordering_anonymous_first() {
        let anon = NamespaceId::anonymous();
        let alpha = NamespaceId::named(Path::parse("Alpha").unwrap());
        let zeta = NamespaceId::named(Path::parse("Zeta").unwrap());
        let mut v = vec![zeta.clone(), anon.clone(), alpha.clone()];
        v.sort();
        assert_eq!(v, vec![anon, alpha, zeta]);
    }

    #[test]
    fn reserved_namespace() {
        assert!(Path::parse("__cedar").unwrap().is_cedar_reserved());
        assert!(Path::parse("__cedar::Foo").unwrap().is_cedar_reserved());
        assert!(!Path::parse("MyApp").unwrap().is_cedar_reserved());
    }

    #[test]
    fn quoted_name_needs_quotes() {
        assert!(!QuotedName::new("read").needs_quotes());
        assert!(QuotedName::new("read write").needs_quotes());
        assert!(QuotedName::new("").needs_quotes());
    }
}
