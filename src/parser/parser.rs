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

//! Recursive-descent parser over the token stream. Builds the AST in
//! [`crate::ast`] directly -- there is no separate pre-resolution "parse
//! tree" type, since the unresolved [`Schema`] already carries everything
//! the grammar can produce (including `EntityOrCommonRef` for ambiguous type
//! references).
//!
//! The grammar is LL(1) once `::` is lexed as a single token, so every
//! `parse_*` method below consumes exactly the tokens it needs and never
//! backtracks.

use nonempty::NonEmpty;
use smol_str::SmolStr;

use crate::ast::{
    ActionRef, Annotations, Attribute, Identifier, Namespace, NamespaceId, Path, PrimitiveType,
    QuotedName, RecordType, Schema, Type,
};
use crate::err::{Error, Result};

use super::err::ParseError;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};

/// Parse a full schema from textual source.
pub fn parse(src: &str, filename: Option<&str>) -> Result<Schema> {
    let (tokens, eof) = Lexer::new(src, filename).tokenize_with_eof()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        filename,
        eof,
    };
    let mut schema = Schema::new();
    schema.filename = filename.map(SmolStr::new);
    while parser.peek().is_some() {
        parser.parse_decl(&mut schema)?;
    }
    Ok(schema)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    filename: Option<&'a str>,
    eof: (u32, u32),
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn current_pos(&self) -> (u32, u32) {
        self.tokens
            .get(self.pos)
            .map(|t| (t.line, t.column))
            .unwrap_or(self.eof)
    }

    fn bump(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        self.pos += 1;
        tok
    }

    fn err_here(&self, message: impl Into<String>) -> ParseError {
        let (line, column) = self.current_pos();
        ParseError::new(self.filename, line, column, message)
    }

    fn unexpected_eof(&self, expected: &str) -> Error {
        self.err_here(format!("unexpected end of input, expected {expected}"))
            .into()
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        match self.peek() {
            Some(k) if *k == kind => Ok(self.bump()),
            Some(k) => Err(self
                .err_here(format!(
                    "expected {}, found {}",
                    TokenKind::describe(&kind),
                    k.describe()
                ))
                .into()),
            None => Err(self.unexpected_eof(&TokenKind::describe(&kind))),
        }
    }

    fn expect_ident(&mut self) -> Result<Identifier> {
        match self.peek() {
            Some(TokenKind::Ident(s)) => {
                let s = s.clone();
                self.bump();
                Identifier::new(s)
                    .map_err(|e| self.err_here(e.to_string()).into())
            }
            Some(k) => Err(self
                .err_here(format!("expected an identifier, found {}", k.describe()))
                .into()),
            None => Err(self.unexpected_eof("an identifier")),
        }
    }

    fn expect_string(&mut self) -> Result<SmolStr> {
        match self.peek() {
            Some(TokenKind::Str(s)) => {
                let s = s.clone();
                self.bump();
                Ok(s)
            }
            Some(k) => Err(self
                .err_here(format!("expected a string literal, found {}", k.describe()))
                .into()),
            None => Err(self.unexpected_eof("a string literal")),
        }
    }

    /// `ident | string`, used for action/enum names and attribute names.
    fn expect_name(&mut self) -> Result<QuotedName> {
        match self.peek() {
            Some(TokenKind::Ident(s)) => {
                let s = s.clone();
                self.bump();
                Ok(QuotedName::new(s))
            }
            Some(TokenKind::Str(s)) => {
                let s = s.clone();
                self.bump();
                Ok(QuotedName::new(s))
            }
            Some(k) => Err(self
                .err_here(format!("expected a name, found {}", k.describe()))
                .into()),
            None => Err(self.unexpected_eof("a name")),
        }
    }

    // annotations := { "@" ident ( "(" string ")" )? }
    fn parse_annotations(&mut self) -> Result<Annotations> {
        let mut annotations = Annotations::new();
        while matches!(self.peek(), Some(TokenKind::At)) {
            self.bump();
            let key = self.expect_ident()?;
            let value = if matches!(self.peek(), Some(TokenKind::LParen)) {
                self.bump();
                let v = self.expect_string()?;
                self.expect(TokenKind::RParen)?;
                v
            } else {
                SmolStr::default()
            };
            annotations.set(key, value);
        }
        Ok(annotations)
    }

    // path := ident { "::" ident }
    fn parse_path(&mut self) -> Result<Path> {
        let first = self.expect_ident()?;
        let mut ids = NonEmpty::new(first);
        while matches!(self.peek(), Some(TokenKind::ColonColon)) {
            self.bump();
            ids.push(self.expect_ident()?);
        }
        Ok(Path::new(ids))
    }

    // path_or_list := path | "[" path { "," path } "]"
    fn parse_path_or_list(&mut self) -> Result<Vec<Path>> {
        if matches!(self.peek(), Some(TokenKind::LBracket)) {
            self.bump();
            let mut out = Vec::new();
            if !matches!(self.peek(), Some(TokenKind::RBracket)) {
                out.push(self.parse_path()?);
                while matches!(self.peek(), Some(TokenKind::Comma)) {
                    self.bump();
                    out.push(self.parse_path()?);
                }
            }
            self.expect(TokenKind::RBracket)?;
            Ok(out)
        } else {
            Ok(vec![self.parse_path()?])
        }
    }

    /// `ns::Action::"name"`, `ns::"name"`, bare `"name"`, or bare (unquoted)
    /// `name`. A trailing literal `Action` segment right before the final
    /// name is a type tag, not part of the namespace: `ns::Action::"name"`
    /// and `ns::"name"` name the same action.
    fn parse_action_ref(&mut self) -> Result<ActionRef> {
        match self.peek() {
            Some(TokenKind::Str(_)) => {
                let name = self.expect_string()?;
                Ok(ActionRef::unqualified(QuotedName::new(name)))
            }
            Some(TokenKind::Ident(_)) => {
                let first = self.expect_ident()?;
                if !matches!(self.peek(), Some(TokenKind::ColonColon)) {
                    return Ok(ActionRef::unqualified(QuotedName::from(first)));
                }
                let mut ids = vec![first];
                loop {
                    self.expect(TokenKind::ColonColon)?;
                    match self.peek() {
                        Some(TokenKind::Str(_)) => {
                            let name = self.expect_string()?;
                            if ids.len() > 1 && ids.last().expect("non-empty").as_str() == "Action"
                            {
                                ids.pop();
                            }
                            let mut iter = ids.into_iter();
                            let mut ne =
                                NonEmpty::new(iter.next().expect("at least one identifier"));
                            for id in iter {
                                ne.push(id);
                            }
                            return Ok(ActionRef::qualified(Path::new(ne), QuotedName::new(name)));
                        }
                        Some(TokenKind::Ident(_)) => {
                            ids.push(self.expect_ident()?);
                        }
                        Some(k) => {
                            return Err(self
                                .err_here(format!(
                                    "expected an identifier or string after `::`, found {}",
                                    k.describe()
                                ))
                                .into())
                        }
                        None => return Err(self.unexpected_eof("an identifier or string")),
                    }
                }
            }
            Some(k) => Err(self
                .err_here(format!("expected an action reference, found {}", k.describe()))
                .into()),
            None => Err(self.unexpected_eof("an action reference")),
        }
    }

    // ref_or_list := action_ref | "[" action_ref { "," action_ref } "]"
    fn parse_action_ref_or_list(&mut self) -> Result<Vec<ActionRef>> {
        if matches!(self.peek(), Some(TokenKind::LBracket)) {
            self.bump();
            let mut out = Vec::new();
            if !matches!(self.peek(), Some(TokenKind::RBracket)) {
                out.push(self.parse_action_ref()?);
                while matches!(self.peek(), Some(TokenKind::Comma)) {
                    self.bump();
                    out.push(self.parse_action_ref()?);
                }
            }
            self.expect(TokenKind::RBracket)?;
            Ok(out)
        } else {
            Ok(vec![self.parse_action_ref()?])
        }
    }

    // type := "Bool" | "Long" | "String" | "Set" "<" type ">" | record_type | path
    fn parse_type(&mut self) -> Result<Type> {
        match self.peek() {
            Some(TokenKind::Bool) => {
                self.bump();
                Ok(Type::Primitive(PrimitiveType::Bool))
            }
            Some(TokenKind::Long) => {
                self.bump();
                Ok(Type::Primitive(PrimitiveType::Long))
            }
            Some(TokenKind::String) => {
                self.bump();
                Ok(Type::Primitive(PrimitiveType::String))
            }
            Some(TokenKind::Set) => {
                self.bump();
                self.expect(TokenKind::Lt)?;
                let elem = stacker::maybe_grow(32 * 1024, 1024 * 1024, || self.parse_type())?;
                self.expect(TokenKind::Gt)?;
                Ok(Type::set_of(elem))
            }
            Some(TokenKind::LBrace) => Ok(Type::Record(self.parse_record_type()?)),
            Some(TokenKind::Ident(_)) => Ok(Type::EntityOrCommonRef(self.parse_path()?)),
            Some(k) => Err(self
                .err_here(format!("expected a type, found {}", k.describe()))
                .into()),
            None => Err(self.unexpected_eof("a type")),
        }
    }

    // record_type := "{" { attr "," } "}"
    // attr := annotations ( ident | string ) ( "?" )? ":" type
    fn parse_record_type(&mut self) -> Result<RecordType> {
        self.expect(TokenKind::LBrace)?;
        let mut rt = RecordType::new();
        while !matches!(self.peek(), Some(TokenKind::RBrace)) {
            let annotations = self.parse_annotations()?;
            let name = self.expect_name()?;
            let required = if matches!(self.peek(), Some(TokenKind::Question)) {
                self.bump();
                false
            } else {
                true
            };
            self.expect(TokenKind::Colon)?;
            let ty = stacker::maybe_grow(32 * 1024, 1024 * 1024, || self.parse_type())?;
            if rt.attributes.contains_key(&name) {
                return Err(self
                    .err_here(format!("duplicate attribute `{name}` in record type"))
                    .into());
            }
            rt.attributes.insert(
                name,
                Attribute {
                    ty,
                    required,
                    annotations,
                },
            );
            if matches!(self.peek(), Some(TokenKind::Comma)) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(rt)
    }

    // idlist := ident { "," ident }
    fn parse_idlist(&mut self) -> Result<NonEmpty<Identifier>> {
        let first = self.expect_ident()?;
        let mut names = NonEmpty::new(first);
        while matches!(self.peek(), Some(TokenKind::Comma)) {
            self.bump();
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    // namelist := name { "," name }
    fn parse_namelist(&mut self) -> Result<NonEmpty<QuotedName>> {
        let first = self.expect_name()?;
        let mut names = NonEmpty::new(first);
        while matches!(self.peek(), Some(TokenKind::Comma)) {
            self.bump();
            names.push(self.expect_name()?);
        }
        Ok(names)
    }

    // decl := annotations ( namespace_decl | top_decl )
    fn parse_decl(&mut self, schema: &mut Schema) -> Result<()> {
        let annotations = self.parse_annotations()?;
        if matches!(self.peek(), Some(TokenKind::Namespace)) {
            self.parse_namespace_decl(schema, annotations)
        } else {
            let ns_id = NamespaceId::anonymous();
            let ns = schema.namespace_mut(ns_id.clone())?;
            self.parse_top_decl(ns, &ns_id, annotations)
        }
    }

    // namespace_decl := "namespace" path "{" { annotations top_decl } "}"
    fn parse_namespace_decl(&mut self, schema: &mut Schema, annotations: Annotations) -> Result<()> {
        self.expect(TokenKind::Namespace)?;
        let path = self.parse_path()?;
        if path.is_cedar_reserved() {
            return Err(crate::ast::ReservedNameError::Namespace(path).into());
        }
        let ns_id = NamespaceId::named(path);
        self.expect(TokenKind::LBrace)?;
        {
            let ns = schema.namespace_mut(ns_id.clone())?;
            ns.annotations = annotations;
        }
        while !matches!(self.peek(), Some(TokenKind::RBrace)) {
            let inner_annotations = self.parse_annotations()?;
            let ns = schema.namespace_mut(ns_id.clone())?;
            self.parse_top_decl(ns, &ns_id, inner_annotations)?;
        }
        self.expect(TokenKind::RBrace)?;
        Ok(())
    }

    // top_decl := entity_decl | action_decl | common_decl
    fn parse_top_decl(
        &mut self,
        ns: &mut Namespace,
        ns_id: &NamespaceId,
        annotations: Annotations,
    ) -> Result<()> {
        match self.peek() {
            Some(TokenKind::Entity) => self.parse_entity_decl(ns, ns_id, annotations),
            Some(TokenKind::Action) => self.parse_action_decl(ns, ns_id, annotations),
            Some(TokenKind::Type) => self.parse_common_decl(ns, ns_id, annotations),
            Some(k) => Err(self
                .err_here(format!(
                    "expected `entity`, `action`, or `type`, found {}",
                    k.describe()
                ))
                .into()),
            None => Err(self.unexpected_eof("`entity`, `action`, or `type`")),
        }
    }

    // entity_decl := "entity" idlist ( enum_body | entity_body )? ";"
    // enum_body := "enum" "[" string { "," string } "]"
    // entity_body := ( "in" path_or_list )? ( ( "=" )? record_type )? ( "tags" type )?
    fn parse_entity_decl(
        &mut self,
        ns: &mut Namespace,
        ns_id: &NamespaceId,
        annotations: Annotations,
    ) -> Result<()> {
        self.expect(TokenKind::Entity)?;
        let names = self.parse_idlist()?;

        if matches!(self.peek(), Some(TokenKind::Enum)) {
            self.bump();
            self.expect(TokenKind::LBracket)?;
            let first = self.expect_string()?;
            let mut values = NonEmpty::new(QuotedName::new(first));
            while matches!(self.peek(), Some(TokenKind::Comma)) {
                self.bump();
                values.push(QuotedName::new(self.expect_string()?));
            }
            self.expect(TokenKind::RBracket)?;
            self.expect(TokenKind::Semi)?;
            for name in names {
                let def = ns.add_enum(ns_id, name, values.clone())?;
                def.annotations = annotations.clone();
            }
            return Ok(());
        }

        let member_of_types = if matches!(self.peek(), Some(TokenKind::In)) {
            self.bump();
            self.parse_path_or_list()?
        } else {
            Vec::new()
        };

        let shape = if matches!(self.peek(), Some(TokenKind::Eq)) {
            self.bump();
            Some(self.parse_record_type()?)
        } else if matches!(self.peek(), Some(TokenKind::LBrace)) {
            Some(self.parse_record_type()?)
        } else {
            None
        };

        let tags = if matches!(self.peek(), Some(TokenKind::Tags)) {
            self.bump();
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::Semi)?;

        for name in names {
            let def = ns.add_entity(ns_id, name)?;
            def.member_of_types = member_of_types.clone();
            def.shape = shape.clone();
            def.tags = tags.clone();
            def.annotations = annotations.clone();
        }
        Ok(())
    }

    // action_decl := "action" namelist ( "in" ref_or_list )?
    //                ( "appliesTo" "{" appliesTo_body "}" )? ";"
    fn parse_action_decl(
        &mut self,
        ns: &mut Namespace,
        ns_id: &NamespaceId,
        annotations: Annotations,
    ) -> Result<()> {
        self.expect(TokenKind::Action)?;
        let names = self.parse_namelist()?;

        let member_of = if matches!(self.peek(), Some(TokenKind::In)) {
            self.bump();
            self.parse_action_ref_or_list()?
        } else {
            Vec::new()
        };

        let applies_to = if matches!(self.peek(), Some(TokenKind::AppliesTo)) {
            self.bump();
            self.expect(TokenKind::LBrace)?;
            let result = self.parse_applies_to_body()?;
            self.expect(TokenKind::RBrace)?;
            Some(result)
        } else {
            None
        };

        self.expect(TokenKind::Semi)?;

        for name in names {
            let def = ns.add_action(ns_id, name)?;
            def.member_of = member_of.clone();
            def.applies_to = applies_to.clone();
            def.annotations = annotations.clone();
        }
        Ok(())
    }

    // appliesTo_body := { ( "principal" ":" path_or_list
    //                     | "resource" ":" path_or_list
    //                     | "context" ":" type ) "," }
    fn parse_applies_to_body(&mut self) -> Result<crate::ast::AppliesTo> {
        let mut applies_to = crate::ast::AppliesTo::default();
        loop {
            match self.peek() {
                Some(TokenKind::Principal) => {
                    self.bump();
                    self.expect(TokenKind::Colon)?;
                    applies_to.principal_types = self.parse_path_or_list()?;
                }
                Some(TokenKind::Resource) => {
                    self.bump();
                    self.expect(TokenKind::Colon)?;
                    applies_to.resource_types = self.parse_path_or_list()?;
                }
                Some(TokenKind::Context) => {
                    self.bump();
                    self.expect(TokenKind::Colon)?;
                    applies_to.context = Some(self.parse_type()?);
                }
                Some(TokenKind::RBrace) => break,
                Some(k) => {
                    return Err(self
                        .err_here(format!(
                            "expected `principal`, `resource`, or `context`, found {}",
                            k.describe()
                        ))
                        .into())
                }
                None => {
                    return Err(self.unexpected_eof("`principal`, `resource`, `context`, or `}`"))
                }
            }
            if matches!(self.peek(), Some(TokenKind::Comma)) {
                self.bump();
            } else {
                break;
            }
        }
        Ok(applies_to)
    }

    // common_decl := "type" ident "=" type ";"
    fn parse_common_decl(
        &mut self,
        ns: &mut Namespace,
        ns_id: &NamespaceId,
        annotations: Annotations,
    ) -> Result<()> {
        self.expect(TokenKind::Type)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Semi)?;
        let def = ns.add_common_type(ns_id, name, ty)?;
        def.annotations = annotations;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::Type;

    #[test]
    fn minimal_entity_and_action() {
        let schema = parse(
            r#"
            namespace MyApp {
              entity User;
              entity Doc;
              action read appliesTo { principal: User, resource: Doc };
            }
            "#,
            None,
        )
        .unwrap();
        let ns = &schema.namespaces[&NamespaceId::named(Path::parse("MyApp").unwrap())];
        assert_eq!(ns.entity_types.len(), 2);
        assert_eq!(ns.actions.len(), 1);
    }

    #[test]
    fn multi_name_entity_shares_shape() {
        let schema = parse("entity A, B { x: Long };", None).unwrap();
        let ns = &schema.namespaces[&NamespaceId::anonymous()];
        assert_eq!(ns.entity_types.len(), 2);
        for name in ["A", "B"] {
            let def = &ns.entity_types[&Identifier::new(name).unwrap()];
            assert!(def.shape.is_some());
        }
    }

    #[test]
    fn multi_name_duplicate_rejected() {
        let err = parse("entity A, A;", None).unwrap_err();
        assert!(matches!(err, Error::Duplicate(_)));
    }

    #[test]
    fn enum_entity() {
        let schema = parse(r#"entity Color enum ["red", "green", "blue"];"#, None).unwrap();
        let ns = &schema.namespaces[&NamespaceId::anonymous()];
        let def = &ns.enum_types[&Identifier::new("Color").unwrap()];
        assert_eq!(def.values.len(), 3);
    }

    #[test]
    fn common_type_and_reference() {
        let schema = parse(
            "type Address = { street: String }; entity User { home: Address };",
            None,
        )
        .unwrap();
        let ns = &schema.namespaces[&NamespaceId::anonymous()];
        assert!(ns.common_types.contains_key(&Identifier::new("Address").unwrap()));
        let user = &ns.entity_types[&Identifier::new("User").unwrap()];
        let home = &user.shape.as_ref().unwrap().attributes[&"home".into()];
        assert!(matches!(home.ty, Type::EntityOrCommonRef(_)));
    }

    #[test]
    fn action_refs_three_shapes() {
        let schema = parse(
            r#"
            namespace MyApp {
              action read;
              action write in read;
              action extra in [MyApp::Action::"write", "read"];
            }
            "#,
            None,
        )
        .unwrap();
        let ns = &schema.namespaces[&NamespaceId::named(Path::parse("MyApp").unwrap())];
        let extra = &ns.actions[&QuotedName::new("extra")];
        assert_eq!(extra.member_of.len(), 2);
        assert_eq!(
            extra.member_of[0].namespace.as_ref().unwrap().to_string(),
            "MyApp"
        );
        assert!(extra.member_of[1].namespace.is_none());
    }

    #[test]
    fn annotations_attach_and_last_wins() {
        let schema = parse(r#"@doc("a") @doc("b") entity User;"#, None).unwrap();
        let ns = &schema.namespaces[&NamespaceId::anonymous()];
        let def = &ns.entity_types[&Identifier::new("User").unwrap()];
        assert_eq!(
            def.annotations.get(&Identifier::new("doc").unwrap()).unwrap(),
            "b"
        );
    }

    #[test]
    fn reserved_name_rejected() {
        let err = parse("entity __cedar;", None).unwrap_err();
        assert!(matches!(err, Error::ReservedName(_)));
        let err = parse("namespace __cedar { entity User; }", None).unwrap_err();
        assert!(matches!(err, Error::ReservedName(_)));
    }

    #[test]
    fn single_element_bracket_in_clause_is_a_list_of_one() {
        let schema = parse("entity User in [Group];", None).unwrap();
        let ns = &schema.namespaces[&NamespaceId::anonymous()];
        let def = &ns.entity_types[&Identifier::new("User").unwrap()];
        assert_eq!(def.member_of_types.len(), 1);
    }

    #[test]
    fn parse_error_carries_position() {
        let err = parse("entity ;", None).unwrap_err();
        match err {
            Error::Parse(e) => {
                assert_eq!(e.line, 1);
                assert_eq!(e.column, 8);
            }
            _ => panic!("expected a Parse error"),
        }
    }
}
