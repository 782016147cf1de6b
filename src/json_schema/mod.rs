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

//! The JSON schema format: a `serde`-derived mirror of the AST, plus the two
//! conversion passes to and from [`crate::ast::Schema`].
//!
//! Duplicate JSON object keys are rejected with [`err::JsonError::Syntax`] via
//! `serde_with::rust::maps_duplicate_key_is_error` on every map-shaped field.
//! `JsonType` is split into an `untagged` enum that tries the known,
//! internally-tagged variants first and falls back to a bare
//! `{"type": "<name>"}` typedef reference -- the only way serde can mix
//! closed, tagged variants with an open catch-all tag in one type.

pub mod err;

use std::collections::BTreeMap;

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::ast::{
    ActionRef, AppliesTo, Attribute, Identifier, NamespaceId, Path, PrimitiveType, QuotedName,
    RecordType, Schema, Type, ACTION_ENTITY_TYPE_NAME,
};
use crate::err::Result;

use err::JsonError;

/// Parse the JSON schema format into the unresolved AST.
pub fn parse(bytes: &[u8]) -> Result<Schema> {
    let root: JsonSchemaRoot = serde_json::from_slice(bytes).map_err(JsonError::from)?;
    json_to_schema(root)
}

/// Render the canonical JSON form, with deterministic ASCII-ascending key
/// sorting: every map here is a `BTreeMap`, so sorted output falls out of
/// `serde_json`'s own `BTreeMap` serialization, the same free-canonical-order
/// trick the AST uses for the textual printer.
pub fn print(schema: &Schema) -> Vec<u8> {
    let root = schema_to_json(schema);
    serde_json::to_vec_pretty(&root).expect("JsonSchemaRoot always serializes")
}

/// The JSON document root: namespace name (empty string for the anonymous
/// namespace) -> namespace body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct JsonSchemaRoot(
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")] BTreeMap<SmolStr, JsonNamespace>,
);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonNamespace {
    #[serde(default)]
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
    #[serde(rename = "commonTypes")]
    common_types: BTreeMap<SmolStr, JsonCommonType>,
    #[serde(default)]
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
    #[serde(rename = "entityTypes")]
    entity_types: BTreeMap<SmolStr, JsonEntityOrEnum>,
    #[serde(default)]
    #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
    actions: BTreeMap<SmolStr, JsonActionType>,
    #[serde(default)]
    annotations: BTreeMap<SmolStr, SmolStr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonCommonType {
    #[serde(flatten)]
    ty: JsonType,
    #[serde(default)]
    annotations: BTreeMap<SmolStr, SmolStr>,
}

/// An entity-type declaration or, when `enum` is present, an enum entity
/// declaration: an entity with a non-empty `enum` array and no
/// `shape`/`tags`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonEntityOrEnum {
    #[serde(default)]
    #[serde(rename = "memberOfTypes")]
    member_of_types: Vec<SmolStr>,
    #[serde(default)]
    shape: Option<JsonType>,
    #[serde(default)]
    tags: Option<JsonType>,
    #[serde(default)]
    #[serde(rename = "enum")]
    enum_values: Option<Vec<SmolStr>>,
    #[serde(default)]
    annotations: BTreeMap<SmolStr, SmolStr>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonActionType {
    #[serde(default)]
    #[serde(rename = "memberOf")]
    member_of: Vec<JsonActionRef>,
    #[serde(default)]
    #[serde(rename = "appliesTo")]
    applies_to: Option<JsonApplySpec>,
    #[serde(default)]
    annotations: BTreeMap<SmolStr, SmolStr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonActionRef {
    id: SmolStr,
    #[serde(rename = "type")]
    #[serde(default)]
    ty: Option<SmolStr>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonApplySpec {
    #[serde(default)]
    #[serde(rename = "principalTypes")]
    principal_types: Vec<SmolStr>,
    #[serde(default)]
    #[serde(rename = "resourceTypes")]
    resource_types: Vec<SmolStr>,
    #[serde(default)]
    context: Option<JsonType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonAttribute {
    #[serde(flatten)]
    ty: JsonType,
    #[serde(default = "default_required")]
    required: bool,
}

fn default_required() -> bool {
    true
}

/// `untagged` so an unrecognized `type` tag falls through to `Named` instead
/// of failing to parse, which is how a reference to a user-defined common
/// type is represented on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum JsonType {
    Tagged(JsonTypeVariant),
    Named {
        #[serde(rename = "type")]
        type_name: SmolStr,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[serde(deny_unknown_fields)]
enum JsonTypeVariant {
    #[serde(alias = "Boolean")]
    Bool,
    Long,
    String,
    Set {
        element: Box<JsonType>,
    },
    Record {
        #[serde(with = "::serde_with::rust::maps_duplicate_key_is_error")]
        attributes: BTreeMap<SmolStr, JsonAttribute>,
    },
    Entity {
        name: SmolStr,
    },
    Extension {
        name: SmolStr,
    },
    EntityOrCommon {
        name: SmolStr,
    },
}

/// A `Named` tag that collides with a reserved tag string means the input
/// meant the tagged variant but left out the field that makes it parse as
/// one -- e.g. `{"type": "Set"}` with no `element` -- rather than a genuine
/// reference to a (nonexistent) common type named `Set`. Returns the tag and
/// the field whose absence caused the fallback.
fn reserved_tag_missing_field(tag: &str) -> Option<(&'static str, &'static str)> {
    match tag {
        "Set" => Some(("Set", "element")),
        "Record" => Some(("Record", "attributes")),
        "Entity" => Some(("Entity", "name")),
        "Extension" => Some(("Extension", "name")),
        "EntityOrCommon" => Some(("EntityOrCommon", "name")),
        _ => None,
    }
}

fn ident(s: &str) -> std::result::Result<Identifier, JsonError> {
    Ok(Identifier::new(s)?)
}

fn path(s: &str) -> std::result::Result<Path, JsonError> {
    Ok(Path::parse(s)?)
}

fn json_type_to_ast(jt: &JsonType) -> std::result::Result<Type, JsonError> {
    match jt {
        JsonType::Tagged(JsonTypeVariant::Bool) => Ok(Type::Primitive(PrimitiveType::Bool)),
        JsonType::Tagged(JsonTypeVariant::Long) => Ok(Type::Primitive(PrimitiveType::Long)),
        JsonType::Tagged(JsonTypeVariant::String) => Ok(Type::Primitive(PrimitiveType::String)),
        JsonType::Tagged(JsonTypeVariant::Set { element }) => {
            Ok(Type::Set(Box::new(json_type_to_ast(element)?)))
        }
        JsonType::Tagged(JsonTypeVariant::Record { attributes }) => {
            let mut rt = RecordType::new();
            for (name, attr) in attributes {
                let ty = json_type_to_ast(&attr.ty)?;
                let mut attribute = Attribute::new(ty);
                attribute.required = attr.required;
                rt.attributes.insert(QuotedName::new(name.clone()), attribute);
            }
            Ok(Type::Record(rt))
        }
        JsonType::Tagged(JsonTypeVariant::Entity { name }) => Ok(Type::EntityRef(path(name)?)),
        JsonType::Tagged(JsonTypeVariant::Extension { name }) => Ok(Type::Extension(ident(name)?)),
        JsonType::Tagged(JsonTypeVariant::EntityOrCommon { name }) => {
            Ok(Type::EntityOrCommonRef(path(name)?))
        }
        JsonType::Named { type_name } => {
            if let Some((tag, field)) = reserved_tag_missing_field(type_name) {
                return Err(JsonError::MissingTypeField { tag, field });
            }
            Ok(Type::EntityOrCommonRef(path(type_name)?))
        }
    }
}

/// `CommonRef` and the ambiguous `EntityOrCommonRef` both render as the bare
/// typedef shape `{"type": "<name>"}`: the JSON format has only one way to
/// spell "reference this name as a common type when it exists", so printing
/// an explicit `CommonRef` and an ambiguous reference are indistinguishable
/// on the wire (same limitation as the textual format and as real Cedar's
/// JSON schema format).
fn ast_type_to_json(ty: &Type) -> JsonType {
    match ty {
        Type::Primitive(PrimitiveType::Bool) => JsonType::Tagged(JsonTypeVariant::Bool),
        Type::Primitive(PrimitiveType::Long) => JsonType::Tagged(JsonTypeVariant::Long),
        Type::Primitive(PrimitiveType::String) => JsonType::Tagged(JsonTypeVariant::String),
        Type::Set(inner) => JsonType::Tagged(JsonTypeVariant::Set {
            element: Box::new(ast_type_to_json(inner)),
        }),
        Type::Record(rt) => {
            let mut attributes = BTreeMap::new();
            for (name, attr) in &rt.attributes {
                attributes.insert(
                    SmolStr::new(name.as_str()),
                    JsonAttribute {
                        ty: ast_type_to_json(&attr.ty),
                        required: attr.required,
                    },
                );
            }
            JsonType::Tagged(JsonTypeVariant::Record { attributes })
        }
        Type::Extension(name) => JsonType::Tagged(JsonTypeVariant::Extension {
            name: SmolStr::new(name.as_str()),
        }),
        Type::EntityRef(p) => JsonType::Tagged(JsonTypeVariant::Entity {
            name: SmolStr::new(p.to_string()),
        }),
        Type::CommonRef(p) | Type::EntityOrCommonRef(p) => JsonType::Named {
            type_name: SmolStr::new(p.to_string()),
        },
    }
}

fn json_action_ref_to_ast(r: &JsonActionRef) -> std::result::Result<ActionRef, JsonError> {
    match &r.ty {
        None => Ok(ActionRef::unqualified(QuotedName::new(r.id.clone()))),
        Some(ty) => {
            let p = path(ty)?;
            if p.last().as_str() == ACTION_ENTITY_TYPE_NAME {
                match p.split_last().0 {
                    None => Ok(ActionRef::unqualified(QuotedName::new(r.id.clone()))),
                    Some(ns) => Ok(ActionRef::qualified(ns, QuotedName::new(r.id.clone()))),
                }
            } else {
                Ok(ActionRef::qualified(p, QuotedName::new(r.id.clone())))
            }
        }
    }
}

fn ast_action_ref_to_json(r: &ActionRef) -> JsonActionRef {
    JsonActionRef {
        id: SmolStr::new(r.name.as_str()),
        ty: r.namespace.as_ref().map(|ns| SmolStr::new(format!("{ns}::{ACTION_ENTITY_TYPE_NAME}"))),
    }
}

fn annotations_to_ast(
    annotations: &BTreeMap<SmolStr, SmolStr>,
    mut set: impl FnMut(Identifier, SmolStr),
) -> std::result::Result<(), JsonError> {
    for (k, v) in annotations {
        set(ident(k)?, v.clone());
    }
    Ok(())
}

fn annotations_to_json(annotations: &crate::ast::Annotations) -> BTreeMap<SmolStr, SmolStr> {
    annotations
        .iter()
        .map(|(k, v)| (SmolStr::new(k.as_str()), v.clone()))
        .collect()
}

fn json_to_schema(root: JsonSchemaRoot) -> Result<Schema> {
    let mut schema = Schema::new();
    for (ns_name, ns_json) in root.0 {
        let ns_id = if ns_name.is_empty() {
            NamespaceId::anonymous()
        } else {
            NamespaceId::named(path(&ns_name)?)
        };
        let ns = schema.namespace_mut(ns_id.clone())?;
        annotations_to_ast(&ns_json.annotations, |k, v| ns.annotations.set(k, v))?;

        for (name, def) in &ns_json.common_types {
            let ty = json_type_to_ast(&def.ty)?;
            let common = ns.add_common_type(&ns_id, ident(name)?, ty)?;
            annotations_to_ast(&def.annotations, |k, v| {
                common.annotate(k, v);
            })?;
        }

        for (name, def) in &ns_json.entity_types {
            if let Some(values) = &def.enum_values {
                let values = NonEmpty::from_vec(
                    values.iter().map(|v| QuotedName::new(v.clone())).collect(),
                )
                .ok_or_else(|| JsonError::EmptyEnum(name.clone()))?;
                let e = ns.add_enum(&ns_id, ident(name)?, values)?;
                annotations_to_ast(&def.annotations, |k, v| {
                    e.annotate(k, v);
                })?;
            } else {
                let entity = ns.add_entity(&ns_id, ident(name)?)?;
                let member_of_types = def
                    .member_of_types
                    .iter()
                    .map(|p| path(p))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                entity.member_of(member_of_types);
                if let Some(shape) = &def.shape {
                    match json_type_to_ast(shape)? {
                        Type::Record(rt) => {
                            entity.shape(rt);
                        }
                        _ => return Err(JsonError::ShapeNotRecord(name.clone()).into()),
                    }
                }
                if let Some(tags) = &def.tags {
                    entity.tags(json_type_to_ast(tags)?);
                }
                annotations_to_ast(&def.annotations, |k, v| {
                    entity.annotate(k, v);
                })?;
            }
        }

        for (name, def) in &ns_json.actions {
            let action = ns.add_action(&ns_id, QuotedName::new(name.clone()))?;
            let member_of = def
                .member_of
                .iter()
                .map(json_action_ref_to_ast)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            action.member_of(member_of);
            if let Some(at) = &def.applies_to {
                let principal_types = at
                    .principal_types
                    .iter()
                    .map(|p| path(p))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                let resource_types = at
                    .resource_types
                    .iter()
                    .map(|p| path(p))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                let context = at.context.as_ref().map(json_type_to_ast).transpose()?;
                action.applies_to(principal_types, resource_types, context);
            }
            annotations_to_ast(&def.annotations, |k, v| {
                action.annotate(k, v);
            })?;
        }
    }
    Ok(schema)
}

fn schema_to_json(schema: &Schema) -> JsonSchemaRoot {
    let mut namespaces = BTreeMap::new();
    for (ns_id, ns) in &schema.namespaces {
        let key = ns_id.path().map(ToString::to_string).unwrap_or_default();
        namespaces.insert(SmolStr::new(key), namespace_to_json(ns));
    }
    JsonSchemaRoot(namespaces)
}

fn namespace_to_json(ns: &crate::ast::Namespace) -> JsonNamespace {
    let mut common_types = BTreeMap::new();
    for (name, def) in &ns.common_types {
        common_types.insert(
            SmolStr::new(name.as_str()),
            JsonCommonType {
                ty: ast_type_to_json(&def.ty),
                annotations: annotations_to_json(&def.annotations),
            },
        );
    }

    let mut entity_types = BTreeMap::new();
    for (name, def) in &ns.entity_types {
        entity_types.insert(
            SmolStr::new(name.as_str()),
            JsonEntityOrEnum {
                member_of_types: def.member_of_types.iter().map(|p| SmolStr::new(p.to_string())).collect(),
                shape: def.shape.as_ref().map(|rt| ast_type_to_json(&Type::Record(rt.clone()))),
                tags: def.tags.as_ref().map(ast_type_to_json),
                enum_values: None,
                annotations: annotations_to_json(&def.annotations),
            },
        );
    }
    for (name, def) in &ns.enum_types {
        entity_types.insert(
            SmolStr::new(name.as_str()),
            JsonEntityOrEnum {
                member_of_types: Vec::new(),
                shape: None,
                tags: None,
                enum_values: Some(def.values.iter().map(|v| SmolStr::new(v.as_str())).collect()),
                annotations: annotations_to_json(&def.annotations),
            },
        );
    }

    let mut actions = BTreeMap::new();
    for (name, def) in &ns.actions {
        actions.insert(
            SmolStr::new(name.as_str()),
            JsonActionType {
                member_of: def.member_of.iter().map(ast_action_ref_to_json).collect(),
                applies_to: def.applies_to.as_ref().map(|at| JsonApplySpec {
                    principal_types: at.principal_types.iter().map(|p| SmolStr::new(p.to_string())).collect(),
                    resource_types: at.resource_types.iter().map(|p| SmolStr::new(p.to_string())).collect(),
                    context: at.context.as_ref().map(ast_type_to_json),
                }),
                annotations: annotations_to_json(&def.annotations),
            },
        );
    }

    JsonNamespace {
        common_types,
        entity_types,
        actions,
        annotations: annotations_to_json(&ns.annotations),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_minimal_schema() {
        let src = br#"{"": {"entityTypes": {"User": {}}, "actions": {}}}"#;
        let schema = parse(src).unwrap();
        assert!(schema.namespaces[&NamespaceId::anonymous()]
            .entity_types
            .contains_key(&Identifier::new("User").unwrap()));
        let printed = print(&schema);
        let reparsed = parse(&printed).unwrap();
        assert!(reparsed.namespaces[&NamespaceId::anonymous()]
            .entity_types
            .contains_key(&Identifier::new("User").unwrap()));
    }

    #[test]
    fn bool_and_boolean_are_synonyms_on_input() {
        let bool_src = br#"{"": {"entityTypes": {"User": {"shape": {"type": "Record", "attributes": {"active": {"type": "Bool"}}}}}, "actions": {}}}"#;
        let boolean_src = br#"{"": {"entityTypes": {"User": {"shape": {"type": "Record", "attributes": {"active": {"type": "Boolean"}}}}}, "actions": {}}}"#;
        let a = parse(bool_src).unwrap();
        let b = parse(boolean_src).unwrap();
        let attr_a = &a.namespaces[&NamespaceId::anonymous()].entity_types[&Identifier::new("User").unwrap()]
            .shape
            .as_ref()
            .unwrap()
            .attributes[&QuotedName::new("active")];
        let attr_b = &b.namespaces[&NamespaceId::anonymous()].entity_types[&Identifier::new("User").unwrap()]
            .shape
            .as_ref()
            .unwrap()
            .attributes[&QuotedName::new("active")];
        assert_eq!(attr_a.ty, attr_b.ty);
    }

    #[test]
    fn output_always_emits_bool_not_boolean() {
        let src = br#"{"": {"entityTypes": {"User": {"shape": {"type": "Record", "attributes": {"active": {"type": "Boolean"}}}}}, "actions": {}}}"#;
        let schema = parse(src).unwrap();
        let printed = String::from_utf8(print(&schema)).unwrap();
        assert!(printed.contains("\"Bool\""));
        assert!(!printed.contains("\"Boolean\""));
    }

    #[test]
    fn missing_element_on_set_is_reported_not_swallowed() {
        let src = br#"{"": {"entityTypes": {}, "actions": {}, "commonTypes": {"Weird": {"type": "Set"}}}}"#;
        let err = parse(src).unwrap_err();
        match err {
            crate::err::Error::InvalidJson(JsonError::MissingTypeField { tag, field }) => {
                assert_eq!(tag, "Set");
                assert_eq!(field, "element");
            }
            other => panic!("expected MissingTypeField, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_entity_type_key_is_rejected() {
        let src = br#"{"": {"entityTypes": {"User": {}, "User": {"memberOfTypes": []}}, "actions": {}}}"#;
        assert!(parse(src).is_err());
    }

    #[test]
    fn enum_entity_round_trips() {
        let src = br#"{"": {"entityTypes": {"Color": {"enum": ["red", "green"]}}, "actions": {}}}"#;
        let schema = parse(src).unwrap();
        let e = &schema.namespaces[&NamespaceId::anonymous()].enum_types[&Identifier::new("Color").unwrap()];
        assert_eq!(e.values.len(), 2);
        let printed = print(&schema);
        let reparsed = parse(&printed).unwrap();
        assert_eq!(
            reparsed.namespaces[&NamespaceId::anonymous()].enum_types[&Identifier::new("Color").unwrap()]
                .values
                .len(),
            2
        );
    }

    #[test]
    fn empty_enum_array_is_rejected() {
        let src = br#"{"": {"entityTypes": {"Color": {"enum": []}}, "actions": {}}}"#;
        let err = parse(src).unwrap_err();
        assert!(matches!(err, crate::err::Error::InvalidJson(JsonError::EmptyEnum(_))));
    }

    #[test]
    fn action_ref_with_explicit_type_resolves_namespace() {
        let src = br#"{
            "MyApp": {
                "entityTypes": {},
                "actions": {
                    "read": {},
                    "write": {"memberOf": [{"id": "read", "type": "MyApp::Action"}]}
                }
            }
        }"#;
        let schema = parse(src).unwrap();
        let ns_id = NamespaceId::named(Path::parse("MyApp").unwrap());
        let write = &schema.namespaces[&ns_id].actions[&QuotedName::new("write")];
        assert_eq!(write.member_of.len(), 1);
        assert_eq!(write.member_of[0].namespace, Some(Path::parse("MyApp").unwrap()));
    }
}
