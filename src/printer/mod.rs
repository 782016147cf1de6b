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

//! Canonical textual printer. A schema built by the parser or
//! by the programmatic constructors prints identically: ordering comes
//! entirely from the `BTreeMap`/`Ord` choices in [`crate::ast`], not from any
//! state carried here.

use crate::ast::{
    ActionDef, ActionRef, Annotations, AppliesTo, Attribute, CommonDef, EntityDef, EnumDef,
    Identifier, Namespace, PrimitiveType, QuotedName, RecordType, Schema, Type,
};

/// Render `schema` to its canonical textual form.
pub fn print(schema: &Schema) -> Vec<u8> {
    let mut out = String::new();
    for (ns_id, ns) in &schema.namespaces {
        match ns_id.path() {
            None => print_namespace_body(&mut out, ns, 0),
            Some(path) => {
                print_annotations(&mut out, &ns.annotations, 0);
                out.push_str(&format!("namespace {path} {{\n"));
                print_namespace_body(&mut out, ns, 1);
                out.push_str("}\n");
            }
        }
    }
    out.into_bytes()
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn print_annotations(out: &mut String, annotations: &Annotations, level: usize) {
    for (key, value) in annotations.iter() {
        indent(out, level);
        if value.is_empty() {
            out.push_str(&format!("@{key}\n"));
        } else {
            out.push_str(&format!("@{key}(\"{}\")\n", escape_string(value)));
        }
    }
}

fn print_namespace_body(out: &mut String, ns: &Namespace, level: usize) {
    for (name, def) in &ns.common_types {
        print_common_decl(out, name, def, level);
    }
    // Entity types and enum entity types share one ASCII-ascending group.
    let mut entity_names: Vec<&Identifier> = ns
        .entity_types
        .keys()
        .chain(ns.enum_types.keys())
        .collect();
    entity_names.sort();
    for name in entity_names {
        if let Some(def) = ns.entity_types.get(name) {
            print_entity_decl(out, name, def, level);
        } else if let Some(def) = ns.enum_types.get(name) {
            print_enum_decl(out, name, def, level);
        }
    }
    for (name, def) in &ns.actions {
        print_action_decl(out, name, def, level);
    }
}

fn print_common_decl(out: &mut String, name: &Identifier, def: &CommonDef, level: usize) {
    print_annotations(out, &def.annotations, level);
    indent(out, level);
    out.push_str(&format!("type {name} = {};\n", fmt_type(&def.ty, level)));
}

fn print_entity_decl(out: &mut String, name: &Identifier, def: &EntityDef, level: usize) {
    print_annotations(out, &def.annotations, level);
    indent(out, level);
    out.push_str(&format!("entity {name}"));
    if !def.member_of_types.is_empty() {
        out.push_str(" in ");
        out.push_str(&fmt_path_list(&def.member_of_types));
    }
    if let Some(shape) = &def.shape {
        out.push(' ');
        out.push_str(&fmt_record(shape, level));
    }
    if let Some(tags) = &def.tags {
        out.push_str(&format!(" tags {}", fmt_type(tags, level)));
    }
    out.push_str(";\n");
}

fn print_enum_decl(out: &mut String, name: &Identifier, def: &EnumDef, level: usize) {
    print_annotations(out, &def.annotations, level);
    indent(out, level);
    let values = def
        .values
        .iter()
        .map(|v| format!("\"{}\"", escape_string(v.as_str())))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("entity {name} enum [{values}];\n"));
}

fn print_action_decl(out: &mut String, name: &QuotedName, def: &ActionDef, level: usize) {
    print_annotations(out, &def.annotations, level);
    indent(out, level);
    out.push_str(&format!("action {}", fmt_name(name)));
    if !def.member_of.is_empty() {
        out.push_str(" in ");
        out.push_str(&fmt_action_ref_list(&def.member_of));
    }
    if let Some(applies_to) = &def.applies_to {
        if let Some(block) = fmt_applies_to(applies_to, level) {
            out.push(' ');
            out.push_str(&block);
        }
    }
    out.push_str(";\n");
}

fn fmt_applies_to(applies_to: &AppliesTo, level: usize) -> Option<String> {
    if applies_to.principal_types.is_empty()
        && applies_to.resource_types.is_empty()
        && applies_to.context.is_none()
    {
        return None;
    }
    let mut s = String::from("appliesTo {\n");
    let mut fields = Vec::new();
    if !applies_to.principal_types.is_empty() {
        fields.push(format!("principal: {}", fmt_path_list(&applies_to.principal_types)));
    }
    if !applies_to.resource_types.is_empty() {
        fields.push(format!("resource: {}", fmt_path_list(&applies_to.resource_types)));
    }
    if let Some(ctx) = &applies_to.context {
        fields.push(format!("context: {}", fmt_type(ctx, level + 1)));
    }
    let last = fields.len() - 1;
    for (i, field) in fields.into_iter().enumerate() {
        indent(&mut s, level + 1);
        s.push_str(&field);
        if i != last {
            s.push(',');
        }
        s.push('\n');
    }
    indent(&mut s, level);
    s.push('}');
    Some(s)
}

fn fmt_path_list(paths: &[crate::ast::Path]) -> String {
    if paths.len() == 1 {
        paths[0].to_string()
    } else {
        format!(
            "[{}]",
            paths.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
        )
    }
}

/// Canonical form of a namespace-qualified action ref is always
/// `ns::Action::"name"` -- the trailing name must stay quoted even when it
/// would otherwise lex as a bare identifier, since an unquoted final segment
/// after `::` would parse as another path component, not a name. An
/// unqualified ref prints as a bare name when possible, matching the parser's
/// acceptance of unquoted top-level action refs.
fn fmt_action_ref(r: &ActionRef) -> String {
    match &r.namespace {
        None => fmt_name(&r.name),
        Some(ns) => format!("{ns}::Action::\"{}\"", escape_string(r.name.as_str())),
    }
}

fn fmt_action_ref_list(refs: &[ActionRef]) -> String {
    if refs.len() == 1 {
        fmt_action_ref(&refs[0])
    } else {
        format!(
            "[{}]",
            refs.iter().map(fmt_action_ref).collect::<Vec<_>>().join(", ")
        )
    }
}

fn fmt_name(name: &QuotedName) -> String {
    if name.needs_quotes() {
        format!("\"{}\"", escape_string(name.as_str()))
    } else {
        name.as_str().to_string()
    }
}

fn fmt_type(ty: &Type, level: usize) -> String {
    match ty {
        Type::Primitive(PrimitiveType::Bool) => "Bool".to_string(),
        Type::Primitive(PrimitiveType::Long) => "Long".to_string(),
        Type::Primitive(PrimitiveType::String) => "String".to_string(),
        Type::Set(elem) => format!("Set<{}>", fmt_type(elem, level)),
        Type::Record(rt) => fmt_record(rt, level),
        Type::Extension(name) => name.to_string(),
        Type::EntityRef(path) | Type::CommonRef(path) | Type::EntityOrCommonRef(path) => {
            path.to_string()
        }
    }
}

fn fmt_record(rt: &RecordType, level: usize) -> String {
    if rt.attributes.is_empty() {
        return "{}".to_string();
    }
    let mut s = String::from("{\n");
    let last = rt.attributes.len() - 1;
    for (i, (name, attr)) in rt.attributes.iter().enumerate() {
        print_annotations(&mut s, &attr.annotations, level + 1);
        indent(&mut s, level + 1);
        s.push_str(&fmt_attr(name, attr, level + 1));
        if i != last {
            s.push(',');
        }
        s.push('\n');
    }
    indent(&mut s, level);
    s.push('}');
    s
}

fn fmt_attr(name: &QuotedName, attr: &Attribute, level: usize) -> String {
    let optional = if attr.required { "" } else { "?" };
    format!(
        "{}{optional}: {}",
        fmt_name(name),
        fmt_type(&attr.ty, level)
    )
}

/// Escape a string body for use inside a double-quoted textual literal.
fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser;

    fn roundtrip_text(src: &str) -> String {
        let schema = parser::parse(src, None).unwrap();
        String::from_utf8(print(&schema)).unwrap()
    }

    #[test]
    fn minimal_entity_prints_canonically() {
        let printed = roundtrip_text("entity User;");
        assert_eq!(printed, "entity User;\n");
    }

    #[test]
    fn namespace_wraps_and_indents() {
        let printed = roundtrip_text("namespace MyApp { entity User; }");
        assert_eq!(printed, "namespace MyApp {\n  entity User;\n}\n");
    }

    #[test]
    fn anonymous_namespace_first_named_ascending() {
        let src = "namespace Zeta { entity Z; } entity A; namespace Alpha { entity B; }";
        let printed = roundtrip_text(src);
        let zeta_pos = printed.find("namespace Zeta").unwrap();
        let alpha_pos = printed.find("namespace Alpha").unwrap();
        let anon_pos = printed.find("entity A;").unwrap();
        assert!(anon_pos < alpha_pos);
        assert!(alpha_pos < zeta_pos);
    }

    #[test]
    fn record_attributes_ascii_ascending() {
        let printed = roundtrip_text("entity User { zeta: Long, alpha: String };");
        let zeta_pos = printed.find("zeta").unwrap();
        let alpha_pos = printed.find("alpha").unwrap();
        assert!(alpha_pos < zeta_pos);
    }

    #[test]
    fn printer_is_idempotent() {
        let src = r#"
            namespace MyApp {
              @doc("users")
              entity User in [Group] { name: String, age?: Long };
              entity Group;
              entity Color enum ["red", "green"];
              action read, write appliesTo { principal: User, resource: Group };
            }
        "#;
        let schema1 = parser::parse(src, None).unwrap();
        let printed1 = print(&schema1);
        let schema2 = parser::parse(std::str::from_utf8(&printed1).unwrap(), None).unwrap();
        let printed2 = print(&schema2);
        assert_eq!(printed1, printed2);
    }

    #[test]
    fn unqualified_action_ref_prints_bare() {
        let src = r#"
            namespace MyApp {
              action read;
              action write in read;
            }
        "#;
        let printed = roundtrip_text(src);
        assert!(printed.contains("action write in read;"));
    }

    #[test]
    fn qualified_action_ref_prints_with_action_tag() {
        let src = r#"
            namespace MyApp {
              action read;
              action write in MyApp::Action::"read";
            }
        "#;
        let printed = roundtrip_text(src);
        assert!(printed.contains(r#"action write in MyApp::Action::"read";"#));
    }

    #[test]
    fn quoted_name_escaping() {
        let printed = roundtrip_text(r#"action "read write";"#);
        assert!(printed.contains(r#""read write""#));
    }
}
