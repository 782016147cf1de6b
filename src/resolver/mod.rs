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

//! The five-phase resolver: index, shadow check, topological sort of common
//! types, common-type body resolution, then resolution of every declaration.
//! Phases are short-circuit -- the first error ends the pipeline.

pub mod err;

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::ast::{
    ActionRef, EntityType, EntityUid, Identifier, NamespaceId, Path, PrimitiveType, QuotedName,
    RecordType, ReservedNameError, ResolvedAction, ResolvedAttribute, ResolvedEntity,
    ResolvedEnum, ResolvedNamespace, ResolvedRecordType, ResolvedSchema, ResolvedType, Schema,
    Type, ACTION_ENTITY_TYPE_NAME, BUILTIN_EXTENSION_NAMES, BUILTIN_PRIMITIVE_NAMES,
    CEDAR_NAMESPACE,
};
use crate::err::Result;

use err::{CycleError, ShadowError, UndefinedTypeError};

/// Resolve `schema` into a fully-qualified, cycle-free, shadow-free
/// [`ResolvedSchema`]. `schema` is read-only throughout.
pub fn resolve(schema: &Schema) -> Result<ResolvedSchema> {
    let mut index = build_index(schema)?; // Phase 1
    check_shadowing(schema)?; // Phase 2
    let order = topo_sort_common_types(schema, &index)?; // Phase 3
    resolve_common_type_bodies(schema, &mut index, &order)?; // Phase 4
    resolve_declarations(schema, &index) // Phase 5
}

/// The three name tables built in Phase 1, plus the built-in cache of
/// already-resolved types. `common_defs` starts seeded with
/// the built-ins and gains one entry per user common type as Phase 4 drains
/// the topological order.
struct Index {
    /// Every fully-qualified entity-type and enum-type name.
    entity_defs: HashSet<Path>,
    /// Fully-qualified common-type names -> their resolved type. Seeded with
    /// built-ins (bare and `__cedar::`-qualified); user common types are
    /// added by Phase 4 as they are resolved.
    common_defs: HashMap<Path, ResolvedType>,
    /// Fully-qualified names of user-defined (non-built-in) common types --
    /// the node set for Phase 3's dependency graph.
    user_common_defs: HashSet<Path>,
    /// `(action-entity-type, action-name)` pairs that exist, for Phase 5's
    /// action-ref resolution.
    action_defs: HashSet<(Path, QuotedName)>,
}

fn build_index(schema: &Schema) -> Result<Index> {
    for ns_id in schema.namespaces.keys() {
        if ns_id.is_cedar_reserved() {
            return Err(ReservedNameError::Namespace(
                ns_id.path().cloned().expect("is_cedar_reserved implies named"),
            )
            .into());
        }
    }

    let mut entity_defs = HashSet::new();
    let mut user_common_defs = HashSet::new();
    let mut action_defs = HashSet::new();
    let common_defs = builtin_common_defs();

    for (ns_id, ns) in &schema.namespaces {
        for name in ns.entity_types.keys() {
            entity_defs.insert(ns_id.qualify(name));
        }
        for name in ns.enum_types.keys() {
            entity_defs.insert(ns_id.qualify(name));
        }
        for name in ns.common_types.keys() {
            user_common_defs.insert(ns_id.qualify(name));
        }
        if !ns.actions.is_empty() {
            let action_type = ns_id.qualify(&Identifier::new_unchecked(ACTION_ENTITY_TYPE_NAME));
            for name in ns.actions.keys() {
                action_defs.insert((action_type.clone(), name.clone()));
            }
        }
    }

    Ok(Index {
        entity_defs,
        common_defs,
        user_common_defs,
        action_defs,
    })
}

/// The built-in name table pre-populated in every schema: the three
/// primitives and the four standard extension types, each reachable both
/// bare and under the reserved `__cedar::` prefix.
fn builtin_common_defs() -> HashMap<Path, ResolvedType> {
    let mut m = HashMap::new();
    let primitives = [
        ("Long", PrimitiveType::Long),
        ("String", PrimitiveType::String),
        ("Bool", PrimitiveType::Bool),
    ];
    debug_assert_eq!(primitives.len(), BUILTIN_PRIMITIVE_NAMES.len());
    for (name, prim) in primitives {
        insert_builtin(&mut m, name, ResolvedType::Primitive(prim));
    }
    for name in BUILTIN_EXTENSION_NAMES {
        insert_builtin(
            &mut m,
            name,
            ResolvedType::Extension(Identifier::new_unchecked(name)),
        );
    }
    m
}

fn insert_builtin(m: &mut HashMap<Path, ResolvedType>, name: &str, ty: ResolvedType) {
    let id = Identifier::new_unchecked(name);
    let cedar_prefixed = Path::single(Identifier::new_unchecked(CEDAR_NAMESPACE)).pushed(id.clone());
    m.insert(Path::single(id), ty.clone());
    m.insert(cedar_prefixed, ty);
}

/// Phase 2 (RFC 70): no named namespace may redeclare a name that already
/// exists in the anonymous namespace.
fn check_shadowing(schema: &Schema) -> Result<()> {
    let Some(anon) = schema.namespaces.get(&NamespaceId::anonymous()) else {
        return Ok(());
    };
    let decl_names: HashSet<&str> = anon
        .entity_types
        .keys()
        .map(Identifier::as_str)
        .chain(anon.enum_types.keys().map(Identifier::as_str))
        .chain(anon.common_types.keys().map(Identifier::as_str))
        .collect();
    let action_names: HashSet<&str> = anon.actions.keys().map(QuotedName::as_str).collect();

    for (ns_id, ns) in &schema.namespaces {
        if ns_id.is_anonymous() {
            continue;
        }
        let names = ns
            .entity_types
            .keys()
            .map(Identifier::as_str)
            .chain(ns.enum_types.keys().map(Identifier::as_str))
            .chain(ns.common_types.keys().map(Identifier::as_str));
        for name in names {
            if decl_names.contains(name) {
                return Err(ShadowError {
                    name: name.into(),
                    namespace: ns_id.path().cloned().expect("checked not anonymous"),
                }
                .into());
            }
        }
        for name in ns.actions.keys().map(QuotedName::as_str) {
            if action_names.contains(name) {
                return Err(ShadowError {
                    name: name.into(),
                    namespace: ns_id.path().cloned().expect("checked not anonymous"),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// `[ns::n, n]` when `ns` is named and `n` is a single segment; `[n]`
/// otherwise.
fn candidates(ns_id: &NamespaceId, name: &Path) -> Vec<Path> {
    if name.len() > 1 {
        return vec![name.clone()];
    }
    match ns_id.path() {
        None => vec![name.clone()],
        Some(_) => vec![ns_id.qualify(name.last()), name.clone()],
    }
}

fn resolve_entity_only(
    index: &Index,
    ns_id: &NamespaceId,
    name: &Path,
    where_: &str,
) -> std::result::Result<EntityType, UndefinedTypeError> {
    for c in candidates(ns_id, name) {
        if index.entity_defs.contains(&c) {
            return Ok(c);
        }
    }
    Err(UndefinedTypeError {
        name: name.to_string().into(),
        context: where_.to_string(),
    })
}

fn resolve_action_ref(
    index: &Index,
    ns_id: &NamespaceId,
    r: &ActionRef,
    where_: &str,
) -> std::result::Result<EntityUid, UndefinedTypeError> {
    let action_type = r
        .namespace
        .clone()
        .unwrap_or_else(|| ns_id.qualify(&Identifier::new_unchecked(ACTION_ENTITY_TYPE_NAME)));
    if index
        .action_defs
        .contains(&(action_type.clone(), r.name.clone()))
    {
        Ok(EntityUid::new(action_type, r.name.clone()))
    } else {
        Err(UndefinedTypeError {
            name: r.name.as_str().into(),
            context: format!("{where_}, in action group"),
        })
    }
}

/// Type-position name resolution: common type wins over entity type for an
/// ambiguous reference (RFC 24).
fn resolve_type_in_position(
    index: &Index,
    ns_id: &NamespaceId,
    ty: &Type,
    where_: &str,
) -> std::result::Result<ResolvedType, UndefinedTypeError> {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || match ty {
        Type::Primitive(p) => Ok(ResolvedType::Primitive(*p)),
        Type::Set(inner) => Ok(ResolvedType::Set(Box::new(resolve_type_in_position(
            index, ns_id, inner, where_,
        )?))),
        Type::Record(rt) => Ok(ResolvedType::Record(resolve_record(
            index, ns_id, rt, where_,
        )?)),
        Type::Extension(name) => Ok(ResolvedType::Extension(name.clone())),
        Type::EntityRef(path) => {
            let q = resolve_entity_only(index, ns_id, path, where_)?;
            Ok(ResolvedType::EntityRef(q))
        }
        Type::CommonRef(path) => {
            for c in candidates(ns_id, path) {
                if let Some(resolved) = index.common_defs.get(&c) {
                    return Ok(resolved.clone());
                }
            }
            Err(UndefinedTypeError {
                name: path.to_string().into(),
                context: where_.to_string(),
            })
        }
        Type::EntityOrCommonRef(path) => {
            for c in candidates(ns_id, path) {
                if let Some(resolved) = index.common_defs.get(&c) {
                    return Ok(resolved.clone());
                }
                if index.entity_defs.contains(&c) {
                    return Ok(ResolvedType::EntityRef(c));
                }
            }
            Err(UndefinedTypeError {
                name: path.to_string().into(),
                context: where_.to_string(),
            })
        }
    })
}

fn resolve_record(
    index: &Index,
    ns_id: &NamespaceId,
    rt: &RecordType,
    where_: &str,
) -> std::result::Result<ResolvedRecordType, UndefinedTypeError> {
    let mut attributes = std::collections::BTreeMap::new();
    for (name, attr) in &rt.attributes {
        let inner_where = format!("{where_}, attribute `{name}`");
        let ty = resolve_type_in_position(index, ns_id, &attr.ty, &inner_where)?;
        attributes.insert(
            name.clone(),
            ResolvedAttribute {
                ty,
                required: attr.required,
                annotations: attr.annotations.clone(),
            },
        );
    }
    Ok(ResolvedRecordType { attributes })
}

/// An action's `context` must resolve to a record. Reported as
/// `UndefinedType` since there's no separate error kind for a shape mismatch
/// and the resolver's only other failure mode for a name is "it doesn't
/// resolve".
fn resolve_context(
    index: &Index,
    ns_id: &NamespaceId,
    ty: &Type,
    where_: &str,
) -> std::result::Result<ResolvedRecordType, UndefinedTypeError> {
    match resolve_type_in_position(index, ns_id, ty, where_)? {
        ResolvedType::Record(rt) => Ok(rt),
        _ => Err(UndefinedTypeError {
            name: "context".into(),
            context: format!("{where_}: context must resolve to a record"),
        }),
    }
}

/// Phase 3: walk a type expression, recording the first-in-priority
/// common-type dependency at each ambiguous reference, exactly the same
/// candidate walk as type-position resolution but recording edges instead of
/// resolving.
fn collect_common_deps(ty: &Type, ns_id: &NamespaceId, index: &Index, out: &mut HashSet<Path>) {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || match ty {
        Type::Set(inner) => collect_common_deps(inner, ns_id, index, out),
        Type::Record(rt) => {
            for attr in rt.attributes.values() {
                collect_common_deps(&attr.ty, ns_id, index, out);
            }
        }
        Type::EntityOrCommonRef(path) | Type::CommonRef(path) => {
            for c in candidates(ns_id, path) {
                if index.common_defs.contains_key(&c) {
                    break;
                }
                if index.entity_defs.contains(&c) {
                    break;
                }
                if index.user_common_defs.contains(&c) {
                    out.insert(c);
                    break;
                }
            }
        }
        Type::Primitive(_) | Type::Extension(_) | Type::EntityRef(_) => {}
    })
}

/// Phase 3: topological order of user common types by Kahn's algorithm, ready
/// queue drained lexicographically for determinism.
///
/// Edges are built dependency -> dependent (the node with no unresolved
/// common-type references is ready first), the direction a Kahn's-algorithm
/// pass needs to produce a valid *resolution* order -- the more natural
/// "references" direction (`u -> v` when `u`'s body references `v`) gives the
/// same cycle participants but the wrong topological order for this
/// purpose, since a cycle's participant set is identical under either
/// orientation; see DESIGN.md.
fn topo_sort_common_types(schema: &Schema, index: &Index) -> Result<Vec<Path>> {
    let mut in_degree: HashMap<Path, usize> =
        index.user_common_defs.iter().cloned().map(|p| (p, 0)).collect();
    let mut dependents: HashMap<Path, Vec<Path>> = HashMap::new();

    for path in &index.user_common_defs {
        let (ns, base) = path.split_last();
        let ns_id = ns.map(NamespaceId::named).unwrap_or_default();
        let def = &schema.namespaces[&ns_id].common_types[base];
        let mut deps = HashSet::new();
        collect_common_deps(&def.ty, &ns_id, index, &mut deps);
        for dep in deps {
            dependents.entry(dep).or_default().push(path.clone());
            *in_degree.get_mut(path).expect("seeded above") += 1;
        }
    }

    let mut ready: BTreeSet<Path> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(p, _)| p.clone())
        .collect();
    let mut order = Vec::with_capacity(index.user_common_defs.len());
    while let Some(next) = ready.iter().next().cloned() {
        ready.remove(&next);
        if let Some(deps) = dependents.get(&next) {
            for d in deps {
                let e = in_degree.get_mut(d).expect("every dependent was seeded");
                *e -= 1;
                if *e == 0 {
                    ready.insert(d.clone());
                }
            }
        }
        order.push(next);
    }

    if order.len() != index.user_common_defs.len() {
        let mut remaining: Vec<Path> = in_degree
            .into_iter()
            .filter(|(_, d)| *d > 0)
            .map(|(p, _)| p)
            .collect();
        remaining.sort();
        return Err(CycleError { names: remaining }.into());
    }
    Ok(order)
}

/// Phase 4: resolve each common type's body in topological order, caching
/// the result for Phase 5 and for later common types in the same order to
/// inline.
fn resolve_common_type_bodies(schema: &Schema, index: &mut Index, order: &[Path]) -> Result<()> {
    for path in order {
        let (ns, base) = path.split_last();
        let ns_id = ns.map(NamespaceId::named).unwrap_or_default();
        let def = &schema.namespaces[&ns_id].common_types[base];
        let where_ = format!("common type `{path}`");
        let resolved = resolve_type_in_position(index, &ns_id, &def.ty, &where_)?;
        index.common_defs.insert(path.clone(), resolved);
    }
    Ok(())
}

/// Phase 5: resolve every declaration in every namespace into the output
/// [`ResolvedSchema`].
fn resolve_declarations(schema: &Schema, index: &Index) -> Result<ResolvedSchema> {
    let mut namespaces = std::collections::BTreeMap::new();
    for (ns_id, ns) in &schema.namespaces {
        let mut entity_types = std::collections::BTreeMap::new();
        for (name, def) in &ns.entity_types {
            let qualified = ns_id.qualify(name);
            let where_ = format!("entity `{qualified}`");
            let mut member_of_types = Vec::with_capacity(def.member_of_types.len());
            for mot in &def.member_of_types {
                member_of_types.push(resolve_entity_only(index, ns_id, mot, &where_)?);
            }
            let shape = def
                .shape
                .as_ref()
                .map(|rt| resolve_record(index, ns_id, rt, &where_))
                .transpose()?;
            let tags = def
                .tags
                .as_ref()
                .map(|ty| resolve_type_in_position(index, ns_id, ty, &where_))
                .transpose()?;
            entity_types.insert(
                qualified,
                ResolvedEntity {
                    annotations: def.annotations.clone(),
                    member_of_types,
                    shape,
                    tags,
                },
            );
        }

        let mut enum_types = std::collections::BTreeMap::new();
        for (name, def) in &ns.enum_types {
            enum_types.insert(
                ns_id.qualify(name),
                ResolvedEnum {
                    annotations: def.annotations.clone(),
                    values: def.values.clone(),
                },
            );
        }

        let mut actions = std::collections::BTreeMap::new();
        for (name, def) in &ns.actions {
            let action_type = ns_id.qualify(&Identifier::new_unchecked(ACTION_ENTITY_TYPE_NAME));
            let uid = EntityUid::new(action_type, name.clone());
            let where_ = format!("action `{uid}`");
            let mut member_of = Vec::with_capacity(def.member_of.len());
            for r in &def.member_of {
                member_of.push(resolve_action_ref(index, ns_id, r, &where_)?);
            }
            let (principal_types, resource_types, context) = match &def.applies_to {
                None => (Vec::new(), Vec::new(), None),
                Some(at) => {
                    let mut principal_types = Vec::with_capacity(at.principal_types.len());
                    for p in &at.principal_types {
                        principal_types.push(resolve_entity_only(index, ns_id, p, &where_)?);
                    }
                    let mut resource_types = Vec::with_capacity(at.resource_types.len());
                    for r in &at.resource_types {
                        resource_types.push(resolve_entity_only(index, ns_id, r, &where_)?);
                    }
                    let context = at
                        .context
                        .as_ref()
                        .map(|ty| resolve_context(index, ns_id, ty, &where_))
                        .transpose()?;
                    (principal_types, resource_types, context)
                }
            };
            actions.insert(
                uid,
                ResolvedAction {
                    annotations: def.annotations.clone(),
                    member_of,
                    principal_types,
                    resource_types,
                    context,
                },
            );
        }

        namespaces.insert(
            ns_id.clone(),
            ResolvedNamespace {
                annotations: ns.annotations.clone(),
                entity_types,
                enum_types,
                actions,
            },
        );
    }
    Ok(ResolvedSchema { namespaces })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::{self, Attribute};
    use crate::err::Error;

    fn ns_id(s: &str) -> NamespaceId {
        if s.is_empty() {
            NamespaceId::anonymous()
        } else {
            NamespaceId::named(Path::parse(s).unwrap())
        }
    }

    #[test]
    fn local_vs_empty_precedence() {
        // local namespace's declaration of the same name wins over the anonymous one.
        let mut schema = Schema::new();
        schema
            .namespace_mut(ns_id(""))
            .unwrap()
            .add_entity(&ns_id(""), Identifier::new("Group").unwrap())
            .unwrap();
        {
            let id = ns_id("MyApp");
            let ns = schema.namespace_mut(id.clone()).unwrap();
            ns.add_entity(&id, Identifier::new("Group").unwrap()).unwrap();
            let user = ns.add_entity(&id, Identifier::new("User").unwrap()).unwrap();
            user.member_of_types = vec![Path::parse("Group").unwrap()];
        }
        let resolved = resolve(&schema).unwrap();
        let user = resolved
            .entity_type(&Path::parse("MyApp::User").unwrap())
            .unwrap();
        assert_eq!(
            user.member_of_types,
            vec![Path::parse("MyApp::Group").unwrap()]
        );
    }

    #[test]
    fn cycle_detection_same_namespace() {
        // a two-cycle between common types in the same namespace.
        let mut schema = Schema::new();
        let id = ns_id("");
        let ns = schema.namespace_mut(id.clone()).unwrap();
        ns.add_common_type(
            &id,
            Identifier::new("a").unwrap(),
            Type::EntityOrCommonRef(Path::parse("b").unwrap()),
        )
        .unwrap();
        ns.add_common_type(
            &id,
            Identifier::new("b").unwrap(),
            Type::EntityOrCommonRef(Path::parse("a").unwrap()),
        )
        .unwrap();
        let err = resolve(&schema).unwrap_err();
        match err {
            Error::Cycle(c) => {
                let names: Vec<String> = c.names.iter().map(ToString::to_string).collect();
                assert!(names.contains(&"a".to_string()));
                assert!(names.contains(&"b".to_string()));
            }
            other => panic!("expected Cycle, got {other:?}"),
        }
    }

    #[test]
    fn cross_namespace_cycle() {
        // a two-cycle between common types across two namespaces.
        let mut schema = Schema::new();
        {
            let id = ns_id("A");
            let ns = schema.namespace_mut(id.clone()).unwrap();
            ns.add_common_type(
                &id,
                Identifier::new("a").unwrap(),
                Type::EntityOrCommonRef(Path::parse("B::a").unwrap()),
            )
            .unwrap();
        }
        {
            let id = ns_id("B");
            let ns = schema.namespace_mut(id.clone()).unwrap();
            ns.add_common_type(
                &id,
                Identifier::new("a").unwrap(),
                Type::EntityOrCommonRef(Path::parse("A::a").unwrap()),
            )
            .unwrap();
        }
        let err = resolve(&schema).unwrap_err();
        assert!(matches!(err, Error::Cycle(_)));
    }

    #[test]
    fn shadow_detection() {
        // a named namespace redeclaring an anonymous-namespace name is rejected.
        let mut schema = Schema::new();
        schema
            .namespace_mut(ns_id(""))
            .unwrap()
            .add_entity(&ns_id(""), Identifier::new("T").unwrap())
            .unwrap();
        {
            let id = ns_id("NS");
            schema
                .namespace_mut(id.clone())
                .unwrap()
                .add_entity(&id, Identifier::new("T").unwrap())
                .unwrap();
        }
        let err = resolve(&schema).unwrap_err();
        match err {
            Error::Shadow(e) => {
                assert_eq!(e.name, "T");
                assert_eq!(e.namespace.to_string(), "NS");
            }
            other => panic!("expected Shadow, got {other:?}"),
        }
    }

    #[test]
    fn common_type_inlining() {
        // a common type's body is inlined into the entity that references it.
        let schema = crate::parser::parse(
            "type Address = { street: String }; entity User { home: Address };",
            None,
        )
        .unwrap();
        let resolved = resolve(&schema).unwrap();
        let user = resolved.entity_type(&Path::parse("User").unwrap()).unwrap();
        let home = &user.shape.as_ref().unwrap().attributes[&"home".into()];
        match &home.ty {
            ResolvedType::Record(rt) => {
                let street = &rt.attributes[&"street".into()];
                assert_eq!(street.ty, ResolvedType::Primitive(PrimitiveType::String));
            }
            other => panic!("expected an inlined record, got {other:?}"),
        }
    }

    #[test]
    fn action_uid_shape() {
        // action UIDs use the synthetic per-namespace Action entity type.
        let schema = crate::parser::parse(
            r#"
            namespace MyApp {
              entity User;
              entity Doc;
              action read appliesTo { principal: User, resource: Doc };
              action write in read appliesTo { principal: User, resource: Doc };
            }
            "#,
            None,
        )
        .unwrap();
        let resolved = resolve(&schema).unwrap();
        let ns = &resolved.namespaces[&ns_id("MyApp")];
        let read_uid = EntityUid::new(Path::parse("MyApp::Action").unwrap(), "read".into());
        let write_uid = EntityUid::new(Path::parse("MyApp::Action").unwrap(), "write".into());
        assert!(ns.actions.contains_key(&read_uid));
        let write = &ns.actions[&write_uid];
        assert_eq!(write.member_of, vec![read_uid]);
        assert_eq!(write.principal_types, vec![Path::parse("MyApp::User").unwrap()]);
    }

    #[test]
    fn undefined_type_is_reported() {
        let mut schema = Schema::new();
        let id = ns_id("");
        let ns = schema.namespace_mut(id.clone()).unwrap();
        let entity = ns.add_entity(&id, Identifier::new("User").unwrap()).unwrap();
        let mut shape = ast::RecordType::new();
        shape.attributes.insert(
            "home".into(),
            Attribute::new(Type::EntityOrCommonRef(Path::parse("Address").unwrap())),
        );
        entity.shape = Some(shape);
        let err = resolve(&schema).unwrap_err();
        assert!(matches!(err, Error::UndefinedType(_)));
    }

    #[test]
    fn resolver_totality_no_common_or_ambiguous_refs_remain() {
        let schema = crate::parser::parse(
            "type Address = { street: String }; entity User in [Group] { home: Address }; entity Group;",
            None,
        )
        .unwrap();
        let resolved = resolve(&schema).unwrap();
        let user = resolved.entity_type(&Path::parse("User").unwrap()).unwrap();
        // ResolvedType has no CommonRef/EntityOrCommonRef variant at all --
        // this compiles only because that's true, and the match below is
        // exhaustive over the five variants that do exist.
        fn assert_no_ambiguity(ty: &ResolvedType) {
            match ty {
                ResolvedType::Primitive(_) | ResolvedType::EntityRef(_) | ResolvedType::Extension(_) => {}
                ResolvedType::Set(inner) => assert_no_ambiguity(inner),
                ResolvedType::Record(rt) => {
                    for attr in rt.attributes.values() {
                        assert_no_ambiguity(&attr.ty);
                    }
                }
            }
        }
        for attr in user.shape.as_ref().unwrap().attributes.values() {
            assert_no_ambiguity(&attr.ty);
        }
    }
}
