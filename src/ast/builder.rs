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

//! Programmatic construction entry points.
//!
//! These are thin wrappers over the mutate-in-place methods already defined
//! on [`Schema`] and [`Namespace`] -- there is no separate "builder" type,
//! because the AST itself is designed to be mutated directly during
//! construction and treated as read-only afterwards. A schema built this way
//! and a schema produced by the parser or JSON bridge are indistinguishable
//! to the printer and resolver.

use super::ident::{Identifier, NamespaceId};
use super::schema::{ReservedNameError, Schema};

/// `newSchema()`.
pub fn new_schema() -> Schema {
    Schema::new()
}

/// `addNamespace(path)`. Pass [`NamespaceId::anonymous`] for the anonymous
/// namespace.
pub fn add_namespace(
    schema: &mut Schema,
    id: NamespaceId,
) -> Result<&mut super::schema::Namespace, ReservedNameError> {
    schema.namespace_mut(id)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ast::ident::Path;
    use crate::ast::{EntityDef, PrimitiveType, RecordType, Type};

    #[test]
    fn builder_and_parser_agree_on_shape() {
        let mut schema = new_schema();
        let ns_id = NamespaceId::named(Path::parse("MyApp").unwrap());
        let ns = add_namespace(&mut schema, ns_id.clone()).unwrap();
        let mut shape = RecordType::new();
        shape.attributes.insert(
            "street".into(),
            crate::ast::Attribute::new(Type::Primitive(PrimitiveType::String)),
        );
        let entity: &mut EntityDef = ns.add_entity(&ns_id, Identifier::new("User").unwrap()).unwrap();
        entity.shape(shape);

        assert!(schema.namespaces[&ns_id].entity_types.contains_key(&Identifier::new("User").unwrap()));
    }
}
