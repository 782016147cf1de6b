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

//! Errors raised by [`super::resolve`].

use itertools::Itertools;
use smol_str::SmolStr;

use crate::ast::Path;

/// Phase 2: a named namespace redeclares a name from the anonymous namespace
/// (RFC 70).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{namespace}` shadows `{name}`, which is declared in the anonymous namespace")]
pub struct ShadowError {
    pub name: SmolStr,
    pub namespace: Path,
}

/// Phase 3: common types form a dependency cycle. `names` is the sorted list
/// of every qualified common-type name left with nonzero in-degree after
/// Kahn's algorithm drains everything it can.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct CycleError {
    pub names: Vec<Path>,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cycle among common type(s): {}",
            self.names.iter().map(ToString::to_string).join(", ")
        )
    }
}

/// Phases 4-5: a name reference could not be resolved against any candidate
/// in its position. `context` is a breadcrumb describing where the
/// reference occurred, e.g. `"entity `MyApp::User`, attribute `home`"`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{context}: undefined name `{name}`")]
pub struct UndefinedTypeError {
    pub name: SmolStr,
    pub context: String,
}
