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

//! Token kinds for the textual schema lexer.

use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Namespace,
    Entity,
    Action,
    Type,
    Enum,
    In,
    Tags,
    AppliesTo,
    Principal,
    Resource,
    Context,
    Set,
    Bool,
    Long,
    String,

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Lt,
    Gt,
    Comma,
    Semi,
    Colon,
    Question,
    Eq,
    At,
    ColonColon,

    Ident(SmolStr),
    /// A decoded (escapes already resolved) string-literal body.
    Str(SmolStr),
}

impl TokenKind {
    /// The keyword this identifier-shaped text denotes, if any. Keywords are
    /// reserved: a schema cannot declare an entity/action/common-type named
    /// `namespace`, `Set`, etc.
    pub fn keyword_for(word: &str) -> Option<TokenKind> {
        Some(match word {
            "namespace" => TokenKind::Namespace,
            "entity" => TokenKind::Entity,
            "action" => TokenKind::Action,
            "type" => TokenKind::Type,
            "enum" => TokenKind::Enum,
            "in" => TokenKind::In,
            "tags" => TokenKind::Tags,
            "appliesTo" => TokenKind::AppliesTo,
            "principal" => TokenKind::Principal,
            "resource" => TokenKind::Resource,
            "context" => TokenKind::Context,
            "Set" => TokenKind::Set,
            "Bool" => TokenKind::Bool,
            "Long" => TokenKind::Long,
            "String" => TokenKind::String,
            _ => return None,
        })
    }

    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("identifier `{s}`"),
            TokenKind::Str(s) => format!("string \"{s}\""),
            other => format!("`{}`", other.lexeme()),
        }
    }

    fn lexeme(&self) -> &'static str {
        match self {
            TokenKind::Namespace => "namespace",
            TokenKind::Entity => "entity",
            TokenKind::Action => "action",
            TokenKind::Type => "type",
            TokenKind::Enum => "enum",
            TokenKind::In => "in",
            TokenKind::Tags => "tags",
            TokenKind::AppliesTo => "appliesTo",
            TokenKind::Principal => "principal",
            TokenKind::Resource => "resource",
            TokenKind::Context => "context",
            TokenKind::Set => "Set",
            TokenKind::Bool => "Bool",
            TokenKind::Long => "Long",
            TokenKind::String => "String",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::Eq => "=",
            TokenKind::At => "@",
            TokenKind::ColonColon => "::",
            TokenKind::Ident(_) => "identifier",
            TokenKind::Str(_) => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
}
