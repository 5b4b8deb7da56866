//! Parse tree for SIEVE scripts (RFC 5228).
//!
//! The tree is generic: commands and tests are identified by name and carry
//! their raw arguments. Meaning is attached later by the engine registries.

use crate::error::Position;

/// A complete SIEVE script is a block of top-level commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub commands: Block,
}

/// `{ command* }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub commands: Vec<Command>,
}

impl Block {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// `identifier arguments (";" / block)`
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub arguments: Arguments,
    pub block: Option<Block>,
    pub position: Position,
}

/// Positional arguments followed by an optional test or test list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub args: Vec<Argument>,
    pub tests: Option<TestList>,
}

impl Arguments {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty() && self.tests.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// A `:tag`, stored lower-cased with its leading colon.
    Tag(String),
    /// A number with any K/M/G quantifier already applied.
    Number(u64),
    /// `"a"` or `["a", "b"]`
    StringList(Vec<String>),
}

impl Argument {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Tag(_) => "tag",
            Self::Number(_) => "number",
            Self::StringList(_) => "string list",
        }
    }
}

/// `(test, test, ...)`, or a single test written without parentheses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestList {
    pub tests: Vec<Test>,
}

/// `identifier arguments`
#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    pub name: String,
    pub arguments: Arguments,
    pub position: Position,
}
