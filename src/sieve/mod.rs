pub mod ast;
pub mod emitter;
pub mod lexer;
pub mod parser;

pub use ast::{Argument, Arguments, Block, Command, Script, Test, TestList};
pub use parser::{parse, parse_with_limits, ParseLimits};
