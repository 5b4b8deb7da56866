//! A SIEVE (RFC 5228) mail filtering interpreter.
//!
//! Scripts are parsed into an AST, then evaluated against a [`MailAdapter`]
//! which receives the queued [`Action`]s.

pub mod comparator;
pub mod config;
pub mod engine;
pub mod error;
pub mod interpreter;
pub mod mail;
pub mod model;
pub mod sieve;
pub mod store;

pub use config::{ConfigError, InterpreterConfig};
pub use error::{Position, Result, SieveError};
pub use interpreter::SieveInterpreter;
pub use mail::{MailAdapter, MemoryMail, ParsedMessage};
pub use model::{Action, VacationAction};
pub use sieve::Script;
