//! The evaluation engine: per-run context, registries, and the command and
//! test dispatch built on them.

pub mod arguments;
pub mod command;
pub mod context;
pub mod registry;
pub mod test;

pub use command::{execute_block, CommandKind, Flow};
pub use context::{CommandState, ConditionState, EvaluationContext};
pub use registry::{CommandManager, Registry, TestManager};
pub use test::TestKind;
