pub mod repository;
pub mod script_io;

pub use repository::{FileRepository, ScriptInfo, ScriptRepository, StoreError, StoreResult};
