pub mod action;
pub mod enums;

pub use action::{Action, VacationAction};
pub use enums::{AddressPart, LogLevel, MatchType, SizeComparator};
