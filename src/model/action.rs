use serde::{Deserialize, Serialize};
use std::fmt;

/// An outcome queued on the mail by an action command.
///
/// `discard` has no variant: it only cancels the implicit keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Keep,
    FileInto { destination: String },
    Reject { message: String },
    Redirect { address: String },
    Vacation(VacationAction),
}

/// Auto-reply parameters collected from a `vacation` command (RFC 5230).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacationAction {
    pub addresses: Vec<String>,
    pub days: u64,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub mime: bool,
    pub handle: Option<String>,
    pub reason: String,
}

impl VacationAction {
    pub const DEFAULT_DAYS: u64 = 7;

    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            addresses: Vec::new(),
            days: Self::DEFAULT_DAYS,
            subject: None,
            from: None,
            mime: false,
            handle: None,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => f.write_str("keep"),
            Self::FileInto { destination } => write!(f, "fileinto \"{destination}\""),
            Self::Reject { message } => write!(f, "reject \"{message}\""),
            Self::Redirect { address } => write!(f, "redirect \"{address}\""),
            Self::Vacation(v) => write!(f, "vacation :days {} \"{}\"", v.days, v.reason),
        }
    }
}
