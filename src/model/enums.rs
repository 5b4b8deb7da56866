use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    Is,
    Contains,
    Matches,
}

impl MatchType {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::Is => ":is",
            Self::Contains => ":contains",
            Self::Matches => ":matches",
        }
    }

    pub fn from_sieve(s: &str) -> Option<Self> {
        match s {
            ":is" => Some(Self::Is),
            ":contains" => Some(Self::Contains),
            ":matches" => Some(Self::Matches),
            _ => None,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sieve())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressPart {
    All,
    Localpart,
    Domain,
}

impl AddressPart {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::All => ":all",
            Self::Localpart => ":localpart",
            Self::Domain => ":domain",
        }
    }

    pub fn from_sieve(s: &str) -> Option<Self> {
        match s {
            ":all" => Some(Self::All),
            ":localpart" => Some(Self::Localpart),
            ":domain" => Some(Self::Domain),
            _ => None,
        }
    }
}

impl fmt::Display for AddressPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sieve())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeComparator {
    Over,
    Under,
}

impl SizeComparator {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::Over => ":over",
            Self::Under => ":under",
        }
    }

    pub fn from_sieve(s: &str) -> Option<Self> {
        match s {
            ":over" => Some(Self::Over),
            ":under" => Some(Self::Under),
            _ => None,
        }
    }
}

impl fmt::Display for SizeComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sieve())
    }
}

/// Severity tags accepted by the `log` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Fatal,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_sieve(&self) -> &'static str {
        match self {
            Self::Fatal => ":fatal",
            Self::Error => ":error",
            Self::Warn => ":warn",
            Self::Info => ":info",
            Self::Debug => ":debug",
            Self::Trace => ":trace",
        }
    }

    pub fn from_sieve(s: &str) -> Option<Self> {
        match s {
            ":fatal" => Some(Self::Fatal),
            ":error" => Some(Self::Error),
            ":warn" => Some(Self::Warn),
            ":info" => Some(Self::Info),
            ":debug" => Some(Self::Debug),
            ":trace" => Some(Self::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sieve())
    }
}
