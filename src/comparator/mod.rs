//! Comparators (RFC 4790) used by `:is`, `:contains` and `:matches`.

pub mod glob;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};
use crate::model::MatchType;

pub const OCTET: &str = "i;octet";
pub const ASCII_CASEMAP: &str = "i;ascii-casemap";
pub const ASCII_NUMERIC: &str = "i;ascii-numeric";

/// Comparator applied when a test names none.
pub const DEFAULT_COMPARATOR: &str = ASCII_CASEMAP;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparator {
    Octet,
    AsciiCasemap,
    AsciiNumeric,
}

impl Comparator {
    pub fn equals(&self, a: &str, b: &str) -> bool {
        match self {
            Self::Octet => a == b,
            Self::AsciiCasemap => a.eq_ignore_ascii_case(b),
            Self::AsciiNumeric => numeric_cmp(a, b) == Ordering::Equal,
        }
    }

    pub fn contains(&self, container: &str, content: &str) -> Result<bool> {
        match self {
            Self::Octet => Ok(container.contains(content)),
            Self::AsciiCasemap => Ok(container
                .to_ascii_uppercase()
                .contains(&content.to_ascii_uppercase())),
            Self::AsciiNumeric => Err(SieveError::feature(
                "substring match unsupported by ascii-numeric",
            )),
        }
    }

    pub fn matches(&self, value: &str, pattern: &str) -> Result<bool> {
        match self {
            Self::Octet => glob::glob_matches(value, pattern),
            Self::AsciiCasemap => glob::glob_matches(
                &value.to_ascii_uppercase(),
                &pattern.to_ascii_uppercase(),
            ),
            Self::AsciiNumeric => Err(SieveError::feature(
                "glob match unsupported by ascii-numeric",
            )),
        }
    }

    pub fn apply(&self, match_type: MatchType, target: &str, key: &str) -> Result<bool> {
        match match_type {
            MatchType::Is => Ok(self.equals(target, key)),
            MatchType::Contains => self.contains(target, key),
            MatchType::Matches => self.matches(target, key),
        }
    }
}

/// A key prepared once and compared against many values.
#[derive(Debug, Clone)]
pub enum KeyMatcher {
    Is { comparator: Comparator, key: String },
    Contains { comparator: Comparator, key: String },
    Glob { fold_case: bool, regex: Regex },
}

impl KeyMatcher {
    pub fn new(comparator: Comparator, match_type: MatchType, key: &str) -> Result<Self> {
        let key = key.to_string();
        match (match_type, comparator) {
            (MatchType::Is, _) => Ok(Self::Is { comparator, key }),
            (MatchType::Contains, Comparator::AsciiNumeric) => Err(SieveError::feature(
                "substring match unsupported by ascii-numeric",
            )),
            (MatchType::Contains, _) => Ok(Self::Contains { comparator, key }),
            (MatchType::Matches, Comparator::AsciiNumeric) => Err(SieveError::feature(
                "glob match unsupported by ascii-numeric",
            )),
            (MatchType::Matches, Comparator::Octet) => Ok(Self::Glob {
                fold_case: false,
                regex: glob::compile(&key)?,
            }),
            (MatchType::Matches, Comparator::AsciiCasemap) => Ok(Self::Glob {
                fold_case: true,
                regex: glob::compile(&key.to_ascii_uppercase())?,
            }),
        }
    }

    pub fn is_match(&self, target: &str) -> Result<bool> {
        match self {
            Self::Is { comparator, key } => Ok(comparator.equals(target, key)),
            Self::Contains { comparator, key } => comparator.contains(target, key),
            Self::Glob {
                fold_case: true,
                regex,
            } => Ok(regex.is_match(&target.to_ascii_uppercase())),
            Self::Glob { regex, .. } => Ok(regex.is_match(target)),
        }
    }
}

/// Leading digit run with leading zeros dropped; `None` stands for
/// positive infinity (no leading digit).
fn leading_number(s: &str) -> Option<&str> {
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let digits = &s[..end];
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed })
}

fn numeric_cmp(a: &str, b: &str) -> Ordering {
    match (leading_number(a), leading_number(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
    }
}

/// Name → comparator registry.
#[derive(Debug, Clone)]
pub struct ComparatorManager {
    comparators: BTreeMap<String, Comparator>,
}

impl ComparatorManager {
    pub fn empty() -> Self {
        Self {
            comparators: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, comparator: Comparator) {
        self.comparators.insert(name.into(), comparator);
    }

    pub fn get(&self, name: &str) -> Result<Comparator> {
        self.comparators
            .get(name)
            .copied()
            .ok_or_else(|| SieveError::feature(format!("unknown comparator '{name}'")))
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.comparators.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.comparators.keys().map(String::as_str)
    }

    /// Resolves `comparator` and prepares `key` for repeated matching.
    pub fn matcher(&self, comparator: &str, match_type: MatchType, key: &str) -> Result<KeyMatcher> {
        KeyMatcher::new(self.get(comparator)?, match_type, key)
    }

    /// Resolves `comparator` and applies `match_type` to `target`/`key`.
    pub fn compare(
        &self,
        comparator: &str,
        match_type: MatchType,
        target: &str,
        key: &str,
    ) -> Result<bool> {
        let result = self.get(comparator)?.apply(match_type, target, key)?;
        tracing::trace!(comparator, %match_type, target, key, result, "compare");
        Ok(result)
    }
}

impl Default for ComparatorManager {
    fn default() -> Self {
        let mut manager = Self::empty();
        manager.register(OCTET, Comparator::Octet);
        manager.register(ASCII_CASEMAP, Comparator::AsciiCasemap);
        manager.register(ASCII_NUMERIC, Comparator::AsciiNumeric);
        manager
    }
}
