//! Translation of SIEVE `:matches` wildcards into regular expressions.

use regex::{Regex, RegexBuilder};

use crate::error::{Result, SieveError};

/// Translates a SIEVE glob into an (unanchored) regular expression.
///
/// `*` becomes `.*` with runs collapsed, `?` becomes `.`, a backslash
/// escapes a following `*`, `?` or `\` and is literal otherwise.
pub fn sieve_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars().peekable();
    let mut last_was_star = false;

    while let Some(ch) = chars.next() {
        match ch {
            '*' => {
                if !last_was_star {
                    out.push_str(".*");
                }
                last_was_star = true;
                continue;
            }
            '?' => out.push('.'),
            '\\' => match chars.peek() {
                Some(&next @ ('*' | '?' | '\\')) => {
                    chars.next();
                    out.push('\\');
                    out.push(next);
                }
                _ => out.push_str("\\\\"),
            },
            _ => push_literal(&mut out, ch),
        }
        last_was_star = false;
    }

    out
}

fn push_literal(out: &mut String, ch: char) {
    if regex_syntax_char(ch) {
        out.push('\\');
    }
    out.push(ch);
}

fn regex_syntax_char(ch: char) -> bool {
    matches!(
        ch,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#'
            | '&' | '-' | '~'
    )
}

/// Compiles a glob into an anchored regex. `*` and `?` also match line
/// breaks so folded header values behave like single lines.
pub fn compile(pattern: &str) -> Result<Regex> {
    let expr = format!("^(?:{})$", sieve_to_regex(pattern));
    RegexBuilder::new(&expr)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| SieveError::feature(format!("invalid match pattern '{pattern}': {e}")))
}

/// Full-string glob match.
pub fn glob_matches(value: &str, pattern: &str) -> Result<bool> {
    Ok(compile(pattern)?.is_match(value))
}
