//! SIEVE script tokenizer (RFC 5228).

use crate::error::{Position, SieveError};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A `:tag` like `:is`, `:contains`, `:over`, `:domain`, etc.
    Tag(String),
    /// An unquoted identifier like `if`, `header`, `allof`, `fileinto`, etc.
    Identifier(String),
    /// A double-quoted string, escapes already resolved.
    QuotedString(String),
    /// A multi-line string `text:\r\n...\r\n.\r\n`, dot-stuffing removed.
    MultiLineString(String),
    /// A numeric value with any K/M/G suffix applied.
    Number(u64),
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
}

#[derive(Debug, Clone)]
pub struct Span {
    pub token: Token,
    pub offset: usize,
    pub len: usize,
    pub position: Position,
}

/// Maps byte offsets back to 1-based line/column pairs.
struct LineIndex<'a> {
    input: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(input: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            input
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { input, line_starts }
    }

    fn position(&self, offset: usize) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = self
            .input
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - start);
        Position::new(line + 1, column + 1)
    }
}

const KILO: u64 = 1 << 10;
const MEGA: u64 = 1 << 20;
const GIGA: u64 = 1 << 30;

pub fn tokenize(input: &str) -> Result<Vec<Span>, SieveError> {
    let index = LineIndex::new(input);
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    let single = |token: Token, offset: usize| Span {
        token,
        offset,
        len: 1,
        position: index.position(offset),
    };

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;

        match bytes[i] {
            b';' => {
                tokens.push(single(Token::Semicolon, start));
                i += 1;
            }
            b',' => {
                tokens.push(single(Token::Comma, start));
                i += 1;
            }
            b'(' => {
                tokens.push(single(Token::LParen, start));
                i += 1;
            }
            b')' => {
                tokens.push(single(Token::RParen, start));
                i += 1;
            }
            b'{' => {
                tokens.push(single(Token::LBrace, start));
                i += 1;
            }
            b'}' => {
                tokens.push(single(Token::RBrace, start));
                i += 1;
            }
            b'[' => {
                tokens.push(single(Token::LBracket, start));
                i += 1;
            }
            b']' => {
                tokens.push(single(Token::RBracket, start));
                i += 1;
            }

            // Hash comment runs to end of line
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }

            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                loop {
                    if i + 1 >= bytes.len() {
                        return Err(SieveError::syntax(
                            "unterminated block comment",
                            index.position(start),
                        ));
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        break;
                    }
                    i += 1;
                }
                i += 2;
            }

            b'"' => {
                let (value, end) = read_quoted(input, start).ok_or_else(|| {
                    SieveError::syntax("unterminated string", index.position(start))
                })?;
                i = end;
                tokens.push(Span {
                    token: Token::QuotedString(value),
                    offset: start,
                    len: i - start,
                    position: index.position(start),
                });
            }

            b't' | b'T'
                if i + 4 < bytes.len() && bytes[i..i + 5].eq_ignore_ascii_case(b"text:") =>
            {
                let (value, end) = read_multi_line(input, start + 5)
                    .map_err(|message| SieveError::syntax(message, index.position(start)))?;
                i = end;
                tokens.push(Span {
                    token: Token::MultiLineString(value),
                    offset: start,
                    len: i - start,
                    position: index.position(start),
                });
            }

            b':' => {
                i += 1;
                if i >= bytes.len() || !(bytes[i].is_ascii_alphabetic() || bytes[i] == b'_') {
                    return Err(SieveError::syntax(
                        "expected identifier after ':'",
                        index.position(start),
                    ));
                }
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(Span {
                    token: Token::Tag(input[start..i].to_ascii_lowercase()),
                    offset: start,
                    len: i - start,
                    position: index.position(start),
                });
            }

            b'0'..=b'9' => {
                let mut value: u64 = 0;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(u64::from(bytes[i] - b'0')))
                        .ok_or_else(|| {
                            SieveError::syntax("number out of range", index.position(start))
                        })?;
                    i += 1;
                }
                let scale = match bytes.get(i) {
                    Some(b'K' | b'k') => KILO,
                    Some(b'M' | b'm') => MEGA,
                    Some(b'G' | b'g') => GIGA,
                    _ => 1,
                };
                if scale != 1 {
                    i += 1;
                }
                let value = value.checked_mul(scale).ok_or_else(|| {
                    SieveError::syntax("number out of range", index.position(start))
                })?;
                tokens.push(Span {
                    token: Token::Number(value),
                    offset: start,
                    len: i - start,
                    position: index.position(start),
                });
            }

            _ if bytes[i].is_ascii_alphabetic() || bytes[i] == b'_' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(Span {
                    token: Token::Identifier(input[start..i].to_string()),
                    offset: start,
                    len: i - start,
                    position: index.position(start),
                });
            }

            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(SieveError::syntax(
                    format!("unexpected character '{ch}'"),
                    index.position(start),
                ));
            }
        }
    }

    Ok(tokens)
}

/// Reads a quoted string starting at the opening quote. Returns the
/// unescaped value and the offset just past the closing quote.
fn read_quoted(input: &str, start: usize) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut chars = input[start + 1..].char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                let (_, escaped) = chars.next()?;
                value.push(escaped);
            }
            '"' => return Some((value, start + 1 + idx + 1)),
            _ => value.push(ch),
        }
    }
    None
}

/// Reads the body of a `text:` string. `from` points just past the colon.
fn read_multi_line(input: &str, from: usize) -> Result<(String, usize), &'static str> {
    const UNTERMINATED: &str = "unterminated multi-line string";

    let header_end = input[from..].find('\n').ok_or(UNTERMINATED)? + from + 1;
    // only whitespace or a hash comment may follow `text:`
    let header = input[from..header_end].trim_end_matches(['\r', '\n']);
    let rest = header.trim_start_matches([' ', '\t']);
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err("unexpected characters after 'text:'");
    }

    let mut value = String::new();
    let mut pos = header_end;
    loop {
        if pos >= input.len() {
            return Err(UNTERMINATED);
        }
        let line_end = input[pos..].find('\n').map(|n| pos + n + 1).unwrap_or(input.len());
        let line = &input[pos..line_end];
        let content = line.trim_end_matches(['\r', '\n']);
        if content == "." {
            return Ok((value, line_end));
        }
        match line.strip_prefix("..") {
            Some(rest) => {
                value.push('.');
                value.push_str(rest);
            }
            None => value.push_str(line),
        }
        pos = line_end;
    }
}
