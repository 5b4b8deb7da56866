//! Recursive descent SIEVE parser.
//!
//! Follows the generic command grammar of RFC 5228 §8: the parser knows
//! nothing about individual commands, it only builds the tree.

use crate::error::{Position, SieveError};
use crate::sieve::ast::*;
use crate::sieve::lexer::{tokenize, Span, Token};

/// Bounds on how deep blocks and tests may nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_nested_blocks: usize,
    pub max_nested_tests: usize,
}

impl ParseLimits {
    pub const DEFAULT_MAX_NESTED_BLOCKS: usize = 50;
    pub const DEFAULT_MAX_NESTED_TESTS: usize = 50;

    pub fn with_max_nested_blocks(mut self, max: usize) -> Self {
        self.max_nested_blocks = max;
        self
    }

    pub fn with_max_nested_tests(mut self, max: usize) -> Self {
        self.max_nested_tests = max;
        self
    }
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_nested_blocks: Self::DEFAULT_MAX_NESTED_BLOCKS,
            max_nested_tests: Self::DEFAULT_MAX_NESTED_TESTS,
        }
    }
}

pub fn parse(input: &str) -> Result<Script, SieveError> {
    parse_with_limits(input, ParseLimits::default())
}

pub fn parse_with_limits(input: &str, limits: ParseLimits) -> Result<Script, SieveError> {
    let spans = tokenize(input)?;
    let mut parser = Parser {
        spans: &spans,
        pos: 0,
        end: end_position(input),
        limits,
        block_depth: 0,
        test_depth: 0,
    };
    let commands = parser.parse_commands()?;
    if let Some(span) = parser.peek_span() {
        return Err(SieveError::syntax(
            format!("unexpected {}", describe(&span.token)),
            span.position,
        ));
    }
    Ok(Script {
        commands: Block::new(commands),
    })
}

fn end_position(input: &str) -> Position {
    let line = input.matches('\n').count() + 1;
    let column = input.rsplit('\n').next().map(|l| l.chars().count()).unwrap_or(0) + 1;
    Position::new(line, column)
}

fn describe(token: &Token) -> String {
    match token {
        Token::Tag(t) => format!("tag '{t}'"),
        Token::Identifier(s) => format!("identifier '{s}'"),
        Token::QuotedString(_) | Token::MultiLineString(_) => "string".to_string(),
        Token::Number(n) => format!("number {n}"),
        Token::Semicolon => "';'".to_string(),
        Token::Comma => "','".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::LBrace => "'{'".to_string(),
        Token::RBrace => "'}'".to_string(),
        Token::LBracket => "'['".to_string(),
        Token::RBracket => "']'".to_string(),
    }
}

struct Parser<'a> {
    spans: &'a [Span],
    pos: usize,
    end: Position,
    limits: ParseLimits,
    block_depth: usize,
    test_depth: usize,
}

impl<'a> Parser<'a> {
    fn peek_span(&self) -> Option<&'a Span> {
        self.spans.get(self.pos)
    }

    fn peek(&self) -> Option<&'a Token> {
        self.peek_span().map(|s| &s.token)
    }

    fn position(&self) -> Position {
        self.peek_span().map(|s| s.position).unwrap_or(self.end)
    }

    fn unexpected(&self, expected: &str) -> SieveError {
        let found = self
            .peek()
            .map(describe)
            .unwrap_or_else(|| "end of script".to_string());
        SieveError::syntax(format!("expected {expected}, found {found}"), self.position())
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<(), SieveError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// `*command`, stopping at `}` or end of input.
    fn parse_commands(&mut self) -> Result<Vec<Command>, SieveError> {
        let mut commands = Vec::new();
        while let Some(Token::Identifier(_)) = self.peek() {
            commands.push(self.parse_command()?);
        }
        Ok(commands)
    }

    fn parse_command(&mut self) -> Result<Command, SieveError> {
        let position = self.position();
        let name = self.parse_identifier()?;
        let arguments = self.parse_arguments()?;

        let block = match self.peek() {
            Some(Token::Semicolon) => {
                self.pos += 1;
                None
            }
            Some(Token::LBrace) => {
                if self.block_depth >= self.limits.max_nested_blocks {
                    return Err(SieveError::syntax(
                        format!(
                            "blocks nested deeper than {}",
                            self.limits.max_nested_blocks
                        ),
                        self.position(),
                    ));
                }
                self.pos += 1;
                self.block_depth += 1;
                let commands = self.parse_commands();
                self.block_depth -= 1;
                let commands = commands?;
                self.expect(Token::RBrace, "'}' or command")?;
                Some(Block::new(commands))
            }
            _ => return Err(self.unexpected("';' or '{'")),
        };

        Ok(Command {
            name,
            arguments,
            block,
            position,
        })
    }

    fn parse_identifier(&mut self) -> Result<String, SieveError> {
        match self.peek() {
            Some(Token::Identifier(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// `*argument [test / test-list]`
    fn parse_arguments(&mut self) -> Result<Arguments, SieveError> {
        let mut args = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Tag(tag)) => {
                    args.push(Argument::Tag(tag.clone()));
                    self.pos += 1;
                }
                Some(Token::Number(n)) => {
                    args.push(Argument::Number(*n));
                    self.pos += 1;
                }
                Some(Token::QuotedString(s)) | Some(Token::MultiLineString(s)) => {
                    args.push(Argument::StringList(vec![s.clone()]));
                    self.pos += 1;
                }
                Some(Token::LBracket) => {
                    args.push(Argument::StringList(self.parse_string_list()?));
                }
                _ => break,
            }
        }

        let tests = match self.peek() {
            Some(Token::Identifier(_)) => Some(TestList {
                tests: vec![self.parse_test()?],
            }),
            Some(Token::LParen) => Some(self.parse_test_list()?),
            _ => None,
        };

        Ok(Arguments { args, tests })
    }

    /// `"[" string *("," string) "]"`
    fn parse_string_list(&mut self) -> Result<Vec<String>, SieveError> {
        self.expect(Token::LBracket, "'['")?;
        let mut items = Vec::new();
        loop {
            match self.peek() {
                Some(Token::QuotedString(s)) | Some(Token::MultiLineString(s)) => {
                    items.push(s.clone());
                    self.pos += 1;
                }
                _ => return Err(self.unexpected("string")),
            }
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RBracket) => {
                    self.pos += 1;
                    return Ok(items);
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
    }

    /// `"(" test *("," test) ")"`
    fn parse_test_list(&mut self) -> Result<TestList, SieveError> {
        self.expect(Token::LParen, "'('")?;
        let mut tests = Vec::new();
        loop {
            tests.push(self.parse_test()?);
            match self.peek() {
                Some(Token::Comma) => self.pos += 1,
                Some(Token::RParen) => {
                    self.pos += 1;
                    return Ok(TestList { tests });
                }
                _ => return Err(self.unexpected("',' or ')'")),
            }
        }
    }

    fn parse_test(&mut self) -> Result<Test, SieveError> {
        let position = self.position();
        if self.test_depth >= self.limits.max_nested_tests {
            return Err(SieveError::syntax(
                format!("tests nested deeper than {}", self.limits.max_nested_tests),
                position,
            ));
        }
        let name = self.parse_identifier()?;
        self.test_depth += 1;
        let arguments = self.parse_arguments();
        self.test_depth -= 1;
        let arguments = arguments?;
        Ok(Test {
            name,
            arguments,
            position,
        })
    }
}
