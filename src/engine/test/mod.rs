//! Test dispatch. A test is a predicate over the mail and never modifies it.

mod compare;
mod message;

use serde::{Deserialize, Serialize};

use crate::engine::context::EvaluationContext;
use crate::error::{Result, SieveError};
use crate::mail::MailAdapter;
use crate::sieve::ast::Test;

/// Built-in test behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Address,
    AllOf,
    AnyOf,
    Body,
    Envelope,
    Exists,
    False,
    Header,
    Not,
    Size,
    True,
}

impl TestKind {
    pub const ALL: [TestKind; 11] = [
        Self::Address,
        Self::AllOf,
        Self::AnyOf,
        Self::Body,
        Self::Envelope,
        Self::Exists,
        Self::False,
        Self::Header,
        Self::Not,
        Self::Size,
        Self::True,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::AllOf => "allof",
            Self::AnyOf => "anyof",
            Self::Body => "body",
            Self::Envelope => "envelope",
            Self::Exists => "exists",
            Self::False => "false",
            Self::Header => "header",
            Self::Not => "not",
            Self::Size => "size",
            Self::True => "true",
        }
    }

    pub fn execute(
        self,
        mail: &dyn MailAdapter,
        test: &Test,
        ctx: &EvaluationContext<'_>,
    ) -> Result<bool> {
        let result = match self {
            Self::Address => compare::address(mail, test, ctx),
            Self::Envelope => compare::envelope(mail, test, ctx),
            Self::Header => compare::header(mail, test, ctx),
            Self::Exists => compare::exists(mail, test),
            Self::AllOf => logical::all_of(mail, test, ctx),
            Self::AnyOf => logical::any_of(mail, test, ctx),
            Self::Not => logical::not(mail, test, ctx),
            Self::True => logical::constant(test, true),
            Self::False => logical::constant(test, false),
            Self::Size => message::size(mail, test),
            Self::Body => message::body(mail, test),
        }?;
        tracing::trace!(test = %test.name, line = test.position.line, result, "evaluated test");
        Ok(result)
    }
}

/// Resolves `test` by name and evaluates it.
pub fn evaluate(mail: &dyn MailAdapter, test: &Test, ctx: &EvaluationContext<'_>) -> Result<bool> {
    let kind = ctx.registry().tests.get(&test.name).map_err(|_| {
        SieveError::feature(format!("unknown test '{}' at {}", test.name, test.position))
    })?;
    kind.execute(mail, test, ctx)
}
