//! `require`, `if`, `elsif` and `else`.

use super::{execute_block, Executed, Flow, Parsed};
use crate::engine::arguments::single_string_list;
use crate::engine::context::EvaluationContext;
use crate::engine::test;
use crate::error::{Result, SieveError};
use crate::mail::MailAdapter;
use crate::sieve::ast::{Block, Command, Test};

pub(super) fn validate_chain_state(command: &Command, ctx: &EvaluationContext<'_>) -> Result<()> {
    if ctx.condition().is_else_allowed() {
        Ok(())
    } else {
        Err(SieveError::command(format!(
            "unexpected command '{}' at {}: not preceded by if or elsif",
            command.name, command.position
        )))
    }
}

pub(super) fn require_arguments(command: &Command) -> Result<Parsed<'_>> {
    single_string_list(&command.arguments, command.position).map(Parsed::Features)
}

/// `if`/`elsif` take exactly one test and nothing else.
pub(super) fn condition_arguments(command: &Command) -> Result<Parsed<'_>> {
    let position = command.position;
    if !command.arguments.args.is_empty() {
        return Err(SieveError::syntax(
            format!("'{}' expects a test, not arguments", command.name),
            position,
        ));
    }
    match command.arguments.tests.as_ref().map(|list| list.tests.as_slice()) {
        Some([test]) => Ok(Parsed::Condition(test)),
        Some(_) => Err(SieveError::syntax(
            format!("'{}' expects a single test, use allof or anyof", command.name),
            position,
        )),
        None => Err(SieveError::syntax(
            format!("'{}' is missing its test", command.name),
            position,
        )),
    }
}

pub(super) fn require(features: &[String], ctx: &EvaluationContext<'_>) -> Result<()> {
    for feature in features {
        ctx.registry().check_feature(feature)?;
        tracing::trace!(feature, "required");
    }
    Ok(())
}

/// Evaluates `test` and, when it holds, runs `block` in a fresh condition
/// scope.
fn run_conditional(
    mail: &mut dyn MailAdapter,
    test: &Test,
    block: Option<&Block>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Executed> {
    let passed = test::evaluate(&*mail, test, ctx)?;
    let flow = match (passed, block) {
        (true, Some(block)) => ctx.with_condition_scope(|inner| execute_block(mail, block, inner))?,
        _ => Flow::Continue,
    };
    Ok(Executed {
        flow,
        test_result: Some(passed),
    })
}

pub(super) fn run_if(
    mail: &mut dyn MailAdapter,
    test: &Test,
    block: Option<&Block>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Executed> {
    run_conditional(mail, test, block, ctx)
}

pub(super) fn run_elsif(
    mail: &mut dyn MailAdapter,
    test: &Test,
    block: Option<&Block>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Executed> {
    if !ctx.condition().is_elsif_runnable() {
        return Ok(Executed::done());
    }
    run_conditional(mail, test, block, ctx)
}

pub(super) fn run_else(
    mail: &mut dyn MailAdapter,
    block: Option<&Block>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Executed> {
    let flow = match block {
        Some(block) if ctx.condition().is_else_runnable() => {
            ctx.with_condition_scope(|inner| execute_block(mail, block, inner))?
        }
        _ => Flow::Continue,
    };
    Ok(Executed {
        flow,
        test_result: None,
    })
}
