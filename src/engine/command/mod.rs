//! Command dispatch.
//!
//! Every command runs the same fixed sequence of phases:
//! `validate_state`, `validate_arguments`, `validate_block`,
//! `execute_basic`, `update_state`. A failing phase aborts the rest.

mod action;
mod control;
mod log;

use serde::{Deserialize, Serialize};

use crate::engine::context::EvaluationContext;
use crate::error::{Result, SieveError};
use crate::mail::MailAdapter;
use crate::model::{LogLevel, VacationAction};
use crate::sieve::ast::{Block, Command, Test};

/// Whether evaluation continues after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Built-in command behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Require,
    Stop,
    If,
    Elsif,
    Else,
    Keep,
    Discard,
    FileInto,
    Reject,
    Redirect,
    Vacation,
    Log,
}

/// Arguments once validated, handed to `execute_basic`.
#[derive(Debug)]
enum Parsed<'a> {
    Nothing,
    Features(Vec<String>),
    Text(String),
    Vacation(VacationAction),
    Log(LogLevel, String),
    Condition(&'a Test),
}

/// What `execute_basic` reports back to `update_state`.
#[derive(Debug, Clone, Copy)]
struct Executed {
    flow: Flow,
    /// Result of a conditional's test; `None` when the test was skipped.
    test_result: Option<bool>,
}

impl Executed {
    fn done() -> Self {
        Self {
            flow: Flow::Continue,
            test_result: None,
        }
    }
}

impl CommandKind {
    pub const ALL: [CommandKind; 12] = [
        Self::Require,
        Self::Stop,
        Self::If,
        Self::Elsif,
        Self::Else,
        Self::Keep,
        Self::Discard,
        Self::FileInto,
        Self::Reject,
        Self::Redirect,
        Self::Vacation,
        Self::Log,
    ];

    /// Default script-level name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Require => "require",
            Self::Stop => "stop",
            Self::If => "if",
            Self::Elsif => "elsif",
            Self::Else => "else",
            Self::Keep => "keep",
            Self::Discard => "discard",
            Self::FileInto => "fileinto",
            Self::Reject => "reject",
            Self::Redirect => "redirect",
            Self::Vacation => "vacation",
            Self::Log => "log",
        }
    }

    pub fn is_prolog(&self) -> bool {
        matches!(self, Self::Require)
    }

    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Self::Keep
                | Self::Discard
                | Self::FileInto
                | Self::Reject
                | Self::Redirect
                | Self::Vacation
        )
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::If | Self::Elsif | Self::Else)
    }

    pub fn execute(
        self,
        mail: &mut dyn MailAdapter,
        command: &Command,
        ctx: &mut EvaluationContext<'_>,
    ) -> Result<Flow> {
        tracing::debug!(
            command = %command.name,
            line = command.position.line,
            depth = ctx.depth(),
            "executing command"
        );
        self.validate_state(command, ctx)?;
        let parsed = self.validate_arguments(command)?;
        self.validate_block(command)?;
        // nested blocks already run outside the prolog
        if !self.is_prolog() {
            ctx.state.in_prolog = false;
        }
        let executed = self.execute_basic(mail, command, parsed, ctx)?;
        self.update_state(ctx, executed);
        Ok(executed.flow)
    }

    fn validate_state(&self, command: &Command, ctx: &EvaluationContext<'_>) -> Result<()> {
        if self.is_prolog() && !ctx.state.in_prolog {
            return Err(SieveError::command(format!(
                "'{}' is only allowed at the start of a script ({})",
                command.name, command.position
            )));
        }
        if self.is_action() && ctx.state.rejected {
            return Err(SieveError::command(format!(
                "cannot perform actions on a rejected message ('{}' at {})",
                command.name, command.position
            )));
        }
        match self {
            Self::Reject => action::validate_reject_state(command, ctx),
            Self::Vacation => action::validate_vacation_state(command, ctx),
            Self::Elsif | Self::Else => control::validate_chain_state(command, ctx),
            _ => Ok(()),
        }
    }

    fn validate_arguments<'a>(&self, command: &'a Command) -> Result<Parsed<'a>> {
        match self {
            Self::Require => control::require_arguments(command),
            Self::If | Self::Elsif => control::condition_arguments(command),
            Self::FileInto | Self::Reject | Self::Redirect => action::text_argument(command),
            Self::Vacation => action::vacation_arguments(command),
            Self::Log => log::log_arguments(command),
            Self::Stop | Self::Else | Self::Keep | Self::Discard => {
                if command.arguments.is_empty() {
                    Ok(Parsed::Nothing)
                } else {
                    Err(SieveError::syntax(
                        format!("'{}' takes no arguments", command.name),
                        command.position,
                    ))
                }
            }
        }
    }

    fn validate_block(&self, command: &Command) -> Result<()> {
        match (self.is_conditional(), &command.block) {
            (true, None) => Err(SieveError::syntax(
                format!("'{}' requires a block", command.name),
                command.position,
            )),
            (false, Some(_)) => Err(SieveError::syntax(
                format!("unexpected block after '{}' (missing ';'?)", command.name),
                command.position,
            )),
            _ => Ok(()),
        }
    }

    fn execute_basic(
        &self,
        mail: &mut dyn MailAdapter,
        command: &Command,
        parsed: Parsed<'_>,
        ctx: &mut EvaluationContext<'_>,
    ) -> Result<Executed> {
        let block = command.block.as_ref();
        match (self, parsed) {
            (Self::Require, Parsed::Features(features)) => {
                control::require(&features, ctx)?;
                Ok(Executed::done())
            }
            (Self::Stop, _) => Ok(Executed {
                flow: Flow::Stop,
                test_result: None,
            }),
            (Self::If, Parsed::Condition(test)) => control::run_if(mail, test, block, ctx),
            (Self::Elsif, Parsed::Condition(test)) => control::run_elsif(mail, test, block, ctx),
            (Self::Else, _) => control::run_else(mail, block, ctx),
            (Self::Keep, _) => {
                action::keep(mail);
                Ok(Executed::done())
            }
            (Self::Discard, _) => Ok(Executed::done()),
            (Self::FileInto, Parsed::Text(destination)) => {
                action::file_into(mail, destination);
                Ok(Executed::done())
            }
            (Self::Reject, Parsed::Text(message)) => {
                action::reject(mail, message);
                Ok(Executed::done())
            }
            (Self::Redirect, Parsed::Text(address)) => {
                action::redirect(mail, address);
                Ok(Executed::done())
            }
            (Self::Vacation, Parsed::Vacation(vacation)) => {
                action::vacation(mail, vacation);
                Ok(Executed::done())
            }
            (Self::Log, Parsed::Log(level, message)) => {
                log::log(level, &message);
                Ok(Executed::done())
            }
            (kind, parsed) => Err(SieveError::command(format!(
                "internal mismatch between '{}' and {parsed:?}",
                kind.name()
            ))),
        }
    }

    fn update_state(&self, ctx: &mut EvaluationContext<'_>, executed: Executed) {
        match self {
            Self::If => {
                if let Some(result) = executed.test_result {
                    ctx.condition_mut().set_if_test_result(result);
                }
            }
            Self::Elsif => {
                if let Some(result) = executed.test_result {
                    ctx.condition_mut().set_elsif_test_result(result);
                }
            }
            Self::Else => ctx.condition_mut().set_else_test_result(),
            _ => ctx.condition_mut().reset(),
        }

        if self.is_action() {
            ctx.state.has_actions = true;
            if *self != Self::Vacation {
                ctx.state.implicit_keep = false;
            }
        }
        match self {
            Self::Reject => ctx.state.rejected = true,
            Self::Vacation => ctx.state.vacation_processed = true,
            _ => {}
        }
    }
}

/// Runs every command of `block` in order until one stops evaluation.
pub fn execute_block(
    mail: &mut dyn MailAdapter,
    block: &Block,
    ctx: &mut EvaluationContext<'_>,
) -> Result<Flow> {
    for command in &block.commands {
        let kind = ctx.registry().commands.get(&command.name).map_err(|_| {
            SieveError::feature(format!(
                "unknown command '{}' at {}",
                command.name, command.position
            ))
        })?;
        if kind.execute(mail, command, ctx)? == Flow::Stop {
            return Ok(Flow::Stop);
        }
    }
    Ok(Flow::Continue)
}
