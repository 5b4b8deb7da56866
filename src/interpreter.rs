//! Runs a script against one mail.

use crate::config::{ConfigError, InterpreterConfig};
use crate::engine::{execute_block, CommandKind, EvaluationContext, Registry};
use crate::error::{Position, Result, SieveError};
use crate::mail::MailAdapter;
use crate::model::Action;
use crate::sieve::ast::{Argument, Block, Script, TestList};
use crate::sieve::parser::{self, ParseLimits};

/// Owns the registries; cheap to share, each run gets its own context.
#[derive(Debug, Clone, Default)]
pub struct SieveInterpreter {
    registry: Registry,
    limits: ParseLimits,
}

impl SieveInterpreter {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            limits: ParseLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ParseLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn from_config(config: &InterpreterConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(config.build_registry()?).with_limits(config.parse_limits()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn parse(&self, script: &[u8]) -> Result<Script> {
        let text = std::str::from_utf8(script).map_err(|e| {
            SieveError::syntax(format!("script is not valid UTF-8: {e}"), Position::new(1, 1))
        })?;
        parser::parse_with_limits(text, self.limits)
    }

    /// Parses `script` and checks every name it uses against the
    /// registries, without running it.
    pub fn check(&self, script: &[u8]) -> Result<Script> {
        let script = self.parse(script)?;
        self.check_block(&script.commands)?;
        Ok(script)
    }

    fn check_block(&self, block: &Block) -> Result<()> {
        for command in &block.commands {
            let kind = self.registry.commands.get(&command.name).map_err(|_| {
                SieveError::feature(format!(
                    "unknown command '{}' at {}",
                    command.name, command.position
                ))
            })?;
            if kind == CommandKind::Require {
                for arg in &command.arguments.args {
                    if let Argument::StringList(features) = arg {
                        for feature in features {
                            self.registry.check_feature(feature)?;
                        }
                    }
                }
            }
            if let Some(tests) = &command.arguments.tests {
                self.check_tests(tests)?;
            }
            if let Some(inner) = &command.block {
                self.check_block(inner)?;
            }
        }
        Ok(())
    }

    fn check_tests(&self, list: &TestList) -> Result<()> {
        for test in &list.tests {
            self.registry.tests.get(&test.name).map_err(|_| {
                SieveError::feature(format!("unknown test '{}' at {}", test.name, test.position))
            })?;
            if let Some(inner) = &test.arguments.tests {
                self.check_tests(inner)?;
            }
        }
        Ok(())
    }

    /// Parses and evaluates `script` against `mail`.
    ///
    /// Actions are queued on `mail`; they are never executed here. Actions
    /// queued before an error stay queued.
    pub fn interpret(&self, mail: &mut dyn MailAdapter, script: &[u8]) -> Result<()> {
        let script = self.parse(script)?;
        self.evaluate(mail, &script)
    }

    /// Evaluates an already parsed script against `mail`.
    ///
    /// A `Keep` is queued when the implicit keep survives the run, including
    /// a run cut short by an error.
    pub fn evaluate(&self, mail: &mut dyn MailAdapter, script: &Script) -> Result<()> {
        let mut ctx = EvaluationContext::new(&self.registry);
        let outcome = execute_block(mail, &script.commands, &mut ctx);

        if ctx.state.implicit_keep {
            mail.add_action(Action::Keep);
        }

        match outcome {
            Ok(flow) => {
                tracing::debug!(?flow, actions = mail.actions().len(), "script evaluated");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(error = %err, "script evaluation failed");
                Err(err)
            }
        }
    }
}
