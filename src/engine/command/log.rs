//! `log [:fatal / :error / :warn / :info / :debug / :trace] <message>`

use super::Parsed;
use crate::engine::arguments::{as_single_string, expect_no_tests};
use crate::error::{Result, SieveError};
use crate::model::LogLevel;
use crate::sieve::ast::{Argument, Command};

pub(super) fn log_arguments(command: &Command) -> Result<Parsed<'_>> {
    let position = command.position;
    expect_no_tests(&command.arguments, position)?;

    match command.arguments.args.as_slice() {
        [message] => Ok(Parsed::Log(
            LogLevel::default(),
            as_single_string(message, position)?,
        )),
        [Argument::Tag(tag), message] => {
            let level = LogLevel::from_sieve(tag).ok_or_else(|| {
                SieveError::syntax(format!("unknown log level '{tag}'"), position)
            })?;
            Ok(Parsed::Log(level, as_single_string(message, position)?))
        }
        _ => Err(SieveError::syntax(
            "expected an optional level tag and a message",
            position,
        )),
    }
}

pub(super) fn log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Fatal | LogLevel::Error => tracing::error!(target: "sieve::script", "{message}"),
        LogLevel::Warn => tracing::warn!(target: "sieve::script", "{message}"),
        LogLevel::Info => tracing::info!(target: "sieve::script", "{message}"),
        LogLevel::Debug => tracing::debug!(target: "sieve::script", "{message}"),
        LogLevel::Trace => tracing::trace!(target: "sieve::script", "{message}"),
    }
}
