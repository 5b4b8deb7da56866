//! Action commands: `keep`, `fileinto`, `reject`, `redirect`, `vacation`.
//! (`discard` has no effect beyond the shared action bookkeeping.)

use super::Parsed;
use crate::engine::arguments::{as_single_string, single_string};
use crate::engine::context::EvaluationContext;
use crate::error::{Result, SieveError};
use crate::mail::MailAdapter;
use crate::model::{Action, VacationAction};
use crate::sieve::ast::{Argument, Command};

pub(super) fn validate_reject_state(command: &Command, ctx: &EvaluationContext<'_>) -> Result<()> {
    if ctx.state.vacation_processed {
        return Err(SieveError::command(format!(
            "reject at {} is incompatible with vacation",
            command.position
        )));
    }
    if ctx.state.has_actions {
        return Err(SieveError::command(format!(
            "cannot reject at {}: other actions have already been performed",
            command.position
        )));
    }
    Ok(())
}

pub(super) fn validate_vacation_state(
    command: &Command,
    ctx: &EvaluationContext<'_>,
) -> Result<()> {
    if ctx.state.vacation_processed {
        return Err(SieveError::command(format!(
            "vacation at {}: only one vacation per script run",
            command.position
        )));
    }
    Ok(())
}

pub(super) fn text_argument(command: &Command) -> Result<Parsed<'_>> {
    single_string(&command.arguments, command.position).map(Parsed::Text)
}

/// `vacation [:days number] [:subject string] [:from string]
/// [:addresses string-list] [:mime] [:handle string] <reason: string>`
pub(super) fn vacation_arguments(command: &Command) -> Result<Parsed<'_>> {
    let position = command.position;
    if command.arguments.tests.is_some() {
        return Err(SieveError::syntax("unexpected test", position));
    }

    let mut vacation = VacationAction::new(String::new());
    let mut seen: Vec<&str> = Vec::new();
    let mut args = command.arguments.args.iter();
    let mut reason = None;

    while let Some(arg) = args.next() {
        let tag = match arg {
            Argument::Tag(tag) => tag.as_str(),
            _ if reason.is_none() => {
                reason = Some(as_single_string(arg, position)?);
                continue;
            }
            _ => return Err(SieveError::syntax("too many arguments", position)),
        };
        if reason.is_some() {
            return Err(SieveError::syntax(
                format!("tag '{tag}' after the vacation reason"),
                position,
            ));
        }
        if seen.contains(&tag) {
            return Err(SieveError::syntax(format!("duplicate tag '{tag}'"), position));
        }
        seen.push(tag);

        let mut value = || {
            args.next()
                .ok_or_else(|| SieveError::syntax(format!("{tag} needs a value"), position))
        };
        match tag {
            ":days" => match value()? {
                Argument::Number(0) => {
                    return Err(SieveError::syntax(":days must be at least 1", position))
                }
                Argument::Number(days) => vacation.days = *days,
                other => {
                    return Err(SieveError::syntax(
                        format!(":days expects a number, found {}", other.describe()),
                        position,
                    ))
                }
            },
            ":subject" => vacation.subject = Some(as_single_string(value()?, position)?),
            ":from" => vacation.from = Some(as_single_string(value()?, position)?),
            ":handle" => vacation.handle = Some(as_single_string(value()?, position)?),
            ":addresses" => match value()? {
                Argument::StringList(list) => vacation.addresses = list.clone(),
                other => {
                    return Err(SieveError::syntax(
                        format!(":addresses expects a string list, found {}", other.describe()),
                        position,
                    ))
                }
            },
            ":mime" => vacation.mime = true,
            _ => return Err(SieveError::syntax(format!("unexpected tag '{tag}'"), position)),
        }
    }

    vacation.reason =
        reason.ok_or_else(|| SieveError::syntax("vacation is missing its reason", position))?;
    Ok(Parsed::Vacation(vacation))
}

pub(super) fn keep(mail: &mut dyn MailAdapter) {
    mail.add_action(Action::Keep);
}

/// Queues a `FileInto` unless one for the same destination is queued.
pub(super) fn file_into(mail: &mut dyn MailAdapter, destination: String) {
    let duplicate = mail.actions().iter().any(|action| {
        matches!(action, Action::FileInto { destination: queued } if *queued == destination)
    });
    if duplicate {
        tracing::debug!(%destination, "fileinto already queued");
        return;
    }
    mail.add_action(Action::FileInto { destination });
}

pub(super) fn reject(mail: &mut dyn MailAdapter, message: String) {
    mail.add_action(Action::Reject { message });
}

pub(super) fn redirect(mail: &mut dyn MailAdapter, address: String) {
    mail.add_action(Action::Redirect { address });
}

pub(super) fn vacation(mail: &mut dyn MailAdapter, vacation: VacationAction) {
    mail.add_action(Action::Vacation(vacation));
}
