//! Comparator-based tests: `address`, `envelope`, `header`, plus `exists`.

use crate::comparator::KeyMatcher;
use crate::engine::arguments::{single_string_list, ComparatorArgs};
use crate::engine::context::EvaluationContext;
use crate::error::Result;
use crate::mail::address::{parse_envelope_address, Address};
use crate::mail::MailAdapter;
use crate::model::{AddressPart, MatchType};
use crate::sieve::ast::Test;

/// One prepared matcher per key; domain keys are lower-cased.
fn key_matchers(args: &ComparatorArgs, ctx: &EvaluationContext<'_>) -> Result<Vec<KeyMatcher>> {
    args.keys
        .iter()
        .map(|key| {
            let key = if args.address_part == AddressPart::Domain {
                key.to_ascii_lowercase()
            } else {
                key.clone()
            };
            ctx.comparators()
                .matcher(&args.comparator, args.match_type, &key)
        })
        .collect()
}

/// True when any key matches `target`.
fn any_key_matches(matchers: &[KeyMatcher], target: &str) -> Result<bool> {
    for matcher in matchers {
        if matcher.is_match(target)? {
            tracing::trace!(target, ?matcher, "key matched");
            return Ok(true);
        }
    }
    Ok(false)
}

fn any_address_matches(
    args: &ComparatorArgs,
    matchers: &[KeyMatcher],
    addresses: &[Address],
) -> Result<bool> {
    for address in addresses {
        if any_key_matches(matchers, &address.part(args.address_part))? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(super) fn address(mail: &dyn MailAdapter, test: &Test, ctx: &EvaluationContext<'_>) -> Result<bool> {
    let args = ComparatorArgs::parse(test, true)?;
    let matchers = key_matchers(&args, ctx)?;
    for name in &args.names {
        let addresses = mail.parse_addresses(name)?;
        if any_address_matches(&args, &matchers, &addresses)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(super) fn envelope(mail: &dyn MailAdapter, test: &Test, ctx: &EvaluationContext<'_>) -> Result<bool> {
    let args = ComparatorArgs::parse(test, true)?;
    let matchers = key_matchers(&args, ctx)?;
    for name in &args.names {
        let addresses: Vec<Address> = mail
            .matching_envelope(name)?
            .iter()
            .map(|value| parse_envelope_address(value))
            .collect();
        if any_address_matches(&args, &matchers, &addresses)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(super) fn header(mail: &dyn MailAdapter, test: &Test, ctx: &EvaluationContext<'_>) -> Result<bool> {
    let args = ComparatorArgs::parse(test, false)?;
    let matchers = key_matchers(&args, ctx)?;
    for name in &args.names {
        let mut values = mail.matching_header(name)?;
        if values.is_empty() && args.match_type == MatchType::Contains {
            values.push(String::new());
        }
        for value in &values {
            if any_key_matches(&matchers, value)? {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

pub(super) fn exists(mail: &dyn MailAdapter, test: &Test) -> Result<bool> {
    let names = single_string_list(&test.arguments, test.position)?;
    for name in &names {
        if mail.matching_header(name)?.is_empty() {
            return Ok(false);
        }
    }
    Ok(true)
}
