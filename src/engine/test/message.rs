//! Tests over the message as a whole: `size` and `body`.

use crate::engine::arguments::expect_no_tests;
use crate::error::{Result, SieveError};
use crate::mail::MailAdapter;
use crate::model::{MatchType, SizeComparator};
use crate::sieve::ast::{Argument, Test};

/// `size <":over" / ":under"> <limit: number>`
pub(super) fn size(mail: &dyn MailAdapter, test: &Test) -> Result<bool> {
    let position = test.position;
    expect_no_tests(&test.arguments, position)?;

    let (comparator, limit) = match test.arguments.args.as_slice() {
        [Argument::Tag(tag), Argument::Number(limit)] => {
            let comparator = SizeComparator::from_sieve(tag).ok_or_else(|| {
                SieveError::syntax(format!("size expects :over or :under, found '{tag}'"), position)
            })?;
            (comparator, *limit)
        }
        _ => {
            return Err(SieveError::syntax(
                "size expects :over or :under followed by a number",
                position,
            ))
        }
    };

    let size = mail.size()?;
    Ok(match comparator {
        SizeComparator::Over => size > limit,
        SizeComparator::Under => size < limit,
    })
}

/// `body [:contains] <key-list>`; substring search of the text body only.
pub(super) fn body(mail: &dyn MailAdapter, test: &Test) -> Result<bool> {
    let position = test.position;
    expect_no_tests(&test.arguments, position)?;

    let keys = match test.arguments.args.as_slice() {
        [Argument::StringList(keys)] => keys,
        [Argument::Tag(tag), Argument::StringList(keys)] => {
            match MatchType::from_sieve(tag) {
                Some(MatchType::Contains) => keys,
                _ => {
                    return Err(SieveError::syntax(
                        format!("body supports only :contains, found '{tag}'"),
                        position,
                    ))
                }
            }
        }
        _ => {
            return Err(SieveError::syntax(
                "body expects [:contains] followed by a key list",
                position,
            ))
        }
    };

    for key in keys {
        if mail.is_in_body_text(key)? {
            return Ok(true);
        }
    }
    Ok(false)
}
