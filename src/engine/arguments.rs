//! Helpers for picking typed values out of parsed arguments.

use crate::comparator::DEFAULT_COMPARATOR;
use crate::error::{Position, Result, SieveError};
use crate::model::{AddressPart, MatchType};
use crate::sieve::ast::{Argument, Arguments, Test};

pub fn expect_no_tests(arguments: &Arguments, position: Position) -> Result<()> {
    match arguments.tests {
        Some(_) => Err(SieveError::syntax("unexpected test", position)),
        None => Ok(()),
    }
}

/// Exactly one string list and nothing else.
pub fn single_string_list(arguments: &Arguments, position: Position) -> Result<Vec<String>> {
    expect_no_tests(arguments, position)?;
    match arguments.args.as_slice() {
        [Argument::StringList(list)] => Ok(list.clone()),
        [] => Err(SieveError::syntax("expected a string list", position)),
        [other] => Err(SieveError::syntax(
            format!("expected a string list, found {}", other.describe()),
            position,
        )),
        _ => Err(SieveError::syntax("too many arguments", position)),
    }
}

/// A string list argument holding exactly one string.
pub fn as_single_string(arg: &Argument, position: Position) -> Result<String> {
    match arg {
        Argument::StringList(list) if list.len() == 1 => Ok(list[0].clone()),
        Argument::StringList(_) => Err(SieveError::syntax("expected a single string", position)),
        other => Err(SieveError::syntax(
            format!("expected a string, found {}", other.describe()),
            position,
        )),
    }
}

/// Exactly one string and nothing else.
pub fn single_string(arguments: &Arguments, position: Position) -> Result<String> {
    expect_no_tests(arguments, position)?;
    match arguments.args.as_slice() {
        [arg] => as_single_string(arg, position),
        [] => Err(SieveError::syntax("expected a string", position)),
        _ => Err(SieveError::syntax("too many arguments", position)),
    }
}

/// Arguments shared by `address`, `header` and `envelope`:
/// `[ADDRESS-PART] [COMPARATOR] [MATCH-TYPE] <names> <keys>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorArgs {
    pub address_part: AddressPart,
    pub comparator: String,
    pub match_type: MatchType,
    pub names: Vec<String>,
    pub keys: Vec<String>,
}

impl ComparatorArgs {
    pub fn parse(test: &Test, accepts_address_part: bool) -> Result<Self> {
        let position = test.position;
        expect_no_tests(&test.arguments, position)?;

        let mut address_part = None;
        let mut comparator = None;
        let mut match_type = None;
        let mut args = test.arguments.args.iter().peekable();

        while let Some(Argument::Tag(tag)) = args.peek().copied() {
            args.next();
            if tag == ":comparator" {
                if comparator.is_some() {
                    return Err(SieveError::syntax("duplicate :comparator", position));
                }
                let name = args
                    .next()
                    .ok_or_else(|| SieveError::syntax(":comparator needs a name", position))?;
                comparator = Some(as_single_string(name, position)?);
            } else if let Some(mt) = MatchType::from_sieve(tag) {
                if match_type.replace(mt).is_some() {
                    return Err(SieveError::syntax("duplicate match type", position));
                }
            } else if let Some(part) = AddressPart::from_sieve(tag) {
                if !accepts_address_part {
                    return Err(SieveError::syntax(
                        format!("unexpected tag '{tag}'"),
                        position,
                    ));
                }
                if address_part.replace(part).is_some() {
                    return Err(SieveError::syntax("duplicate address part", position));
                }
            } else {
                return Err(SieveError::syntax(format!("unexpected tag '{tag}'"), position));
            }
        }

        let names = next_string_list(&mut args, position, "header names")?;
        let keys = next_string_list(&mut args, position, "key list")?;
        if args.next().is_some() {
            return Err(SieveError::syntax("too many arguments", position));
        }

        Ok(Self {
            address_part: address_part.unwrap_or(AddressPart::All),
            comparator: comparator.unwrap_or_else(|| DEFAULT_COMPARATOR.to_string()),
            match_type: match_type.unwrap_or(MatchType::Is),
            names,
            keys,
        })
    }
}

fn next_string_list<'a>(
    args: &mut impl Iterator<Item = &'a Argument>,
    position: Position,
    what: &str,
) -> Result<Vec<String>> {
    match args.next() {
        Some(Argument::StringList(list)) => Ok(list.clone()),
        Some(other) => Err(SieveError::syntax(
            format!("expected {what}, found {}", other.describe()),
            position,
        )),
        None => Err(SieveError::syntax(format!("missing {what}"), position)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sieve::parse;

    fn first_test(script: &str) -> Test {
        let script = parse(script).unwrap();
        script.commands.commands[0]
            .arguments
            .tests
            .as_ref()
            .unwrap()
            .tests[0]
            .clone()
    }

    #[test]
    fn test_defaults() {
        let test = first_test("if header \"Subject\" \"hi\" {}");
        let args = ComparatorArgs::parse(&test, false).unwrap();
        assert_eq!(args.address_part, AddressPart::All);
        assert_eq!(args.comparator, "i;ascii-casemap");
        assert_eq!(args.match_type, MatchType::Is);
        assert_eq!(args.names, ["Subject"]);
        assert_eq!(args.keys, ["hi"]);
    }

    #[test]
    fn test_tags_in_any_order() {
        let test = first_test(
            "if address :comparator \"i;octet\" :domain :matches [\"to\", \"cc\"] \"*.org\" {}",
        );
        let args = ComparatorArgs::parse(&test, true).unwrap();
        assert_eq!(args.address_part, AddressPart::Domain);
        assert_eq!(args.comparator, "i;octet");
        assert_eq!(args.match_type, MatchType::Matches);
        assert_eq!(args.names, ["to", "cc"]);
    }

    #[test]
    fn test_repeated_category_is_rejected() {
        let test = first_test("if header :is :contains \"Subject\" \"hi\" {}");
        assert!(matches!(
            ComparatorArgs::parse(&test, false),
            Err(SieveError::Syntax { .. })
        ));
    }

    #[test]
    fn test_address_part_only_where_accepted() {
        let test = first_test("if header :localpart \"From\" \"x\" {}");
        assert!(ComparatorArgs::parse(&test, false).is_err());
        assert!(ComparatorArgs::parse(&test, true).is_ok());
    }

    #[test]
    fn test_missing_keys() {
        let test = first_test("if header :is \"Subject\" {}");
        assert!(matches!(
            ComparatorArgs::parse(&test, false),
            Err(SieveError::Syntax { .. })
        ));
    }
}
