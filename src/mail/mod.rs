//! The capability interface the engine requires from the hosting mail
//! system, plus two implementations of it.

pub mod address;
pub mod memory;
pub mod message;

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::Action;

pub use address::Address;
pub use memory::MemoryMail;
pub use message::ParsedMessage;

/// Case- and surrounding-whitespace-insensitive header name comparison.
pub fn header_name_matches(candidate: &str, wanted: &str) -> bool {
    candidate.trim().eq_ignore_ascii_case(wanted.trim())
}

/// Values of `fields` whose name matches `wanted`, in field order.
pub(crate) fn matching_fields(fields: &[(String, String)], wanted: &str) -> Vec<String> {
    fields
        .iter()
        .filter(|(name, _)| header_name_matches(name, wanted))
        .map(|(_, value)| value.clone())
        .collect()
}

/// What a script may read from and queue on the mail being filtered.
///
/// The engine only queues actions; committing them is up to the host via
/// [`MailAdapter::execute_actions`].
pub trait MailAdapter {
    /// Values of headers named exactly `name`.
    fn header(&self, name: &str) -> Result<Vec<String>>;

    fn header_names(&self) -> Result<BTreeSet<String>>;

    /// Values of every header whose name equals `name` ignoring case and
    /// surrounding whitespace.
    ///
    /// The default groups values by name spelling in sorted order. Adapters
    /// that keep the message's field order override it to preserve that
    /// order.
    fn matching_header(&self, name: &str) -> Result<Vec<String>> {
        let mut values = Vec::new();
        for candidate in self.header_names()? {
            if header_name_matches(&candidate, name) {
                values.extend(self.header(&candidate)?);
            }
        }
        Ok(values)
    }

    /// Envelope parts (`from`, `to`) named exactly `name`.
    fn envelope(&self, name: &str) -> Result<Vec<String>>;

    fn envelope_names(&self) -> Result<BTreeSet<String>>;

    fn matching_envelope(&self, name: &str) -> Result<Vec<String>> {
        let mut values = Vec::new();
        for candidate in self.envelope_names()? {
            if header_name_matches(&candidate, name) {
                values.extend(self.envelope(&candidate)?);
            }
        }
        Ok(values)
    }

    /// Message size in octets.
    fn size(&self) -> Result<u64>;

    fn content_type(&self) -> Result<String>;

    /// Case-insensitive search of the text body.
    fn is_in_body_text(&self, phrase: &str) -> Result<bool>;

    /// Addresses held by all headers matching `header_name`.
    fn parse_addresses(&self, header_name: &str) -> Result<Vec<Address>> {
        let mut addresses = Vec::new();
        for value in self.matching_header(header_name)? {
            addresses.extend(address::parse_address_list(&value)?);
        }
        Ok(addresses)
    }

    fn add_action(&mut self, action: Action);

    /// Queued actions in insertion order.
    fn actions(&self) -> &[Action];

    fn execute_actions(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_name_matching_ignores_case_and_whitespace() {
        let mut mail = MemoryMail::new();
        mail.add_header("From", "a@example.com");
        mail.add_header("from ", "b@example.com");
        mail.add_header(" From", "c@example.com");
        mail.add_header(" from ", "d@example.com");
        mail.add_header("Fromage", "e@example.com");

        assert_eq!(
            mail.matching_header("from").unwrap(),
            ["a@example.com", "b@example.com", "c@example.com", "d@example.com"]
        );
        assert_eq!(mail.header("From").unwrap(), ["a@example.com"]);
    }

    #[test]
    fn test_matching_header_keeps_message_order() {
        let mut mail = MemoryMail::new();
        mail.add_header("received", "first");
        mail.add_header("Received", "second");
        mail.add_header("RECEIVED", "third");
        mail.add_header("received", "fourth");
        assert_eq!(
            mail.matching_header("Received").unwrap(),
            ["first", "second", "third", "fourth"]
        );

        let msg = ParsedMessage::parse(
            b"Received: first\r\nreceived: second\r\nRECEIVED: third\r\n\r\nbody",
        )
        .unwrap();
        assert_eq!(
            msg.matching_header("received").unwrap(),
            ["first", "second", "third"]
        );
    }

    #[test]
    fn test_parse_addresses_spans_matching_headers() {
        let mut mail = MemoryMail::new();
        mail.add_header("To", "x@y.com");
        mail.add_header("to", "Someone <s@z.org>, t@z.org");
        let addrs = mail.parse_addresses("TO").unwrap();
        assert_eq!(addrs.len(), 3);
    }
}
