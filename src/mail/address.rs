//! RFC 822 address-list parsing into local-part/domain pairs.

use mailparse::MailAddr;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SieveError};
use crate::model::AddressPart;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub local_part: String,
    pub domain: String,
}

impl Address {
    /// Splits an addr-spec at its last `@`. A missing `@` leaves the domain
    /// empty.
    pub fn from_addr_spec(spec: &str) -> Self {
        let spec = spec.trim();
        match spec.rsplit_once('@') {
            Some((local, domain)) => Self {
                local_part: local.to_string(),
                domain: domain.to_string(),
            },
            None => Self {
                local_part: spec.to_string(),
                domain: String::new(),
            },
        }
    }

    /// Text compared for the given address part. Domains are lower-cased.
    pub fn part(&self, part: AddressPart) -> String {
        match part {
            AddressPart::Localpart => self.local_part.clone(),
            AddressPart::Domain => self.domain.to_ascii_lowercase(),
            AddressPart::All if self.domain.is_empty() => self.local_part.clone(),
            AddressPart::All => format!("{}@{}", self.local_part, self.domain),
        }
    }
}

/// A header mailbox must have both a local part and a domain.
fn mailbox(addr: &str, value: &str) -> Result<Address> {
    let address = Address::from_addr_spec(addr);
    if address.local_part.is_empty() || address.domain.is_empty() {
        return Err(SieveError::AddressParse(format!(
            "'{value}': malformed address '{addr}'"
        )));
    }
    Ok(address)
}

/// Parses a header value holding a mailbox list (groups are flattened).
pub fn parse_address_list(value: &str) -> Result<Vec<Address>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    let list = mailparse::addrparse(value)
        .map_err(|e| SieveError::AddressParse(format!("'{value}': {e}")))?;

    let mut addresses = Vec::new();
    for addr in list.iter() {
        match addr {
            MailAddr::Single(info) => addresses.push(mailbox(&info.addr, value)?),
            MailAddr::Group(group) => {
                for info in &group.addrs {
                    addresses.push(mailbox(&info.addr, value)?);
                }
            }
        }
    }
    Ok(addresses)
}

/// Parses an envelope value. `<>` (the null sender) yields an empty address.
pub fn parse_envelope_address(value: &str) -> Address {
    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(trimmed);
    Address::from_addr_spec(inner)
}
