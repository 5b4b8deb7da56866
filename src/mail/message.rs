//! RFC 822 message adapter backed by `mailparse`.

use std::collections::BTreeSet;

use mailparse::ParsedMail;

use crate::error::{Result, SieveError};
use crate::mail::{matching_fields, MailAdapter};
use crate::model::Action;

/// A raw message decoded once into owned headers and body text.
#[derive(Debug, Clone)]
pub struct ParsedMessage {
    headers: Vec<(String, String)>,
    envelope: Vec<(String, String)>,
    body_text: String,
    content_type: String,
    size: u64,
    actions: Vec<Action>,
}

impl ParsedMessage {
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let parsed = mailparse::parse_mail(raw)
            .map_err(|e| SieveError::MailAccess(format!("failed to parse message: {e}")))?;

        let headers = parsed
            .headers
            .iter()
            .map(|h| (h.get_key(), h.get_value()))
            .collect();

        let mut body_text = String::new();
        collect_text(&parsed, &mut body_text)?;

        Ok(Self {
            headers,
            envelope: Vec::new(),
            body_text,
            content_type: parsed.ctype.mimetype.clone(),
            size: raw.len() as u64,
            actions: Vec::new(),
        })
    }

    /// Records an SMTP envelope part (`from` or `to`).
    pub fn add_envelope(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.envelope.push((name.into(), value.into()));
    }
}

/// Concatenates every `text/*` leaf part.
fn collect_text(part: &ParsedMail<'_>, out: &mut String) -> Result<()> {
    if part.subparts.is_empty() {
        if part.ctype.mimetype.to_ascii_lowercase().starts_with("text/") {
            let body = part
                .get_body()
                .map_err(|e| SieveError::MailAccess(format!("unreadable body part: {e}")))?;
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&body);
        }
        return Ok(());
    }
    for sub in &part.subparts {
        collect_text(sub, out)?;
    }
    Ok(())
}

impl MailAdapter for ParsedMessage {
    fn header(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .headers
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn header_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.headers.iter().map(|(n, _)| n.clone()).collect())
    }

    fn matching_header(&self, name: &str) -> Result<Vec<String>> {
        Ok(matching_fields(&self.headers, name))
    }

    fn envelope(&self, name: &str) -> Result<Vec<String>> {
        Ok(self
            .envelope
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .collect())
    }

    fn envelope_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.envelope.iter().map(|(n, _)| n.clone()).collect())
    }

    fn matching_envelope(&self, name: &str) -> Result<Vec<String>> {
        Ok(matching_fields(&self.envelope, name))
    }

    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }

    fn content_type(&self) -> Result<String> {
        Ok(self.content_type.clone())
    }

    fn is_in_body_text(&self, phrase: &str) -> Result<bool> {
        Ok(self
            .body_text
            .to_lowercase()
            .contains(&phrase.to_lowercase()))
    }

    fn add_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn execute_actions(&mut self) -> Result<()> {
        for action in &self.actions {
            tracing::info!(%action, "action");
        }
        Ok(())
    }
}
