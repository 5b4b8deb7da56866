use std::collections::BTreeSet;

use crate::error::Result;
use crate::mail::{matching_fields, MailAdapter};
use crate::model::Action;

/// An in-memory mail assembled field by field.
#[derive(Debug, Clone, Default)]
pub struct MemoryMail {
    headers: Vec<(String, String)>,
    envelope: Vec<(String, String)>,
    body: String,
    content_type: Option<String>,
    size: Option<u64>,
    actions: Vec<Action>,
    executed: Vec<Action>,
}

impl MemoryMail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_header(name, value);
        self
    }

    pub fn add_envelope(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.envelope.push((name.into(), value.into()));
    }

    pub fn with_envelope(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_envelope(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Overrides the size otherwise computed from headers and body.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Actions committed by [`MailAdapter::execute_actions`].
    pub fn executed(&self) -> &[Action] {
        &self.executed
    }

    fn computed_size(&self) -> u64 {
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.len() + value.len() + 4)
            .sum();
        (headers + 2 + self.body.len()) as u64
    }
}

impl MailAdapter for MemoryMail {
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
        Ok(self.size.unwrap_or_else(|| self.computed_size()))
    }

    fn content_type(&self) -> Result<String> {
        Ok(self
            .content_type
            .clone()
            .unwrap_or_else(|| "text/plain".to_string()))
    }

    fn is_in_body_text(&self, phrase: &str) -> Result<bool> {
        Ok(self
            .body
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
        for action in self.actions.drain(..) {
            tracing::info!(%action, "executing action");
            self.executed.push(action);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_defaults_to_rendered_length() {
        let mail = MemoryMail::new().with_header("Subject", "hi").with_body("body");
        // "Subject: hi\r\n" + "\r\n" + "body"
        assert_eq!(mail.size().unwrap(), 13 + 2 + 4);
        assert_eq!(mail.with_size(10).size().unwrap(), 10);
    }

    #[test]
    fn test_body_search_is_case_insensitive() {
        let mail = MemoryMail::new().with_body("Win a FREE cruise");
        assert!(mail.is_in_body_text("free cruise").unwrap());
        assert!(!mail.is_in_body_text("yacht").unwrap());
    }

    #[test]
    fn test_execute_actions_commits_queue() {
        let mut mail = MemoryMail::new();
        mail.add_action(Action::Keep);
        mail.execute_actions().unwrap();
        assert!(mail.actions().is_empty());
        assert_eq!(mail.executed(), [Action::Keep]);
    }
}
