//! Placeholder substitution for message templates.
//!
//! A placeholder is `{identifier}` where the identifier is one or more ASCII
//! letters, digits or underscores. `{name}` always resolves to the contact's
//! name; every other identifier is looked up in the contact's fields.
//! Anything that does not resolve is copied to the output untouched.

use crate::domain::contact::Contact;
use crate::domain::ids::TemplateId;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

const NAME_PLACEHOLDER: &str = "name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub content: String,
    pub placeholders: Vec<String>,
    pub created_at: i64,
}

impl Template {
    pub fn new(now_utc: i64, content: impl Into<String>) -> Result<Self, CoreError> {
        let content = content.into();
        validate_template(&content)?;
        Ok(Self {
            id: TemplateId::new(),
            placeholders: placeholders(&content),
            content,
            created_at: now_utc,
        })
    }

    pub fn render(&self, contact: &Contact) -> String {
        render(&self.content, contact)
    }
}

pub fn validate_template(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::EmptyTemplate);
    }
    Ok(())
}

pub fn render(template: &str, contact: &Contact) -> String {
    let mut out = String::with_capacity(template.len());
    for segment in Segments::new(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(ident) => match resolve(ident, contact) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(ident);
                    out.push('}');
                }
            },
        }
    }
    out
}

/// Distinct placeholder identifiers in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for segment in Segments::new(template) {
        if let Segment::Placeholder(ident) = segment {
            if !seen.iter().any(|existing| existing == ident) {
                seen.push(ident.to_string());
            }
        }
    }
    seen
}

/// Placeholders that `render` would leave as literal text for this contact.
pub fn unresolved_placeholders(template: &str, contact: &Contact) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|ident| resolve(ident, contact).is_none())
        .collect()
}

pub fn is_placeholder_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_identifier_char)
}

fn resolve<'c>(ident: &str, contact: &'c Contact) -> Option<&'c str> {
    if ident == NAME_PLACEHOLDER {
        return Some(contact.name.as_str());
    }
    contact.field(ident)
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Splits a template into literal runs and well-formed placeholders in one pass.
struct Segments<'a> {
    rest: &'a str,
}

impl<'a> Segments<'a> {
    fn new(template: &'a str) -> Self {
        Self { rest: template }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        if let Some(after) = self.rest.strip_prefix('{') {
            if let Some(ident) = scan_identifier(after) {
                self.rest = &after[ident.len() + 1..];
                return Some(Segment::Placeholder(ident));
            }
            // Not a placeholder: emit the brace and keep scanning after it.
            let literal = &self.rest[..1];
            self.rest = after;
            return Some(Segment::Literal(literal));
        }

        let end = self.rest.find('{').unwrap_or(self.rest.len());
        let literal = &self.rest[..end];
        self.rest = &self.rest[end..];
        Some(Segment::Literal(literal))
    }
}

fn scan_identifier(input: &str) -> Option<&str> {
    let end = input.find(|ch: char| !is_identifier_char(ch))?;
    if end == 0 || !input[end..].starts_with('}') {
        return None;
    }
    Some(&input[..end])
}
