//! Typed access to attribute nodes.
//!
//! Missing-field policy, applied everywhere:
//! - text: empty string
//! - currency: [`DisplayAmount::Unavailable`] (rendered as `N/A`)
//! - integer: `None`

use crate::core::format::display_amount;
use crate::domain::model::{AttributeNode, DisplayAmount};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Currency,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Currency(DisplayAmount),
}

impl FieldValue {
    /// Display form; currency gets its dollar prefix.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Currency(amount) => amount.currency(),
        }
    }
}

pub fn get(node: &AttributeNode, field: &str, kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Text => FieldValue::Text(node.text(field).to_string()),
        FieldKind::Currency => FieldValue::Currency(node.currency(field)),
    }
}

impl AttributeNode {
    pub fn text(&self, field: &str) -> &str {
        self.raw(field).unwrap_or("")
    }

    pub fn currency(&self, field: &str) -> DisplayAmount {
        display_amount(self.raw(field))
    }

    /// Leading base-10 integer of the field, ignoring grouping commas.
    ///
    /// `"200000.75"` reads as `200000`; text with no leading digits is `None`.
    pub fn integer(&self, field: &str) -> Option<i64> {
        parse_leading_integer(self.raw(field)?)
    }
}

pub(crate) fn parse_leading_integer(text: &str) -> Option<i64> {
    let cleaned = text.trim().replace(',', "");
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
