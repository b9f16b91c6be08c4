use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::formatter::RenderType;

/// Placeholder rendered for absent fields.
pub const MISSING: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(String),
    List(Vec<String>),
}

impl Value {
    /// String view used by search. Only textual values are searchable.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Date(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Date(s) => f.write_str(s),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

/// A loosely shaped row. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Display form of a field, `N/A` when absent.
    pub fn display(&self, key: &str) -> String {
        self.get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| MISSING.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub key: String,
    pub title: String,
    pub render: Option<RenderType>,
}

impl ColumnSpec {
    pub fn new(key: &str, title: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            render: None,
        }
    }

    /// Attach a formatter by tag. Unknown tags leave the column unformatted.
    pub fn render(mut self, tag: &str) -> Self {
        self.render = tag.parse().ok();
        if self.render.is_none() {
            debug!("Column \"{}\": unknown render tag \"{tag}\"", self.key);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_like_integers_when_whole() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn lists_join_with_commas() {
        let v = Value::from(vec!["Web".to_string(), "Mobile".to_string()]);
        assert_eq!(v.to_string(), "Web,Mobile");
        assert_eq!(v.as_str(), None);
    }

    #[test]
    fn missing_fields_show_placeholder() {
        let r = Record::new().with("name", "Contact 1");
        assert_eq!(r.display("name"), "Contact 1");
        assert_eq!(r.display("email"), MISSING);
        assert_eq!(r.text("name"), Some("Contact 1"));
    }

    #[test]
    fn dates_are_searchable_text() {
        let r = Record::new().with("when", Value::Date("3/4/2026".into()));
        assert_eq!(r.text("when"), Some("3/4/2026"));
    }

    #[test]
    fn unknown_render_tags_are_dropped() {
        assert_eq!(ColumnSpec::new("status", "Status").render("sparkles").render, None);
        assert_eq!(
            ColumnSpec::new("status", "Status").render("crmStatus").render,
            Some(RenderType::CrmStatus)
        );
    }
}
