//! Per-field rules
//!
//! Rules look at the field's JSON value. Every rule except `Required` skips
//! empty values (`null` or blank strings), so optional fields stay optional.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Predicate over a field value; `true` means valid
pub type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A single field constraint and its message
#[derive(Clone)]
pub enum Rule {
    /// Non-null, non-blank; checkboxes must be ticked
    Required(String),
    MinLength(usize, String),
    MaxLength(usize, String),
    Email(String),
    Phone(String),
    Pattern(Regex, String),
    /// Strictly greater than zero
    Positive(String),
    NonNegative(String),
    Min(f64, String),
    Max(f64, String),
    Integer(String),
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[:SS]`
    Date(String),
    OneOf(Vec<String>, String),
    Custom(ValuePredicate, String),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required(_) => write!(f, "Required"),
            Self::MinLength(n, _) => write!(f, "MinLength({})", n),
            Self::MaxLength(n, _) => write!(f, "MaxLength({})", n),
            Self::Email(_) => write!(f, "Email"),
            Self::Phone(_) => write!(f, "Phone"),
            Self::Pattern(re, _) => write!(f, "Pattern({})", re.as_str()),
            Self::Positive(_) => write!(f, "Positive"),
            Self::NonNegative(_) => write!(f, "NonNegative"),
            Self::Min(n, _) => write!(f, "Min({})", n),
            Self::Max(n, _) => write!(f, "Max({})", n),
            Self::Integer(_) => write!(f, "Integer"),
            Self::Date(_) => write!(f, "Date"),
            Self::OneOf(values, _) => write!(f, "OneOf({:?})", values),
            Self::Custom(_, _) => write!(f, "Custom"),
        }
    }
}

impl Rule {
    /// Error message if `value` violates the rule
    pub fn check(&self, value: &Value) -> Option<&str> {
        let ok = match self {
            Self::Required(_) => !is_blank(value) && value != &Value::Bool(false),
            _ if is_blank(value) => true,
            Self::MinLength(n, _) => text_len(value) >= *n,
            Self::MaxLength(n, _) => text_len(value) <= *n,
            Self::Email(_) => value.as_str().is_some_and(is_email),
            Self::Phone(_) => value.as_str().is_some_and(is_phone),
            Self::Pattern(re, _) => value.as_str().is_some_and(|s| re.is_match(s)),
            Self::Positive(_) => as_number(value).is_some_and(|n| n > 0.0),
            Self::NonNegative(_) => as_number(value).is_some_and(|n| n >= 0.0),
            Self::Min(min, _) => as_number(value).is_some_and(|n| n >= *min),
            Self::Max(max, _) => as_number(value).is_some_and(|n| n <= *max),
            Self::Integer(_) => as_number(value).is_some_and(|n| n.fract() == 0.0),
            Self::Date(_) => value.as_str().and_then(parse_date).is_some(),
            Self::OneOf(values, _) => {
                let text = value_text(value);
                values.iter().any(|v| *v == text)
            }
            Self::Custom(predicate, _) => predicate(value),
        };
        if ok {
            None
        } else {
            Some(self.message())
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Required(m)
            | Self::MinLength(_, m)
            | Self::MaxLength(_, m)
            | Self::Email(m)
            | Self::Phone(m)
            | Self::Pattern(_, m)
            | Self::Positive(m)
            | Self::NonNegative(m)
            | Self::Min(_, m)
            | Self::Max(_, m)
            | Self::Integer(m)
            | Self::Date(m)
            | Self::OneOf(_, m)
            | Self::Custom(_, m) => m,
        }
    }
}

/// Ordered rules for one field; the first failure wins
#[derive(Clone, Debug, Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Required(message.into()))
    }

    pub fn min_len(self, n: usize, message: impl Into<String>) -> Self {
        self.rule(Rule::MinLength(n, message.into()))
    }

    pub fn max_len(self, n: usize, message: impl Into<String>) -> Self {
        self.rule(Rule::MaxLength(n, message.into()))
    }

    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Email(message.into()))
    }

    pub fn phone(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Phone(message.into()))
    }

    /// Regex must match; an invalid pattern is a programming error in the
    /// form definition and is reported on the field itself.
    pub fn pattern(self, pattern: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match Regex::new(pattern) {
            Ok(re) => self.rule(Rule::Pattern(re, message)),
            Err(e) => {
                tracing::warn!("invalid validation pattern {:?}: {}", pattern, e);
                self.rule(Rule::Custom(Arc::new(|_| false), message))
            }
        }
    }

    pub fn positive(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Positive(message.into()))
    }

    pub fn non_negative(self, message: impl Into<String>) -> Self {
        self.rule(Rule::NonNegative(message.into()))
    }

    pub fn min(self, min: f64, message: impl Into<String>) -> Self {
        self.rule(Rule::Min(min, message.into()))
    }

    pub fn max(self, max: f64, message: impl Into<String>) -> Self {
        self.rule(Rule::Max(max, message.into()))
    }

    pub fn integer(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Integer(message.into()))
    }

    pub fn date(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Date(message.into()))
    }

    pub fn one_of<I, S>(self, values: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rule(Rule::OneOf(
            values.into_iter().map(Into::into).collect(),
            message.into(),
        ))
    }

    pub fn custom<F>(self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.rule(Rule::Custom(Arc::new(predicate), message.into()))
    }

    /// First failing rule's message
    pub fn check(&self, value: &Value) -> Option<String> {
        self.rules
            .iter()
            .find_map(|r| r.check(value))
            .map(str::to_owned)
    }
}

/// Parse a date or local date-time string
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn text_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.trim().chars().count(),
        Value::Array(items) => items.len(),
        other => other.to_string().chars().count(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn is_email(s: &str) -> bool {
    let s = s.trim();
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.contains(char::is_whitespace)
}

fn is_phone(s: &str) -> bool {
    let s = s.trim();
    let body = s.strip_prefix('+').unwrap_or(s);
    let valid_chars = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '.'));
    let digits = body.chars().filter(char::is_ascii_digit).count();
    valid_chars && (7..=15).contains(&digits)
}
