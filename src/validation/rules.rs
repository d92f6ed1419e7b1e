//! Field rules and the checks behind them.

use serde_json::Value;

/// A constraint on one field's value.
#[derive(Clone, Copy, Debug)]
pub enum Rule {
    /// String with a character count in `min..=max`.
    Text { min: usize, max: Option<usize> },
    /// Integer with optional exclusive lower and inclusive upper bounds.
    Integer { gt: Option<i64>, le: Option<i64> },
    Boolean,
    Email,
    /// String drawn from a closed set.
    OneOf(&'static [&'static str]),
}

impl Rule {
    /// Any string at all.
    pub const TEXT: Self = Self::Text { min: 0, max: None };

    pub const fn text(min: usize, max: usize) -> Self {
        Self::Text { min, max: Some(max) }
    }

    pub const fn min_len(min: usize) -> Self {
        Self::Text { min, max: None }
    }

    pub const fn max_len(max: usize) -> Self {
        Self::Text { min: 0, max: Some(max) }
    }

    pub const fn int(gt: i64, le: i64) -> Self {
        Self::Integer { gt: Some(gt), le: Some(le) }
    }

    pub const fn positive() -> Self {
        Self::Integer { gt: Some(0), le: None }
    }

    /// Checks a decoded JSON value, which must already have the right type.
    pub fn check_json(&self, value: &Value) -> Result<(), String> {
        match self {
            Self::Integer { .. } => match value.as_i64() {
                Some(n) => self.check_int(n),
                None => Err("value is not a valid integer".to_owned()),
            },
            Self::Boolean => match value {
                Value::Bool(_) => Ok(()),
                _ => Err("value is not a valid boolean".to_owned()),
            },
            _ => match value.as_str() {
                Some(s) => self.check_str(s),
                None => Err("value is not a valid string".to_owned()),
            },
        }
    }

    /// Checks a raw string from a query string, form, path or header, parsing
    /// numbers and booleans first.
    pub fn check_text(&self, raw: &str) -> Result<(), String> {
        match self {
            Self::Integer { .. } => match raw.trim().parse::<i64>() {
                Ok(n) => self.check_int(n),
                Err(_) => Err("value is not a valid integer".to_owned()),
            },
            Self::Boolean => parse_bool(raw)
                .map(|_| ())
                .ok_or_else(|| "value is not a valid boolean".to_owned()),
            _ => self.check_str(raw),
        }
    }

    /// Converts a raw string to the JSON value this rule expects. Only called
    /// after [`check_text`](Self::check_text) succeeded.
    pub(crate) fn coerce(&self, raw: &str) -> Value {
        match self {
            Self::Integer { .. } => raw.trim().parse::<i64>().map_or(Value::Null, Value::from),
            Self::Boolean => parse_bool(raw).map_or(Value::Null, Value::Bool),
            _ => Value::String(raw.to_owned()),
        }
    }

    fn check_int(&self, n: i64) -> Result<(), String> {
        let Self::Integer { gt, le } = *self else { return Ok(()) };
        if let Some(gt) = gt.filter(|&gt| n <= gt) {
            return Err(format!("ensure this value is greater than {gt}"));
        }
        if let Some(le) = le.filter(|&le| n > le) {
            return Err(format!("ensure this value is less than or equal to {le}"));
        }
        Ok(())
    }

    fn check_str(&self, s: &str) -> Result<(), String> {
        match *self {
            Self::Text { min, max } => {
                let len = s.chars().count();
                if len < min {
                    return Err(format!("ensure this value has at least {min} characters"));
                }
                match max {
                    Some(max) if len > max => {
                        Err(format!("ensure this value has at most {max} characters"))
                    }
                    _ => Ok(()),
                }
            }
            Self::Email if is_valid_email(s) => Ok(()),
            Self::Email => Err("value is not a valid email address".to_owned()),
            Self::OneOf(allowed) if allowed.iter().any(|a| *a == s) => Ok(()),
            Self::OneOf(allowed) => {
                let permitted = allowed.iter().map(|a| format!("'{a}'")).collect::<Vec<_>>();
                Err(format!(
                    "value is not a valid enumeration member; permitted: {}",
                    permitted.join(", ")
                ))
            }
            Self::Integer { .. } | Self::Boolean => Ok(()),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Exactly one `@`, a non-empty local part, and a domain of at least two
/// non-empty dot-separated labels. No whitespace anywhere.
pub fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else { return false };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}
