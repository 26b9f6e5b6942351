//! scalar coercion for JSON strings, numbers and booleans

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Bool,
    Date,
    DateTime,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Bool => "bool",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
        }
    }

    /// whether a value whose natural kind is `natural` can be held by this kind without loss
    pub fn widens(self, natural: ScalarKind) -> bool {
        matches!(
            (self, natural),
            (ScalarKind::Float, ScalarKind::Integer)
                | (ScalarKind::String, ScalarKind::Date)
                | (ScalarKind::String, ScalarKind::DateTime)
        )
    }
}

/// A JSON scalar coerced to its nearest native type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
}

impl Scalar {
    /// the nearest native type for a JSON scalar, `None` for null, arrays and objects.
    ///
    /// Strings that parse as RFC 3339 timestamps or `YYYY-MM-DD` dates become
    /// temporal values; integers that fit `i64` stay integral.
    pub fn coerce(value: &Value) -> Option<Scalar> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Scalar::Integer(i)),
                None => n.as_f64().map(Scalar::Float),
            },
            Value::String(s) => Some(Self::from_text(s)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn from_text(text: &str) -> Scalar {
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
            return Scalar::DateTime(timestamp);
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
            return Scalar::Date(date);
        }
        Scalar::String(text.to_string())
    }

    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::String(_) => ScalarKind::String,
            Scalar::Integer(_) => ScalarKind::Integer,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Date(_) => ScalarKind::Date,
            Scalar::DateTime(_) => ScalarKind::DateTime,
        }
    }

    /// convert to `kind`, if it holds this value without loss
    pub fn convert(self, kind: ScalarKind) -> Option<Scalar> {
        if self.kind() == kind {
            return Some(self);
        }
        match (self, kind) {
            (Scalar::Integer(i), ScalarKind::Float) => Some(Scalar::Float(i as f64)),
            (Scalar::Date(d), ScalarKind::String) => Some(Scalar::String(d.format(DATE_FORMAT).to_string())),
            (Scalar::DateTime(t), ScalarKind::String) => Some(Scalar::String(t.to_rfc3339())),
            _ => None,
        }
    }
}
