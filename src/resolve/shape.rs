//! candidate descriptions the resolver scores values against

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;

use crate::resolve::scalar::ScalarKind;

/// What a field's value is expected to look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// string, number, boolean
    Value,
    Object,
    Array,
    Any,
}

impl FieldKind {
    /// whether an observed value fits this kind; `null` fits everything
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::Any, _) | (_, Value::Null) => true,
            (FieldKind::Object, Value::Object(_)) => true,
            (FieldKind::Array, Value::Array(_)) => true,
            (FieldKind::Value, Value::String(_) | Value::Number(_) | Value::Bool(_)) => true,
            _ => false,
        }
    }
}

/// A declared field of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    pub const fn value(name: &'static str) -> Self {
        Self::new(name, FieldKind::Value)
    }

    pub const fn object(name: &'static str) -> Self {
        Self::new(name, FieldKind::Object)
    }

    pub const fn array(name: &'static str) -> Self {
        Self::new(name, FieldKind::Array)
    }

    pub const fn any(name: &'static str) -> Self {
        Self::new(name, FieldKind::Any)
    }
}

/// A named set of JSON properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl ShapeDef {
    pub const fn new(name: &'static str, fields: &'static [FieldDef]) -> Self {
        Self { name, fields }
    }
}

/// One member of an untagged union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Scalar(ScalarKind),
    Object(ShapeDef),
    /// a homogeneous list of the inner candidate
    List(Box<Candidate>),
}

impl Candidate {
    pub fn list_of(element: Candidate) -> Self {
        Candidate::List(Box::new(element))
    }

    pub fn name(&self) -> String {
        match self {
            Candidate::Scalar(kind) => kind.name().to_string(),
            Candidate::Object(shape) => shape.name.to_string(),
            Candidate::List(element) => format!("[{}]", element.name()),
        }
    }
}

/// Types that can take part in structural resolution.
pub trait Resolvable {
    fn candidate() -> Candidate;
}

macro_rules! scalar_resolvable {
    ($($ty:ty => $kind:ident),+ $(,)?) => {
        $(
            impl Resolvable for $ty {
                fn candidate() -> Candidate {
                    Candidate::Scalar(ScalarKind::$kind)
                }
            }
        )+
    };
}

scalar_resolvable!(
    String => String,
    i64 => Integer,
    i32 => Integer,
    u32 => Integer,
    f64 => Float,
    bool => Bool,
    NaiveDate => Date,
    DateTime<FixedOffset> => DateTime,
);

impl<T: Resolvable> Resolvable for Vec<T> {
    fn candidate() -> Candidate {
        Candidate::list_of(T::candidate())
    }
}
