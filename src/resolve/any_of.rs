//! serde glue: untagged union types backed by the structural resolver.

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolve::resolver::Resolver;
use crate::resolve::shape::Resolvable;

macro_rules! any_of {
    ($(#[$meta:meta])* $name:ident { $($index:literal => $variant:ident($param:ident)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name<$($param),+> {
            $($variant($param)),+
        }

        impl<$($param),+> $name<$($param),+> {
            /// position of the held variant in declaration order
            pub fn index(&self) -> usize {
                match self {
                    $($name::$variant(_) => $index),+
                }
            }
        }

        impl<$($param: Serialize),+> Serialize for $name<$($param),+> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    $($name::$variant(inner) => inner.serialize(serializer)),+
                }
            }
        }

        impl<'de, $($param: Resolvable + DeserializeOwned),+> Deserialize<'de> for $name<$($param),+> {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = Value::deserialize(deserializer)?;
                let candidates = [$($param::candidate()),+];
                let (chosen, value) = Resolver::default()
                    .choose_aligned(value, &candidates)
                    .map_err(D::Error::custom)?;

                match chosen {
                    $($index => serde_json::from_value(value).map($name::$variant).map_err(D::Error::custom),)+
                    _ => Err(D::Error::custom("resolver chose an unknown candidate")),
                }
            }
        }
    };
}

any_of!(
    /// A value that is structurally one of two shapes, with no tag in the data.
    AnyOf2 {
        0 => First(A),
        1 => Second(B),
    }
);

any_of!(
    /// A value that is structurally one of three shapes, with no tag in the data.
    AnyOf3 {
        0 => First(A),
        1 => Second(B),
        2 => Third(C),
    }
);

/// `deserialize_with` helper for optional unions: absent, `null` and
/// unmatched values all become `None`.
///
/// ```ignore
/// #[serde(default, deserialize_with = "optional::deserialize")]
/// filter: Option<AnyOf2<Basic, Advanced>>,
/// ```
pub mod optional {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(serde_json::from_value(value).ok())
    }
}

/// populate a typed value, degrading `null` to `T::default()`.
pub fn populate<T>(value: Value) -> Result<T, serde_json::Error>
where
    T: Default + DeserializeOwned,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value)
}
