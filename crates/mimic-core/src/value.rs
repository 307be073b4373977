//! Type-erased values crossing a substitute, and the zero-value defaults
//! returned for unprogrammed calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::error::{MockError, Result};

/// Shape of a concrete argument or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Sequence,
    Map,
}

impl ValueKind {
    /// Classify a value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Sequence,
            Value::Object(_) => ValueKind::Map,
        }
    }

    /// Whether `value` is of this kind. Floats also accept integers.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, ValueKind::of(value)) {
            (ValueKind::Float, ValueKind::Integer) => true,
            (expected, actual) => *expected == actual,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Null => write!(f, "null"),
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Integer => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::String => write!(f, "string"),
            ValueKind::Sequence => write!(f, "sequence"),
            ValueKind::Map => write!(f, "map"),
        }
    }
}

/// Declared return type of an operation, as far as defaults and stub
/// validation are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// `()`
    Unit,
    Bool,
    Integer,
    Float,
    Text,
    /// Nullable reference: `Option<T>` or a raw JSON value
    Optional,
    Sequence,
    Map,
    /// Any other user type; it has no usable zero value
    Opaque,
}

impl ReturnKind {
    /// Whether a stubbed value fits this return type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ReturnKind::Unit => value.is_null(),
            ReturnKind::Bool => value.is_boolean(),
            ReturnKind::Integer => value.is_i64() || value.is_u64(),
            ReturnKind::Float => value.is_number(),
            ReturnKind::Text => value.is_string(),
            ReturnKind::Sequence => value.is_array(),
            ReturnKind::Map => value.is_object(),
            ReturnKind::Optional | ReturnKind::Opaque => true,
        }
    }

    /// The zero value before any table overrides
    pub fn zero_value(&self) -> Value {
        match self {
            ReturnKind::Unit | ReturnKind::Optional | ReturnKind::Opaque => Value::Null,
            ReturnKind::Bool => Value::Bool(false),
            ReturnKind::Integer => Value::from(0),
            ReturnKind::Float => Value::from(0.0),
            ReturnKind::Text => Value::String(String::new()),
            ReturnKind::Sequence => Value::Array(Vec::new()),
            ReturnKind::Map => Value::Object(serde_json::Map::new()),
        }
    }
}

impl fmt::Display for ReturnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReturnKind::Unit => "unit",
            ReturnKind::Bool => "bool",
            ReturnKind::Integer => "integer",
            ReturnKind::Float => "float",
            ReturnKind::Text => "text",
            ReturnKind::Optional => "optional",
            ReturnKind::Sequence => "sequence",
            ReturnKind::Map => "map",
            ReturnKind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Maps a Rust return type onto its [`ReturnKind`].
///
/// Implement it for your own types to use them as return values of
/// substituted operations:
///
/// ```
/// use mimic_core::{ReturnKind, ReturnType};
///
/// #[derive(serde::Deserialize)]
/// struct Receipt { id: u64 }
///
/// impl ReturnType for Receipt {
///     fn return_kind() -> ReturnKind { ReturnKind::Opaque }
/// }
/// ```
pub trait ReturnType {
    fn return_kind() -> ReturnKind;
}

macro_rules! impl_return_type {
    ($kind:ident => $($ty:ty),+) => {
        $(
            impl ReturnType for $ty {
                fn return_kind() -> ReturnKind {
                    ReturnKind::$kind
                }
            }
        )+
    };
}

impl_return_type!(Unit => ());
impl_return_type!(Bool => bool);
impl_return_type!(Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_return_type!(Float => f32, f64);
impl_return_type!(Text => String);
impl_return_type!(Optional => Value);

impl<T> ReturnType for Option<T> {
    fn return_kind() -> ReturnKind {
        ReturnKind::Optional
    }
}

impl<T> ReturnType for Vec<T> {
    fn return_kind() -> ReturnKind {
        ReturnKind::Sequence
    }
}

impl<T, S> ReturnType for HashSet<T, S> {
    fn return_kind() -> ReturnKind {
        ReturnKind::Sequence
    }
}

impl<T> ReturnType for BTreeSet<T> {
    fn return_kind() -> ReturnKind {
        ReturnKind::Sequence
    }
}

impl<K, V, S> ReturnType for HashMap<K, V, S> {
    fn return_kind() -> ReturnKind {
        ReturnKind::Map
    }
}

impl<K, V> ReturnType for BTreeMap<K, V> {
    fn return_kind() -> ReturnKind {
        ReturnKind::Map
    }
}

/// Zero values handed out when no stub rule matches a call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<ReturnKind, Value>",
    into = "BTreeMap<ReturnKind, Value>"
)]
pub struct DefaultValueTable {
    overrides: BTreeMap<ReturnKind, Value>,
}

impl DefaultValueTable {
    /// Table with the built-in zero values only
    pub fn standard() -> Self {
        Self::default()
    }

    /// Replace the default for one return kind. The value must fit the kind.
    pub fn with_override(mut self, kind: ReturnKind, value: Value) -> Result<Self> {
        if !kind.accepts(&value) {
            return Err(MockError::DefaultTypeMismatch {
                kind,
                actual: ValueKind::of(&value),
            });
        }
        self.overrides.insert(kind, value);
        Ok(self)
    }

    /// Default for a return kind
    pub fn lookup(&self, kind: ReturnKind) -> Value {
        self.overrides
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.zero_value())
    }
}

impl TryFrom<BTreeMap<ReturnKind, Value>> for DefaultValueTable {
    type Error = MockError;

    fn try_from(overrides: BTreeMap<ReturnKind, Value>) -> Result<Self> {
        overrides
            .into_iter()
            .try_fold(Self::standard(), |table, (kind, value)| table.with_override(kind, value))
    }
}

impl From<DefaultValueTable> for BTreeMap<ReturnKind, Value> {
    fn from(table: DefaultValueTable) -> Self {
        table.overrides
    }
}
