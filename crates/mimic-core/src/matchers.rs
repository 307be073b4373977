//! Argument matchers and the literal/matcher argument lists used when
//! stubbing and verifying.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use crate::capability::OperationSignature;
use crate::error::{InconsistentStubbingError, Result};
use crate::value::ValueKind;

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A stateless predicate over one argument position
#[derive(Clone)]
pub struct Matcher {
    description: String,
    predicate: Predicate,
}

impl Matcher {
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        (self.predicate)(value)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matcher").field(&self.description).finish()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Accepts every value
pub fn any() -> Matcher {
    Matcher::new("any()", |_| true)
}

/// Accepts values of one kind
pub fn any_of(kind: ValueKind) -> Matcher {
    Matcher::new(format!("any({})", kind), move |value| kind.accepts(value))
}

pub fn any_int() -> Matcher {
    any_of(ValueKind::Integer)
}

pub fn any_float() -> Matcher {
    any_of(ValueKind::Float)
}

pub fn any_string() -> Matcher {
    any_of(ValueKind::String)
}

pub fn any_bool() -> Matcher {
    any_of(ValueKind::Bool)
}

/// Accepts values equal to `expected`. Numbers compare by value, so `1`
/// equals `1.0`.
///
/// An explicit `eq(0.1)` is compared at `f64` precision; write the literal
/// itself for an `f32` parameter so it is narrowed to the parameter type.
pub fn eq(expected: impl Into<Value>) -> Matcher {
    let expected = expected.into();
    Matcher::new(expected.to_string(), move |value| same_value(&expected, value))
}

fn same_value(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(e), Value::Number(a)) if e.is_f64() || a.is_f64() => {
            e.as_f64() == a.as_f64()
        }
        _ => expected == actual,
    }
}

/// `eq` for a literal written against a parameter of `type_name`. `f32`
/// parameters serialize at `f32` precision, so the literal is narrowed the
/// same way before comparing.
fn literal(value: Value, type_name: Option<&str>) -> Matcher {
    let description = value.to_string();
    let expected = match (type_name, value.as_f64()) {
        (Some("f32"), Some(n)) => Value::from(n as f32),
        _ => value,
    };
    Matcher::new(description, move |actual| same_value(&expected, actual))
}

pub fn not(inner: Matcher) -> Matcher {
    Matcher::new(format!("not({})", inner.description), move |value| {
        !inner.matches(value)
    })
}

pub fn is_null() -> Matcher {
    Matcher::new("is_null()", Value::is_null)
}

pub fn not_null() -> Matcher {
    Matcher::new("not_null()", |value| !value.is_null())
}

pub fn starts_with(prefix: impl Into<String>) -> Matcher {
    let prefix = prefix.into();
    Matcher::new(format!("starts_with({:?})", prefix), move |value| {
        value.as_str().is_some_and(|s| s.starts_with(&prefix))
    })
}

pub fn contains_str(needle: impl Into<String>) -> Matcher {
    let needle = needle.into();
    Matcher::new(format!("contains_str({:?})", needle), move |value| {
        value.as_str().is_some_and(|s| s.contains(&needle))
    })
}

/// Decodes the argument into `T` and applies `predicate`. Values that do not
/// decode into `T` never match.
///
/// ```
/// use mimic_core::matchers::arg_that;
/// use serde_json::json;
///
/// let negative = arg_that(|index: &i64| *index < 0);
/// assert!(negative.matches(&json!(-1)));
/// assert!(!negative.matches(&json!(3)));
/// assert!(!negative.matches(&json!("minus one")));
/// ```
pub fn arg_that<T, F>(predicate: F) -> Matcher
where
    T: DeserializeOwned,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    Matcher::new(format!("arg_that(<{}>)", type_name::<T>()), move |value| {
        serde_json::from_value::<T>(value.clone())
            .map(|decoded| predicate(&decoded))
            .unwrap_or(false)
    })
}

/// One argument position as written by the test: a raw literal or a matcher
#[derive(Debug, Clone)]
pub enum ArgSpec {
    Literal(Value),
    Matcher(Matcher),
}

impl ArgSpec {
    fn describe(&self) -> String {
        match self {
            ArgSpec::Literal(value) => value.to_string(),
            ArgSpec::Matcher(matcher) => matcher.description.clone(),
        }
    }
}

/// Conversion used by [`args!`](crate::args)
pub trait IntoArgSpec {
    fn into_arg_spec(self) -> ArgSpec;
}

impl IntoArgSpec for ArgSpec {
    fn into_arg_spec(self) -> ArgSpec {
        self
    }
}

impl IntoArgSpec for Matcher {
    fn into_arg_spec(self) -> ArgSpec {
        ArgSpec::Matcher(self)
    }
}

impl IntoArgSpec for Value {
    fn into_arg_spec(self) -> ArgSpec {
        ArgSpec::Literal(self)
    }
}

macro_rules! impl_literal_arg {
    ($($ty:ty),+) => {
        $(
            impl IntoArgSpec for $ty {
                fn into_arg_spec(self) -> ArgSpec {
                    ArgSpec::Literal(Value::from(self))
                }
            }
        )+
    };
}

impl_literal_arg!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, String, &str);

/// Wrap any serializable value as a literal argument. Values that cannot be
/// represented fall back to `null`.
pub fn lit<T: Serialize>(value: T) -> ArgSpec {
    ArgSpec::Literal(serde_json::to_value(value).unwrap_or(Value::Null))
}

/// Build an argument list for `when`/`verify`
///
/// ```
/// use mimic_core::{args, matchers::any_int};
///
/// let specs = args![any_int(), "banana"];
/// assert_eq!(specs.len(), 2);
/// assert!(args![].is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::matchers::ArgSpec>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::matchers::IntoArgSpec::into_arg_spec($arg)),+]
    };
}

/// Turn a written argument list into positional matchers.
///
/// All literals become [`eq`] matchers against the declared parameter type
/// and all matchers are kept; a list mixing both fails with
/// [`InconsistentStubbingError`].
pub fn normalize(signature: &OperationSignature, specs: Vec<ArgSpec>) -> Result<Vec<Matcher>> {
    let matchers = specs
        .iter()
        .filter(|spec| matches!(spec, ArgSpec::Matcher(_)))
        .count();
    let literals = specs.len() - matchers;
    if matchers > 0 && literals > 0 {
        return Err(InconsistentStubbingError {
            operation: signature.name.clone(),
            literals,
            matchers,
        }
        .into());
    }

    Ok(specs
        .into_iter()
        .enumerate()
        .map(|(position, spec)| match spec {
            ArgSpec::Literal(value) => {
                let param = signature.params.get(position);
                literal(value, param.map(|p| p.type_name.as_str()))
            }
            ArgSpec::Matcher(matcher) => matcher,
        })
        .collect())
}

/// Render an argument list the way the test wrote it
pub fn describe_specs(specs: &[ArgSpec]) -> String {
    specs
        .iter()
        .map(ArgSpec::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render normalised matchers
pub fn describe_matchers(matchers: &[Matcher]) -> String {
    matchers
        .iter()
        .map(Matcher::description)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Positional match: same length and every matcher accepts its argument
pub fn all_match(matchers: &[Matcher], arguments: &[Value]) -> bool {
    matchers.len() == arguments.len()
        && matchers
            .iter()
            .zip(arguments)
            .all(|(matcher, argument)| matcher.matches(argument))
}
