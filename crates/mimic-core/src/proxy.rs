//! Generated stand-ins for traits.
//!
//! [`substitute!`](crate::substitute!) declares a struct implementing a trait
//! whose every method forwards to a [`Substitute`]. The helpers here are what
//! those generated methods call.
//!
//! Generated methods cannot return a [`MockError`](crate::MockError), so a
//! misused substitute panics at the call site: a stub value that does not
//! decode into the declared return type, an error thrown from an operation
//! that cannot fail, or an unstubbed call under
//! [`DefaultAnswer::Fail`](crate::DefaultAnswer::Fail).

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::substitute::{Outcome, Substitute};

/// Serialize one call argument for the ledger. Arguments that cannot be
/// represented are recorded as `null`.
pub fn to_argument<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!(
            "Cannot record argument of type {}: {}",
            std::any::type_name::<T>(),
            e
        );
        Value::Null
    })
}

/// Route a call to an infallible operation through `substitute`.
///
/// `original` runs the call on the wrapped implementation and yields `None`
/// when there is none.
pub fn forward<T, D>(substitute: &Substitute, operation: &str, arguments: Vec<Value>, original: D) -> T
where
    T: DeserializeOwned,
    D: FnOnce() -> Option<T>,
{
    match substitute.invoke(operation, arguments) {
        Ok(Outcome::Return(value)) => decode(substitute, operation, value),
        Ok(Outcome::Throw(thrown)) => {
            panic!("{}.{} threw {}", substitute.name(), operation, thrown.render())
        }
        Ok(Outcome::Delegate) => match original() {
            Some(value) => value,
            None => no_original(substitute, operation),
        },
        Err(err) => panic!("{}", err),
    }
}

/// Route a call to an operation returning `Result<T, E>` through
/// `substitute`. Thrown errors of type `E` come back as `Err`.
pub fn forward_fallible<T, E, D>(
    substitute: &Substitute,
    operation: &str,
    arguments: Vec<Value>,
    original: D,
) -> Result<T, E>
where
    T: DeserializeOwned,
    E: 'static,
    D: FnOnce() -> Option<Result<T, E>>,
{
    match substitute.invoke(operation, arguments) {
        Ok(Outcome::Return(value)) => Ok(decode(substitute, operation, value)),
        Ok(Outcome::Throw(thrown)) => match thrown.take::<E>() {
            Some(err) => Err(err),
            None => panic!(
                "{}.{} threw {} ({}), expected {}",
                substitute.name(),
                operation,
                thrown,
                thrown.type_name(),
                std::any::type_name::<E>()
            ),
        },
        Ok(Outcome::Delegate) => match original() {
            Some(result) => result,
            None => no_original(substitute, operation),
        },
        Err(err) => panic!("{}", err),
    }
}

fn decode<T: DeserializeOwned>(substitute: &Substitute, operation: &str, value: Value) -> T {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => decoded,
        Err(e) => panic!(
            "{}.{} returned {} which is not a {} ({}); stub it with a value of that type first",
            substitute.name(),
            operation,
            value,
            std::any::type_name::<T>(),
            e
        ),
    }
}

fn no_original(substitute: &Substitute, operation: &str) -> ! {
    panic!(
        "{}.{} delegated, but {} wraps no original implementation",
        substitute.name(),
        operation,
        substitute.name()
    )
}

/// Declare a substitute for a trait.
///
/// Each method is listed with its signature. Methods take `&self`; a method
/// returning `Result<T, E>` is fallible and can be stubbed to throw `E`.
/// Argument types must be `Serialize`, return types `DeserializeOwned` and
/// [`ReturnType`](crate::ReturnType).
///
/// ```
/// use mimic_core::{args, substitute};
///
/// pub trait Counter {
///     fn get(&self, key: String) -> i64;
///     fn reset(&self);
/// }
///
/// substitute! {
///     pub MockCounter for Counter {
///         fn get(&self, key: String) -> i64;
///         fn reset(&self);
///     }
/// }
///
/// let counter = MockCounter::new();
/// counter.when("get", args!["hits"]).unwrap().then_return(3).unwrap();
///
/// assert_eq!(counter.get("hits".to_string()), 3);
/// assert_eq!(counter.get("misses".to_string()), 0);
/// counter.reset();
/// counter.verify().once().call("reset", args![]).unwrap();
/// ```
#[macro_export]
macro_rules! substitute {
    // fallible method
    (@munch ($vis:vis $mock:ident $tr:path) [$($methods:tt)*] [$($ops:tt)*]
        fn $name:ident(&self $(, $arg:ident : $argty:ty)*) -> Result<$ok:ty, $err:ty>;
        $($rest:tt)*
    ) => {
        $crate::substitute! { @munch ($vis $mock $tr)
            [
                $($methods)*
                fn $name(&self $(, $arg: $argty)*) -> ::std::result::Result<$ok, $err> {
                    let arguments = ::std::vec![$($crate::proxy::to_argument(&$arg)),*];
                    $crate::proxy::forward_fallible(
                        &self.substitute,
                        stringify!($name),
                        arguments,
                        || self.original.as_ref().map(|original| original.$name($($arg),*)),
                    )
                }
            ]
            [
                $($ops)*
                .operation(
                    $crate::OperationSignature::new(stringify!($name))
                        $(.param(stringify!($arg), ::std::any::type_name::<$argty>()))*
                        .returns(<$ok as $crate::ReturnType>::return_kind())
                        .fails_with::<$err>()
                )
            ]
            $($rest)*
        }
    };

    // method with a return value
    (@munch ($vis:vis $mock:ident $tr:path) [$($methods:tt)*] [$($ops:tt)*]
        fn $name:ident(&self $(, $arg:ident : $argty:ty)*) -> $ret:ty;
        $($rest:tt)*
    ) => {
        $crate::substitute! { @munch ($vis $mock $tr)
            [
                $($methods)*
                fn $name(&self $(, $arg: $argty)*) -> $ret {
                    let arguments = ::std::vec![$($crate::proxy::to_argument(&$arg)),*];
                    $crate::proxy::forward(
                        &self.substitute,
                        stringify!($name),
                        arguments,
                        || self.original.as_ref().map(|original| original.$name($($arg),*)),
                    )
                }
            ]
            [
                $($ops)*
                .operation(
                    $crate::OperationSignature::new(stringify!($name))
                        $(.param(stringify!($arg), ::std::any::type_name::<$argty>()))*
                        .returns(<$ret as $crate::ReturnType>::return_kind())
                )
            ]
            $($rest)*
        }
    };

    // unit method
    (@munch ($vis:vis $mock:ident $tr:path) [$($methods:tt)*] [$($ops:tt)*]
        fn $name:ident(&self $(, $arg:ident : $argty:ty)*);
        $($rest:tt)*
    ) => {
        $crate::substitute! { @munch ($vis $mock $tr)
            [
                $($methods)*
                fn $name(&self $(, $arg: $argty)*) {
                    let arguments = ::std::vec![$($crate::proxy::to_argument(&$arg)),*];
                    $crate::proxy::forward::<(), _>(
                        &self.substitute,
                        stringify!($name),
                        arguments,
                        || self.original.as_ref().map(|original| original.$name($($arg),*)),
                    )
                }
            ]
            [
                $($ops)*
                .operation(
                    $crate::OperationSignature::new(stringify!($name))
                        $(.param(stringify!($arg), ::std::any::type_name::<$argty>()))*
                )
            ]
            $($rest)*
        }
    };

    (@munch ($vis:vis $mock:ident $tr:path) [$($methods:tt)*] [$($ops:tt)*]) => {
        $vis struct $mock {
            substitute: $crate::Substitute,
            original: ::std::option::Option<::std::sync::Arc<dyn $tr + Send + Sync>>,
        }

        impl $mock {
            /// Operations this substitute stands in for
            $vis fn capability() -> ::std::sync::Arc<$crate::Capability> {
                match $crate::Capability::builder(stringify!($tr)) $($ops)* .build() {
                    ::std::result::Result::Ok(capability) => capability,
                    ::std::result::Result::Err(err) => {
                        panic!("invalid substitute {}: {}", stringify!($mock), err)
                    }
                }
            }

            $vis fn new() -> Self {
                Self::with_config($crate::SubstituteConfig::default())
            }

            $vis fn with_config(config: $crate::SubstituteConfig) -> Self {
                Self {
                    substitute: $crate::Substitute::with_config(Self::capability(), config),
                    original: ::std::option::Option::None,
                }
            }

            /// Wrap a real implementation. Only `then_delegate` stubs reach it
            /// unless the default answer is `CallOriginal`.
            $vis fn spy<O>(original: O) -> Self
            where
                O: $tr + Send + Sync + 'static,
            {
                Self::spy_with_config(original, $crate::SubstituteConfig::default())
            }

            $vis fn spy_with_config<O>(original: O, config: $crate::SubstituteConfig) -> Self
            where
                O: $tr + Send + Sync + 'static,
            {
                let original: ::std::sync::Arc<dyn $tr + Send + Sync> = ::std::sync::Arc::new(original);
                Self {
                    substitute: $crate::Substitute::with_config(Self::capability(), config).with_original(),
                    original: ::std::option::Option::Some(original),
                }
            }

            $vis fn substitute(&self) -> &$crate::Substitute {
                &self.substitute
            }
        }

        impl ::std::ops::Deref for $mock {
            type Target = $crate::Substitute;

            fn deref(&self) -> &Self::Target {
                &self.substitute
            }
        }

        impl ::std::default::Default for $mock {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::fmt::Debug for $mock {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($mock))
                    .field("substitute", &self.substitute)
                    .field("spy", &self.original.is_some())
                    .finish()
            }
        }

        impl $tr for $mock {
            $($methods)*
        }
    };

    ($vis:vis $mock:ident for $tr:path { $($body:tt)* }) => {
        $crate::substitute! { @munch ($vis $mock $tr) [] [] $($body)* }
    };
}
