//!
//! Mimic Core - test doubles for Rust unit tests
//!
//! A substitute stands in for a trait object. Tests program its behaviour
//! per operation and argument list, exercise the code under test, then
//! verify which calls were made, how often and in what order.
//!
//! ```
//! use mimic_core::{args, matchers::any_int, substitute};
//!
//! pub trait Inventory {
//!     fn stock(&self, sku: i64) -> u32;
//! }
//!
//! substitute! {
//!     pub MockInventory for Inventory {
//!         fn stock(&self, sku: i64) -> u32;
//!     }
//! }
//!
//! let inventory = MockInventory::new();
//! inventory.when("stock", args![any_int()]).unwrap().then_return(12).unwrap();
//!
//! assert_eq!(inventory.stock(7), 12);
//! inventory.verify().once().call("stock", args![7]).unwrap();
//! ```

#![forbid(unsafe_code)]

/// Operation signatures a substitute stands in for
pub mod capability;

/// Per-substitute configuration
pub mod config;

/// Error types
pub mod error;

/// Invocation recording
pub mod ledger;

pub mod logging;

/// Argument matchers
pub mod matchers;

/// Trait stand-ins generated by `substitute!`
pub mod proxy;

pub mod stubbing;

pub mod substitute;

/// Type-erased values and their defaults
pub mod value;

pub mod verification;

// Re-export key types
pub use capability::{Capability, CapabilityBuilder, OperationSignature};
pub use config::{DefaultAnswer, SubstituteConfig};
pub use error::{InconsistentStubbingError, MockError, Result, VerificationError};
pub use ledger::InvocationRecord;
pub use matchers::{ArgSpec, Matcher};
pub use stubbing::{OngoingStub, Stubbing};
pub use substitute::{Outcome, Substitute};
pub use value::{DefaultValueTable, ReturnKind, ReturnType, ValueKind};
pub use verification::{InOrder, Verification, VerificationMode};
