//! Checking a substitute's invocation ledger after the fact.

mod in_order;
mod mode;
mod verifier;

pub use in_order::InOrder;
pub use mode::*;
pub use verifier::Verification;
