//! Programming substitute behaviour.
//!
//! A test calls [`Substitute::when`](crate::Substitute::when) with an
//! argument list, then attaches one or more actions through the returned
//! [`Stubbing`]. The rule is registered on the first action and later
//! actions queue behind it.

mod builder;
mod registry;

pub use builder::{OngoingStub, Stubbing};
pub use registry::{first_accepting, Action, Answer, RuleId, StubRegistry, StubRule, Thrown};
