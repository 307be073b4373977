//! Fluent builders returned by `when`: each `then_*` call validates one
//! action against the operation signature before it is queued.

use serde_json::Value;
use std::fmt;

use crate::error::{MockError, Result};
use crate::matchers::Matcher;
use crate::substitute::Substitute;

use super::registry::{Action, RuleId, Thrown};

/// Shared `then_*` surface of [`Stubbing`] and [`OngoingStub`]. Each
/// method funnels into the type's own `push`.
macro_rules! stub_actions {
    ($lt:lifetime) => {
        /// Return `value` from matching calls
        pub fn then_return(self, value: impl Into<Value>) -> Result<OngoingStub<$lt>> {
            self.push(vec![Action::Return(value.into())])
        }

        /// Return each value in turn, repeating the last one
        pub fn then_return_all<I, V>(self, values: I) -> Result<OngoingStub<$lt>>
        where
            I: IntoIterator<Item = V>,
            V: Into<Value>,
        {
            self.push(values.into_iter().map(|v| Action::Return(v.into())).collect())
        }

        /// Fail matching calls with a clone of `error`
        pub fn then_throw<E>(self, error: E) -> Result<OngoingStub<$lt>>
        where
            E: Clone + fmt::Debug + Send + Sync + 'static,
        {
            self.push(vec![Action::Throw(Thrown::new(error))])
        }

        /// Fail matching calls with a freshly built error
        pub fn then_throw_with<E, F>(self, factory: F) -> Result<OngoingStub<$lt>>
        where
            E: fmt::Debug + Send + 'static,
            F: Fn() -> E + Send + Sync + 'static,
        {
            self.push(vec![Action::Throw(Thrown::with(factory))])
        }

        /// Run the original implementation for matching calls
        pub fn then_delegate(self) -> Result<OngoingStub<$lt>> {
            self.push(vec![Action::Delegate])
        }

        /// Compute the return value from the actual arguments
        pub fn then_answer<F>(self, answer: F) -> Result<OngoingStub<$lt>>
        where
            F: Fn(&[Value]) -> Value + Send + Sync + 'static,
        {
            self.push(vec![Action::Answer(std::sync::Arc::new(answer))])
        }
    };
}

/// A matched call awaiting its first action
#[must_use = "a stub is only registered once an action is attached"]
pub struct Stubbing<'a> {
    substitute: &'a Substitute,
    operation: String,
    matchers: Vec<Matcher>,
}

impl<'a> Stubbing<'a> {
    pub(crate) fn new(substitute: &'a Substitute, operation: &str, matchers: Vec<Matcher>) -> Self {
        Self {
            substitute,
            operation: operation.to_string(),
            matchers,
        }
    }

    stub_actions!('a);

    fn push(self, actions: Vec<Action>) -> Result<OngoingStub<'a>> {
        if actions.is_empty() {
            return Err(MockError::EmptyActions {
                operation: self.operation,
            });
        }
        for action in &actions {
            self.substitute.check_action(&self.operation, action)?;
        }

        let rule = self
            .substitute
            .program(&self.operation, self.matchers, actions);
        Ok(OngoingStub {
            substitute: self.substitute,
            operation: self.operation,
            rule,
        })
    }
}

impl fmt::Debug for Stubbing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stubbing")
            .field("operation", &self.operation)
            .field("matchers", &self.matchers)
            .finish()
    }
}

/// A registered rule that further actions can be queued on
pub struct OngoingStub<'a> {
    substitute: &'a Substitute,
    operation: String,
    rule: RuleId,
}

impl<'a> OngoingStub<'a> {
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    stub_actions!('a);

    fn push(self, actions: Vec<Action>) -> Result<OngoingStub<'a>> {
        if actions.is_empty() {
            return Err(MockError::EmptyActions {
                operation: self.operation,
            });
        }
        for action in &actions {
            self.substitute.check_action(&self.operation, action)?;
        }
        for action in actions {
            self.substitute.append_action(&self.operation, self.rule, action);
        }
        Ok(self)
    }
}

impl fmt::Debug for OngoingStub<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OngoingStub")
            .field("operation", &self.operation)
            .field("rule", &self.rule)
            .finish()
    }
}
