//! Programmed behaviours, matched most-recent-first.

use parking_lot::Mutex;
use serde_json::Value;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::matchers::{all_match, describe_matchers, Matcher};

/// Handle to a registered stub rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(u64);

/// Computes a return value from the actual arguments
pub type Answer = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

type ErrorFactory = Arc<dyn Fn() -> (Box<dyn Any + Send>, String) + Send + Sync>;

/// An error a stub raises instead of returning
#[derive(Clone)]
pub struct Thrown {
    type_id: TypeId,
    type_name: &'static str,
    /// Debug text of the last error produced
    rendered: Arc<Mutex<Option<String>>>,
    factory: ErrorFactory,
}

impl Thrown {
    /// Throw a clone of `error` on every matching call
    pub fn new<E>(error: E) -> Self
    where
        E: Clone + fmt::Debug + Send + Sync + 'static,
    {
        let rendered = format!("{:?}", error);
        Self::from_factory(Some(rendered), move || error.clone())
    }

    /// Build a fresh error on every matching call. `factory` only runs when
    /// a call actually throws.
    pub fn with<E, F>(factory: F) -> Self
    where
        E: fmt::Debug + Send + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self::from_factory(None, factory)
    }

    fn from_factory<E, F>(rendered: Option<String>, factory: F) -> Self
    where
        E: fmt::Debug + Send + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: type_name::<E>(),
            rendered: Arc::new(Mutex::new(rendered)),
            factory: Arc::new(move || {
                let error = factory();
                let rendered = format!("{:?}", error);
                (Box::new(error) as Box<dyn Any + Send>, rendered)
            }),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn produce(&self) -> Box<dyn Any + Send> {
        let (error, rendered) = (self.factory)();
        *self.rendered.lock() = Some(rendered);
        error
    }

    /// Produce the error as `E`, or `None` when the stub threw another type
    pub fn take<E: 'static>(&self) -> Option<E> {
        self.produce().downcast::<E>().ok().map(|boxed| *boxed)
    }

    /// Produce the error and return its debug text
    pub fn render(&self) -> String {
        self.produce();
        self.to_string()
    }
}

impl fmt::Debug for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thrown")
            .field("type", &self.type_name)
            .field("error", &*self.rendered.lock())
            .finish()
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.rendered.lock() {
            Some(rendered) => f.write_str(rendered),
            None => write!(f, "<{}>", self.type_name),
        }
    }
}

/// What a matching call does
#[derive(Clone)]
pub enum Action {
    Return(Value),
    Throw(Thrown),
    /// Run the original implementation
    Delegate,
    Answer(Answer),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Return(value) => f.debug_tuple("Return").field(value).finish(),
            Action::Throw(thrown) => f.debug_tuple("Throw").field(thrown).finish(),
            Action::Delegate => f.write_str("Delegate"),
            Action::Answer(_) => f.write_str("Answer(..)"),
        }
    }
}

/// Operation, positional matchers and a queue of actions
#[derive(Debug, Clone)]
pub struct StubRule {
    id: RuleId,
    matchers: Vec<Matcher>,
    actions: Vec<Action>,
    cursor: usize,
}

impl StubRule {
    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn accepts(&self, arguments: &[Value]) -> bool {
        all_match(&self.matchers, arguments)
    }

    /// Next queued action; the last one repeats once the queue is exhausted
    fn next_action(&mut self) -> Option<Action> {
        let last = self.actions.len().checked_sub(1)?;
        let action = self.actions[self.cursor.min(last)].clone();
        if self.cursor < last {
            self.cursor += 1;
        }
        Some(action)
    }
}

impl fmt::Display for StubRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -> {:?}", describe_matchers(&self.matchers), self.actions)
    }
}

/// Stub rules per operation, most recently registered first
#[derive(Debug, Default)]
pub struct StubRegistry {
    rules: HashMap<String, Vec<StubRule>>,
    next_id: u64,
}

impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule ahead of every earlier rule for `operation`
    pub fn program(&mut self, operation: &str, matchers: Vec<Matcher>, actions: Vec<Action>) -> RuleId {
        self.next_id += 1;
        let id = RuleId(self.next_id);
        self.rules.entry(operation.to_string()).or_default().insert(
            0,
            StubRule {
                id,
                matchers,
                actions,
                cursor: 0,
            },
        );
        id
    }

    /// Queue another action on an existing rule. Returns false for an
    /// unknown rule.
    pub fn append_action(&mut self, operation: &str, rule: RuleId, action: Action) -> bool {
        match self
            .rules
            .get_mut(operation)
            .and_then(|rules| rules.iter_mut().find(|r| r.id == rule))
        {
            Some(rule) => {
                rule.actions.push(action);
                true
            }
            None => false,
        }
    }

    /// Action of the first rule accepting `arguments`, advancing its queue
    pub fn resolve(&mut self, operation: &str, arguments: &[Value]) -> Option<Action> {
        let rule = first_accepting(&self.candidates(operation), arguments)?;
        self.advance(operation, rule)
    }

    /// Rule ids and matchers for `operation`, most recent first, so callers
    /// can match arguments without holding the registry
    pub fn candidates(&self, operation: &str) -> Vec<(RuleId, Vec<Matcher>)> {
        self.rules_for(operation)
            .iter()
            .map(|rule| (rule.id, rule.matchers.clone()))
            .collect()
    }

    /// Next action of one rule, advancing its queue
    pub fn advance(&mut self, operation: &str, rule: RuleId) -> Option<Action> {
        self.rules
            .get_mut(operation)?
            .iter_mut()
            .find(|r| r.id == rule)
            .and_then(StubRule::next_action)
    }

    pub fn rules_for(&self, operation: &str) -> &[StubRule] {
        self.rules.get(operation).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// First candidate whose matchers accept `arguments`
pub fn first_accepting(candidates: &[(RuleId, Vec<Matcher>)], arguments: &[Value]) -> Option<RuleId> {
    candidates
        .iter()
        .find(|(_, matchers)| all_match(matchers, arguments))
        .map(|(id, _)| *id)
}
