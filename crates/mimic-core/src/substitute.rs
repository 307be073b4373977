//! The per-mock core behind every generated substitute.
//!
//! Each call routed through a [`Substitute`] is appended to its
//! [`InvocationLedger`] first, then resolved against its [`StubRegistry`],
//! falling back to the configured [`DefaultAnswer`] when no rule matches.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::capability::{Capability, OperationSignature};
use crate::config::{DefaultAnswer, SubstituteConfig};
use crate::error::{MockError, Result, VerificationError};
use crate::ledger::{InvocationLedger, InvocationRecord};
use crate::matchers::{all_match, normalize, ArgSpec, Matcher};
use crate::stubbing::{first_accepting, Action, RuleId, StubRegistry, Stubbing, Thrown};
use crate::value::ValueKind;
use crate::verification::{InOrder, Verification, VerificationMode};

/// What an intercepted call should do, as decided by the substitute
#[derive(Debug, Clone)]
pub enum Outcome {
    Return(Value),
    Throw(Thrown),
    /// Hand the call to the original implementation
    Delegate,
}

#[derive(Debug, Default)]
struct SubstituteState {
    stubs: StubRegistry,
    ledger: InvocationLedger,
    /// Sequence numbers matched by a successful verification
    verified: HashSet<u64>,
}

/// Matching records for one verification query
pub(crate) struct Tally {
    pub matched: Vec<u64>,
    pub recorded: Vec<InvocationRecord>,
}

/// Stub registry, invocation ledger and configuration of one mock
pub struct Substitute {
    capability: Arc<Capability>,
    config: SubstituteConfig,
    has_original: bool,
    state: Mutex<SubstituteState>,
}

impl Substitute {
    pub fn new(capability: Arc<Capability>) -> Self {
        Self::with_config(capability, SubstituteConfig::default())
    }

    pub fn with_config(capability: Arc<Capability>, config: SubstituteConfig) -> Self {
        Self {
            capability,
            config,
            has_original: false,
            state: Mutex::new(SubstituteState::default()),
        }
    }

    /// Mark an original implementation as available for delegation
    pub fn with_original(mut self) -> Self {
        self.has_original = true;
        self
    }

    /// Configured name, or the capability's name
    pub fn name(&self) -> &str {
        self.config
            .name
            .as_deref()
            .unwrap_or_else(|| self.capability.name())
    }

    pub fn capability(&self) -> &Arc<Capability> {
        &self.capability
    }

    pub fn config(&self) -> &SubstituteConfig {
        &self.config
    }

    pub fn has_original(&self) -> bool {
        self.has_original
    }

    /// Intercept one call: record it, then decide its outcome.
    ///
    /// Matchers and answers run while the internal lock is released, so
    /// they may call back into the same substitute.
    pub fn invoke(&self, operation: &str, arguments: Vec<Value>) -> Result<Outcome> {
        let signature = self.capability.require(operation)?;
        check_arity(signature, arguments.len())?;

        let (sequence, candidates) = {
            let mut state = self.state.lock();
            let sequence = state.ledger.record(operation, arguments.clone());
            (sequence, state.stubs.candidates(operation))
        };
        let action = first_accepting(&candidates, &arguments)
            .and_then(|rule| self.state.lock().stubs.advance(operation, rule));

        let outcome = match action {
            Some(Action::Return(value)) => Outcome::Return(value),
            Some(Action::Throw(thrown)) => Outcome::Throw(thrown),
            Some(Action::Delegate) => Outcome::Delegate,
            Some(Action::Answer(answer)) => Outcome::Return(answer(&arguments)),
            None => self.default_outcome(signature, &arguments)?,
        };

        debug!(
            substitute = self.name(),
            operation,
            sequence,
            outcome = ?outcome,
            "Intercepted call"
        );
        Ok(outcome)
    }

    fn default_outcome(&self, signature: &OperationSignature, arguments: &[Value]) -> Result<Outcome> {
        match self.config.default_answer {
            DefaultAnswer::CallOriginal if self.has_original => Ok(Outcome::Delegate),
            DefaultAnswer::ReturnDefaults | DefaultAnswer::CallOriginal => {
                Ok(Outcome::Return(self.config.defaults.lookup(signature.returns)))
            }
            DefaultAnswer::Fail => Err(MockError::UnstubbedCall {
                substitute: self.name().to_string(),
                operation: signature.name.clone(),
                arguments: arguments
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// Start programming a behaviour for `operation` called with `args`.
    ///
    /// Fails when the operation is unknown, the argument count is wrong, or
    /// literals and matchers are mixed.
    pub fn when(&self, operation: &str, args: Vec<ArgSpec>) -> Result<Stubbing<'_>> {
        let matchers = self.query_matchers(operation, args)?;
        Ok(Stubbing::new(self, operation, matchers))
    }

    /// Verify with the default mode (at least once)
    pub fn verify(&self) -> Verification<'_> {
        Verification::new(self, VerificationMode::default())
    }

    pub fn verify_with(&self, mode: VerificationMode) -> Verification<'_> {
        Verification::new(self, mode)
    }

    /// Verify calls in the order they happened
    pub fn in_order(&self) -> InOrder<'_> {
        InOrder::new(self)
    }

    /// Fails if any recorded call was not matched by a successful verification
    pub fn verify_no_more_interactions(&self) -> Result<()> {
        let state = self.state.lock();
        let unverified: Vec<_> = state
            .ledger
            .records()
            .iter()
            .filter(|r| !state.verified.contains(&r.sequence))
            .take(self.config.max_reported_invocations)
            .cloned()
            .collect();
        if unverified.is_empty() {
            return Ok(());
        }
        Err(VerificationError::NoMoreInteractions {
            substitute: self.name().to_string(),
            unverified,
        }
        .into())
    }

    /// Fails if the substitute was called at all
    pub fn verify_no_interactions(&self) -> Result<()> {
        let state = self.state.lock();
        if state.ledger.is_empty() {
            return Ok(());
        }
        Err(VerificationError::NoMoreInteractions {
            substitute: self.name().to_string(),
            unverified: state
                .ledger
                .records()
                .iter()
                .take(self.config.max_reported_invocations)
                .cloned()
                .collect(),
        }
        .into())
    }

    /// Snapshot of the ledger
    pub fn invocations(&self) -> Vec<InvocationRecord> {
        self.state.lock().ledger.records().to_vec()
    }

    /// Arguments passed at `position` to every call of `operation`, in call order
    pub fn captured(&self, operation: &str, position: usize) -> Vec<Value> {
        self.state
            .lock()
            .ledger
            .for_operation(operation)
            .filter_map(|r| r.arguments.get(position).cloned())
            .collect()
    }

    /// Like [`captured`](Self::captured), decoded into `T`
    pub fn captured_as<T: DeserializeOwned>(&self, operation: &str, position: usize) -> Result<Vec<T>> {
        self.captured(operation, position)
            .into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|e| MockError::ArgumentDecode {
                    operation: operation.to_string(),
                    type_name: std::any::type_name::<T>().to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    /// Resolve a written argument list against the operation's signature
    pub(crate) fn query_matchers(&self, operation: &str, args: Vec<ArgSpec>) -> Result<Vec<Matcher>> {
        let signature = self.capability.require(operation)?;
        check_arity(signature, args.len())?;
        normalize(signature, args)
    }

    pub(crate) fn check_action(&self, operation: &str, action: &Action) -> Result<()> {
        let signature = self.capability.require(operation)?;
        match action {
            Action::Return(value) if !signature.returns.accepts(value) => {
                Err(MockError::ReturnTypeMismatch {
                    operation: operation.to_string(),
                    expected: signature.returns,
                    actual: ValueKind::of(value),
                })
            }
            Action::Throw(thrown) => match &signature.error {
                Some(spec) if spec.type_id != thrown.type_id() => Err(MockError::ErrorTypeMismatch {
                    operation: operation.to_string(),
                    expected: spec.type_name.clone(),
                    actual: thrown.type_name().to_string(),
                }),
                _ => Ok(()),
            },
            Action::Delegate if !self.has_original => Err(MockError::NoOriginal {
                substitute: self.name().to_string(),
                operation: operation.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn program(&self, operation: &str, matchers: Vec<Matcher>, actions: Vec<Action>) -> RuleId {
        debug!(
            substitute = self.name(),
            operation,
            actions = actions.len(),
            "Programmed stub"
        );
        self.state.lock().stubs.program(operation, matchers, actions)
    }

    pub(crate) fn append_action(&self, operation: &str, rule: RuleId, action: Action) {
        let appended = self.state.lock().stubs.append_action(operation, rule, action);
        debug_assert!(appended, "stub rule {:?} vanished from {}", rule, operation);
    }

    pub(crate) fn tally(&self, operation: &str, matchers: &[Matcher]) -> Tally {
        let recorded = self.recorded(operation);
        Tally {
            matched: recorded
                .iter()
                .filter(|r| all_match(matchers, &r.arguments))
                .map(|r| r.sequence)
                .collect(),
            recorded: recorded
                .into_iter()
                .take(self.config.max_reported_invocations)
                .collect(),
        }
    }

    /// First call of `operation` matching `matchers` after sequence `after`
    pub(crate) fn first_match_after(
        &self,
        operation: &str,
        matchers: &[Matcher],
        after: Option<u64>,
    ) -> Option<u64> {
        let floor = after.unwrap_or(0);
        self.recorded(operation)
            .iter()
            .find(|r| r.sequence > floor && all_match(matchers, &r.arguments))
            .map(|r| r.sequence)
    }

    /// Records of one operation, copied out so matchers run unlocked
    fn recorded(&self, operation: &str) -> Vec<InvocationRecord> {
        self.state
            .lock()
            .ledger
            .for_operation(operation)
            .cloned()
            .collect()
    }

    pub(crate) fn mark_verified(&self, sequences: &[u64]) {
        self.state.lock().verified.extend(sequences.iter().copied());
    }
}

impl fmt::Debug for Substitute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Substitute")
            .field("name", &self.name())
            .field("operations", &self.capability.operations().len())
            .field("invocations", &state.ledger.len())
            .field("has_original", &self.has_original)
            .finish()
    }
}

fn check_arity(signature: &OperationSignature, actual: usize) -> Result<()> {
    if signature.arity() != actual {
        return Err(MockError::ArityMismatch {
            operation: signature.name.clone(),
            expected: signature.arity(),
            actual,
        });
    }
    Ok(())
}
