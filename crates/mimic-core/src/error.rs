use thiserror::Error;

use crate::ledger::InvocationRecord;
use crate::value::{ReturnKind, ValueKind};
use crate::verification::VerificationMode;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, MockError>;

/// Error type for everything a test can get wrong while programming or
/// interrogating a substitute
#[derive(Debug, Clone, Error)]
pub enum MockError {
    /// The operation is not part of the substitute's capability
    #[error("Unknown operation '{operation}' on {capability}")]
    UnknownOperation {
        capability: String,
        operation: String,
    },

    /// Argument count differs from the operation's declared parameters
    #[error("Operation '{operation}' takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        operation: String,
        expected: usize,
        actual: usize,
    },

    /// Two operations with the same name in one capability
    #[error("Duplicate operation '{operation}' in capability {capability}")]
    DuplicateOperation {
        capability: String,
        operation: String,
    },

    /// Literals and matchers mixed in one argument list
    #[error(transparent)]
    InconsistentStubbing(#[from] InconsistentStubbingError),

    /// A stubbed return value does not fit the declared return type
    #[error("Operation '{operation}' returns {expected}, cannot stub it with a {actual} value")]
    ReturnTypeMismatch {
        operation: String,
        expected: ReturnKind,
        actual: ValueKind,
    },

    /// A default-table override does not fit the return kind it replaces
    #[error("Default for {kind} return values cannot be a {actual} value")]
    DefaultTypeMismatch { kind: ReturnKind, actual: ValueKind },

    /// A thrown error does not match the operation's declared error type
    #[error("Operation '{operation}' fails with {expected}, cannot throw {actual}")]
    ErrorTypeMismatch {
        operation: String,
        expected: String,
        actual: String,
    },

    /// Delegation requested on a substitute created without an original
    #[error("Operation '{operation}' cannot delegate: {substitute} has no original implementation")]
    NoOriginal {
        substitute: String,
        operation: String,
    },

    /// A stub was programmed with an empty action list
    #[error("Stub for '{operation}' needs at least one action")]
    EmptyActions { operation: String },

    /// No rule matched and the substitute refuses to fall back to defaults
    #[error("Unstubbed call {substitute}.{operation}({arguments})")]
    UnstubbedCall {
        substitute: String,
        operation: String,
        arguments: String,
    },

    /// A recorded or stubbed value could not be decoded into the requested type
    #[error("Cannot decode value for '{operation}' as {type_name}: {message}")]
    ArgumentDecode {
        operation: String,
        type_name: String,
        message: String,
    },

    /// An expectation on the invocation ledger does not hold
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

/// Raised when one call mixes raw literals with matcher objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Inconsistent arguments for '{operation}': {literals} literal(s) mixed with {matchers} matcher(s); \
     wrap literals with eq() when any position uses a matcher"
)]
pub struct InconsistentStubbingError {
    pub operation: String,
    pub literals: usize,
    pub matchers: usize,
}

/// A broken expectation on a substitute's invocation ledger
#[derive(Debug, Clone, Error)]
pub enum VerificationError {
    #[error(
        "Wanted {substitute}.{operation}({arguments}) {expected}, but it was invoked {actual} time(s).{}",
        render_invocations(.invocations)
    )]
    CountMismatch {
        substitute: String,
        operation: String,
        arguments: String,
        expected: VerificationMode,
        actual: usize,
        invocations: Vec<InvocationRecord>,
    },

    #[error(
        "No more interactions wanted on {substitute}, found unverified:{}",
        render_invocations(.unverified)
    )]
    NoMoreInteractions {
        substitute: String,
        unverified: Vec<InvocationRecord>,
    },

    #[error("Wanted {substitute}.{operation}({arguments}) after {}, but no such call was found in order", render_cursor(.after))]
    OutOfOrder {
        substitute: String,
        operation: String,
        arguments: String,
        after: Option<u64>,
    },
}

impl VerificationError {
    /// Number of matching invocations found, where the failure kind carries one
    pub fn actual_count(&self) -> Option<usize> {
        match self {
            VerificationError::CountMismatch { actual, .. } => Some(*actual),
            _ => None,
        }
    }
}

fn render_invocations(records: &[InvocationRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nRecorded:");
    for record in records {
        out.push_str("\n  ");
        out.push_str(&record.to_string());
    }
    out
}

fn render_cursor(after: &Option<u64>) -> String {
    match after {
        Some(sequence) => format!("call #{}", sequence),
        None => "the start".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_mismatch_lists_recorded_calls() {
        let err = VerificationError::CountMismatch {
            substitute: "list".to_string(),
            operation: "add".to_string(),
            arguments: "\"chocolate\"".to_string(),
            expected: VerificationMode::default(),
            actual: 0,
            invocations: vec![InvocationRecord {
                sequence: 1,
                operation: "add".to_string(),
                arguments: vec![json!("apple")],
            }],
        };

        let message = err.to_string();
        assert!(message.contains("Wanted list.add(\"chocolate\") at least once"));
        assert!(message.contains("invoked 0 time(s)"));
        assert!(message.contains("#1 add(\"apple\")"));
        assert_eq!(err.actual_count(), Some(0));
    }

    #[test]
    fn test_inconsistent_stubbing_converts_into_mock_error() {
        let err: MockError = InconsistentStubbingError {
            operation: "put".to_string(),
            literals: 1,
            matchers: 1,
        }
        .into();

        assert!(matches!(err, MockError::InconsistentStubbing(_)));
        assert!(err.to_string().contains("wrap literals with eq()"));
    }

    #[test]
    fn test_out_of_order_renders_cursor() {
        let err = VerificationError::OutOfOrder {
            substitute: "list".to_string(),
            operation: "clear".to_string(),
            arguments: String::new(),
            after: Some(3),
        };
        assert!(err.to_string().contains("after call #3"));
        assert_eq!(err.actual_count(), None);
    }
}
