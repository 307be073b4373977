//! Append-only log of every call made against a substitute.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::matchers::{all_match, Matcher};

/// One intercepted call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Position in call order, starting at 1
    pub sequence: u64,
    pub operation: String,
    pub arguments: Vec<Value>,
}

impl InvocationRecord {
    pub fn matches(&self, operation: &str, matchers: &[Matcher]) -> bool {
        self.operation == operation && all_match(matchers, &self.arguments)
    }
}

impl fmt::Display for InvocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .arguments
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "#{} {}({})", self.sequence, self.operation, args)
    }
}

/// Records are appended in real-time call order and never removed
#[derive(Debug, Clone, Default)]
pub struct InvocationLedger {
    records: Vec<InvocationRecord>,
}

impl InvocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call and return its sequence number
    pub fn record(&mut self, operation: &str, arguments: Vec<Value>) -> u64 {
        let sequence = self.records.len() as u64 + 1;
        self.records.push(InvocationRecord {
            sequence,
            operation: operation.to_string(),
            arguments,
        });
        sequence
    }

    pub fn records(&self) -> &[InvocationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_operation<'a>(
        &'a self,
        operation: &'a str,
    ) -> impl Iterator<Item = &'a InvocationRecord> + 'a {
        self.records.iter().filter(move |r| r.operation == operation)
    }

    pub fn matching<'a>(
        &'a self,
        operation: &'a str,
        matchers: &'a [Matcher],
    ) -> impl Iterator<Item = &'a InvocationRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.matches(operation, matchers))
    }

    pub fn count_matching(&self, operation: &str, matchers: &[Matcher]) -> usize {
        self.matching(operation, matchers).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::{any, eq};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_records_are_sequenced_in_call_order() {
        let mut ledger = InvocationLedger::new();
        assert!(ledger.is_empty());

        assert_eq!(ledger.record("add", vec![json!("apple")]), 1);
        assert_eq!(ledger.record("size", vec![]), 2);
        assert_eq!(ledger.record("add", vec![json!("banana")]), 3);

        let ops: Vec<_> = ledger.records().iter().map(|r| r.operation.as_str()).collect();
        assert_eq!(ops, vec!["add", "size", "add"]);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_matching_filters_by_operation_and_arguments() {
        let mut ledger = InvocationLedger::new();
        ledger.record("add", vec![json!("apple")]);
        ledger.record("add", vec![json!("banana")]);
        ledger.record("contains", vec![json!("apple")]);

        assert_eq!(ledger.count_matching("add", &[any()]), 2);
        assert_eq!(ledger.count_matching("add", &[eq("apple")]), 1);
        assert_eq!(ledger.count_matching("add", &[eq("chocolate")]), 0);
        assert_eq!(ledger.count_matching("add", &[]), 0);
        assert_eq!(ledger.for_operation("contains").count(), 1);
    }

    #[test]
    fn test_display() {
        let record = InvocationRecord {
            sequence: 4,
            operation: "get".to_string(),
            arguments: vec![json!(1), json!("x")],
        };
        assert_eq!(record.to_string(), "#4 get(1, \"x\")");
    }
}
