use crate::error::{Result, VerificationError};
use crate::matchers::{describe_specs, ArgSpec};
use crate::substitute::Substitute;

/// Verifies calls against the ledger in sequence order.
///
/// Each successful [`call`](InOrder::call) moves a cursor to the matched
/// record; the next expectation must match a later record.
#[derive(Debug)]
pub struct InOrder<'a> {
    substitute: &'a Substitute,
    cursor: Option<u64>,
}

impl<'a> InOrder<'a> {
    pub(crate) fn new(substitute: &'a Substitute) -> Self {
        Self {
            substitute,
            cursor: None,
        }
    }

    /// Sequence number of the last matched record
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    pub fn call(&mut self, operation: &str, args: Vec<ArgSpec>) -> Result<&mut Self> {
        let arguments = describe_specs(&args);
        let matchers = self.substitute.query_matchers(operation, args)?;

        match self
            .substitute
            .first_match_after(operation, &matchers, self.cursor)
        {
            Some(sequence) => {
                self.substitute.mark_verified(&[sequence]);
                self.cursor = Some(sequence);
                Ok(self)
            }
            None => Err(VerificationError::OutOfOrder {
                substitute: self.substitute.name().to_string(),
                operation: operation.to_string(),
                arguments,
                after: self.cursor,
            }
            .into()),
        }
    }
}
