use tracing::debug;

use crate::error::{Result, VerificationError};
use crate::matchers::{describe_specs, ArgSpec};
use crate::substitute::Substitute;

use super::mode::VerificationMode;

/// A pending count check against one substitute.
///
/// Nothing is checked until [`call`](Verification::call) names the
/// operation and arguments.
#[must_use = "a verification only runs once `call` is invoked"]
#[derive(Debug)]
pub struct Verification<'a> {
    substitute: &'a Substitute,
    mode: VerificationMode,
}

impl<'a> Verification<'a> {
    pub(crate) fn new(substitute: &'a Substitute, mode: VerificationMode) -> Self {
        Self { substitute, mode }
    }

    pub fn mode(mut self, mode: VerificationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn times(self, n: usize) -> Self {
        self.mode(VerificationMode::Exactly(n))
    }

    pub fn once(self) -> Self {
        self.times(1)
    }

    pub fn at_least(self, n: usize) -> Self {
        self.mode(VerificationMode::AtLeast(n))
    }

    pub fn at_most(self, n: usize) -> Self {
        self.mode(VerificationMode::AtMost(n))
    }

    pub fn never(self) -> Self {
        self.mode(VerificationMode::Never)
    }

    /// Count the recorded calls of `operation` matching `args` and check the
    /// count against the mode. Matched calls count as verified on success.
    pub fn call(self, operation: &str, args: Vec<ArgSpec>) -> Result<()> {
        let arguments = describe_specs(&args);
        let matchers = self.substitute.query_matchers(operation, args)?;
        let tally = self.substitute.tally(operation, &matchers);
        let actual = tally.matched.len();

        if self.mode.check(actual) {
            self.substitute.mark_verified(&tally.matched);
            return Ok(());
        }

        debug!(
            substitute = self.substitute.name(),
            operation,
            expected = %self.mode,
            actual,
            "Verification failed"
        );
        Err(VerificationError::CountMismatch {
            substitute: self.substitute.name().to_string(),
            operation: operation.to_string(),
            arguments,
            expected: self.mode,
            actual,
            invocations: tally.recorded,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use crate::args;
    use crate::capability::{Capability, OperationSignature};
    use crate::config::SubstituteConfig;
    use crate::error::{MockError, VerificationError};
    use crate::matchers::{any, any_int, any_string, eq};
    use crate::substitute::Substitute;
    use crate::value::ReturnKind;
    use crate::verification::{at_least, never, times};
    use assert_matches::assert_matches;
    use serde_json::json;

    fn list(config: SubstituteConfig) -> Substitute {
        let capability = Capability::builder("StringList")
            .operation(
                OperationSignature::new("add")
                    .param("item", "String")
                    .returns(ReturnKind::Bool),
            )
            .operation(OperationSignature::new("clear"))
            .operation(
                OperationSignature::new("set")
                    .param("index", "i64")
                    .param("item", "String")
                    .returns(ReturnKind::Text),
            )
            .build()
            .unwrap();
        Substitute::with_config(capability, config)
    }

    #[test]
    fn test_counts_against_modes() {
        let list = list(SubstituteConfig::default());
        list.invoke("add", vec![json!("apple")]).unwrap();
        list.invoke("add", vec![json!("apple")]).unwrap();
        list.invoke("add", vec![json!("banana")]).unwrap();

        assert!(list.verify().call("add", args!["banana"]).is_ok());
        assert!(list.verify().times(2).call("add", args!["apple"]).is_ok());
        assert!(list.verify_with(times(3)).call("add", args![any_string()]).is_ok());
        assert!(list.verify_with(at_least(2)).call("add", args![any()]).is_ok());
        assert!(list.verify().at_most(1).call("add", args![eq("banana")]).is_ok());
        assert!(list.verify_with(never()).call("clear", args![]).is_ok());
    }

    #[test]
    fn test_count_mismatch_reports_actual_and_recorded() {
        let list = list(SubstituteConfig::named("list"));
        list.invoke("add", vec![json!("apple")]).unwrap();

        let err = list.verify().call("add", args!["chocolate"]).unwrap_err();
        assert_matches!(
            &err,
            MockError::Verification(VerificationError::CountMismatch { actual: 0, invocations, .. })
                if invocations.len() == 1
        );
        let message = err.to_string();
        assert!(message.contains("Wanted list.add(\"chocolate\") at least once"));
        assert!(message.contains("#1 add(\"apple\")"));
    }

    #[test]
    fn test_never_fails_when_called() {
        let list = list(SubstituteConfig::default());
        list.invoke("clear", vec![]).unwrap();

        let err = list.verify().never().call("clear", args![]).unwrap_err();
        assert_matches!(
            err,
            MockError::Verification(VerificationError::CountMismatch { actual: 1, .. })
        );
    }

    #[test]
    fn test_reported_invocations_are_truncated() {
        let mut config = SubstituteConfig::default();
        config.max_reported_invocations = 2;
        let list = list(config);
        for item in ["a", "b", "c", "d"] {
            list.invoke("add", vec![json!(item)]).unwrap();
        }

        let err = list.verify().call("add", args!["z"]).unwrap_err();
        assert_matches!(
            err,
            MockError::Verification(VerificationError::CountMismatch { actual: 0, invocations, .. })
                if invocations.len() == 2
        );
    }

    #[test]
    fn test_verify_rejects_malformed_queries() {
        let list = list(SubstituteConfig::default());
        assert_matches!(list.verify().call("push", args![]), Err(MockError::UnknownOperation { .. }));
        assert_matches!(list.verify().call("add", args![]), Err(MockError::ArityMismatch { .. }));
        assert_matches!(
            list.verify().call("add", args![any(), "x"]),
            Err(MockError::ArityMismatch { .. })
        );
    }

    #[test]
    fn test_verify_rejects_mixed_literals_and_matchers() {
        let list = list(SubstituteConfig::default());
        list.invoke("set", vec![json!(0), json!("x")]).unwrap();

        assert_matches!(
            list.verify().call("set", args![any_int(), "x"]),
            Err(MockError::InconsistentStubbing(ref e)) if e.literals == 1 && e.matchers == 1
        );
        assert!(list.verify().call("set", args![any_int(), eq("x")]).is_ok());
        assert!(list.verify().call("set", args![0, "x"]).is_ok());
    }
}
