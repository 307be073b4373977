use serde::{Deserialize, Serialize};
use std::fmt;

/// How many matching invocations a verification expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    Exactly(usize),
    AtLeast(usize),
    AtMost(usize),
    Never,
}

impl VerificationMode {
    pub fn check(&self, count: usize) -> bool {
        match *self {
            VerificationMode::Exactly(n) => count == n,
            VerificationMode::AtLeast(n) => count >= n,
            VerificationMode::AtMost(n) => count <= n,
            VerificationMode::Never => count == 0,
        }
    }
}

/// No mode given means "at least once"
impl Default for VerificationMode {
    fn default() -> Self {
        VerificationMode::AtLeast(1)
    }
}

impl fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            VerificationMode::Exactly(1) => write!(f, "exactly once"),
            VerificationMode::Exactly(n) => write!(f, "exactly {} times", n),
            VerificationMode::AtLeast(1) => write!(f, "at least once"),
            VerificationMode::AtLeast(n) => write!(f, "at least {} times", n),
            VerificationMode::AtMost(n) => write!(f, "at most {} times", n),
            VerificationMode::Never => write!(f, "never"),
        }
    }
}

pub fn times(n: usize) -> VerificationMode {
    VerificationMode::Exactly(n)
}

pub fn once() -> VerificationMode {
    VerificationMode::Exactly(1)
}

pub fn at_least(n: usize) -> VerificationMode {
    VerificationMode::AtLeast(n)
}

pub fn at_least_once() -> VerificationMode {
    VerificationMode::AtLeast(1)
}

pub fn at_most(n: usize) -> VerificationMode {
    VerificationMode::AtMost(n)
}

pub fn never() -> VerificationMode {
    VerificationMode::Never
}
