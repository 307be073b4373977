//! Per-substitute configuration
//!
//! Defaults can be overridden from the environment with
//! [`SubstituteConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::value::DefaultValueTable;

/// What an unprogrammed call does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAnswer {
    /// Return the default value for the operation's return kind
    #[default]
    ReturnDefaults,
    /// Delegate to the original implementation, when there is one
    CallOriginal,
    /// Fail the call
    Fail,
}

impl FromStr for DefaultAnswer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "return_defaults" | "defaults" => Ok(DefaultAnswer::ReturnDefaults),
            "call_original" | "original" => Ok(DefaultAnswer::CallOriginal),
            "fail" | "strict" => Ok(DefaultAnswer::Fail),
            other => Err(format!("unknown default answer '{}'", other)),
        }
    }
}

impl fmt::Display for DefaultAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefaultAnswer::ReturnDefaults => "return_defaults",
            DefaultAnswer::CallOriginal => "call_original",
            DefaultAnswer::Fail => "fail",
        };
        f.write_str(name)
    }
}

/// Substitute configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstituteConfig {
    /// Name used in diagnostics; the capability name when unset
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub default_answer: DefaultAnswer,

    /// Per-kind overrides of the standard default values
    #[serde(default)]
    pub defaults: DefaultValueTable,

    /// Cap on recorded calls listed in a verification failure
    #[serde(default = "default_max_reported_invocations")]
    pub max_reported_invocations: usize,
}

fn default_max_reported_invocations() -> usize {
    20
}

impl Default for SubstituteConfig {
    fn default() -> Self {
        Self {
            name: None,
            default_answer: DefaultAnswer::default(),
            defaults: DefaultValueTable::default(),
            max_reported_invocations: default_max_reported_invocations(),
        }
    }
}

impl SubstituteConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_default_answer(mut self, answer: DefaultAnswer) -> Self {
        self.default_answer = answer;
        self
    }

    pub fn with_defaults(mut self, defaults: DefaultValueTable) -> Self {
        self.defaults = defaults;
        self
    }

    /// Defaults overridden by `MIMIC_DEFAULT_ANSWER` and
    /// `MIMIC_MAX_REPORTED_INVOCATIONS`. Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(answer) = lookup("MIMIC_DEFAULT_ANSWER") {
            match answer.parse::<DefaultAnswer>() {
                Ok(answer) => self.default_answer = answer,
                Err(e) => warn!("Invalid MIMIC_DEFAULT_ANSWER value: {}", e),
            }
        }

        if let Some(max) = lookup("MIMIC_MAX_REPORTED_INVOCATIONS") {
            if let Ok(max) = max.parse::<usize>() {
                self.max_reported_invocations = max;
            } else {
                warn!("Invalid MIMIC_MAX_REPORTED_INVOCATIONS value: {}", max);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ReturnKind;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SubstituteConfig::default();
        assert_eq!(config.name, None);
        assert_eq!(config.default_answer, DefaultAnswer::ReturnDefaults);
        assert_eq!(config.max_reported_invocations, 20);
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = SubstituteConfig::default().with_overrides(lookup(&[
            ("MIMIC_DEFAULT_ANSWER", "fail"),
            ("MIMIC_MAX_REPORTED_INVOCATIONS", "5"),
        ]));
        assert_eq!(config.default_answer, DefaultAnswer::Fail);
        assert_eq!(config.max_reported_invocations, 5);
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let config = SubstituteConfig::default().with_overrides(lookup(&[
            ("MIMIC_DEFAULT_ANSWER", "sometimes"),
            ("MIMIC_MAX_REPORTED_INVOCATIONS", "many"),
        ]));
        assert_eq!(config.default_answer, DefaultAnswer::ReturnDefaults);
        assert_eq!(config.max_reported_invocations, 20);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: SubstituteConfig = serde_json::from_value(json!({
            "name": "list",
            "default_answer": "call_original",
            "defaults": { "integer": -1 }
        }))
        .unwrap();

        assert_eq!(config.name.as_deref(), Some("list"));
        assert_eq!(config.default_answer, DefaultAnswer::CallOriginal);
        assert_eq!(config.defaults.lookup(ReturnKind::Integer), json!(-1));
        assert_eq!(config.max_reported_invocations, 20);
    }

    #[test]
    fn test_default_answer_round_trips_through_display() {
        for answer in [DefaultAnswer::ReturnDefaults, DefaultAnswer::CallOriginal, DefaultAnswer::Fail] {
            assert_eq!(answer.to_string().parse::<DefaultAnswer>(), Ok(answer));
        }
    }
}
