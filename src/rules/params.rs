//! Rule invocations and their parameter bags

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parameter bag attached to a rule invocation.
///
/// Each rule decodes it into its own typed struct.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleParams(pub toml::Table);

impl RuleParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and by code that assembles templates by hand
    pub fn with(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Decode into a rule's typed parameters. Malformed params yield `None`.
    pub fn decode<P: DeserializeOwned>(&self, rule_id: &str) -> Option<P> {
        match toml::Value::Table(self.0.clone()).try_into::<P>() {
            Ok(params) => Some(params),
            Err(err) => {
                tracing::warn!("Rule '{}' has malformed params: {}", rule_id, err);
                None
            }
        }
    }
}

/// A template's reference to a rule: registry id plus parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleInvocation {
    pub id: String,
    #[serde(default)]
    pub params: RuleParams,
}

impl RuleInvocation {
    pub fn new(id: impl Into<String>, params: RuleParams) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }
}
