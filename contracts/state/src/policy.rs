//! Policy entries attached to a permission request.
//!
//! Each policy is a `{ "type": ..., "data": ... }` pair. The wallet and the
//! on-chain permission manager interpret the data; this side only encodes it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StateError;

/// A single scope restriction inside a permission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    /// Policy type tag, e.g. `native-token-recurring-allowance`
    #[serde(rename = "type")]
    pub policy_type: String,
    /// Policy-specific payload
    pub data: Value,
}

impl PolicyEntry {
    pub fn new(policy_type: impl Into<String>, data: Value) -> Self {
        Self {
            policy_type: policy_type.into(),
            data,
        }
    }
}

/// Typed policy payloads that know their own type tag.
///
/// Implemented by the policy builder crates so that the SDK can collect
/// heterogeneous policies into a single request.
pub trait PolicyData: Serialize {
    /// The `type` tag written next to the encoded data
    const POLICY_TYPE: &'static str;

    fn to_policy(&self) -> Result<PolicyEntry, StateError> {
        let data = serde_json::to_value(self).map_err(|source| StateError::PolicyEncoding {
            policy_type: Self::POLICY_TYPE,
            source,
        })?;
        Ok(PolicyEntry::new(Self::POLICY_TYPE, data))
    }
}
