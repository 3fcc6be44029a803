use session_keys_policy_contract_selector::ContractSelectorBuilder;
use session_keys_policy_spend_limit::SpendLimitBuilder;
use session_keys_state::{PolicyData, PolicyEntry};

use crate::core::config::SessionConfig;
use crate::error::Result;

/// Fluent builder for the `permissions` list of a permission request.
/// Entries keep the order they were added in.
#[derive(Debug, Default, Clone)]
pub struct PermissionPolicyBuilder {
    policies: Vec<PolicyEntry>,
}

impl PermissionPolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_policy(mut self, entry: PolicyEntry) -> Self {
        self.policies.push(entry);
        self
    }

    pub fn add_policies(mut self, entries: impl IntoIterator<Item = PolicyEntry>) -> Self {
        self.policies.extend(entries);
        self
    }

    /// Encode a typed policy and add it
    pub fn add<P: PolicyData>(self, policy: &P) -> Result<Self> {
        Ok(self.add_policy(policy.to_policy()?))
    }

    pub fn build(self) -> Vec<PolicyEntry> {
        self.policies
    }
}

/// The policies a session key is granted by default: a native-token
/// allowance starting at `start`, and the configured contract function.
pub fn default_policies(config: &SessionConfig, start: u64) -> Result<Vec<PolicyEntry>> {
    let spend_limit = SpendLimitBuilder::new()
        .limit(config.spend_allowance)
        .starting_at(start)
        .every(config.allowance_period)
        .build()?;

    let selectors = ContractSelectorBuilder::new()
        .allow_function(config.allowed_contract, &config.allowed_function)
        .build()?;

    Ok(PermissionPolicyBuilder::new()
        .add_policy(spend_limit)
        .add_policies(selectors)
        .build())
}
