use alloy_primitives::{Address, FixedBytes};
use serde::Serialize;
use session_keys_interface::function_selector;
use session_keys_state::{PolicyData, PolicyEntry, StateError};

/// Upper bound on contract/selector pairs in a single request
pub const MAX_ALLOWED_SELECTORS: usize = 100;

/// Restricts the session signer to one function on one contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllowedContractSelector {
    pub contract: Address,
    pub selector: FixedBytes<4>,
}

impl PolicyData for AllowedContractSelector {
    const POLICY_TYPE: &'static str = "allowed-contract-selector";
}

/// Collects contract/selector pairs, one policy entry per pair
#[derive(Debug, Default, Clone)]
pub struct ContractSelectorBuilder {
    entries: Vec<AllowedContractSelector>,
}

impl ContractSelectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `selector` on `contract`. Pairs past the limit and duplicates are ignored.
    pub fn allow(mut self, contract: Address, selector: [u8; 4]) -> Self {
        let entry = AllowedContractSelector {
            contract,
            selector: FixedBytes(selector),
        };
        if self.entries.len() < MAX_ALLOWED_SELECTORS && !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
        self
    }

    /// Allow a function given by its canonical signature, e.g. `permissionedCall(bytes)`
    pub fn allow_function(self, contract: Address, signature: &str) -> Self {
        self.allow(contract, function_selector(signature))
    }

    pub fn build(self) -> Result<Vec<PolicyEntry>, StateError> {
        self.entries.iter().map(PolicyData::to_policy).collect()
    }
}
