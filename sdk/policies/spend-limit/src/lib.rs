use alloy_primitives::U256;
use serde::Serialize;
use session_keys_state::{PolicyData, PolicyEntry, StateError};

/// Seconds in one day, the default allowance period
pub const ONE_DAY: u64 = 86_400;

/// Native-token allowance that resets every `period` seconds starting at `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeTokenRecurringAllowance {
    /// Amount in wei spendable per period
    pub allowance: U256,
    /// Unix timestamp of the first period
    pub start: u64,
    /// Period length in seconds
    pub period: u64,
}

impl PolicyData for NativeTokenRecurringAllowance {
    const POLICY_TYPE: &'static str = "native-token-recurring-allowance";
}

/// One-off native-token cap over the whole life of the grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NativeTokenLimit {
    /// Amount in wei spendable in total
    pub allowance: U256,
}

impl PolicyData for NativeTokenLimit {
    const POLICY_TYPE: &'static str = "native-token-limit";
}

/// Builds a native-token spend-limit policy.
///
/// With a period set the limit recurs; without one it is a fixed cap.
#[derive(Debug, Default, Clone)]
pub struct SpendLimitBuilder {
    allowance: U256,
    start: u64,
    period: Option<u64>,
}

impl SpendLimitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, wei: U256) -> Self {
        self.allowance = wei;
        self
    }

    pub fn starting_at(mut self, unix_seconds: u64) -> Self {
        self.start = unix_seconds;
        self
    }

    /// Reset the allowance every `seconds`; a zero period means a fixed cap
    pub fn every(mut self, seconds: u64) -> Self {
        self.period = (seconds > 0).then_some(seconds);
        self
    }

    pub fn build(self) -> Result<PolicyEntry, StateError> {
        match self.period {
            Some(period) => NativeTokenRecurringAllowance {
                allowance: self.allowance,
                start: self.start,
                period,
            }
            .to_policy(),
            None => NativeTokenLimit {
                allowance: self.allowance,
            }
            .to_policy(),
        }
    }
}
