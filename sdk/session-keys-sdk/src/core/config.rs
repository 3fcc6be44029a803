//! Session configuration, built once at startup and handed to the flow.

use std::env;
use std::time::Duration;

use alloy_primitives::{Address, U256};

use crate::advanced::backends::SubmissionBackend;
use crate::core::constants::*;
use crate::error::{Result, SessionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Chain the permission is requested for
    pub chain_id: u64,
    /// Sponsor endpoint attached to every call batch, if any
    pub paymaster_url: Option<String>,
    /// Unix timestamp written as the permission expiry
    pub permission_expiry: u64,
    /// Native-token allowance per period, in wei
    pub spend_allowance: U256,
    /// Allowance period in seconds; zero requests a fixed cap
    pub allowance_period: u64,
    /// Contract the session key is scoped to
    pub allowed_contract: Address,
    /// Canonical signature of the function the session key is scoped to
    pub allowed_function: String,
    pub poll_interval: Duration,
    pub tx_explorer_url: String,
    pub op_explorer_url: String,
    pub backend: SubmissionBackend,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            paymaster_url: None,
            permission_expiry: DEFAULT_PERMISSION_EXPIRY,
            spend_allowance: DEFAULT_SPEND_ALLOWANCE,
            allowance_period: DEFAULT_ALLOWANCE_PERIOD,
            allowed_contract: CLICK_ADDRESS,
            allowed_function: session_keys_interface::PERMISSIONED_CALL_SIGNATURE.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            tx_explorer_url: DEFAULT_TX_EXPLORER_URL.to_string(),
            op_explorer_url: DEFAULT_OP_EXPLORER_URL.to_string(),
            backend: SubmissionBackend::default(),
        }
    }
}

impl SessionConfig {
    /// Defaults overridden by process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.paymaster_url = lookup(PAYMASTER_URL_ENV)
            .or_else(|| lookup(LEGACY_PAYMASTER_URL_ENV))
            .filter(|url| !url.trim().is_empty());

        if let Some(raw) = lookup(CHAIN_ID_ENV) {
            config.chain_id = raw.trim().parse().map_err(|_| {
                SessionError::Config(format!("{CHAIN_ID_ENV} is not a chain id: {raw}"))
            })?;
        }

        if let Some(raw) = lookup(POLL_INTERVAL_ENV) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                SessionError::Config(format!("{POLL_INTERVAL_ENV} is not a number: {raw}"))
            })?;
            if millis == 0 {
                return Err(SessionError::Config(format!(
                    "{POLL_INTERVAL_ENV} must be positive"
                )));
            }
            config.poll_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }

    pub fn with_paymaster(mut self, url: impl Into<String>) -> Self {
        self.paymaster_url = Some(url.into());
        self
    }

    pub fn with_backend(mut self, backend: SubmissionBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
