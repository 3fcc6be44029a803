use std::time::Duration;

use alloy_primitives::U256;

pub use session_keys_interface::CLICK_ADDRESS;

/// Base Sepolia
pub const DEFAULT_CHAIN_ID: u64 = 84532;

/// Expiry written into permission requests, far in the future
pub const DEFAULT_PERMISSION_EXPIRY: u64 = 17_218_875_770;

/// 0.1 ETH in wei
pub const DEFAULT_SPEND_ALLOWANCE: U256 = U256::from_limbs([100_000_000_000_000_000, 0, 0, 0]);

/// One day, in seconds
pub const DEFAULT_ALLOWANCE_PERIOD: u64 = 86_400;

/// Interval between status polls while a batch is pending
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Consecutive failed status lookups before a batch is abandoned
pub const MAX_STATUS_FAILURES: u32 = 5;

pub const DEFAULT_TX_EXPLORER_URL: &str = "https://sepolia.basescan.org/tx";
pub const DEFAULT_OP_EXPLORER_URL: &str = "https://jiffyscan.xyz/userOpHash";

pub const APP_NAME: &str = "Session Key Workshop";

// Environment variables read by `SessionConfig::from_env`
pub const PAYMASTER_URL_ENV: &str = "PAYMASTER_URL";
pub const LEGACY_PAYMASTER_URL_ENV: &str = "VITE_PAYMASTER_URL";
pub const CHAIN_ID_ENV: &str = "SESSION_CHAIN_ID";
pub const POLL_INTERVAL_ENV: &str = "SESSION_POLL_INTERVAL_MS";
