//! Solidity interface of the demo `Click` contract.
//!
//! The contract exposes a zero-argument `click()` entry point, which can be
//! called directly, and two permissioned wrappers used when a session key
//! authorizes the call on behalf of a smart wallet.
#![allow(missing_docs)]
#![allow(clippy::too_many_arguments)]

use alloy_primitives::{address, Address};
use alloy_sol_types::{sol, SolCall};

pub use IClick::{
    callWithPermissionCall, clickCall, permissionedCallCall, AddressEmptyCode, Click,
    FailedCall,
};

sol! {
    contract IClick {
        function click() external;
        function permissionedCall(bytes calldata call) external payable returns (bytes memory);
        function callWithPermission(bytes32 permissionHash, bytes calldata signature, bytes calldata call) external payable returns (bytes memory);

        event Click(address indexed sender);

        error AddressEmptyCode(address target);
        error FailedCall();
    }
}

/// Length of a function selector in bytes
pub const SELECTOR_LEN: usize = 4;

/// Address of the demo contract on Base Sepolia
pub const CLICK_ADDRESS: Address = address!("67c97D1FB8184F038592b2109F854dfb09C77C75");

/// Signature of the entry point session keys are scoped to
pub const PERMISSIONED_CALL_SIGNATURE: &str = "permissionedCall(bytes)";

/// Selector for `click()`
pub const CLICK_SELECTOR: [u8; SELECTOR_LEN] = clickCall::SELECTOR;
/// Selector for `permissionedCall(bytes)`
pub const PERMISSIONED_CALL_SELECTOR: [u8; SELECTOR_LEN] = permissionedCallCall::SELECTOR;
/// Selector for `callWithPermission(bytes32,bytes,bytes)`
pub const CALL_WITH_PERMISSION_SELECTOR: [u8; SELECTOR_LEN] = callWithPermissionCall::SELECTOR;

/// Compute the 4-byte selector of a canonical function signature,
/// e.g. `permissionedCall(bytes)`
pub fn function_selector(signature: &str) -> [u8; SELECTOR_LEN] {
    let hash = alloy_primitives::keccak256(signature.as_bytes());
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(&hash[..SELECTOR_LEN]);
    selector
}
