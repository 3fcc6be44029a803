//! Calldata for the demo contract.

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::SolCall;
use session_keys_interface::{callWithPermissionCall, clickCall, permissionedCallCall};
use session_keys_state::Call;

/// `click()` on `contract`, no value attached
pub fn click(contract: Address) -> Call {
    Call::new(contract, clickCall {}.abi_encode())
}

/// `permissionedCall(inner)` on `contract`
pub fn permissioned_call(contract: Address, inner: Bytes) -> Call {
    Call::new(contract, permissionedCallCall { call: inner }.abi_encode())
}

/// `callWithPermission(scope, signature, inner)` on `contract`
pub fn call_with_permission(
    contract: Address,
    permission_hash: B256,
    signature: Bytes,
    inner: Bytes,
) -> Call {
    let data = callWithPermissionCall {
        permissionHash: permission_hash,
        signature,
        call: inner,
    }
    .abi_encode();
    Call::new(contract, data)
}
