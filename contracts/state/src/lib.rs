//! Session Keys State Module
//!
//! Wire types exchanged with the wallet while granting and using a session
//! key: the permission request and the policies it carries, the opaque grant
//! returned by the wallet, and the call batches submitted under that grant.

pub mod call;
pub mod error;
pub mod permission;
pub mod policy;

pub use call::{
    Call, CallBatchId, CallBatchStatus, CallStatus, Capabilities, PaymasterService,
    PermissionsCapability, PreparedCalls, Receipt, SendCallsRequest, SEND_CALLS_VERSION,
};
pub use error::StateError;
pub use permission::{
    PermissionContext, PermissionGrant, PermissionRequest, SignerDescriptor, SignerKey, KeyType,
};
pub use policy::{PolicyData, PolicyEntry};
