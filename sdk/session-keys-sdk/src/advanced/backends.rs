//! Submission backends: the ways a call batch can be authorized and sent.

use session_keys_state::{CallBatchId, CallBatchStatus, SendCallsRequest};
use tracing::{debug, warn};

use crate::core::config::SessionConfig;
use crate::core::connection::CallSubmitter;
use crate::core::signer::SessionSigner;
use crate::error::{Result, SessionError};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionBackend {
    /// Prepare the batch, sign its hash with the session key, send it. No wallet prompt.
    #[default]
    SignatureOverride,
    /// Let the wallet sign the batch interactively
    WalletInteractive,
    /// Like `SignatureOverride`, but the batch id carries a user-operation hash
    UserOperationHash,
}

impl SubmissionBackend {
    /// Whether this backend needs the session key to sign
    pub fn signs_locally(&self) -> bool {
        !matches!(self, Self::WalletInteractive)
    }

    /// Submit `request`, signing with `signer` when the backend requires it
    pub async fn submit(
        &self,
        submitter: &dyn CallSubmitter,
        signer: &dyn SessionSigner,
        request: &SendCallsRequest,
    ) -> Result<CallBatchId> {
        if !self.signs_locally() {
            return submitter
                .send_calls(request)
                .await
                .map_err(|e| SessionError::Submission(e.to_string()));
        }

        let prepared = submitter
            .prepare_calls(request)
            .await
            .map_err(|e| SessionError::Submission(e.to_string()))?;
        debug!(hash = %prepared.hash, "signing prepared calls with session key");

        let signature = signer
            .sign_hash(&prepared.hash)
            .await
            .map_err(SessionError::Signing)?;

        let id = submitter
            .send_prepared_calls(prepared, signature)
            .await
            .map_err(|e| SessionError::Submission(e.to_string()))?;

        // The batch is already on its way; an undecodable id only loses the link
        if *self == Self::UserOperationHash && id.user_operation_hash().is_err() {
            warn!(%id, "batch id is not a user-operation hash");
        }
        Ok(id)
    }

    /// Explorer link for a confirmed batch
    pub fn explorer_link(
        &self,
        config: &SessionConfig,
        id: &CallBatchId,
        status: &CallBatchStatus,
    ) -> Option<String> {
        if !status.is_confirmed() {
            return None;
        }
        match self {
            Self::UserOperationHash => id
                .user_operation_hash()
                .ok()
                .map(|hash| utils::explorer_link(&config.op_explorer_url, &hash)),
            Self::SignatureOverride | Self::WalletInteractive => status
                .transaction_hash()
                .map(|hash| utils::explorer_link(&config.tx_explorer_url, &hash)),
        }
    }
}
