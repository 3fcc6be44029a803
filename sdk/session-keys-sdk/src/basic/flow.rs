//! The session authorization flow: grant a session key once, then use it to
//! authorize many calls without further wallet prompts.
//!
//! Phases move `Disconnected -> ConnectedNoGrant -> Granted`, and from
//! `Granted` through `CallSubmitted` and back each time a call batch is sent
//! and resolved. Disconnecting from any phase discards the session key, the
//! grant and any outstanding batch.
//!
//! All state sits behind one lock that is never held across an await. Every
//! disconnect and every new grant bumps an epoch; an async result whose
//! epoch no longer matches is discarded instead of applied.

use std::sync::Arc;

use alloy_primitives::Address;
use parking_lot::Mutex;
use session_keys_state::{Call, CallBatchId, CallBatchStatus, PermissionGrant, SignerKey};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::advanced::calls;
use crate::basic::actions::{GrantPermissionsBuilder, SendCallsBuilder};
use crate::basic::policy::default_policies;
use crate::core::config::SessionConfig;
use crate::core::connection::{CallSubmitter, ConnectorChoice, PermissionIssuer, WalletConnector};
use crate::core::constants::MAX_STATUS_FAILURES;
use crate::core::signer::{P256SessionKey, SessionSigner};
use crate::error::{Result, SessionError};
use crate::types::{FlowPhase, FlowSnapshot};
use crate::utils::unix_now;

/// A session key paired with the grant it was issued
struct ActiveSession {
    key: Arc<P256SessionKey>,
    grant: PermissionGrant,
}

#[derive(Default)]
struct FlowState {
    account: Option<Address>,
    session: Option<ActiveSession>,
    busy: bool,
    granting: bool,
    call_batch_id: Option<CallBatchId>,
    status: Option<CallBatchStatus>,
    epoch: u64,
    /// Bumped only on disconnect
    connection_epoch: u64,
}

impl FlowState {
    fn batch_outstanding(&self) -> bool {
        self.call_batch_id.is_some()
            && !self
                .status
                .as_ref()
                .is_some_and(|s| s.status.is_terminal())
    }

    fn phase(&self) -> FlowPhase {
        match (&self.account, &self.session) {
            (None, _) => FlowPhase::Disconnected,
            (Some(_), None) => FlowPhase::ConnectedNoGrant,
            (Some(_), Some(_)) if self.batch_outstanding() => FlowPhase::CallSubmitted,
            (Some(_), Some(_)) => FlowPhase::Granted,
        }
    }

    /// Drop the session key, grant and batch tracking; invalidates in-flight work
    fn clear_session(&mut self) {
        self.session = None;
        self.busy = false;
        self.granting = false;
        self.call_batch_id = None;
        self.status = None;
        self.epoch += 1;
    }
}

pub struct SessionFlow {
    config: SessionConfig,
    connector: Arc<dyn WalletConnector>,
    issuer: Arc<dyn PermissionIssuer>,
    submitter: Arc<dyn CallSubmitter>,
    state: Mutex<FlowState>,
    snapshots: watch::Sender<FlowSnapshot>,
}

impl SessionFlow {
    pub fn new(
        config: SessionConfig,
        connector: Arc<dyn WalletConnector>,
        issuer: Arc<dyn PermissionIssuer>,
        submitter: Arc<dyn CallSubmitter>,
    ) -> Self {
        let (snapshots, _) = watch::channel(FlowSnapshot::disconnected());
        Self {
            config,
            connector,
            issuer,
            submitter,
            state: Mutex::new(FlowState::default()),
            snapshots,
        }
    }

    /// Build a flow over a single wallet client playing all three roles
    pub fn with_wallet<W>(config: SessionConfig, wallet: Arc<W>) -> Self
    where
        W: WalletConnector + PermissionIssuer + CallSubmitter + 'static,
    {
        Self::new(config, wallet.clone(), wallet.clone(), wallet)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    //=========================================================================
    // Observation
    //=========================================================================

    pub fn snapshot(&self) -> FlowSnapshot {
        self.snapshot_of(&self.state.lock())
    }

    /// Receive a new snapshot on every transition
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn phase(&self) -> FlowPhase {
        self.state.lock().phase()
    }

    pub fn account(&self) -> Option<Address> {
        self.state.lock().account
    }

    pub fn grant(&self) -> Option<PermissionGrant> {
        self.state.lock().session.as_ref().map(|s| s.grant.clone())
    }

    /// Public half of the session key currently held, if any
    pub fn session_key(&self) -> Option<SignerKey> {
        self.state.lock().session.as_ref().map(|s| s.key.public_key())
    }

    fn snapshot_of(&self, state: &FlowState) -> FlowSnapshot {
        let explorer_link = match (&state.call_batch_id, &state.status) {
            (Some(id), Some(status)) => self.config.backend.explorer_link(&self.config, id, status),
            _ => None,
        };
        FlowSnapshot {
            phase: state.phase(),
            account: state.account,
            has_grant: state.session.is_some(),
            busy: state.busy,
            granting: state.granting,
            call_batch_id: state.call_batch_id.clone(),
            status: state.status.clone(),
            explorer_link,
        }
    }

    fn publish(&self, state: &FlowState) {
        self.snapshots.send_replace(self.snapshot_of(state));
    }

    //=========================================================================
    // Connection
    //=========================================================================

    #[instrument(skip(self))]
    pub async fn connect(&self, choice: &ConnectorChoice) -> Result<Address> {
        let connection_epoch = self.state.lock().connection_epoch;

        let account = match self.connector.connect(choice).await {
            Ok(account) => account,
            Err(e) => {
                warn!(error = %e, "wallet connection failed");
                return Err(SessionError::Connector(e.to_string()));
            },
        };

        let mut state = self.state.lock();
        if state.connection_epoch != connection_epoch {
            warn!(%account, "discarding connection that raced a disconnect");
            return Err(SessionError::Stale("wallet connection"));
        }
        if state.account.is_some_and(|current| current != account) {
            // Grants are bound to the account they were issued for
            state.clear_session();
        }
        state.account = Some(account);
        self.publish(&state);
        info!(%account, "wallet connected");
        Ok(account)
    }

    /// Forget the account and everything tied to it. Local state is cleared
    /// even if the connector reports an error.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.account = None;
            state.connection_epoch += 1;
            state.clear_session();
            self.publish(&state);
        }
        info!("session cleared");

        self.connector.disconnect().await.map_err(|e| {
            warn!(error = %e, "connector disconnect failed");
            SessionError::Connector(e.to_string())
        })
    }

    //=========================================================================
    // Permission
    //=========================================================================

    /// Generate a fresh session key and ask the wallet to grant it the
    /// configured scopes. A previous key and grant are replaced, never merged.
    /// Only one request may be in flight at a time.
    #[instrument(skip(self))]
    pub async fn request_permission(&self) -> Result<PermissionGrant> {
        let key = P256SessionKey::generate();
        let (account, request, epoch) = {
            let mut state = self.state.lock();
            let account = state.account.ok_or(SessionError::NotConnected)?;
            if state.granting {
                return Err(SessionError::PermissionPending);
            }
            let request = GrantPermissionsBuilder::new(account)
                .with_chain_id(self.config.chain_id)
                .with_expiry(self.config.permission_expiry)
                .with_signer(key.public_key())
                .with_policies(default_policies(&self.config, unix_now())?)
                .build()?;

            state.granting = true;
            self.publish(&state);
            (account, request, state.epoch)
        };

        let result = match self.issuer.grant_permissions(&request).await {
            Ok(grant)
                if !grant.is_bound_to(account, self.config.chain_id)
                    || grant.signer != key.public_key() =>
            {
                warn!("issuer returned a grant for a different account, chain or signer");
                Err(SessionError::Issuer(
                    "grant does not match the requested scope".into(),
                ))
            },
            Ok(grant) => Ok(grant),
            Err(e) => {
                warn!(error = %e, "permission request rejected");
                Err(SessionError::Issuer(e.to_string()))
            },
        };

        let mut state = self.state.lock();
        if state.epoch != epoch || state.account != Some(account) {
            if result.is_ok() {
                warn!(%account, "discarding grant for an invalidated session");
                return Err(SessionError::Stale("permission request"));
            }
            return result;
        }
        let grant = match result {
            Ok(grant) => grant,
            Err(e) => {
                state.granting = false;
                self.publish(&state);
                return Err(e);
            },
        };

        state.clear_session();
        state.session = Some(ActiveSession {
            key: Arc::new(key),
            grant: grant.clone(),
        });
        self.publish(&state);

        debug!(context = ?grant.context.0, "permission context");
        info!(%account, expiry = grant.expiry, "permission granted");
        Ok(grant)
    }

    //=========================================================================
    // Calls
    //=========================================================================

    /// Submit `call` as a one-call batch authorized by the held grant
    #[instrument(skip(self, call), fields(to = %call.to))]
    pub async fn submit_call(&self, call: Call) -> Result<CallBatchId> {
        let (request, key, epoch) = {
            let mut state = self.state.lock();
            let session = state.session.as_ref().ok_or(SessionError::NoGrant)?;
            if state.busy {
                return Err(SessionError::Busy);
            }
            if state.batch_outstanding() {
                let id = state.call_batch_id.as_ref().map(|id| id.to_string());
                return Err(SessionError::BatchPending(id.unwrap_or_default()));
            }

            let request = SendCallsBuilder::new(session.grant.account)
                .with_chain_id(self.config.chain_id)
                .add_call(call)
                .with_permission_context(session.grant.context.clone())
                .with_paymaster(self.config.paymaster_url.clone())
                .build()?;
            let key = session.key.clone();

            state.busy = true;
            state.call_batch_id = None;
            state.status = None;
            self.publish(&state);
            (request, key, state.epoch)
        };

        let result = self
            .config
            .backend
            .submit(&*self.submitter, &*key, &request)
            .await;

        let mut state = self.state.lock();
        if state.epoch != epoch {
            return match result {
                Ok(id) => {
                    warn!(%id, "discarding call batch submitted under an invalidated grant");
                    Err(SessionError::Stale("call submission"))
                },
                Err(e) => Err(e),
            };
        }

        state.busy = false;
        match result {
            Ok(id) => {
                state.call_batch_id = Some(id.clone());
                self.publish(&state);
                info!(%id, "call batch submitted");
                Ok(id)
            },
            Err(e) => {
                self.publish(&state);
                error!(error = %e, "call submission failed");
                Err(e)
            },
        }
    }

    /// Submit the demo contract's `click()`
    pub async fn submit_click(&self) -> Result<CallBatchId> {
        self.submit_call(calls::click(self.config.allowed_contract))
            .await
    }

    //=========================================================================
    // Status
    //=========================================================================

    /// One polling step. Returns `None` when no batch is outstanding and the
    /// cached status once it is terminal, without querying again.
    pub async fn poll_status(&self) -> Result<Option<CallBatchStatus>> {
        let (id, epoch) = {
            let state = self.state.lock();
            let Some(id) = state.call_batch_id.clone() else {
                return Ok(None);
            };
            if let Some(status) = state.status.as_ref().filter(|s| s.status.is_terminal()) {
                return Ok(Some(status.clone()));
            }
            (id, state.epoch)
        };

        let status = match self.submitter.get_calls_status(&id).await {
            Ok(status) => status,
            Err(e) => {
                warn!(%id, error = %e, "status lookup failed");
                return Err(SessionError::Submission(e.to_string()));
            },
        };

        let mut state = self.state.lock();
        if state.epoch != epoch || state.call_batch_id.as_ref() != Some(&id) {
            debug!(%id, "dropping status for a batch no longer tracked");
            return Err(SessionError::Stale("status poll"));
        }

        state.status = Some(status.clone());
        self.publish(&state);
        if status.status.is_terminal() {
            info!(%id, status = ?status.status, receipts = status.receipts.len(), "call batch resolved");
        }
        Ok(Some(status))
    }

    /// Poll at the configured interval until the outstanding batch reaches a
    /// terminal status. Stops early when there is nothing to poll or the
    /// session is invalidated.
    ///
    /// Failed lookups are retried. After `MAX_STATUS_FAILURES` consecutive
    /// failures the batch is abandoned so a new call can be sent.
    pub async fn wait_for_confirmation(&self) -> Result<Option<CallBatchStatus>> {
        let (id, epoch) = {
            let state = self.state.lock();
            match &state.call_batch_id {
                Some(id) => (id.clone(), state.epoch),
                None => return Ok(None),
            }
        };

        let mut failures = 0;
        loop {
            match self.poll_status().await {
                Ok(None) => return Ok(None),
                Ok(Some(status)) if status.status.is_terminal() => return Ok(Some(status)),
                Ok(Some(_)) => failures = 0,
                Err(SessionError::Submission(reason)) => {
                    failures += 1;
                    if failures >= MAX_STATUS_FAILURES {
                        self.abandon_batch(&id, epoch);
                        return Err(SessionError::Submission(reason));
                    }
                    warn!(%id, failures, "retrying status lookup");
                },
                Err(e) => return Err(e),
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Stop tracking `id` if it is still the current batch
    fn abandon_batch(&self, id: &CallBatchId, epoch: u64) {
        let mut state = self.state.lock();
        if state.epoch != epoch || state.call_batch_id.as_ref() != Some(id) {
            return;
        }
        state.call_batch_id = None;
        state.status = None;
        self.publish(&state);
        error!(%id, "giving up on call batch status");
    }

    /// Run `wait_for_confirmation` in the background
    pub fn spawn_status_poller(self: &Arc<Self>) -> JoinHandle<Result<Option<CallBatchStatus>>> {
        let flow = Arc::clone(self);
        tokio::spawn(async move { flow.wait_for_confirmation().await })
    }

    /// Explorer link for the latest batch once confirmed
    pub fn explorer_link(&self) -> Option<String> {
        self.snapshot().explorer_link
    }
}
