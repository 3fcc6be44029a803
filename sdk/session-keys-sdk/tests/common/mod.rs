use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::{Signature, VerifyingKey};
use parking_lot::Mutex;
use serde_json::json;
use session_keys_sdk::core::connection::{
    BoxError, CallSubmitter, ConnectorChoice, PermissionIssuer, WalletConnector, WalletPreference,
};
use session_keys_sdk::state::{
    CallBatchId, CallBatchStatus, CallStatus, PermissionContext, PermissionGrant,
    PermissionRequest, PreparedCalls, Receipt, SendCallsRequest,
};
use session_keys_sdk::{SessionConfig, SessionFlow, SubmissionBackend};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

pub const TEST_ACCOUNT: Address = Address::repeat_byte(0xa1);

struct Batch {
    polls_until_final: usize,
    final_status: CallStatus,
}

#[derive(Default)]
struct Ledger {
    grants: HashMap<Bytes, PermissionGrant>,
    prepared: HashMap<B256, SendCallsRequest>,
    batches: HashMap<String, Batch>,
    requests: Vec<SendCallsRequest>,
    nonce: u64,
}

/// In-process wallet playing connector, issuer and submitter.
///
/// Enforces what a real smart wallet would: calls must stay inside the granted
/// scope and prepared batches must carry a valid P-256 signature from the
/// granted key.
pub struct MockWallet {
    pub account: Address,
    pub smart_wallet: AtomicBool,
    pub reject_connect: AtomicBool,
    pub reject_grant: AtomicBool,
    pub reject_send: AtomicBool,
    /// `PENDING` answers each new batch gets before resolving
    pub pending_polls: AtomicUsize,
    pub final_status: Mutex<CallStatus>,
    /// Status lookups that fail before the wallet answers again
    pub failing_status_queries: AtomicUsize,
    /// Hand out this id instead of a hex hash
    pub batch_id_override: Mutex<Option<String>>,

    pub grant_count: AtomicUsize,
    pub send_count: AtomicUsize,
    pub status_queries: AtomicUsize,

    pub grant_entered: Notify,
    pub send_entered: Notify,
    pub status_entered: Notify,
    pub connect_entered: Notify,
    grant_gate: Mutex<Option<oneshot::Receiver<()>>>,
    send_gate: Mutex<Option<oneshot::Receiver<()>>>,
    status_gate: Mutex<Option<oneshot::Receiver<()>>>,
    connect_gate: Mutex<Option<oneshot::Receiver<()>>>,

    ledger: Mutex<Ledger>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            account: TEST_ACCOUNT,
            smart_wallet: AtomicBool::new(true),
            reject_connect: AtomicBool::new(false),
            reject_grant: AtomicBool::new(false),
            reject_send: AtomicBool::new(false),
            pending_polls: AtomicUsize::new(2),
            final_status: Mutex::new(CallStatus::Confirmed),
            failing_status_queries: AtomicUsize::new(0),
            batch_id_override: Mutex::new(None),
            grant_count: AtomicUsize::new(0),
            send_count: AtomicUsize::new(0),
            status_queries: AtomicUsize::new(0),
            grant_entered: Notify::new(),
            send_entered: Notify::new(),
            status_entered: Notify::new(),
            connect_entered: Notify::new(),
            grant_gate: Mutex::new(None),
            send_gate: Mutex::new(None),
            status_gate: Mutex::new(None),
            connect_gate: Mutex::new(None),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Block the next grant until the returned sender fires
    pub fn hold_next_grant(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.grant_gate.lock() = Some(rx);
        tx
    }

    /// Block the next submission until the returned sender fires
    pub fn hold_next_send(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.send_gate.lock() = Some(rx);
        tx
    }

    /// Block the next status lookup until the returned sender fires
    pub fn hold_next_status(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.status_gate.lock() = Some(rx);
        tx
    }

    /// Block the next connection until the returned sender fires
    pub fn hold_next_connect(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.connect_gate.lock() = Some(rx);
        tx
    }

    pub fn grants_issued(&self) -> usize {
        self.grant_count.load(Ordering::SeqCst)
    }

    pub fn sends(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn status_queries(&self) -> usize {
        self.status_queries.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<SendCallsRequest> {
        self.ledger.lock().requests.last().cloned()
    }

    pub fn grant_for(&self, context: &PermissionContext) -> Option<PermissionGrant> {
        self.ledger.lock().grants.get(&context.0).cloned()
    }

    async fn pass_gate(gate: &Mutex<Option<oneshot::Receiver<()>>>, entered: &Notify) {
        let rx = gate.lock().take();
        if let Some(rx) = rx {
            entered.notify_one();
            let _ = rx.await;
        }
    }

    fn check_scope(&self, request: &SendCallsRequest) -> Result<PermissionGrant, BoxError> {
        let context = request
            .permission_context()
            .ok_or("missing permissions capability")?;
        let grant = self
            .ledger
            .lock()
            .grants
            .get(&context.0)
            .cloned()
            .ok_or("unknown permission context")?;
        if request.from != grant.account {
            return Err("permission belongs to another account".into());
        }
        let allowed: Vec<Address> = grant
            .policies
            .iter()
            .filter(|p| p.policy_type == "allowed-contract-selector")
            .filter_map(|p| serde_json::from_value(p.data["contract"].clone()).ok())
            .collect();
        for call in &request.calls {
            if !allowed.contains(&call.to) {
                return Err(format!("call to {} is outside the granted scope", call.to).into());
            }
        }
        Ok(grant)
    }

    fn record_batch(&self, request: &SendCallsRequest) -> CallBatchId {
        let mut ledger = self.ledger.lock();
        ledger.nonce += 1;
        let id = match self.batch_id_override.lock().clone() {
            Some(id) => CallBatchId::new(id),
            None => CallBatchId::new(keccak256(ledger.nonce.to_be_bytes()).to_string()),
        };
        ledger.batches.insert(
            id.as_str().to_string(),
            Batch {
                polls_until_final: self.pending_polls.load(Ordering::SeqCst),
                final_status: *self.final_status.lock(),
            },
        );
        ledger.requests.push(request.clone());
        self.send_count.fetch_add(1, Ordering::SeqCst);
        id
    }
}

/// Transaction hash the mock reports for a confirmed batch
pub fn expected_tx_hash(id: &CallBatchId) -> B256 {
    keccak256(id.as_str().as_bytes())
}

#[async_trait]
impl WalletConnector for MockWallet {
    async fn connect(&self, choice: &ConnectorChoice) -> Result<Address, BoxError> {
        Self::pass_gate(&self.connect_gate, &self.connect_entered).await;
        if self.reject_connect.load(Ordering::SeqCst) {
            return Err("user rejected the connection".into());
        }
        if choice.preference == WalletPreference::SmartWalletOnly
            && !self.smart_wallet.load(Ordering::SeqCst)
        {
            return Err("no smart wallet available".into());
        }
        Ok(self.account)
    }

    async fn disconnect(&self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[async_trait]
impl PermissionIssuer for MockWallet {
    async fn grant_permissions(
        &self,
        request: &PermissionRequest,
    ) -> Result<PermissionGrant, BoxError> {
        Self::pass_gate(&self.grant_gate, &self.grant_entered).await;
        if self.reject_grant.load(Ordering::SeqCst) {
            return Err("user rejected the permission request".into());
        }
        if request.permissions.is_empty() {
            return Err("no permissions requested".into());
        }

        let n = self.grant_count.fetch_add(1, Ordering::SeqCst) as u64;
        let context = PermissionContext::new(B256::from(U256::from(n + 1)).to_vec());
        let grant = PermissionGrant::from_request(request, context.clone());
        self.ledger.lock().grants.insert(context.0, grant.clone());
        Ok(grant)
    }
}

#[async_trait]
impl CallSubmitter for MockWallet {
    async fn send_calls(&self, request: &SendCallsRequest) -> Result<CallBatchId, BoxError> {
        Self::pass_gate(&self.send_gate, &self.send_entered).await;
        if self.reject_send.load(Ordering::SeqCst) {
            return Err("wallet refused the batch".into());
        }
        self.check_scope(request)?;
        Ok(self.record_batch(request))
    }

    async fn prepare_calls(&self, request: &SendCallsRequest) -> Result<PreparedCalls, BoxError> {
        self.check_scope(request)?;
        let mut ledger = self.ledger.lock();
        ledger.nonce += 1;
        let mut preimage = serde_json::to_vec(request)?;
        preimage.extend_from_slice(&ledger.nonce.to_be_bytes());
        let hash = keccak256(preimage);
        ledger.prepared.insert(hash, request.clone());
        Ok(PreparedCalls {
            hash,
            context: json!({ "nonce": ledger.nonce }),
        })
    }

    async fn send_prepared_calls(
        &self,
        prepared: PreparedCalls,
        signature: Bytes,
    ) -> Result<CallBatchId, BoxError> {
        Self::pass_gate(&self.send_gate, &self.send_entered).await;
        if self.reject_send.load(Ordering::SeqCst) {
            return Err("wallet refused the batch".into());
        }
        let request = self
            .ledger
            .lock()
            .prepared
            .remove(&prepared.hash)
            .ok_or("unknown prepared batch")?;
        let grant = self.check_scope(&request)?;

        let key = VerifyingKey::from_sec1_bytes(&grant.signer.to_sec1_uncompressed())?;
        let signature = Signature::from_slice(&signature)?;
        key.verify_prehash(prepared.hash.as_slice(), &signature)?;

        Ok(self.record_batch(&request))
    }

    async fn get_calls_status(&self, id: &CallBatchId) -> Result<CallBatchStatus, BoxError> {
        Self::pass_gate(&self.status_gate, &self.status_entered).await;
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing_status_queries.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_status_queries.store(failing - 1, Ordering::SeqCst);
            return Err("connection reset".into());
        }
        let mut ledger = self.ledger.lock();
        let batch = ledger
            .batches
            .get_mut(id.as_str())
            .ok_or("unknown call batch")?;
        if batch.polls_until_final > 0 {
            batch.polls_until_final -= 1;
            return Ok(CallBatchStatus::pending());
        }
        let receipts = match batch.final_status {
            CallStatus::Confirmed => vec![Receipt {
                transaction_hash: expected_tx_hash(id),
                block_hash: None,
                block_number: None,
            }],
            _ => Vec::new(),
        };
        Ok(CallBatchStatus {
            status: batch.final_status,
            receipts,
        })
    }
}

pub fn test_config(backend: SubmissionBackend) -> SessionConfig {
    SessionConfig::default()
        .with_backend(backend)
        .with_poll_interval(Duration::from_millis(5))
}

pub fn setup_flow(backend: SubmissionBackend) -> (Arc<MockWallet>, Arc<SessionFlow>) {
    let wallet = Arc::new(MockWallet::new());
    let flow = Arc::new(SessionFlow::with_wallet(test_config(backend), wallet.clone()));
    (wallet, flow)
}

/// A flow already connected and holding a grant
pub async fn granted_flow(backend: SubmissionBackend) -> (Arc<MockWallet>, Arc<SessionFlow>) {
    let (wallet, flow) = setup_flow(backend);
    flow.connect(&ConnectorChoice::default())
        .await
        .expect("connect");
    flow.request_permission().await.expect("grant");
    (wallet, flow)
}
