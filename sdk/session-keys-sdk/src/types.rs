use alloy_primitives::Address;
use session_keys_state::{CallBatchId, CallBatchStatus};

/// Stable phases of the session authorization flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Disconnected,
    ConnectedNoGrant,
    Granted,
    /// A call batch is outstanding and has not reached a terminal status
    CallSubmitted,
}

/// Which user actions are currently available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub connect: bool,
    pub disconnect: bool,
    pub grant_permission: bool,
    pub send_calls: bool,
}

/// Observable view of the flow, published on every transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSnapshot {
    pub phase: FlowPhase,
    pub account: Option<Address>,
    pub has_grant: bool,
    pub busy: bool,
    /// A permission request is in flight
    pub granting: bool,
    pub call_batch_id: Option<CallBatchId>,
    pub status: Option<CallBatchStatus>,
    /// Explorer link once the latest batch is confirmed
    pub explorer_link: Option<String>,
}

impl FlowSnapshot {
    pub fn disconnected() -> Self {
        Self {
            phase: FlowPhase::Disconnected,
            account: None,
            has_grant: false,
            busy: false,
            granting: false,
            call_batch_id: None,
            status: None,
            explorer_link: None,
        }
    }

    /// Whether the latest batch still awaits a terminal status
    pub fn batch_outstanding(&self) -> bool {
        self.call_batch_id.is_some()
            && !self
                .status
                .as_ref()
                .is_some_and(|s| s.status.is_terminal())
    }

    pub fn controls(&self) -> Controls {
        match self.phase {
            FlowPhase::Disconnected => Controls {
                connect: true,
                ..Controls::default()
            },
            FlowPhase::ConnectedNoGrant => Controls {
                disconnect: true,
                grant_permission: !self.granting,
                ..Controls::default()
            },
            FlowPhase::Granted | FlowPhase::CallSubmitted => Controls {
                disconnect: true,
                send_calls: !self.busy && !self.batch_outstanding(),
                ..Controls::default()
            },
        }
    }
}
