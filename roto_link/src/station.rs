//! Station connectivity state machine.
//!
//! Association with the access point is driven by three external events —
//! `StationStart`, `Disconnected`, `GotAddress` — delivered on a serialized
//! queue and consumed by a single task, so no two transitions ever run
//! concurrently. Each transition is a pure function of (state, event)
//! producing the next state plus at most one side effect (a connect attempt
//! issued through the [`StationDriver`] seam), which makes the whole
//! machine testable without a network stack.
//!
//! Startup blocks on the [`wait_ready`] signal until the machine reaches
//! `Connected` or `Failed` — no timeout beyond the retry budget. `Failed`
//! is terminal for the session and must never stop position regulation.

use std::collections::VecDeque;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Connectivity lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Station not started.
    Idle,
    /// Connect attempt outstanding.
    Connecting,
    /// Associated with an address.
    Connected,
    /// Retry budget exhausted — terminal for this session.
    Failed,
}

/// External event consumed by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Station stack came up.
    StationStart,
    /// Association lost or attempt failed.
    Disconnected,
    /// Association complete, address acquired.
    GotAddress,
}

/// Side effect commanded by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No side effect.
    None,
    /// Issue a connect attempt through the driver.
    Connect,
}

/// Result of a transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Transition accepted — next state and commanded side effect.
    Changed {
        /// State after the event.
        next: LinkState,
        /// Side effect to carry out.
        action: Action,
    },
    /// Event not valid in the current state — reason.
    Rejected(&'static str),
}

/// The connectivity state machine with its bounded retry budget.
#[derive(Debug, Clone)]
pub struct StationFsm {
    state: LinkState,
    retries: u32,
    max_retries: u32,
}

impl StationFsm {
    /// Create a machine in `Idle` with the given retry budget.
    pub const fn new(max_retries: u32) -> Self {
        Self {
            state: LinkState::Idle,
            retries: 0,
            max_retries,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    /// Consecutive reconnect attempts since the last address acquisition.
    #[inline]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    /// Attempt a transition given an event.
    pub fn handle_event(&mut self, event: LinkEvent) -> Transition {
        use LinkEvent::*;
        use LinkState::*;

        let (next, action) = match (self.state, event) {
            // Idle → Connecting: first connect attempt.
            (Idle, StationStart) => (Connecting, Action::Connect),

            // Association lost: retry inside the budget, fail beyond it.
            (Connecting | Connected, Disconnected) => {
                self.retries += 1;
                if self.retries >= self.max_retries {
                    (Failed, Action::None)
                } else {
                    (Connecting, Action::Connect)
                }
            }

            // Address acquired: budget replenished.
            (Connecting | Connected, GotAddress) => {
                self.retries = 0;
                (Connected, Action::None)
            }

            (Failed, _) => return Transition::Rejected("Failed is terminal for this session"),
            (Idle, _) => return Transition::Rejected("Idle: only StationStart allowed"),
            (_, StationStart) => return Transition::Rejected("station already started"),
        };

        self.state = next;
        Transition::Changed { next, action }
    }
}

/// Interface to the station supplicant.
///
/// `connect` issues an asynchronous association attempt; the outcome comes
/// back later as a [`LinkEvent`] on the event queue.
pub trait StationDriver: Send {
    /// Issue one connect attempt.
    fn connect(&mut self);
}

/// Scripted simulation driver.
///
/// Each connect attempt reports the next scripted outcome back onto the
/// event queue; once the script runs dry every attempt succeeds. With an
/// empty script this doubles as the no-hardware default driver.
///
/// The driver only holds a weak sender: the queue closes (and the station
/// task ends) as soon as the daemon drops its own sender, mid-retry or not.
pub struct ScriptedStation {
    outcomes: VecDeque<LinkEvent>,
    events: mpsc::WeakUnboundedSender<LinkEvent>,
}

impl ScriptedStation {
    /// Driver replaying `outcomes`, then succeeding.
    pub fn new(
        events: &mpsc::UnboundedSender<LinkEvent>,
        outcomes: impl IntoIterator<Item = LinkEvent>,
    ) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            events: events.downgrade(),
        }
    }

    /// Driver whose every attempt succeeds immediately.
    pub fn immediate(events: &mpsc::UnboundedSender<LinkEvent>) -> Self {
        Self::new(events, [])
    }
}

impl StationDriver for ScriptedStation {
    fn connect(&mut self) {
        let outcome = self.outcomes.pop_front().unwrap_or(LinkEvent::GotAddress);
        // Queue gone means shutdown; nothing left to report to.
        if let Some(events) = self.events.upgrade() {
            let _ = events.send(outcome);
        }
    }
}

/// Startup readiness signal: `None` until the machine resolves.
pub type ReadySender = watch::Sender<Option<LinkState>>;
/// Receiving half of the readiness signal.
pub type ReadyReceiver = watch::Receiver<Option<LinkState>>;

/// Create an unresolved readiness signal pair.
pub fn ready_signal() -> (ReadySender, ReadyReceiver) {
    watch::channel(None)
}

/// Block until connectivity resolves to `Connected` or `Failed`.
///
/// Returns `None` if the station task went away first (process shutdown) —
/// the only way out besides resolution, since the wait itself has no
/// timeout.
pub async fn wait_ready(ready: &mut ReadyReceiver) -> Option<LinkState> {
    loop {
        if let Some(state) = *ready.borrow_and_update() {
            return Some(state);
        }
        if ready.changed().await.is_err() {
            return None;
        }
    }
}

/// Consume the serialized event queue and drive the state machine.
///
/// Runs until the queue closes (shutdown) or the machine reaches `Failed`.
/// The readiness signal latches on the first resolution; regulation is
/// never touched from here.
pub async fn run_station<D: StationDriver>(
    mut fsm: StationFsm,
    mut driver: D,
    mut events: mpsc::UnboundedReceiver<LinkEvent>,
    ready: ReadySender,
) {
    while let Some(event) = events.recv().await {
        match fsm.handle_event(event) {
            Transition::Changed { next, action } => {
                debug!(?event, state = ?next, retries = fsm.retries(), "link transition");
                if action == Action::Connect {
                    driver.connect();
                }
                match next {
                    LinkState::Connected => {
                        info!("station associated, address acquired");
                        ready.send_replace(Some(LinkState::Connected));
                    }
                    LinkState::Failed => {
                        warn!(
                            attempts = fsm.retries(),
                            "retry budget exhausted, link failed for this session"
                        );
                        ready.send_replace(Some(LinkState::Failed));
                        return;
                    }
                    _ => {}
                }
            }
            Transition::Rejected(reason) => {
                debug!(?event, reason, "link event rejected");
            }
        }
    }
}
