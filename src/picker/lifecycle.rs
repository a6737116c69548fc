//! Lifecycle gate
//!
//! Two-state machine owning the open/closed state of the picker surface.
//! It is the only switch that arms the scroll trigger: triggers read the
//! gate through a `watch` receiver and never change it themselves.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    Closed,
    Open,
}

/// Current phase plus the number of times the surface has been opened
///
/// The open count lets observers tell a reopened surface from one that
/// never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    pub phase: GatePhase,
    pub opened: u64,
}

impl GateState {
    pub fn is_open(&self) -> bool {
        self.phase == GatePhase::Open
    }
}

/// Why the surface closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Selection,
    OutsideInteraction,
    DismissKey,
}

#[derive(Debug)]
pub struct LifecycleGate {
    state: watch::Sender<GateState>,
}

impl Default for LifecycleGate {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleGate {
    pub fn new() -> Self {
        let (state, _) = watch::channel(GateState {
            phase: GatePhase::Closed,
            opened: 0,
        });
        Self { state }
    }

    /// Closed -> Open on explicit user action; returns whether it transitioned
    pub fn open(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.is_open() {
                return false;
            }
            state.phase = GatePhase::Open;
            state.opened += 1;
            true
        })
    }

    /// Open -> Closed; returns whether it transitioned
    pub fn close(&self, reason: CloseReason) -> bool {
        let closed = self.state.send_if_modified(|state| {
            if !state.is_open() {
                return false;
            }
            state.phase = GatePhase::Closed;
            true
        });
        if closed {
            crate::debug_log!(?reason, "picker surface closed");
        }
        #[cfg(not(feature = "debug-logging"))]
        let _ = reason;
        closed
    }

    pub fn state(&self) -> GateState {
        *self.state.borrow()
    }

    /// Whether scroll triggers are armed
    pub fn enabled(&self) -> bool {
        self.state().is_open()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateState> {
        self.state.subscribe()
    }
}
