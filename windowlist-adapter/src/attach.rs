use std::fmt;
use std::sync::Arc;

use crate::element::{ScrollArea, ScrollProbe};

/// Default re-probe interval while the container is being resolved.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Where container discovery currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachState {
    /// Discovery is on but no probe attempt has happened yet.
    Unattached,
    /// The probe came up empty at least once; retrying on the interval.
    Resolving,
    /// A usable container was found.
    Attached,
    /// Discovery is switched off; no retries are pending.
    Disabled,
}

/// Discovers the scroll container through an injected probe.
///
/// The container commonly mounts after the windowing engine initializes
/// (tab panels, lazy-rendered routes), so a missing container is not an
/// error: the resolver keeps re-probing on a fixed interval until the
/// element appears, discovery is disabled, or the owner is dropped. All
/// waiting is timestamp-driven re-polling; cancellation is a plain state
/// change and there is no timer handle to leak.
pub struct AttachmentResolver {
    probe: ScrollProbe,
    retry_delay_ms: u64,
    state: State,
}

enum State {
    Unattached,
    Resolving { retry_at_ms: u64 },
    Attached,
    Disabled,
}

impl AttachmentResolver {
    pub fn new(probe: ScrollProbe, retry_delay_ms: u64) -> Self {
        Self {
            probe,
            retry_delay_ms: retry_delay_ms.max(1),
            state: State::Disabled,
        }
    }

    pub fn state(&self) -> AttachState {
        match self.state {
            State::Unattached => AttachState::Unattached,
            State::Resolving { .. } => AttachState::Resolving,
            State::Attached => AttachState::Attached,
            State::Disabled => AttachState::Disabled,
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, State::Attached)
    }

    /// Starts (or restarts) discovery with an immediate probe attempt.
    ///
    /// Returns the container when the probe finds one right away.
    pub fn enable(&mut self, now_ms: u64) -> Option<Arc<dyn ScrollArea>> {
        self.state = State::Unattached;
        self.try_probe(now_ms)
    }

    /// Advances discovery: re-probes once the retry interval has elapsed.
    /// A no-op when attached or disabled.
    pub fn poll(&mut self, now_ms: u64) -> Option<Arc<dyn ScrollArea>> {
        match self.state {
            State::Unattached => self.try_probe(now_ms),
            State::Resolving { retry_at_ms } if now_ms >= retry_at_ms => self.try_probe(now_ms),
            _ => None,
        }
    }

    /// Cancels discovery and any pending retry. Re-enabling later starts a
    /// fresh search from scratch.
    pub fn disable(&mut self) {
        self.state = State::Disabled;
    }

    fn try_probe(&mut self, now_ms: u64) -> Option<Arc<dyn ScrollArea>> {
        match (self.probe)() {
            Some(element) => {
                self.state = State::Attached;
                Some(element)
            }
            None => {
                self.state = State::Resolving {
                    retry_at_ms: now_ms.saturating_add(self.retry_delay_ms),
                };
                None
            }
        }
    }
}

impl fmt::Debug for AttachmentResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentResolver")
            .field("state", &self.state())
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish_non_exhaustive()
    }
}
