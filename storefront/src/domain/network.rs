//! Session-scoped network availability.
//!
//! Availability is probed once when a session starts and then injected, by
//! value, into every component that routes on it. A later session probes
//! again and builds new components; nothing is flipped in place.

use super::ports::NetworkProbe;

/// Network availability observed at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkAvailability(bool);

impl NetworkAvailability {
    /// The backend was reachable.
    pub const fn online() -> Self {
        Self(true)
    }

    /// The backend was unreachable or the session was forced offline.
    pub const fn offline() -> Self {
        Self(false)
    }

    /// Whether remote reads and gated writes may proceed.
    pub const fn is_available(self) -> bool {
        self.0
    }

    /// Probe connectivity once, unless `force_offline` is set.
    pub async fn probe(probe: &dyn NetworkProbe, force_offline: bool) -> Self {
        if force_offline {
            tracing::info!("session forced offline; skipping connectivity probe");
            return Self::offline();
        }
        let available = probe.is_network_available().await;
        tracing::info!(available, "connectivity probed for new session");
        Self::from(available)
    }
}

impl From<bool> for NetworkAvailability {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for NetworkAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(if self.0 { "online" } else { "offline" })
    }
}
