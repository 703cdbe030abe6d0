//! Port for the connectivity check run at session start.

use async_trait::async_trait;

/// Reports whether the backend is reachable right now.
///
/// Consulted once per session; the answer is frozen into a
/// [`crate::domain::NetworkAvailability`] value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// `true` when the backend answered.
    async fn is_network_available(&self) -> bool;
}

/// Fixed answer, for tests and offline tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureNetworkProbe(pub bool);

#[async_trait]
impl NetworkProbe for FixtureNetworkProbe {
    async fn is_network_available(&self) -> bool {
        self.0
    }
}
