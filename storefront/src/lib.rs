//! Dual-store synchronisation core for an offline-capable storefront.
//!
//! Reads are routed between a device cache and the authoritative backend
//! according to connectivity probed once per session; writes are mirrored
//! into both stores concurrently and reported as a single [`domain::Outcome`].

pub mod config;
pub mod domain;
pub mod outbound;
pub mod session;
pub mod telemetry;

pub use config::{SettingsError, SyncSettings};
pub use session::{SessionPorts, SessionSnapshot, StorefrontSession};
