//! Outbound adapters implementing domain ports.
//!
//! - **memory**: in-process document store implementing both store ports
//! - **file_cache**: cap-std directory cache implementing the local port
//! - **http_remote**: reqwest REST client implementing the remote port
//! - **probe**: HTTP connectivity probe
//!
//! Adapters translate between documents and their medium. They contain no
//! routing or dual-write logic.

pub mod file_cache;
pub mod http_remote;
pub mod memory;
pub mod probe;

pub use file_cache::FileLocalStore;
pub use http_remote::{HttpRemoteStore, HttpRemoteStoreBuildError};
pub use memory::InMemoryDocumentStore;
pub use probe::HttpNetworkProbe;
