//! Concurrent writes to the local cache and the backend.
//!
//! A logical write succeeds only when both stores accept it. The two
//! sub-writes are issued together and joined; neither waits on the other's
//! outcome, and a store that committed is never rolled back when its sibling
//! fails. Each invocation walks `InFlight -> Committed | PartiallyFailed`.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use serde_json::Value;
use tracing::{debug, warn};

use super::ports::{LocalStore, RemoteStore};
use super::{
    Collection, CollectionPath, EntityKey, Error, NetworkAvailability, Outcome, SyncableEntity,
    UserId, encode,
};

/// Whether a write may proceed while the session is offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteGate {
    /// Rejected with `NetworkUnavailable` when offline; neither store is
    /// touched.
    RequiresNetwork,
    /// Both stores are attempted regardless of connectivity.
    Ungated,
}

/// Terminal and transitional states of one dual-write, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    InFlight,
    Committed,
    PartiallyFailed,
}

impl WriteState {
    fn as_str(self) -> &'static str {
        match self {
            Self::InFlight => "in_flight",
            Self::Committed => "committed",
            Self::PartiallyFailed => "partially_failed",
        }
    }
}

/// Which store a sub-write targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Remote,
    Local,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Completed sub-write together with the order in which it finished.
struct Finished {
    side: Side,
    outcome: Outcome<()>,
    position: u8,
}

/// Issues one logical write to both stores and aggregates the outcome.
///
/// Failures are never retried here; callers own any retry policy.
pub struct DualWriteCoordinator<L, R> {
    local: Arc<L>,
    remote: Arc<R>,
    network: NetworkAvailability,
}

impl<L, R> Clone for DualWriteCoordinator<L, R> {
    fn clone(&self) -> Self {
        Self {
            local: Arc::clone(&self.local),
            remote: Arc::clone(&self.remote),
            network: self.network,
        }
    }
}

impl<L, R> DualWriteCoordinator<L, R> {
    /// Build a coordinator for one session.
    pub fn new(local: Arc<L>, remote: Arc<R>, network: NetworkAvailability) -> Self {
        Self {
            local,
            remote,
            network,
        }
    }

    /// Availability this coordinator was built with.
    pub fn network(&self) -> NetworkAvailability {
        self.network
    }

    /// Shared handle to the local store.
    pub fn local(&self) -> &Arc<L> {
        &self.local
    }

    /// Shared handle to the remote store.
    pub fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    fn admit(&self, gate: WriteGate, operation: &str, collection: Collection) -> Outcome<()> {
        if gate == WriteGate::RequiresNetwork && !self.network.is_available() {
            debug!(
                operation,
                collection = collection.as_str(),
                "gated write rejected while offline"
            );
            return Err(Error::network_unavailable());
        }
        Ok(())
    }

    /// Run `remote_op` and `local_op` concurrently and aggregate the result.
    ///
    /// Returns `Ok(())` only if both succeed. When exactly one side fails the
    /// error is `PartialCommit` wrapping that side's cause; when both fail the
    /// cause that was observed first is returned unchanged.
    pub async fn commit<RF, LF>(
        &self,
        operation: &str,
        path: &CollectionPath,
        key: Option<&EntityKey>,
        gate: WriteGate,
        remote_op: RF,
        local_op: LF,
    ) -> Outcome<()>
    where
        RF: Future<Output = Outcome<()>>,
        LF: Future<Output = Outcome<()>>,
    {
        self.admit(gate, operation, path.collection())?;
        let key = key.map(EntityKey::as_str);
        debug!(
            operation,
            collection = %path,
            key,
            state = WriteState::InFlight.as_str(),
            "dual write issued"
        );

        let finished = AtomicU8::new(0);
        let tagged = |side: Side, outcome: Outcome<()>| Finished {
            side,
            outcome,
            position: finished.fetch_add(1, Ordering::Relaxed),
        };
        let (remote, local) = tokio::join!(
            async { tagged(Side::Remote, remote_op.await) },
            async { tagged(Side::Local, local_op.await) },
        );

        let mut failures: Vec<(u8, Side, Error)> = [remote, local]
            .into_iter()
            .filter_map(|done| done.outcome.err().map(|err| (done.position, done.side, err)))
            .collect();
        failures.sort_by_key(|(position, _, _)| *position);
        let mut failures = failures.into_iter();

        match (failures.next(), failures.next()) {
            (None, _) => {
                debug!(
                    operation,
                    collection = %path,
                    key,
                    state = WriteState::Committed.as_str(),
                    "dual write committed"
                );
                Ok(())
            }
            (Some((_, side, cause)), None) => {
                warn!(
                    operation,
                    collection = %path,
                    key,
                    failed_side = side.as_str(),
                    error = %cause,
                    state = WriteState::PartiallyFailed.as_str(),
                    "dual write left stores divergent"
                );
                Err(Error::partial_commit(format!(
                    "{operation} on {path} did not reach both stores: {cause}"
                ))
                .with_cause(cause))
            }
            (Some((_, first_side, first)), Some((_, second_side, second))) => {
                warn!(
                    operation,
                    collection = %path,
                    key,
                    first_side = first_side.as_str(),
                    second_side = second_side.as_str(),
                    error = %first,
                    second_error = %second,
                    state = WriteState::PartiallyFailed.as_str(),
                    "dual write failed on both stores"
                );
                Err(first)
            }
        }
    }
}

impl<L, R> DualWriteCoordinator<L, R>
where
    L: LocalStore,
    R: RemoteStore,
{
    /// Insert or replace `entity` in both stores.
    ///
    /// User-scoped entities are written under `owner`; shared ones ignore it.
    pub async fn put<T: SyncableEntity>(
        &self,
        gate: WriteGate,
        owner: Option<&UserId>,
        entity: &T,
    ) -> Outcome<()> {
        self.admit(gate, "put", T::COLLECTION)?;
        let path = CollectionPath::new(T::COLLECTION, owner)?;
        let document = encode(entity)?;
        self.put_document(gate, &path, &entity.key(), &document)
            .await
    }

    /// Insert or replace a raw document in both stores.
    pub async fn put_document(
        &self,
        gate: WriteGate,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Outcome<()> {
        self.commit(
            "put",
            path,
            Some(key),
            gate,
            async {
                self.remote
                    .put(path, key, document)
                    .await
                    .map_err(Error::from)
            },
            async {
                self.local
                    .put(path, key, document)
                    .await
                    .map_err(Error::from)
            },
        )
        .await
    }

    /// Remove the document stored under `key` from both stores.
    pub async fn delete(
        &self,
        gate: WriteGate,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Outcome<()> {
        self.commit(
            "delete",
            path,
            Some(key),
            gate,
            async { self.remote.delete(path, key).await.map_err(Error::from) },
            async { self.local.delete(path, key).await.map_err(Error::from) },
        )
        .await
    }

    /// Remove every document under `path` from both stores.
    pub async fn clear(&self, gate: WriteGate, path: &CollectionPath) -> Outcome<()> {
        self.commit(
            "clear",
            path,
            None,
            gate,
            async { self.remote.clear(path).await.map_err(Error::from) },
            async { self.local.clear(path).await.map_err(Error::from) },
        )
        .await
    }
}

#[cfg(test)]
#[path = "dual_write_tests.rs"]
mod tests;
