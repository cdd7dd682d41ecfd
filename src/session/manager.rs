use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::ConnectionSettings;
use crate::session::store::{CatalogStore, Connector};
use crate::{CatalogError, Result};

/// Owns the one session a process keeps for its whole lifetime.
///
/// The session is established at most once. While an attempt is in flight,
/// other callers wait on it instead of starting their own; if it fails, every
/// caller that waited gets that same error and the manager stays unconnected,
/// so the next caller to arrive afterwards starts a fresh attempt. The session
/// is never closed here: it lives until the hosting container is torn down.
pub struct SessionManager<C: Connector> {
    connector: C,
    settings: ConnectionSettings,
    session: OnceCell<Arc<C::Store>>,
    // Held for the whole of an attempt; keeps the error of the last failed one
    last_failure: Mutex<Option<CatalogError>>,
    failures: AtomicUsize,
    attempts: AtomicUsize,
}

impl<C: Connector> SessionManager<C> {
    pub fn new(connector: C, settings: ConnectionSettings) -> Self {
        Self {
            connector,
            settings,
            session: OnceCell::new(),
            last_failure: Mutex::new(None),
            failures: AtomicUsize::new(0),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Establish the session if it is not already up. Calling this on a
    /// connected manager is a no-op.
    pub async fn connect(&self) -> Result<()> {
        self.session().await.map(|_| ())
    }

    /// The shared session, connecting first when needed
    pub async fn session(&self) -> Result<Arc<C::Store>> {
        if let Some(store) = self.session.get() {
            return Ok(Arc::clone(store));
        }

        let seen = self.failures.load(Ordering::SeqCst);
        let mut last_failure = self.last_failure.lock().await;

        if let Some(store) = self.session.get() {
            return Ok(Arc::clone(store));
        }
        // The attempt we queued behind failed; share its outcome
        if self.failures.load(Ordering::SeqCst) != seen {
            if let Some(e) = last_failure.as_ref() {
                return Err(e.clone());
            }
        }

        match self.open().await {
            Ok(store) => {
                let _ = self.session.set(Arc::clone(&store));
                *last_failure = None;
                Ok(store)
            }
            Err(e) => {
                *last_failure = Some(e.clone());
                self.failures.fetch_add(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn open(&self) -> Result<Arc<C::Store>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "Connecting to {:?} (local data center {}, attempt {})",
            self.settings.contact_points, self.settings.local_dc, attempt
        );

        match self.connector.connect(&self.settings).await {
            Ok(store) => {
                info!("Connected to the cluster, discovered {} nodes", store.node_count());
                Ok(Arc::new(store))
            }
            Err(e) => {
                error!("There was an error trying to connect: {}", e);
                Err(e)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.initialized()
    }

    /// Connector calls made so far, successful or not
    pub fn connection_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<C: Connector> SessionManager<C> {
    /// Kick off the connect at container start without blocking it.
    /// Handlers that arrive before it finishes join the same attempt.
    pub fn spawn_connect(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            // failure is already logged by `open`; the next invocation retries
            let _ = manager.connect().await;
        })
    }
}
