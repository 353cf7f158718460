//! Capability connections and their scoped release

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::task::TaskTracker;

use super::registry::CapabilityProvider;

/// An open connection to one capability provider
#[async_trait]
pub trait CapabilitySession: Send {
    /// Name of the provider this session is connected to
    fn capability(&self) -> &str;

    /// Tear the connection down
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens sessions to capability providers
#[async_trait]
pub trait CapabilityConnector: Send + Sync {
    async fn connect(&self, provider: &CapabilityProvider) -> Result<Box<dyn CapabilitySession>>;
}

/// The capability sessions held open by one agent
///
/// Sessions are closed exactly once: by [`ConnectionScope::release`] on the
/// normal path, or from `Drop` when the owning future was cancelled before
/// it could release. A release started from `Drop` runs as a task on the
/// scope's [`TaskTracker`], so whoever cancelled the owner can wait for it.
pub struct ConnectionScope {
    owner: String,
    sessions: Vec<Box<dyn CapabilitySession>>,
    releases: Option<TaskTracker>,
}

impl ConnectionScope {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            sessions: Vec::new(),
            releases: None,
        }
    }

    /// Track releases started from `Drop` on `releases`
    pub fn tracked(owner: impl Into<String>, releases: TaskTracker) -> Self {
        let mut scope = Self::new(owner);
        scope.releases = Some(releases);
        scope
    }

    pub fn push(&mut self, session: Box<dyn CapabilitySession>) {
        self.sessions.push(session);
    }

    /// Names of the connected capabilities, in acquisition order
    pub fn capabilities(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.capability()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Close every session, most recently opened first
    pub async fn release(mut self) {
        let sessions = std::mem::take(&mut self.sessions);
        close_all(&self.owner, sessions).await;
    }
}

async fn close_all(owner: &str, sessions: Vec<Box<dyn CapabilitySession>>) {
    for session in sessions.into_iter().rev() {
        let capability = session.capability().to_string();
        match session.close().await {
            Ok(()) => tracing::debug!("Agent '{}': closed capability '{}'", owner, capability),
            Err(e) => tracing::warn!(
                "Agent '{}': failed to close capability '{}': {:#}",
                owner,
                capability,
                e
            ),
        }
    }
}

impl Drop for ConnectionScope {
    fn drop(&mut self) {
        if self.sessions.is_empty() {
            return;
        }

        let sessions = std::mem::take(&mut self.sessions);
        let owner = std::mem::take(&mut self.owner);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(
                    "Agent '{}': releasing {} capability session(s) after cancellation",
                    owner,
                    sessions.len()
                );
                let release = async move { close_all(&owner, sessions).await };
                match self.releases.take() {
                    Some(releases) => {
                        releases.spawn_on(release, &handle);
                    }
                    None => {
                        handle.spawn(release);
                    }
                }
            }
            Err(_) => {
                tracing::warn!(
                    "Agent '{}': no runtime to close {} capability session(s), dropping them",
                    owner,
                    sessions.len()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    struct RecordingSession {
        name: String,
        closed: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl CapabilitySession for RecordingSession {
        fn capability(&self) -> &str {
            &self.name
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.closed.lock().unwrap().push(self.name.clone());
            if self.fail {
                anyhow::bail!("provider exited uncleanly");
            }
            Ok(())
        }
    }

    fn scope_with(names: &[&str], closed: &Arc<Mutex<Vec<String>>>) -> ConnectionScope {
        let mut scope = ConnectionScope::new("tester");
        for name in names {
            scope.push(Box::new(RecordingSession {
                name: name.to_string(),
                closed: Arc::clone(closed),
                fail: *name == "flaky",
            }));
        }
        scope
    }

    #[tokio::test]
    async fn test_release_closes_in_reverse_order() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let scope = scope_with(&["filesystem", "fetch"], &closed);
        assert_eq!(scope.capabilities(), vec!["filesystem", "fetch"]);

        scope.release().await;
        assert_eq!(*closed.lock().unwrap(), vec!["fetch", "filesystem"]);
    }

    #[tokio::test]
    async fn test_close_error_does_not_stop_release() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let scope = scope_with(&["filesystem", "flaky", "fetch"], &closed);

        scope.release().await;
        assert_eq!(closed.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_drop_releases_on_runtime() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let scope = scope_with(&["filesystem"], &closed);

        drop(scope);
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(*closed.lock().unwrap(), vec!["filesystem"]);
    }

    #[tokio::test]
    async fn test_tracked_drop_release_can_be_awaited() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let releases = TaskTracker::new();
        let mut scope = ConnectionScope::tracked("tester", releases.clone());
        for name in ["filesystem", "fetch"] {
            scope.push(Box::new(RecordingSession {
                name: name.to_string(),
                closed: Arc::clone(&closed),
                fail: false,
            }));
        }

        drop(scope);
        assert_eq!(releases.len(), 1);
        releases.close();
        releases.wait().await;

        assert_eq!(*closed.lock().unwrap(), vec!["fetch", "filesystem"]);
    }

    #[tokio::test]
    async fn test_release_then_drop_closes_once() {
        let count = Arc::new(AtomicUsize::new(0));

        struct Counted(Arc<AtomicUsize>);

        #[async_trait]
        impl CapabilitySession for Counted {
            fn capability(&self) -> &str {
                "fetch"
            }
            async fn close(self: Box<Self>) -> Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let mut scope = ConnectionScope::new("tester");
        scope.push(Box::new(Counted(Arc::clone(&count))));
        scope.release().await;
        tokio::task::yield_now().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
