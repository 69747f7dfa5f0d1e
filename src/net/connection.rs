//! Connection lifecycle tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count open connections for shutdown reporting and metrics
//! - Track per-connection request activity for idle detection

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::observability::metrics;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts open connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new open connection. Returns a guard that decrements on drop.
    pub fn track(&self) -> ConnectionGuard {
        let count = self.active_count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_active_connections(count);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
        }
    }

    /// Get current open connection count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements active count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
}

impl ConnectionGuard {
    /// Get this connection's ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let count = self.active_count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::record_active_connections(count);
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}

/// Request activity on one connection.
///
/// The connection is idle when no request is in flight; the idle clock starts
/// when the last request finished (or when the connection opened).
#[derive(Debug)]
pub struct ConnectionActivity {
    epoch: Instant,
    last_active_ms: AtomicU64,
    in_flight: AtomicUsize,
    requests_seen: AtomicU64,
    first_request: Notify,
}

impl ConnectionActivity {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            epoch: Instant::now(),
            last_active_ms: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            requests_seen: AtomicU64::new(0),
            first_request: Notify::new(),
        })
    }

    /// Mark a request as started. The returned guard marks it finished.
    pub fn begin_request(self: &Arc<Self>) -> RequestGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.touch();
        if self.requests_seen.fetch_add(1, Ordering::SeqCst) == 0 {
            // Stores a permit if nobody is waiting yet.
            self.first_request.notify_one();
        }
        RequestGuard {
            activity: Arc::clone(self),
        }
    }

    /// True once the connection has started at least one request.
    pub fn has_served(&self) -> bool {
        self.requests_seen.load(Ordering::SeqCst) > 0
    }

    /// Resolves when the first request on this connection starts.
    pub async fn first_request(&self) {
        if !self.has_served() {
            self.first_request.notified().await;
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        let elapsed = self.epoch.elapsed().as_millis() as u64;
        self.last_active_ms.store(elapsed, Ordering::SeqCst);
    }

    fn last_active(&self) -> Instant {
        self.epoch + Duration::from_millis(self.last_active_ms.load(Ordering::SeqCst))
    }

    /// Earliest instant at which the connection could be considered idle.
    pub fn idle_deadline(&self, idle_timeout: Duration) -> Instant {
        if self.in_flight() > 0 {
            Instant::now() + idle_timeout
        } else {
            self.last_active() + idle_timeout
        }
    }

    /// True if no request is in flight and none finished within `idle_timeout`.
    pub fn is_idle(&self, idle_timeout: Duration) -> bool {
        self.in_flight() == 0 && self.last_active().elapsed() >= idle_timeout
    }
}

/// Marks one request on a connection as in flight until dropped.
#[derive(Debug)]
pub struct RequestGuard {
    activity: Arc<ConnectionActivity>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.activity.touch();
        self.activity.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_unique() {
        let id1 = ConnectionId::new();
        let id2 = ConnectionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn connection_tracker_counts() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.active_count(), 0);

        let guard1 = tracker.track();
        assert_eq!(tracker.active_count(), 1);

        let guard2 = tracker.track();
        assert_eq!(tracker.active_count(), 2);
        assert_ne!(guard1.id(), guard2.id());

        drop(guard1);
        assert_eq!(tracker.active_count(), 1);

        drop(guard2);
        assert_eq!(tracker.active_count(), 0);
    }

    #[tokio::test]
    async fn first_request_wakes_waiter() {
        let activity = ConnectionActivity::new();
        assert!(!activity.has_served());

        let waiter = {
            let activity = Arc::clone(&activity);
            tokio::spawn(async move { activity.first_request().await })
        };
        tokio::task::yield_now().await;

        let request = activity.begin_request();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(activity.has_served());

        drop(request);
        // Later calls return at once.
        tokio::time::timeout(Duration::from_millis(100), activity.first_request())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn first_request_before_wait_is_not_missed() {
        let activity = ConnectionActivity::new();
        drop(activity.begin_request());
        tokio::time::timeout(Duration::from_millis(100), activity.first_request())
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn idle_only_without_requests_in_flight() {
        let activity = ConnectionActivity::new();
        let idle = Duration::from_secs(60);
        assert!(!activity.is_idle(idle));

        let request = activity.begin_request();
        tokio::time::advance(Duration::from_secs(120)).await;
        assert!(!activity.is_idle(idle));
        assert!(activity.idle_deadline(idle) > Instant::now());

        drop(request);
        assert!(!activity.is_idle(idle));
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(activity.is_idle(idle));
        assert!(activity.idle_deadline(idle) <= Instant::now());
    }
}
