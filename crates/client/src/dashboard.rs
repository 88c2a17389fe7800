//! Admin dashboard session.
//!
//! [`DashboardSession`] owns the shared [`Dashboard`] view state, refreshes
//! it from the API on demand and, while auto-refresh is on, from a
//! background task on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use staffdata_core::dashboard::{Dashboard, AUTO_REFRESH_INTERVAL};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::gateway::SubmissionGateway;

/// Shown on the dashboard when a fetch fails. The previous list stays visible.
pub const MSG_FETCH_FAILED: &str = "Failed to load submissions. Please try again.";

// ---------------------------------------------------------------------------
// DashboardSession
// ---------------------------------------------------------------------------

pub struct DashboardSession {
    gateway: SubmissionGateway,
    state: Arc<RwLock<Dashboard>>,
    refresh_interval: Duration,
    auto: Option<AutoRefresh>,
}

struct AutoRefresh {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl DashboardSession {
    pub fn new(gateway: SubmissionGateway) -> Self {
        Self::with_interval(gateway, AUTO_REFRESH_INTERVAL)
    }

    /// Use a custom auto-refresh period instead of [`AUTO_REFRESH_INTERVAL`].
    ///
    /// Auto-refresh starts on by default, so this spawns the refresh task and
    /// must be called from within a Tokio runtime.
    pub fn with_interval(gateway: SubmissionGateway, refresh_interval: Duration) -> Self {
        let dashboard = Dashboard::new();
        let auto_on = dashboard.auto_refresh();
        let mut session = Self {
            gateway,
            state: Arc::new(RwLock::new(dashboard)),
            refresh_interval,
            auto: None,
        };
        if auto_on {
            session.auto = Some(session.spawn_auto_refresh());
        }
        session
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Dashboard> {
        self.state.read().await
    }

    /// Filters, paging and selection go through the write guard.
    pub async fn write(&self) -> RwLockWriteGuard<'_, Dashboard> {
        self.state.write().await
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.auto.is_some()
    }

    /// Fetch the full list once and replace the dashboard contents.
    ///
    /// On failure the error is recorded on the dashboard and returned; the
    /// previously loaded list is kept.
    pub async fn refresh(&self) -> Result<usize, ClientError> {
        refresh_into(&self.gateway, &self.state).await
    }

    /// Turn the periodic refresh on or off.
    ///
    /// Enabling is idempotent. Disabling waits for the background task to
    /// stop, so no refresh lands after this returns.
    pub async fn set_auto_refresh(&mut self, enabled: bool) {
        self.state.write().await.set_auto_refresh(enabled);

        match (enabled, self.auto.take()) {
            (true, Some(running)) => self.auto = Some(running),
            (true, None) => self.auto = Some(self.spawn_auto_refresh()),
            (false, Some(running)) => {
                running.cancel.cancel();
                if let Err(e) = running.handle.await {
                    tracing::error!(error = %e, "Auto-refresh task ended abnormally");
                }
            }
            (false, None) => {}
        }
    }

    fn spawn_auto_refresh(&self) -> AutoRefresh {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let gateway = self.gateway.clone();
        let state = Arc::clone(&self.state);
        let period = self.refresh_interval;

        let handle = tokio::spawn(async move {
            // First tick one period from now; the caller refreshes on open.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("Dashboard auto-refresh stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = refresh_into(&gateway, &state).await {
                            tracing::warn!(error = %e, "Scheduled dashboard refresh failed");
                        }
                    }
                }
            }
        });

        tracing::debug!(interval_ms = period.as_millis() as u64, "Dashboard auto-refresh started");
        AutoRefresh { cancel, handle }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        if let Some(auto) = self.auto.take() {
            auto.cancel.cancel();
        }
    }
}

/// The lock is not held across the request; whichever fetch finishes last
/// decides the list.
async fn refresh_into(
    gateway: &SubmissionGateway,
    state: &RwLock<Dashboard>,
) -> Result<usize, ClientError> {
    state.write().await.begin_fetch();

    match gateway.list_submissions().await {
        Ok(list) => {
            let count = list.len();
            state.write().await.replace_all(list, Utc::now());
            tracing::debug!(count, "Dashboard refreshed");
            Ok(count)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch submissions");
            state.write().await.fetch_failed(MSG_FETCH_FAILED);
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::{serve, submission_json};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn list_router(hits: Arc<AtomicUsize>, failing: Arc<AtomicBool>) -> Router {
        Router::new().route(
            "/api/v1/get-data",
            get(move || {
                let hits = Arc::clone(&hits);
                let failing = Arc::clone(&failing);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    if failing.load(Ordering::SeqCst) {
                        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "success": true,
                            "data": [
                                submission_json(1, "Older", "2025-03-01T08:00:00Z"),
                                submission_json(2, "Newer", "2025-03-05T11:07:00Z"),
                            ]
                        })),
                    )
                }
            }),
        )
    }

    async fn session(interval: Duration) -> (DashboardSession, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(AtomicBool::new(false));
        let url = serve(list_router(Arc::clone(&hits), Arc::clone(&failing))).await;
        let session = DashboardSession::with_interval(SubmissionGateway::new(url), interval);
        (session, hits, failing)
    }

    #[tokio::test]
    async fn refresh_loads_newest_first() {
        let (s, _, _) = session(AUTO_REFRESH_INTERVAL).await;

        assert_eq!(s.refresh().await.unwrap(), 2);
        let dash = s.read().await;
        let names: Vec<_> = dash.all().iter().map(|x| x.fields.name.as_str()).collect();
        assert_eq!(names, ["Newer", "Older"]);
        assert!(!dash.is_loading());
        assert!(dash.last_updated().is_some());
        assert_eq!(dash.last_error(), None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let (s, _, failing) = session(AUTO_REFRESH_INTERVAL).await;
        s.refresh().await.unwrap();

        failing.store(true, Ordering::SeqCst);
        assert!(s.refresh().await.is_err());

        let dash = s.read().await;
        assert_eq!(dash.all().len(), 2);
        assert_eq!(dash.last_error(), Some(MSG_FETCH_FAILED));
        assert!(!dash.is_loading());
    }

    #[tokio::test]
    async fn auto_refresh_ticks_until_disabled() {
        let (mut s, hits, _) = session(Duration::from_millis(40)).await;

        s.set_auto_refresh(true).await;
        assert!(s.is_auto_refreshing());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(hits.load(Ordering::SeqCst) >= 2);

        s.set_auto_refresh(false).await;
        assert!(!s.is_auto_refreshing());
        assert!(!s.read().await.auto_refresh());
        let stopped_at = hits.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(hits.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test]
    async fn new_session_refreshes_on_its_own() {
        let (s, hits, _) = session(Duration::from_millis(40)).await;

        assert!(s.is_auto_refreshing());
        assert!(s.read().await.auto_refresh());
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(hits.load(Ordering::SeqCst) >= 1);
        assert!(s.read().await.last_updated().is_some());
    }

    #[tokio::test]
    async fn failed_scheduled_refresh_is_recorded() {
        let (s, hits, failing) = session(Duration::from_millis(40)).await;
        failing.store(true, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(hits.load(Ordering::SeqCst) >= 1);
        let dash = s.read().await;
        assert_eq!(dash.last_error(), Some(MSG_FETCH_FAILED));
    }

    #[tokio::test]
    async fn enabling_twice_keeps_one_task() {
        let (mut s, hits, _) = session(Duration::from_millis(100)).await;

        s.set_auto_refresh(true).await;
        s.set_auto_refresh(true).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        s.set_auto_refresh(false).await;

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn filters_apply_to_refreshed_list() {
        let (s, _, _) = session(AUTO_REFRESH_INTERVAL).await;
        s.refresh().await.unwrap();

        s.write().await.set_search("newer");
        let dash = s.read().await;
        assert_eq!(dash.filtered().len(), 1);
        assert_eq!(dash.page(), 1);
    }
}
