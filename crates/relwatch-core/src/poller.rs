use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use reqwest::Url;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::CheckError;
use crate::observer::{Observers, SubscriptionId};
use crate::release::{
    DEFAULT_API_BASE, GitHubReleases, ReleaseEndpoint, ReleaseInfo, ReleaseSource, user_agent,
};
use crate::schedule::{Schedule, run_schedule};
use crate::state::{PollerState, Status};
use crate::version::VersionString;

const DEFAULT_APP_NAME: &str = "Relwatch";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// How the default HTTP release source is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerOptions {
    pub app_name: String,
    pub api_base: String,
    pub http_timeout: Duration,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

struct Inner {
    state: PollerState,
    observers: Observers,
    scheduled: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    /// Held from snapshot through delivery so observers see transitions in
    /// the order they were applied. Always taken before `inner`.
    publish: Mutex<()>,
    /// Signalled whenever an in-flight check lets go of `is_checking`.
    settled: Notify,
    source: Arc<dyn ReleaseSource>,
    token: CancellationToken,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> PollerState {
        self.lock().state.clone()
    }

    /// Apply `update` under the lock and, if it reports a change, publish the
    /// new snapshot to every observer after the state lock is released.
    ///
    /// Observers may subscribe, unsubscribe or read the state from a callback.
    fn transition(&self, update: impl FnOnce(&mut PollerState) -> bool) -> bool {
        let _publishing = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        let published = {
            let mut inner = self.lock();
            if !update(&mut inner.state) {
                return false;
            }
            (inner.state.clone(), inner.observers.snapshot())
        };

        let (snapshot, callbacks) = published;
        for callback in callbacks {
            callback(&snapshot);
        }
        true
    }
}

/// Holds `is_checking` for the duration of one check. Dropping it without
/// [`CheckingGuard::settle`] still clears the flag.
struct CheckingGuard<'a> {
    shared: &'a Shared,
    settled: bool,
}

impl<'a> CheckingGuard<'a> {
    fn begin(shared: &'a Shared) -> Option<Self> {
        if shared.token.is_cancelled() {
            debug!("Poller has been shut down, ignoring release check");
            return None;
        }

        let started = shared.transition(|state| {
            if state.is_checking {
                return false;
            }
            state.is_checking = true;
            state.last_error = None;
            true
        });

        if started {
            Some(Self {
                shared,
                settled: false,
            })
        } else {
            debug!("Release check already in flight, skipping");
            None
        }
    }

    fn settle(mut self, result: Result<ReleaseInfo, CheckError>) {
        self.settled = true;
        self.shared.transition(|state| {
            apply_result(state, result);
            state.is_checking = false;
            state.last_checked_at = Some(Utc::now());
            true
        });
    }
}

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.shared.transition(|state| {
                state.is_checking = false;
                true
            });
        }
        self.shared.settled.notify_waiters();
    }
}

fn apply_result(state: &mut PollerState, result: Result<ReleaseInfo, CheckError>) {
    let release = match result {
        Ok(release) => release,
        Err(error) => {
            warn!("Release check failed: {error}");
            state.last_error = Some(error);
            return;
        }
    };

    let latest = release.version();
    let update_available = state.current_version.is_older_than(&latest);
    let download_url = match Url::parse(&release.html_url) {
        Ok(url) => Some(url),
        Err(error) => {
            warn!("Ignoring release link '{}': {error}", release.html_url);
            None
        }
    };

    if update_available {
        info!(
            "Update available: {} -> {latest}",
            state.current_version
        );
    } else {
        debug!(
            "Latest release {latest} is not newer than {}",
            state.current_version
        );
    }

    state.latest_version = Some(latest);
    state.release_title = Some(release.title);
    state.release_notes = Some(release.body);
    state.download_url = download_url;
    state.update_available = update_available;
    state.last_error = None;
}

async fn run_check(shared: &Shared) -> PollerState {
    // Registered before `begin` so a check settling in between still wakes us.
    let mut in_flight_settled = std::pin::pin!(shared.settled.notified());
    in_flight_settled.as_mut().enable();

    let Some(guard) = CheckingGuard::begin(shared) else {
        if shared.lock().state.is_checking {
            in_flight_settled.await;
        }
        return shared.snapshot();
    };

    let result = tokio::select! {
        biased;
        () = shared.token.cancelled() => None,
        result = shared.source.latest_release() => Some(result),
    };

    match result {
        Some(result) if !shared.token.is_cancelled() => guard.settle(result),
        _ => {
            debug!("Discarding release check result after shutdown");
            drop(guard);
        }
    }

    shared.snapshot()
}

/// Polls a release source and keeps an observable [`PollerState`].
///
/// Dropping the poller shuts it down.
pub struct VersionPoller {
    shared: Arc<Shared>,
}

impl VersionPoller {
    /// Poller for `owner/repo` on the public GitHub API.
    ///
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(current_version: &str, owner: &str, repo: &str) -> Result<Self, CheckError> {
        Self::with_options(current_version, owner, repo, &PollerOptions::default())
    }

    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn with_options(
        current_version: &str,
        owner: &str,
        repo: &str,
        options: &PollerOptions,
    ) -> Result<Self, CheckError> {
        let current_version = VersionString::new(current_version);
        let client = reqwest::Client::builder()
            .timeout(options.http_timeout)
            .build()
            .map_err(|error| CheckError::network(&error))?;
        let source = GitHubReleases::new(
            client,
            ReleaseEndpoint::new(options.api_base.as_str(), owner, repo),
            user_agent(&options.app_name, &current_version),
        );
        Ok(Self::with_source(current_version, Arc::new(source)))
    }

    #[must_use]
    pub fn with_source(current_version: VersionString, source: Arc<dyn ReleaseSource>) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: PollerState::new(current_version),
                    observers: Observers::default(),
                    scheduled: false,
                }),
                publish: Mutex::new(()),
                settled: Notify::new(),
                source,
                token: CancellationToken::new(),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> PollerState {
        self.shared.snapshot()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.shared.lock().state.status()
    }

    /// Register `callback` to receive every published state snapshot.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&PollerState) + Send + Sync + 'static,
    {
        self.shared.lock().observers.subscribe(Arc::new(callback))
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.lock().observers.unsubscribe(id)
    }

    /// Start a release check in the background and return immediately.
    ///
    /// A check that is already in flight absorbs this trigger.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn check_for_updates(&self) -> JoinHandle<()> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            run_check(&shared).await;
        })
    }

    /// Run one release check to completion and return the settled state.
    ///
    /// When a check is already in flight, waits for that one instead of
    /// starting another.
    pub async fn check_now(&self) -> PollerState {
        run_check(&self.shared).await
    }

    /// Begin periodic checks on `schedule`.
    ///
    /// Returns `false` when a schedule is already running or the poller has
    /// been shut down.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn start(&self, schedule: Schedule) -> bool {
        {
            let mut inner = self.shared.lock();
            if inner.scheduled || self.shared.token.is_cancelled() {
                return false;
            }
            inner.scheduled = true;
        }

        debug!(
            "Scheduling release checks: first in {:?}, then every {:?}",
            schedule.initial_delay, schedule.interval
        );
        let shared = Arc::clone(&self.shared);
        let token = self.shared.token.clone();
        tokio::spawn(async move {
            run_schedule(schedule, token, move || {
                let shared = Arc::clone(&shared);
                async move {
                    run_check(&shared).await;
                }
            })
            .await;
        });
        true
    }

    /// Stop the schedule and discard any result still in flight.
    pub fn shutdown(&self) {
        if !self.shared.token.is_cancelled() {
            debug!("Shutting down release poller");
            self.shared.token.cancel();
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shared.token.is_cancelled()
    }
}

impl Drop for VersionPoller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
