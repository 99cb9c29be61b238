//! Release polling for relwatch.
//!
//! This crate holds everything that does not depend on a user interface:
//! - Version parsing and the "is this release newer" comparison.
//! - The release descriptor, its endpoint, and the HTTP release source.
//! - The observable poller state with its derived status indicator.
//! - The periodic schedule and the [`VersionPoller`] that ties them together.

mod error;
mod observer;
mod poller;
mod release;
pub mod schedule;
mod state;
pub mod version;

/// Failure of a single release check.
pub use error::{CheckError, ErrorKind};
/// Observer registration handle.
pub use observer::SubscriptionId;
/// The poller and its HTTP source options.
pub use poller::{PollerOptions, VersionPoller};
/// Release descriptor, endpoint, and the source seam the poller fetches through.
pub use release::{
    DEFAULT_API_BASE, GitHubReleases, ReleaseEndpoint, ReleaseInfo, ReleaseSource, user_agent,
};
/// Periodic check timing.
pub use schedule::Schedule;
/// Observable state and derived status indicator.
pub use state::{PollerState, Status};
/// Version strings and comparison helpers.
pub use version::{VersionString, is_newer, resolve_current_version};
