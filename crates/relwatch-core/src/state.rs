use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Url;

use crate::error::CheckError;
use crate::version::VersionString;

/// Observable snapshot of the poller.
///
/// Release fields only change when a check succeeds; a failed check records
/// `last_error` and keeps the previous release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerState {
    pub current_version: VersionString,
    pub latest_version: Option<VersionString>,
    pub release_title: Option<String>,
    pub release_notes: Option<String>,
    pub download_url: Option<Url>,
    pub update_available: bool,
    pub is_checking: bool,
    pub last_error: Option<CheckError>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl PollerState {
    #[must_use]
    pub fn new(current_version: VersionString) -> Self {
        Self {
            current_version,
            latest_version: None,
            release_title: None,
            release_notes: None,
            download_url: None,
            update_available: false,
            is_checking: false,
            last_error: None,
            last_checked_at: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        if self.is_checking {
            Status::Checking
        } else if self.update_available {
            Status::UpdateAvailable
        } else {
            Status::UpToDate
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Checking,
    UpdateAvailable,
    UpToDate,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::UpdateAvailable => "update-available",
            Self::UpToDate => "up-to-date",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_prefers_checking_over_update_available() {
        let mut state = PollerState::new(VersionString::new("1.0.0"));
        assert_eq!(state.status(), Status::UpToDate);

        state.update_available = true;
        assert_eq!(state.status(), Status::UpdateAvailable);

        state.is_checking = true;
        assert_eq!(state.status(), Status::Checking);
    }

    #[test]
    fn status_displays_indicator_names() {
        assert_eq!(Status::Checking.to_string(), "checking");
        assert_eq!(Status::UpdateAvailable.to_string(), "update-available");
        assert_eq!(Status::UpToDate.to_string(), "up-to-date");
    }
}
