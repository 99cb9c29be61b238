use std::process::ExitCode;

use relwatch_core::{PollerState, Status};

pub const EXIT_UPDATE_AVAILABLE: u8 = 10;

/// One-line summary of a status transition, as printed while watching.
pub fn status_line(state: &PollerState) -> String {
    match state.status() {
        Status::Checking => "checking for updates...".to_string(),
        Status::UpdateAvailable => match &state.latest_version {
            Some(latest) => format!("update-available: {} -> {latest}", state.current_version),
            None => "update-available".to_string(),
        },
        Status::UpToDate => match &state.last_error {
            Some(error) => format!(
                "up-to-date ({}, last check failed: {error})",
                state.current_version
            ),
            None => format!("up-to-date ({})", state.current_version),
        },
    }
}

/// Full report of a settled check.
pub fn describe(state: &PollerState, repository: &str) -> String {
    let mut out = format!("{repository}: {}\n", status_line(state));

    if state.update_available {
        if let Some(title) = &state.release_title {
            out.push_str(&format!("  release: {title}\n"));
        }
        if let Some(url) = &state.download_url {
            out.push_str(&format!("  link:    {url}\n"));
        }
        if let Some(notes) = state.release_notes.as_deref().map(str::trim)
            && !notes.is_empty()
        {
            out.push('\n');
            for line in notes.lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    if let Some(checked_at) = state.last_checked_at {
        out.push_str(&format!("  checked: {}\n", checked_at.to_rfc3339()));
    }

    out
}

pub fn exit_code(state: &PollerState) -> ExitCode {
    if state.last_error.is_some() {
        ExitCode::FAILURE
    } else if state.update_available {
        ExitCode::from(EXIT_UPDATE_AVAILABLE)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use relwatch_core::{CheckError, PollerState, VersionString};

    use super::{describe, status_line};

    fn state_with_update() -> PollerState {
        let mut state = PollerState::new(VersionString::new("1.0.0"));
        state.latest_version = Some(VersionString::new("1.1.0"));
        state.release_title = Some("Widget 1.1".to_string());
        state.release_notes = Some("- faster\n- smaller\n".to_string());
        state.download_url = "https://github.com/acme/widget/releases/tag/v1.1.0"
            .parse()
            .ok();
        state.update_available = true;
        state
    }

    #[test]
    fn status_line_names_versions() {
        assert_eq!(
            status_line(&state_with_update()),
            "update-available: 1.0.0 -> 1.1.0"
        );

        let mut state = PollerState::new(VersionString::new("1.0.0"));
        assert_eq!(status_line(&state), "up-to-date (1.0.0)");

        state.is_checking = true;
        assert_eq!(status_line(&state), "checking for updates...");
    }

    #[test]
    fn status_line_mentions_last_error() {
        let mut state = PollerState::new(VersionString::new("1.0.0"));
        state.last_error = Some(CheckError::ServerError(500));

        assert_eq!(
            status_line(&state),
            "up-to-date (1.0.0, last check failed: release check failed with HTTP 500)"
        );
    }

    #[test]
    fn describe_includes_release_details_only_for_updates() {
        let report = describe(&state_with_update(), "acme/widget");

        assert!(report.starts_with("acme/widget: update-available: 1.0.0 -> 1.1.0\n"));
        assert!(report.contains("  release: Widget 1.1\n"));
        assert!(report.contains("  link:    https://github.com/acme/widget/releases/tag/v1.1.0\n"));
        assert!(report.contains("  - smaller\n"));

        assert!(report.contains("\n\n  - faster\n  - smaller\n"));

        let mut current = state_with_update();
        current.update_available = false;
        let report = describe(&current, "acme/widget");
        assert!(!report.contains("release:"));
    }
}
