use std::path::PathBuf;

use relwatch_core::CheckError;
use relwatch_platform::AppPathsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Paths(#[from] AppPathsError),

    #[error("failed to write settings to {}: {source}", path.display())]
    SettingsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode settings: {0}")]
    SettingsEncode(#[from] serde_json::Error),

    #[error("no repository configured; pass --owner and --repo or set them in {}", settings.display())]
    MissingRepository { settings: PathBuf },

    #[error("failed to create release poller: {0}")]
    Poller(#[source] CheckError),

    #[error("could not check {repository} for updates: {source}")]
    CheckFailed {
        repository: String,
        #[source]
        source: CheckError,
    },

    #[error("failed to open {url}: {source}")]
    OpenBrowser {
        url: String,
        #[source]
        source: std::io::Error,
    },
}
