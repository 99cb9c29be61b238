use clap::Parser;

use crate::settings::AppSettings;

#[derive(Debug, Parser)]
#[command(
    name = "relwatch",
    version,
    about = "Watch a GitHub repository for new releases"
)]
pub struct Cli {
    /// Repository owner (overrides settings)
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (overrides settings)
    #[arg(long)]
    pub repo: Option<String>,

    /// Version to compare against instead of the build version
    #[arg(long, value_name = "VERSION")]
    pub current_version: Option<String>,

    /// Run a single check and exit
    #[arg(long)]
    pub once: bool,

    /// Open the release page when an update is found
    #[arg(long)]
    pub open: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_settings: bool,
}

impl Cli {
    /// Fold command-line overrides into `settings`.
    pub fn apply_to(&self, settings: &mut AppSettings) {
        if let Some(owner) = &self.owner {
            settings.owner = Some(owner.clone());
        }
        if let Some(repo) = &self.repo {
            settings.repo = Some(repo.clone());
        }
        if self.debug {
            settings.debug_logging = true;
        }
    }
}
