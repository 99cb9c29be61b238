mod cli;
mod error;
mod logging;
mod report;
mod settings;

use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use log::{debug, info, warn};
use relwatch_core::{PollerState, Status, VersionPoller, VersionString, resolve_current_version};
use relwatch_platform::AppPaths;

use crate::cli::Cli;
use crate::error::AppError;
use crate::settings::AppSettings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            log::error!("{error}");
            eprintln!("relwatch: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let paths = AppPaths::new()?;
    let settings_path = paths.settings_file();
    let mut settings = AppSettings::load_from(&settings_path);
    cli.apply_to(&mut settings);

    logging::init_logging(&paths, settings.debug_logging, settings.max_log_size_bytes);

    if cli.save_settings {
        settings.save_to(&settings_path)?;
        info!("Saved settings to {}", settings_path.display());
    }

    let (Some(owner), Some(repo)) = (settings.owner.clone(), settings.repo.clone()) else {
        return Err(AppError::MissingRepository {
            settings: settings_path,
        });
    };
    let repository = format!("{owner}/{repo}");

    let current_version = current_version(cli.current_version.as_deref());
    debug!("Watching {repository} for releases newer than {current_version}");

    let poller = VersionPoller::with_options(
        current_version.as_str(),
        &owner,
        &repo,
        &settings.poller_options(),
    )
    .map_err(AppError::Poller)?;

    if cli.once {
        let state = poller.check_now().await;
        if let Some(source) = state.last_error.clone() {
            return Err(AppError::CheckFailed { repository, source });
        }
        print!("{}", report::describe(&state, &repository));
        if cli.open && state.update_available {
            open_release_page(&state)?;
        }
        return Ok(report::exit_code(&state));
    }

    watch(&poller, &repository, cli.open, &settings).await;
    Ok(ExitCode::SUCCESS)
}

async fn watch(poller: &VersionPoller, repository: &str, open_page: bool, settings: &AppSettings) {
    let repository = repository.to_string();
    let last_status = Mutex::new(None::<Status>);
    poller.subscribe(move |state| {
        let status = state.status();
        let mut last = last_status
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if *last == Some(status) {
            return;
        }
        *last = Some(status);
        drop(last);

        if status == Status::UpdateAvailable {
            print!("{}", report::describe(state, &repository));
            if open_page && let Err(error) = open_release_page(state) {
                warn!("{error}");
            }
        } else {
            println!("{repository}: {}", report::status_line(state));
        }
    });

    poller.start(settings.schedule());
    info!(
        "Checking for new releases every {}h, press Ctrl+C to stop",
        settings.check_interval_hours
    );

    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {error}");
    }
    poller.shutdown();
}

/// The `--current-version` flag or the marketing version baked in at build
/// time, then the build version, then the package version.
fn current_version(override_version: Option<&str>) -> VersionString {
    let marketing = override_version
        .filter(|version| !version.trim().is_empty())
        .or(option_env!("RELWATCH_MARKETING_VERSION"));
    let build = option_env!("RELWATCH_BUILD_VERSION")
        .filter(|version| !version.trim().is_empty())
        .or(Some(env!("CARGO_PKG_VERSION")));
    resolve_current_version(marketing, build)
}

fn open_release_page(state: &PollerState) -> Result<(), AppError> {
    let Some(url) = &state.download_url else {
        return Ok(());
    };
    info!("Opening {url}");
    open::that(url.as_str()).map_err(|source| AppError::OpenBrowser {
        url: url.to_string(),
        source,
    })
}
