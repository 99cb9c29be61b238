use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::error::CheckError;
use crate::version::VersionString;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const RELEASES_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// One published release, as returned by `/releases/latest`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseInfo {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(rename = "name")]
    pub title: String,
    pub body: String,
    pub html_url: String,
}

impl ReleaseInfo {
    /// Decode a release payload. All four fields must be present strings.
    ///
    /// # Errors
    /// Returns [`CheckError::EmptyBody`] for an empty payload and
    /// [`CheckError::ParseError`] when it does not decode.
    pub fn from_json(payload: &[u8]) -> Result<Self, CheckError> {
        if payload.is_empty() {
            return Err(CheckError::EmptyBody);
        }
        serde_json::from_slice(payload).map_err(|error| CheckError::ParseError(error.to_string()))
    }

    #[must_use]
    pub fn version(&self) -> VersionString {
        VersionString::new(&self.tag)
    }
}

/// Location of a repository's latest-release resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEndpoint {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
}

impl ReleaseEndpoint {
    pub fn new(
        api_base: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn github(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::new(DEFAULT_API_BASE, owner, repo)
    }

    /// # Errors
    /// Returns [`CheckError::InvalidEndpoint`] when the owner or repository is
    /// not a single path segment or the resulting URL does not parse.
    pub fn url(&self) -> Result<Url, CheckError> {
        for (label, segment) in [("owner", &self.owner), ("repository", &self.repo)] {
            if segment.is_empty() || segment.contains(['/', '?', '#']) {
                return Err(CheckError::InvalidEndpoint(format!(
                    "{label} '{segment}' is not a valid path segment"
                )));
            }
        }

        let base = self.api_base.trim_end_matches('/');
        let url = format!("{base}/repos/{}/{}/releases/latest", self.owner, self.repo);
        let parsed =
            Url::parse(&url).map_err(|error| CheckError::InvalidEndpoint(format!("{url}: {error}")))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(CheckError::InvalidEndpoint(format!(
                "{url}: expected an http(s) URL"
            )));
        }
        Ok(parsed)
    }
}

#[must_use]
pub fn user_agent(app_name: &str, current_version: &VersionString) -> String {
    format!("{app_name}-App/{current_version}")
}

/// Where the poller gets release descriptors from.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_release(&self) -> Result<ReleaseInfo, CheckError>;
}

/// [`ReleaseSource`] backed by a GitHub-compatible REST API.
pub struct GitHubReleases {
    client: reqwest::Client,
    endpoint: ReleaseEndpoint,
    user_agent: String,
}

impl GitHubReleases {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: ReleaseEndpoint, user_agent: String) -> Self {
        Self {
            client,
            endpoint,
            user_agent,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &ReleaseEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn latest_release(&self) -> Result<ReleaseInfo, CheckError> {
        let url = self.endpoint.url()?;
        debug!("Requesting latest release from {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, RELEASES_MEDIA_TYPE)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|error| CheckError::network(&error))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CheckError::ServerError(status.as_u16()));
        }

        let payload = response.bytes().await.map_err(|error| {
            debug!("Failed to read release response body: {error}");
            CheckError::InvalidResponse
        })?;

        ReleaseInfo::from_json(&payload)
    }
}
