//! Shared wiremock helpers for release check tests.

#![allow(dead_code)]

use std::time::Duration;

use relwatch_core::{PollerOptions, VersionPoller};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "acme";
pub const REPO: &str = "widget";
pub const LATEST_PATH: &str = "/repos/acme/widget/releases/latest";

pub fn release_json(tag: &str) -> serde_json::Value {
    json!({
        "id": 42,
        "tag_name": tag,
        "name": format!("Widget {tag}"),
        "body": format!("## Changes in {tag}\n- fixes"),
        "html_url": format!("https://github.com/acme/widget/releases/tag/{tag}"),
        "draft": false,
        "prerelease": false,
        "assets": []
    })
}

pub fn options_for(server: &MockServer) -> PollerOptions {
    PollerOptions {
        app_name: "Widget".to_string(),
        api_base: server.uri(),
        http_timeout: Duration::from_secs(5),
    }
}

pub fn poller_for(server: &MockServer, current_version: &str) -> VersionPoller {
    VersionPoller::with_options(current_version, OWNER, REPO, &options_for(server))
        .expect("poller should build against the mock server")
}

/// Serve `tag` as the latest release, but only to requests carrying the
/// release media type.
pub async fn mock_latest_release(server: &MockServer, tag: &str) {
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .and(header("accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(tag)))
        .mount(server)
        .await;
}

pub async fn mock_latest_response(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Serve `first` once, then `then` for every later request.
pub async fn mock_latest_sequence(server: &MockServer, first: ResponseTemplate, then: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(first)
        .up_to_n_times(1)
        .mount(server)
        .await;
    mock_latest_response(server, then).await;
}
