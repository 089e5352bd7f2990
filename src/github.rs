//! GitHub releases API access
//!
//! Release/asset types, the rate-limit check applied to every listing, and the
//! lookup of install metadata for a single release.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CtModError;
use crate::logging::{log_error, log_warning};

const RATE_LIMIT_MESSAGE: &str = "API rate limit exceeded";
const CHECKSUM_SUFFIX: &str = "sha512sum";

// ============================================================================
// Release Types
// ============================================================================

/// GitHub release metadata. Only the fields the ctmod needs.
#[derive(Deserialize, Debug, Clone)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_assets")]
    pub assets: Vec<GithubAsset>,
}

/// GitHub release asset
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

// A malformed asset drops only itself, not the whole release.
fn lenient_assets<'de, D>(deserializer: D) -> Result<Vec<GithubAsset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

impl GithubRelease {
    /// Publication date without the time part (`2024-01-31T12:00:00Z` -> `2024-01-31`)
    pub fn date(&self) -> String {
        self.published_at
            .as_deref()
            .and_then(|d| d.split('T').next())
            .unwrap_or_default()
            .to_string()
    }
}

/// Install metadata handed to the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseData {
    pub version: String,
    pub date: String,
    pub download: Option<String>,
    pub size: Option<u64>,
    pub checksum: Option<String>,
}

// ============================================================================
// Release Source
// ============================================================================

/// Anything that can answer a GET with a JSON document.
pub trait ReleaseSource {
    fn get_json(&self, url: &str) -> Result<Value, CtModError>;
}

/// Releases endpoint URL for one page of results.
pub fn releases_page_url(api_url: &str, count: u32, page: u32) -> String {
    format!("{}?per_page={}&page={}", api_url, count, page)
}

/// Unwrap a release listing, turning a rate-limit reply into an empty list.
pub fn rate_limit_check(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => {
            let message = map.get("message").and_then(Value::as_str).unwrap_or("");
            if message.contains(RATE_LIMIT_MESSAGE) {
                log_warning(&format!("GitHub API rate limit exceeded: {}", message));
            } else {
                log_warning(&format!("Unexpected GitHub API reply: {}", message));
            }
            Vec::new()
        }
        other => {
            log_warning(&format!("Unexpected GitHub API reply: {}", other));
            Vec::new()
        }
    }
}

/// Parse the releases of a listing, skipping entries without a `tag_name`.
pub fn parse_releases(items: Vec<Value>) -> Vec<GithubRelease> {
    items
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect()
}

/// Fetch one page of releases. Failures are logged and give an empty list.
pub fn fetch_releases_page<S>(source: &S, api_url: &str, count: u32, page: u32) -> Vec<GithubRelease>
where
    S: ReleaseSource + ?Sized,
{
    let url = releases_page_url(api_url, count, page);
    match source.get_json(&url) {
        Ok(payload) => parse_releases(rate_limit_check(payload)),
        Err(e) => {
            log_error(&format!("Failed to fetch releases: {}", e));
            Vec::new()
        }
    }
}

/// Build the install metadata of a release.
///
/// The first asset ending in `release_format` that passes `asset_condition`
/// provides the download; a `sha512sum` asset provides the checksum.
pub fn release_data<F>(release: &GithubRelease, release_format: &str, asset_condition: F) -> ReleaseData
where
    F: Fn(&GithubAsset) -> bool,
{
    let checksum = release
        .assets
        .iter()
        .find(|a| a.name.ends_with(CHECKSUM_SUFFIX))
        .map(|a| a.browser_download_url.clone());

    let asset = release
        .assets
        .iter()
        .find(|&a| a.name.ends_with(release_format) && asset_condition(a));

    ReleaseData {
        version: release.tag_name.clone(),
        date: release.date(),
        download: asset.map(|a| a.browser_download_url.clone()),
        size: asset.map(|a| a.size),
        checksum,
    }
}

/// Look up the install metadata of `tag` (or of the latest release).
///
/// Returns `None` when the release can't be fetched or has no `tag_name`.
pub fn fetch_project_release_data<S, F>(
    source: &S,
    release_url: &str,
    release_format: &str,
    tag: Option<&str>,
    asset_condition: F,
) -> Option<ReleaseData>
where
    S: ReleaseSource + ?Sized,
    F: Fn(&GithubAsset) -> bool,
{
    let url = match tag {
        Some(tag) => format!("{}/tags/{}", release_url, tag),
        None => format!("{}/latest", release_url),
    };

    let payload = match source.get_json(&url) {
        Ok(payload) => payload,
        Err(e) => {
            log_error(&format!("Failed to fetch release data from {}: {}", url, e));
            return None;
        }
    };

    if payload.get("tag_name").is_none() {
        if let Some(message) = payload.get("message").and_then(Value::as_str) {
            log_warning(&format!("GitHub API: {}", message));
        }
        return None;
    }

    match decode_release(payload) {
        Ok(release) => Some(release_data(&release, release_format, asset_condition)),
        Err(e) => {
            log_error(&format!("Malformed release payload from {}: {}", url, e));
            None
        }
    }
}

/// Decode a single release document.
pub fn decode_release(payload: Value) -> Result<GithubRelease, CtModError> {
    let release = serde_json::from_value(payload)?;
    Ok(release)
}

// ============================================================================
// HTTP Client
// ============================================================================

#[cfg(feature = "net")]
pub use client::GithubClient;

#[cfg(feature = "net")]
mod client {
    use std::time::Duration;

    use serde_json::Value;

    use super::ReleaseSource;
    use crate::config::AppConfig;
    use crate::error::CtModError;

    /// Blocking GitHub client
    pub struct GithubClient {
        agent: ureq::Agent,
        token: Option<String>,
    }

    impl GithubClient {
        pub fn new(user_agent: &str, token: Option<String>) -> Self {
            let agent = ureq::AgentBuilder::new()
                .user_agent(user_agent)
                .timeout(Duration::from_secs(30))
                .build();
            Self { agent, token }
        }

        pub fn from_config(config: &AppConfig) -> Self {
            Self::new(&config.user_agent, config.effective_token())
        }
    }

    impl ReleaseSource for GithubClient {
        fn get_json(&self, url: &str) -> Result<Value, CtModError> {
            let mut request = self
                .agent
                .get(url)
                .set("Accept", "application/vnd.github+json");
            if let Some(token) = &self.token {
                request = request.set("Authorization", &format!("token {}", token));
            }

            let http_err = |reason: String| CtModError::Http {
                url: url.to_string(),
                reason,
            };

            let response = match request.call() {
                Ok(response) => response,
                // Error replies (rate limit, unknown tag) still carry a JSON message
                Err(ureq::Error::Status(code, response)) => {
                    return response
                        .into_json()
                        .map_err(|e| http_err(format!("status {}: {}", code, e)));
                }
                Err(e) => return Err(http_err(e.to_string())),
            };

            response.into_json().map_err(|e| http_err(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    struct FakeSource {
        payload: Value,
        requested: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn new(payload: Value) -> Self {
            Self {
                payload,
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReleaseSource for FakeSource {
        fn get_json(&self, url: &str) -> Result<Value, CtModError> {
            self.requested.borrow_mut().push(url.to_string());
            Ok(self.payload.clone())
        }
    }

    fn release_json() -> Value {
        json!({
            "tag_name": "10.0",
            "published_at": "2025-01-21T18:02:11Z",
            "assets": [
                { "name": "wine-10.0-amd64.tar.xz", "browser_download_url": "https://dl/amd64", "size": 70 },
                { "name": "wine-10.0-amd64-wow64.tar.xz", "browser_download_url": "https://dl/wow64", "size": 64 },
                { "name": "wine-10.0.sha512sum", "browser_download_url": "https://dl/sum", "size": 1 }
            ]
        })
    }

    #[test]
    fn test_rate_limit_check() {
        let limited = json!({ "message": "API rate limit exceeded for 1.2.3.4.", "documentation_url": "x" });
        assert!(rate_limit_check(limited).is_empty());
        assert_eq!(rate_limit_check(json!([{ "tag_name": "a" }, {}])).len(), 2);
        assert!(rate_limit_check(json!("nope")).is_empty());
    }

    #[test]
    fn test_parse_releases_skips_missing_fields() {
        let items = vec![
            json!({ "tag_name": "9.0" }),
            json!({ "name": "no tag" }),
            json!({ "tag_name": "9.1", "assets": [ { "size": "huge" }, { "name": "wine-9.1-amd64.tar.xz" } ] }),
        ];
        let releases = parse_releases(items);
        assert_eq!(releases.len(), 2);
        assert!(releases[0].assets.is_empty());
        assert_eq!(releases[1].assets.len(), 1);
        assert_eq!(releases[1].assets[0].name, "wine-9.1-amd64.tar.xz");
    }

    #[test]
    fn test_fetch_project_release_data_by_tag() {
        let source = FakeSource::new(release_json());
        let data = fetch_project_release_data(
            &source,
            "https://api/releases",
            "tar.xz",
            Some("10.0"),
            |a| a.name.contains("wow64"),
        )
        .unwrap();

        assert_eq!(source.requested.borrow()[0], "https://api/releases/tags/10.0");
        assert_eq!(data.version, "10.0");
        assert_eq!(data.date, "2025-01-21");
        assert_eq!(data.download.as_deref(), Some("https://dl/wow64"));
        assert_eq!(data.size, Some(64));
        assert_eq!(data.checksum.as_deref(), Some("https://dl/sum"));
    }

    #[test]
    fn test_fetch_project_release_data_latest_without_match() {
        let source = FakeSource::new(release_json());
        let data =
            fetch_project_release_data(&source, "https://api/releases", "tar.xz", None, |_| false)
                .unwrap();
        assert_eq!(source.requested.borrow()[0], "https://api/releases/latest");
        assert_eq!(data.download, None);
        assert_eq!(data.size, None);
    }

    #[test]
    fn test_decode_release_reports_json_error() {
        let err = decode_release(json!({ "tag_name": 10 })).unwrap_err();
        assert!(matches!(err, CtModError::Json(_)));
        assert!(err.to_string().starts_with("Invalid JSON payload"));
    }

    #[test]
    fn test_fetch_project_release_data_malformed_tag() {
        let source = FakeSource::new(json!({ "tag_name": ["10.0"] }));
        assert!(
            fetch_project_release_data(&source, "https://api/releases", "tar.xz", Some("10.0"), |_| true)
                .is_none()
        );
    }

    #[test]
    fn test_fetch_project_release_data_not_found() {
        let source = FakeSource::new(json!({ "message": "Not Found" }));
        assert!(
            fetch_project_release_data(&source, "https://api/releases", "tar.xz", Some("0.0"), |_| true)
                .is_none()
        );
    }

    #[test]
    fn test_fetch_releases_page_url() {
        let source = FakeSource::new(json!([release_json()]));
        let releases = fetch_releases_page(&source, "https://api/releases", 30, 2);
        assert_eq!(releases.len(), 1);
        assert_eq!(
            source.requested.borrow()[0],
            "https://api/releases?per_page=30&page=2"
        );
    }
}
