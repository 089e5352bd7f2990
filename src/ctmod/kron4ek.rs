//! Kron4ek Wine-Builds Vanilla
//!
//! Official Wine from the WineHQ sources, built by Kron4ek. Every release
//! ships a classic amd64 archive and a wow64 one; both are listed as separate
//! entries and the variant travels in the display tag.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{CtInfo, CtInstaller};
use crate::config::{AppConfig, DEFAULT_API_URL, DEFAULT_INFO_URL, DEFAULT_RELEASE_FORMAT};
use crate::error::CtModError;
use crate::github::{fetch_project_release_data, fetch_releases_page, GithubRelease, ReleaseData, ReleaseSource};
use crate::glibc::HostProbe;
use crate::logging::{log_error, log_info};
use crate::variant::{base_tag, parse_display_tag, BuildVariant};

pub const CT_INFO: CtInfo = CtInfo {
    name: "Kron4ek Wine-Builds Vanilla",
    launchers: &["lutris", "winezgui"],
    description: "Compatibility tool \"Wine\" to run Windows games on Linux. \
                  Official version from the WineHQ sources, compiled by Kron4ek.",
};

pub struct Kron4ekVanilla<S, P> {
    source: S,
    probe: P,
    api_url: String,
    info_url: String,
    release_format: String,
}

impl<S: ReleaseSource, P: HostProbe> Kron4ekVanilla<S, P> {
    pub fn new(source: S, probe: P) -> Self {
        Self {
            source,
            probe,
            api_url: DEFAULT_API_URL.to_string(),
            info_url: DEFAULT_INFO_URL.to_string(),
            release_format: DEFAULT_RELEASE_FORMAT.to_string(),
        }
    }

    pub fn with_config(source: S, probe: P, config: &AppConfig) -> Self {
        Self {
            source,
            probe,
            api_url: config.api_url.clone(),
            info_url: config.info_url.clone(),
            release_format: config.release_format.clone(),
        }
    }

    pub fn release_format(&self) -> &str {
        &self.release_format
    }

    /// One entry per release and variant, in listing order.
    pub fn display_tags(&self, releases: &[GithubRelease]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut versions = Vec::new();

        for release in releases {
            for asset in &release.assets {
                if !asset.name.ends_with(self.release_format.as_str()) {
                    continue;
                }
                let Some(variant) = BuildVariant::classify_asset(&asset.name) else {
                    continue;
                };
                if seen.insert((release.tag_name.as_str(), variant)) {
                    versions.push(variant.display_tag(&release.tag_name));
                }
            }
        }

        versions
    }
}

#[cfg(feature = "net")]
impl Kron4ekVanilla<crate::github::GithubClient, crate::glibc::LddProbe> {
    /// Module wired to GitHub and the host's `ldd`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_config(
            crate::github::GithubClient::from_config(config),
            crate::glibc::LddProbe::with_timeout_secs(config.probe_timeout_secs),
            config,
        )
    }
}

impl<S: ReleaseSource, P: HostProbe> CtInstaller for Kron4ekVanilla<S, P> {
    fn info(&self) -> &CtInfo {
        &CT_INFO
    }

    fn fetch_releases(&self, count: u32, page: u32) -> Vec<String> {
        let releases = fetch_releases_page(&self.source, &self.api_url, count, page);
        self.display_tags(&releases)
    }

    fn fetch_release_data(&self, tag: &str) -> Option<ReleaseData> {
        let Some((tag, variant)) = parse_display_tag(tag) else {
            log_error(&CtModError::InvalidTag(tag.to_string()).to_string());
            return None;
        };

        fetch_project_release_data(
            &self.source,
            &self.api_url,
            &self.release_format,
            Some(tag),
            |asset| variant.matches_asset(&asset.name),
        )
    }

    fn is_system_compatible(&self) -> bool {
        match self.probe.glibc_version() {
            Ok(version) => {
                let supported = version.is_supported();
                if !supported {
                    log_info(&format!(
                        "{} needs glibc {} or newer, host has {}",
                        CT_INFO.name,
                        crate::glibc::MIN_GLIBC,
                        version
                    ));
                }
                supported
            }
            Err(e) => {
                log_error(&format!("Could not determine host glibc version: {}", e));
                false
            }
        }
    }

    // Wine, unlike Proton, goes into the launcher's runner directory unchanged
    fn get_extract_dir(&self, install_dir: &Path) -> PathBuf {
        install_dir.to_path_buf()
    }

    fn get_info_url(&self, version: &str) -> String {
        format!("{}{}", self.info_url, base_tag(version))
    }
}
