//! Compatibility tool modules
//!
//! A ctmod knows where a compatibility tool is published and which of its
//! releases fit the host. Downloading and unpacking the archive is left to the
//! installer driving the [`CtInstaller`] trait.

mod kron4ek;

pub use kron4ek::Kron4ekVanilla;

use std::path::{Path, PathBuf};

use crate::github::ReleaseData;

/// Static description of a compatibility tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtInfo {
    pub name: &'static str,
    /// Launchers the tool can be installed for
    pub launchers: &'static [&'static str],
    pub description: &'static str,
}

impl CtInfo {
    pub fn supports_launcher(&self, launcher: &str) -> bool {
        self.launchers
            .iter()
            .any(|l| l.eq_ignore_ascii_case(launcher))
    }
}

/// Contract between a compatibility tool module and the installer.
pub trait CtInstaller {
    fn info(&self) -> &CtInfo;

    /// Display tags of the releases on one page of the listing.
    fn fetch_releases(&self, count: u32, page: u32) -> Vec<String>;

    /// Install metadata for a display tag returned by [`CtInstaller::fetch_releases`].
    fn fetch_release_data(&self, tag: &str) -> Option<ReleaseData>;

    fn is_system_compatible(&self) -> bool;

    /// Directory the archive has to be unpacked into for a launcher install dir.
    fn get_extract_dir(&self, install_dir: &Path) -> PathBuf;

    /// Web page describing a release.
    fn get_info_url(&self, version: &str) -> String;
}
