//! Build variants of the Wine-Builds assets
//!
//! Kron4ek publishes several archives per release. Only the asset name tells
//! them apart, so the variant is carried in the display tag shown to users:
//! `"wine-9.0 (wow64)"`, `"wine-9.0 (amd64)"`.

use std::fmt;

/// Asset markers that are never offered by the vanilla module
const STAGING_MARKER: &str = "staging";
const WOW64_MARKER: &str = "wow64";
const AMD64_MARKER: &str = "amd64";
const AMD64_WOW64_MARKER: &str = "amd64-wow64";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildVariant {
    /// New WoW64 mode build (64-bit Wine running 32-bit apps without multilib)
    Wow64,
    /// Classic 64-bit build
    Amd64,
}

impl BuildVariant {
    pub const ALL: [BuildVariant; 2] = [BuildVariant::Wow64, BuildVariant::Amd64];

    pub fn label(&self) -> &'static str {
        match self {
            BuildVariant::Wow64 => "wow64",
            BuildVariant::Amd64 => "amd64",
        }
    }

    /// Suffix appended to a release tag, including the leading space
    pub fn tag_suffix(&self) -> String {
        format!(" ({})", self.label())
    }

    /// Display string for a release tag of this variant.
    pub fn display_tag(&self, tag: &str) -> String {
        format!("{}{}", tag, self.tag_suffix())
    }

    /// Whether an asset belongs to this variant.
    pub fn matches_asset(&self, asset_name: &str) -> bool {
        if asset_name.contains(STAGING_MARKER) {
            return false;
        }
        match self {
            BuildVariant::Wow64 => asset_name.contains(AMD64_WOW64_MARKER),
            BuildVariant::Amd64 => {
                asset_name.contains(AMD64_MARKER) && !asset_name.contains(WOW64_MARKER)
            }
        }
    }

    /// Classify an asset, checking wow64 first since its name also contains `amd64`.
    pub fn classify_asset(asset_name: &str) -> Option<BuildVariant> {
        Self::ALL.into_iter().find(|v| v.matches_asset(asset_name))
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Split a display tag into the upstream release tag and its variant.
///
/// Returns `None` when the tag carries no known variant suffix.
pub fn parse_display_tag(display_tag: &str) -> Option<(&str, BuildVariant)> {
    BuildVariant::ALL.into_iter().find_map(|variant| {
        display_tag
            .strip_suffix(&variant.tag_suffix())
            .map(|tag| (tag, variant))
    })
}

/// Strip a variant suffix if present, otherwise return the tag as-is.
pub fn base_tag(display_tag: &str) -> &str {
    parse_display_tag(display_tag)
        .map(|(tag, _)| tag)
        .unwrap_or(display_tag)
}
