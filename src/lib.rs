//! wine-builds - Kron4ek Wine-Builds compatibility tool module
//!
//! Library crate with the release listing, host checks and install metadata
//! lookup, shared with the `wine-builds` CLI.

pub mod config;
pub mod ctmod;
pub mod error;
pub mod github;
pub mod glibc;
pub mod logging;
pub mod paths;
pub mod runtime_wrap;
pub mod variant;
