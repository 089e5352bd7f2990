//! Host glibc detection
//!
//! Kron4ek's vanilla builds are linked against glibc 2.27, so the host has to
//! provide at least that version. The version is read from `ldd --version`,
//! whose first line looks like `ldd (GNU libc) 2.35`.

use std::fmt;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::CtModError;
use crate::runtime_wrap::host_command;

/// Oldest glibc the builds run on
pub const MIN_GLIBC: GlibcVersion = GlibcVersion { major: 2, minor: 27 };

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlibcVersion {
    pub major: u32,
    pub minor: u32,
}

impl GlibcVersion {
    /// Parse the version from the last word of the first line of `ldd --version`.
    pub fn parse_ldd_output(output: &str) -> Result<Self, CtModError> {
        let invalid = || CtModError::LddOutput(output.lines().next().unwrap_or("").to_string());

        let first_line = output.lines().next().ok_or_else(invalid)?;
        let version = first_line.trim().split(' ').next_back().ok_or_else(invalid)?;

        let mut parts = version.split('.');
        let major = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;

        Ok(Self { major, minor })
    }

    /// Major 2 needs at least [`MIN_GLIBC`]; any later major is accepted as is.
    pub fn is_supported(&self) -> bool {
        if self.major < MIN_GLIBC.major {
            return false;
        }
        self.major != MIN_GLIBC.major || self.minor >= MIN_GLIBC.minor
    }
}

impl fmt::Display for GlibcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Source of the host's `ldd --version` report.
pub trait HostProbe {
    fn ldd_output(&self) -> Result<String, CtModError>;

    fn glibc_version(&self) -> Result<GlibcVersion, CtModError> {
        GlibcVersion::parse_ldd_output(&self.ldd_output()?)
    }
}

/// Runs `ldd --version` on the host, through `flatpak-spawn --host` when sandboxed.
#[derive(Debug, Clone)]
pub struct LddProbe {
    pub timeout: Duration,
}

impl Default for LddProbe {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

impl LddProbe {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
        }
    }
}

impl HostProbe for LddProbe {
    fn ldd_output(&self) -> Result<String, CtModError> {
        let mut cmd = host_command("ldd");
        cmd.arg("--version");
        run_with_timeout(cmd, "ldd --version", self.timeout)
    }
}

/// Run `cmd` and return its stdout; a non-zero exit or a timeout is an error.
fn run_with_timeout(mut cmd: Command, label: &str, timeout: Duration) -> Result<String, CtModError> {
    let mut child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let status = match child.wait_timeout(timeout)? {
        Some(status) => status,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CtModError::Timeout {
                command: label.to_string(),
                secs: timeout.as_secs(),
            });
        }
    };

    if !status.success() {
        return Err(CtModError::CommandFailed {
            command: label.to_string(),
            code: status.code(),
        });
    }

    let mut stdout = String::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_string(&mut stdout)?;
    }
    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(out: &str) -> GlibcVersion {
        GlibcVersion::parse_ldd_output(out).unwrap()
    }

    #[test]
    fn test_parse_gnu_output() {
        let out = "ldd (GNU libc) 2.39\nCopyright (C) 2024 Free Software Foundation, Inc.\n";
        assert_eq!(version(out), GlibcVersion { major: 2, minor: 39 });
    }

    #[test]
    fn test_parse_distro_output() {
        let out = "ldd (Ubuntu GLIBC 2.35-0ubuntu3.8) 2.35\n";
        assert_eq!(version(out), GlibcVersion { major: 2, minor: 35 });
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(GlibcVersion::parse_ldd_output("").is_err());
        assert!(GlibcVersion::parse_ldd_output("musl libc (x86_64)\n").is_err());
        assert!(GlibcVersion::parse_ldd_output("ldd 2\n").is_err());
    }

    #[test]
    fn test_supported_versions() {
        assert!(!version("ldd (GNU libc) 2.26").is_supported());
        assert!(version("ldd (GNU libc) 2.27").is_supported());
        assert!(version("ldd (GNU libc) 2.31").is_supported());
        assert!(version("ldd (GNU libc) 3.0").is_supported());
        assert!(!version("ldd (GNU libc) 1.30").is_supported());
    }

    struct FixedProbe(&'static str);

    impl HostProbe for FixedProbe {
        fn ldd_output(&self) -> Result<String, CtModError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_probe_default_parses() {
        let v = FixedProbe("ldd (GNU libc) 2.27\n").glibc_version().unwrap();
        assert_eq!(v.to_string(), "2.27");
    }

    #[test]
    fn test_run_returns_stdout() {
        let mut cmd = Command::new("echo");
        cmd.arg("ldd (GNU libc) 2.31");
        let out = run_with_timeout(cmd, "echo", Duration::from_secs(5)).unwrap();
        assert_eq!(GlibcVersion::parse_ldd_output(&out).unwrap().to_string(), "2.31");
    }

    #[test]
    fn test_run_kills_on_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let err = run_with_timeout(cmd, "sleep 5", Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, CtModError::Timeout { .. }));
    }

    #[test]
    fn test_run_reports_exit_code() {
        let err = run_with_timeout(Command::new("false"), "false", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, CtModError::CommandFailed { code: Some(1), .. }));
    }
}
