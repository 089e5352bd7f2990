use std::env;
use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name)
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
            .as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Force host spawning even when `/.flatpak-info` is missing (e.g. nested sandboxes)
pub fn force_host_spawn() -> bool {
    env_flag("WINE_BUILDS_FORCE_HOST_SPAWN")
}

pub fn is_flatpak() -> bool {
    Path::new("/.flatpak-info").exists()
}

/// Prefix needed to run a binary on the host rather than inside the sandbox.
pub fn host_prefix(sandboxed: bool) -> &'static [&'static str] {
    if sandboxed {
        &["flatpak-spawn", "--host"]
    } else {
        &[]
    }
}

/// Builds a command that runs `exe` on the host.
///
/// Inside a Flatpak sandbox the host's libc is not visible, so the probe has
/// to go through the Flatpak portal instead of running directly.
pub fn host_command(exe: impl AsRef<OsStr>) -> Command {
    command_with_prefix(host_prefix(is_flatpak() || force_host_spawn()), exe)
}

fn command_with_prefix(prefix: &[&str], exe: impl AsRef<OsStr>) -> Command {
    match prefix.split_first() {
        Some((launcher, rest)) => {
            let mut cmd = Command::new(launcher);
            cmd.args(rest).arg(exe);
            cmd
        }
        None => Command::new(exe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sandboxed_command_goes_through_portal() {
        let cmd = command_with_prefix(host_prefix(true), "ldd");
        assert_eq!(cmd.get_program(), "flatpak-spawn");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["--host", "ldd"]);
    }

    #[test]
    fn test_unsandboxed_command_runs_directly() {
        let cmd = command_with_prefix(host_prefix(false), "ldd");
        assert_eq!(cmd.get_program(), "ldd");
        assert_eq!(cmd.get_args().count(), 0);
    }
}
