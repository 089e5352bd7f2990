//! wine-builds - Kron4ek Wine-Builds Vanilla from the command line
//!
//! Lists installable releases, shows their download metadata and checks
//! whether the host can run them.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use wine_builds::config::AppConfig;
use wine_builds::ctmod::{CtInstaller, Kron4ekVanilla};
use wine_builds::glibc::{HostProbe, LddProbe};
use wine_builds::logging::{init_logger, log_action, log_info};

#[derive(Parser)]
#[command(name = "wine-builds", version, about = "Kron4ek Wine-Builds Vanilla releases")]
struct Cli {
    /// Do not write a log file
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available releases (one entry per wow64/amd64 build)
    List {
        #[arg(long)]
        count: Option<u32>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show download metadata for a listed release, e.g. "10.0 (wow64)"
    Show { tag: String },
    /// Check whether the host glibc can run the builds
    Check,
    /// Print the directory an archive is unpacked into
    ExtractDir { install_dir: PathBuf },
    /// Describe the compatibility tool
    About {
        /// Only succeed if the tool supports this launcher
        #[arg(long)]
        launcher: Option<String>,
    },
    /// Print the configuration, optionally writing the defaults to disk
    Config {
        #[arg(long)]
        init: bool,
    },
}

fn format_size(bytes: u64) -> String {
    format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
}

fn run(cli: Cli, config: AppConfig) -> Result<ExitCode, Box<dyn Error>> {
    let ct = Kron4ekVanilla::from_config(&config);

    match cli.command {
        Commands::List { count, page } => {
            let count = count.unwrap_or(config.per_page);
            log_action(&format!("Listing releases (count {}, page {})", count, page));
            for tag in ct.fetch_releases(count, page) {
                println!("{}", tag);
            }
        }
        Commands::Show { tag } => {
            log_action(&format!("Fetching release data for '{}'", tag));
            let Some(data) = ct.fetch_release_data(&tag) else {
                return Err(format!("No release data for '{}'", tag).into());
            };
            println!("Version:  {}", data.version);
            println!("Date:     {}", data.date);
            match (&data.download, data.size) {
                (Some(url), Some(size)) => {
                    println!("Download: {}", url);
                    println!("Size:     {}", format_size(size));
                }
                _ => println!("Download: no matching {} asset", ct.release_format()),
            }
            if let Some(checksum) = &data.checksum {
                println!("Checksum: {}", checksum);
            }
            println!("Info:     {}", ct.get_info_url(&tag));
        }
        Commands::Check => {
            match LddProbe::with_timeout_secs(config.probe_timeout_secs).glibc_version() {
                Ok(version) => println!("Host glibc: {}", version),
                Err(e) => println!("Host glibc: unknown ({})", e),
            }
            let compatible = ct.is_system_compatible();
            println!("Compatible: {}", if compatible { "yes" } else { "no" });
            if !compatible {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::ExtractDir { install_dir } => {
            println!("{}", ct.get_extract_dir(&install_dir).display());
        }
        Commands::About { launcher } => {
            let info = ct.info();
            println!("{}", info.name);
            println!("{}", info.description);
            println!("Launchers: {}", info.launchers.join(", "));
            if let Some(launcher) = launcher {
                if !info.supports_launcher(&launcher) {
                    println!("Not available for {}", launcher);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Config { init } => {
            if init {
                config.save()?;
                log_info(&format!("Wrote {}", AppConfig::get_path().display()));
            }
            println!("# {}", AppConfig::get_path().display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = AppConfig::load();

    init_logger(config.log_to_file && !cli.no_log_file);
    log_info("wine-builds starting up...");

    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            wine_builds::logging::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
