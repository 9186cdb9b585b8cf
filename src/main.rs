//! `reg-appsearch` - find installed applications by approximate name.
//!
//! ```text
//! reg-appsearch <guess> [-v|--verbose] [--hive <path>] [--mount <name>]
//!               [--config <path>] [--keep-going]
//! ```
//!
//! Without `--hive` the live `HKEY_LOCAL_MACHINE` registry is searched, which
//! is only possible on Windows.

use anyhow::{Context, Result};
use clap::Parser;
use reg_appsearch::{
    write_matches, ConfigStore, HiveStore, KeyErrorPolicy, OutputMode, SearchConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Prints the DisplayName of every installed application whose name
/// contains, or is contained in, the guess (case-insensitive).
#[derive(Parser, Debug)]
#[command(name = "reg-appsearch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Guess at the application's display name; empty matches everything
    guess: String,

    /// Print every attribute of each match as JSON
    #[arg(short, long)]
    verbose: bool,

    /// Search an offline hive file instead of the live registry
    #[arg(long, value_name = "PATH")]
    hive: Option<PathBuf>,

    /// Hive mount point to strip from paths (default: SOFTWARE)
    #[arg(long, value_name = "NAME", requires = "hive")]
    mount: Option<String>,

    /// Load search settings from a JSON file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Skip keys that cannot be read instead of failing
    #[arg(long)]
    keep_going: bool,
}

fn init_logging() {
    // Results go to stdout; diagnostics stay on stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();
}

fn open_store(args: &Cli) -> Result<Box<dyn ConfigStore>> {
    if let Some(path) = &args.hive {
        let store = HiveStore::open(path)?;
        let store = match &args.mount {
            Some(mount) => store.with_mount(Some(mount.as_str())),
            None => store,
        };
        return Ok(Box::new(store));
    }
    live_store()
}

#[cfg(windows)]
fn live_store() -> Result<Box<dyn ConfigStore>> {
    Ok(Box::new(reg_appsearch::LocalMachine::new()))
}

#[cfg(not(windows))]
fn live_store() -> Result<Box<dyn ConfigStore>> {
    anyhow::bail!("the live registry is only available on Windows; pass --hive <path>")
}

fn run(args: Cli) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if args.keep_going {
        config = config.with_policy(KeyErrorPolicy::Skip);
    }
    debug!(?config, "Search configuration");

    let store = open_store(&args)?;
    let matches = reg_appsearch::find_applications(store.as_ref(), &args.guess, &config)
        .with_context(|| format!("search of {} failed", store.describe()))?;

    let mode = if args.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Terse
    };
    let stdout = std::io::stdout();
    write_matches(&mut stdout.lock(), &matches, mode)?;
    Ok(())
}

fn main() -> ExitCode {
    // Usage errors exit with status 2 from inside clap.
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("reg-appsearch").chain(args.iter().copied()))
    }

    #[test]
    fn test_guess_and_verbose() {
        let cli = parse(&["notepad", "-v"]).unwrap();
        assert_eq!(cli.guess, "notepad");
        assert!(cli.verbose);
        assert!(cli.hive.is_none());
        assert!(!cli.keep_going);
    }

    #[test]
    fn test_hive_options() {
        let cli = parse(&["--hive", "SOFTWARE", "--mount", "HKLM", "--keep-going", "vlc"]).unwrap();
        assert_eq!(cli.hive, Some(PathBuf::from("SOFTWARE")));
        assert_eq!(cli.mount.as_deref(), Some("HKLM"));
        assert!(cli.keep_going);
        assert_eq!(cli.guess, "vlc");
    }

    #[test]
    fn test_empty_guess_is_allowed() {
        assert_eq!(parse(&[""]).unwrap().guess, "");
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(parse(&[]).unwrap_err().kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse(&["a", "b"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert!(parse(&["a", "--hive"]).is_err());
        assert_eq!(parse(&["--bogus", "a"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert!(parse(&["a", "--mount", "SOFTWARE"]).is_err());
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_usage_errors_exit_with_two() {
        assert_eq!(parse(&["--bogus", "a"]).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
