//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use frontstage_core::{
    InstallSpec, MergeConfig, MergeOutcome, ProgressReporter, build_report, merge_assets,
    write_report,
};
use frontstage_fetch::Source;
use frontstage_shared::{AppConfig, init_config, load_config, load_config_from, validate_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Frontstage — stage frontend assets into the build output directory.
#[derive(Parser)]
#[command(
    name = "frontstage",
    version,
    about = "Install dependencies, fetch the frontend tree, and stage allowlisted assets.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the merge step: install, fetch, stage, clean up.
    Merge {
        /// Destination directory (defaults to the configured dest_dir).
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Config file path (defaults to ./frontstage.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured remote URL.
        #[arg(long)]
        remote: Option<String>,

        /// Stage from a local tree instead of cloning (fixture testing).
        #[arg(long, conflicts_with = "remote")]
        source_path: Option<PathBuf>,

        /// Skip the dependency install step.
        #[arg(long)]
        skip_install: bool,

        /// Write a JSON merge report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Write a default frontstage.toml into the working directory.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "frontstage=info",
        1 => "frontstage=debug",
        _ => "frontstage=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Merge {
            dest,
            config,
            remote,
            source_path,
            skip_install,
            report,
        } => {
            cmd_merge(
                dest,
                config.as_deref(),
                remote.as_deref(),
                source_path,
                skip_install,
                report,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

async fn cmd_merge(
    dest: Option<PathBuf>,
    config_path: Option<&std::path::Path>,
    remote: Option<&str>,
    source_path: Option<PathBuf>,
    skip_install: bool,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let cwd = std::env::current_dir()
        .map_err(|e| eyre!("cannot determine working directory: {e}"))?;

    let mut config = match config_path {
        Some(p) => load_config_from(p)?,
        None => load_config(&cwd)?,
    };

    if let Some(url) = remote {
        config.source.remote = url.to_string();
        config.source.kind = "git".into();
    }
    if let Some(path) = &source_path {
        config.source.remote = path.to_string_lossy().to_string();
        config.source.kind = "local".into();
    }
    if skip_install {
        config.install.enabled = false;
    }

    validate_config(&config)?;

    let dest_dir = dest.unwrap_or_else(|| cwd.join(&config.staging.dest_dir));
    let merge_config = build_merge_config(&config, dest_dir)?;

    info!(
        source = %merge_config.source.describe(),
        dest = %merge_config.dest_dir.display(),
        entries = merge_config.allowlist.len(),
        "starting asset merge"
    );

    let reporter = CliProgress::new();
    let outcome = merge_assets(&merge_config, &reporter).await?;

    if let Some(warning) = &outcome.cleanup_warning {
        warn!(%warning, "merge succeeded with cleanup warning");
        eprintln!("  warning: {warning}");
    }

    // Print summary
    println!();
    println!("  Assets staged successfully!");
    println!("  Run:     {}", outcome.run_id);
    println!("  Source:  {}", merge_config.source.describe());
    println!("  Dest:    {}", merge_config.dest_dir.display());
    println!("  Entries: {}", outcome.entries.len());
    println!("  Files:   {}", outcome.files_copied);
    println!("  Bytes:   {}", outcome.bytes_copied);
    println!("  Time:    {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    if let Some(path) = report_path {
        let report = build_report(&merge_config, &outcome);
        write_report(&path, &report)?;
        println!("  Report:  {}", path.display());
    }

    Ok(())
}

/// Resolve the runtime merge config from the loaded app config.
fn build_merge_config(config: &AppConfig, dest_dir: PathBuf) -> Result<MergeConfig> {
    let source = match config.source.kind.as_str() {
        "git" => Source::Git {
            url: config.source.remote.clone(),
            reference: if config.source.reference.is_empty() {
                None
            } else {
                Some(config.source.reference.clone())
            },
        },
        "local" => Source::Local {
            path: PathBuf::from(&config.source.remote),
        },
        other => return Err(eyre!("unknown source.kind '{other}'")),
    };

    let install = if config.install.enabled {
        Some(InstallSpec {
            command: config.install.command.clone(),
            args: config.install.args.clone(),
        })
    } else {
        None
    };

    Ok(MergeConfig {
        source,
        allowlist: config.staging.allowlist.clone(),
        dest_dir,
        install,
        install_timeout: timeout_from_secs(config.limits.install_timeout_secs),
        fetch_timeout: timeout_from_secs(config.limits.fetch_timeout_secs),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn entry_staged(&self, entry: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Staging [{current}/{total}] {entry}"));
    }

    fn done(&self, _outcome: &MergeOutcome) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = init_config(&cwd)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config: AppConfig = load_config(&cwd)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
