//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use booklet_core::{
    BuildResult, ProgressReporter, build_package, load_request, run_batch, write_package,
};
use booklet_shared::{AppConfig, BuildConfig, init_config, load_config, load_config_from};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Booklet: build H5P Interactive Book packages.
#[derive(Parser)]
#[command(
    name = "booklet",
    version,
    about = "Build H5P Interactive Book packages from structured chapter data.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.booklet/booklet.toml).
    #[arg(long, env = "BOOKLET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

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
    /// Build one package from a request file (.json or .md).
    Build {
        /// Request file.
        request: PathBuf,

        /// Template archive (overrides the config file).
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output file or directory (defaults to the configured output dir).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Build every request in a folder, writing packages beside them.
    Batch {
        /// Folder of request files.
        dir: PathBuf,

        /// Template archive (overrides the config file).
        #[arg(short, long)]
        template: Option<PathBuf>,
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
    /// Initialize config file with defaults.
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
        0 => "booklet=info",
        1 => "booklet=debug",
        _ => "booklet=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build {
            request,
            template,
            out,
        } => cmd_build(config_path, &request, template, out.as_deref()),
        Command::Batch { dir, template } => cmd_batch(config_path, &dir, template),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_app_config(config_path: Option<&Path>) -> Result<AppConfig> {
    Ok(match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

fn resolve_build_config(config_path: Option<&Path>, template: Option<PathBuf>) -> Result<BuildConfig> {
    let app = resolve_app_config(config_path)?;
    let mut config = BuildConfig::from(&app);
    if let Some(template) = template {
        config.template_path = template;
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn asset_loaded(&self, path: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Loading assets [{current}/{total}] {path}"));
    }

    fn done(&self, result: &BuildResult) {
        self.spinner
            .set_message(format!("Built {} ({} chapters)", result.file_name, result.chapter_count));
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_build(
    config_path: Option<&Path>,
    request_path: &Path,
    template: Option<PathBuf>,
    out: Option<&Path>,
) -> Result<()> {
    let config = resolve_build_config(config_path, template)?;
    let request = load_request(request_path)?;

    info!(
        request = %request_path.display(),
        template = %config.template_path.display(),
        "building package"
    );

    let reporter = CliProgress::new()?;
    let built = build_package(&config, &request, &reporter);
    reporter.finish();
    let result = built?;

    let output = match out {
        Some(path) if path.is_dir() => path.join(&result.file_name),
        Some(path) => path.to_path_buf(),
        None => config.output_dir.join(&result.file_name),
    };
    write_package(&result, &output)?;

    println!();
    println!("  Package built successfully!");
    println!("  File:     {}", output.display());
    println!("  Chapters: {}", result.chapter_count);
    println!("  Skipped:  {}", result.skipped);
    println!("  Assets:   {}", result.asset_count);
    println!("  Size:     {:.1} KB", result.bytes.len() as f64 / 1024.0);
    println!("  SHA-256:  {}", result.sha256);
    println!("  Time:     {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_batch(config_path: Option<&Path>, dir: &Path, template: Option<PathBuf>) -> Result<()> {
    let config = resolve_build_config(config_path, template)?;
    if !dir.is_dir() {
        return Err(eyre!("'{}' is not a directory", dir.display()));
    }

    let reporter = CliProgress::new()?;
    let summary = run_batch(&config, dir, &reporter);
    reporter.finish();
    let summary = summary?;

    println!();
    for item in &summary.items {
        match (&item.output, &item.error) {
            (Some(output), _) => println!("  ok     {}", output.display()),
            (None, Some(error)) => println!("  failed {}: {error}", item.request.display()),
            (None, None) => {}
        }
    }
    println!();
    println!(
        "  {} built, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    println!();

    if summary.failed() > 0 {
        return Err(eyre!(
            "{} of {} requests failed",
            summary.failed(),
            summary.items.len()
        ));
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_app_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_build_flags() {
        let cli = Cli::try_parse_from([
            "booklet",
            "-vv",
            "--log-format",
            "json",
            "build",
            "book.json",
            "--template",
            "t.h5p",
            "--out",
            "out/",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        match cli.command {
            Command::Build {
                request,
                template,
                out,
            } => {
                assert_eq!(request, PathBuf::from("book.json"));
                assert_eq!(template, Some(PathBuf::from("t.h5p")));
                assert_eq!(out, Some(PathBuf::from("out/")));
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn template_flag_overrides_config() {
        let dir = std::env::temp_dir().join(format!("booklet-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config_file = dir.join("booklet.toml");
        std::fs::write(&config_file, "[defaults]\ntemplate_path = \"from-file.h5p\"\n").unwrap();

        let config = resolve_build_config(Some(&config_file), None).unwrap();
        assert_eq!(config.template_path, PathBuf::from("from-file.h5p"));

        let config = resolve_build_config(Some(&config_file), Some("flag.h5p".into())).unwrap();
        assert_eq!(config.template_path, PathBuf::from("flag.h5p"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
