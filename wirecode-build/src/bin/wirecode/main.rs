mod output;
mod theme;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::control::ShouldColorize;
use wirecode_build::{ExpandSettings, ExpansionReport, WirecodeConfig};

use crate::output::{GlobalOptions, OutputManager};

#[derive(Parser)]
#[command(name = "wirecode")]
#[command(about = "Preview and check the code generated by wirecode coding macros")]
#[command(version)]
struct Cli {
    /// Suppress output (only diagnostics will be shown)
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable verbose output and planner logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print or write the expansion of every annotated item
    Expand(ExpandArgs),

    /// Run every expansion and report diagnostics only
    Check(ScanArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Files or directories to scan (default: from wirecode.toml, else src)
    paths: Vec<PathBuf>,

    /// Runtime crate path used by generated code
    #[arg(long, value_name = "PATH")]
    runtime: Option<String>,

    /// Fail on warnings as well as errors
    #[arg(long)]
    deny_warnings: bool,

    /// Configuration file (default: nearest wirecode.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ExpandArgs {
    #[command(flatten)]
    scan: ScanArgs,

    /// Write the expansion to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let no_color = cli.no_color || !ShouldColorize::from_env().should_colorize();
    if no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color,
    });

    if let Err(err) = execute(cli.command, &output) {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn execute(command: Commands, output: &OutputManager) -> Result<()> {
    match command {
        Commands::Expand(args) => handle_expand(args, output),
        Commands::Check(args) => handle_check(args, output),
    }
}

fn handle_expand(args: ExpandArgs, output: &OutputManager) -> Result<()> {
    let mut settings = load_settings(&args.scan)?;
    if let Some(path) = args.output {
        settings.output_file = Some(path);
    }

    let report = settings.expander().collect()?;
    output.items(&report);
    output.findings(&report);

    match &settings.output_file {
        Some(path) => {
            if report.write_to(path)? {
                output.info(&format!("wrote {}", path.display()));
            } else {
                output.info(&format!("{} is up to date", path.display()));
            }
        }
        None => output.code(&report.listing()),
    }

    summarize(&report, settings.deny_warnings, output)
}

fn handle_check(args: ScanArgs, output: &OutputManager) -> Result<()> {
    let settings = load_settings(&args)?;
    let report = settings.expander().collect()?;
    output.items(&report);
    output.findings(&report);
    summarize(&report, settings.deny_warnings, output)
}

fn summarize(report: &ExpansionReport, deny_warnings: bool, output: &OutputManager) -> Result<()> {
    let errors = report.errors().count();
    let warnings = report.warnings().count();

    if !report.passes(deny_warnings) {
        bail!("{errors} error(s), {warnings} warning(s)");
    }

    output.success(&format!(
        "{} item(s) checked, {} expanded, {warnings} warning(s)",
        report.items.len(),
        report.expanded().count()
    ));
    Ok(())
}

/// Settings from `--config` or the nearest `wirecode.toml`, overridden by flags.
fn load_settings(args: &ScanArgs) -> Result<ExpandSettings> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;

    let (root, config) = match &args.config {
        Some(path) => {
            let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (root, WirecodeConfig::load(path)?)
        }
        None => match WirecodeConfig::find_from(&current_dir)? {
            Some((path, config)) => {
                log::debug!("using {}", path.display());
                let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                (root, config)
            }
            None => (current_dir, WirecodeConfig::default()),
        },
    };

    let mut settings = config.expand.resolved(&root);
    if !args.paths.is_empty() {
        settings.scan_paths = args.paths.clone();
    }
    if let Some(runtime) = &args.runtime {
        settings.runtime = Some(runtime.clone());
    }
    settings.deny_warnings |= args.deny_warnings;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("wirecode.toml");
        std::fs::write(&config, "[expand]\nscan_paths = [\"models\"]\nruntime = \"crate::wire\"\n").unwrap();

        let cli = Cli::parse_from([
            "wirecode",
            "check",
            "--runtime",
            "::other",
            "--deny-warnings",
            "--config",
            config.to_str().unwrap(),
        ]);
        let Commands::Check(args) = cli.command else {
            panic!("expected the check command");
        };

        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.scan_paths, [dir.path().join("models")]);
        assert_eq!(settings.runtime.as_deref(), Some("::other"));
        assert!(settings.deny_warnings);
    }

    #[test]
    fn expand_accepts_an_output_file() {
        let cli = Cli::parse_from(["wirecode", "--no-color", "expand", "src", "-o", "out.rs"]);
        assert!(cli.no_color);
        let Commands::Expand(args) = cli.command else {
            panic!("expected the expand command");
        };
        assert_eq!(args.scan.paths, [PathBuf::from("src")]);
        assert_eq!(args.output, Some(PathBuf::from("out.rs")));
    }
}
