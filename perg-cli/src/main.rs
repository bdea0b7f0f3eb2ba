use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use perg::{search, SearchConfig, SearchSummary};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Multithreaded grep-style search over files and directory trees.
///
/// By default the current directory is searched non-recursively, splitting
/// each file into line blocks processed in parallel. With --file-wise,
/// whole files are distributed across workers instead, which is optimal
/// when files are small, similar in size, or numerous.
#[derive(Parser, Debug)]
#[command(name = "perg", about, long_about = None, version, disable_version_flag = true)]
struct Cli {
    /// Pattern to search for (supports regex)
    pattern: String,

    /// Directory to search when no explicit file is given
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Search only this file instead of walking a directory
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    /// Print NUM lines of trailing context after each match.
    /// Does not combine with --invert-match.
    #[arg(short = 'A', long = "after-context", value_name = "NUM", default_value_t = 0)]
    after_context: usize,

    /// Recursively search subdirectories
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Select lines that do not match the pattern
    #[arg(short = 'v', long = "invert-match")]
    invert_match: bool,

    /// Prefix each matched line with the path it came from
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Distribute whole files across workers instead of splitting each
    /// file into line blocks
    #[arg(short = 'w', long = "file-wise")]
    file_wise: bool,

    /// Include hidden files in the search
    #[arg(short = 'i', long = "hidden")]
    include_hidden: bool,

    /// Paths to skip (glob format, repeatable)
    #[arg(long)]
    ignore: Vec<String>,

    /// Number of worker threads (default: CPU cores)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print run statistics after the matches
    #[arg(long)]
    stats: bool,

    /// Print version
    #[arg(long, action = clap::ArgAction::Version, value_parser = clap::value_parser!(bool))]
    version: Option<bool>,
}

fn main() {
    let cli = Cli::parse();
    let stats = cli.stats;

    let code = match run(cli) {
        Ok(summary) => {
            if stats {
                print_stats(&summary);
            }
            // grep convention: 0 when something matched, 1 when nothing did
            if summary.has_matches() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            2
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<SearchSummary> {
    let file_config =
        SearchConfig::load_from(cli.config.as_deref()).context("failed to load config file")?;

    let cli_config = SearchConfig {
        pattern: cli.pattern,
        root_path: cli.path,
        file: cli.file,
        invert: cli.invert_match,
        verbose: cli.verbose,
        context_lines: cli.after_context,
        file_wise: cli.file_wise,
        include_hidden: cli.include_hidden,
        recursive: cli.recursive,
        ignore_patterns: cli.ignore,
        thread_count: cli
            .threads
            .or_else(|| NonZeroUsize::new(num_cpus::get()))
            .unwrap_or(NonZeroUsize::MIN),
        ..Default::default()
    };

    let config = file_config.merge_with_cli(cli_config);
    init_tracing(&config.log_level);

    Ok(search(&config)?)
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_stats(summary: &SearchSummary) {
    println!(
        "\n{} {} matched lines ({} context) across {} units, {} skipped",
        "stats:".cyan().bold(),
        summary.matched_lines,
        summary.context_lines,
        summary.units_completed,
        summary.units_skipped
    );
}
