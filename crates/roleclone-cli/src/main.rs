//! roleclone command line.
//!
//! Copies an IAM role under a new name: trust policy, path, description,
//! session duration, permissions boundary, tags, inline policies and
//! managed policy attachments.
//!
//! ```bash
//! # Preview what would be created
//! roleclone --source app-prod --target app-staging --dry-run
//!
//! # Clone using a named profile
//! roleclone --source app-prod --target app-staging --profile admin
//! ```

mod commands;
mod style;

use std::process::ExitCode;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, ValueEnum};
use roleclone_config::{MAX_PAGE_SIZE, OutputFormat};
use tracing_subscriber::EnvFilter;

use commands::clone::CloneOptions;

const DEFAULT_LOG_FILTER: &str = "warn,roleclone=info,roleclone_aws=info";

/// roleclone - clone an IAM role with its trust policy, tags and policies.
#[derive(Parser)]
#[command(name = "roleclone")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Name of the role to copy.
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    source: String,

    /// Name of the role to create.
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    target: String,

    /// AWS region (defaults to the SDK's resolution chain).
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    region: Option<String>,

    /// Named profile from the shared AWS config files.
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    profile: Option<String>,

    /// Override the IAM endpoint, e.g. for a local emulator.
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    endpoint_url: Option<String>,

    /// Items requested per listing page.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGE_SIZE)))]
    page_size: Option<u32>,

    /// Read the source role and print the plan without creating anything.
    #[arg(long)]
    dry_run: bool,

    /// Output format.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Disable colored output.
    #[arg(long)]
    no_color: bool,

    /// Directory searched for roleclone.toml and roleclone.local.toml.
    #[arg(long, default_value = ".")]
    project_dir: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl From<Cli> for CloneOptions {
    fn from(cli: Cli) -> Self {
        Self {
            source: cli.source,
            target: cli.target,
            region: cli.region,
            profile: cli.profile,
            endpoint_url: cli.endpoint_url,
            page_size: cli.page_size,
            format: cli.format.map(OutputFormat::from),
            dry_run: cli.dry_run,
            project_dir: cli.project_dir,
        }
    }
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color || style::no_color_requested_by_env() {
        style::set_no_color(true);
    }

    match commands::clone::run(&CloneOptions::from(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            style::print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
