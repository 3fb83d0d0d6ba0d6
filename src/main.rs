use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reviewgen::cli::commands::generate::GenerateOptions;
use reviewgen::types::{ReviewKind, ToneMode};

/// Parse a review kind from string
fn parse_kind(s: &str) -> Result<ReviewKind, String> {
    match s.to_lowercase().as_str() {
        "visitor" => Ok(ReviewKind::Visitor),
        "blog" => Ok(ReviewKind::Blog),
        _ => Err(format!("Invalid kind '{}'. Valid values: visitor, blog", s)),
    }
}

/// Parse a tone mode from string
fn parse_tone(s: &str) -> Result<ToneMode, String> {
    ToneMode::parse(s).ok_or_else(|| {
        format!(
            "Invalid tone '{}'. Valid values: gentle, casual, energetic",
            s
        )
    })
}

#[derive(Parser)]
#[command(name = "reviewgen")]
#[command(
    version,
    about = "AI review generator with ordered provider fallback"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Use a specific config file only")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a review from a corpus of place reviews
    Generate {
        #[arg(long, help = "File with reviews (JSON array or one per line)")]
        reviews_file: Option<PathBuf>,
        #[arg(long = "review", help = "A review passed directly (repeatable)")]
        reviews: Vec<String>,
        #[arg(long, value_parser = parse_kind, default_value = "blog", help = "Output kind: visitor, blog")]
        kind: ReviewKind,
        #[arg(long, value_parser = parse_tone, default_value = "casual", help = "Tone: gentle, casual, energetic")]
        tone: ToneMode,
        #[arg(long, help = "Optional one-line visitor impression to blend in")]
        impression: Option<String>,
        #[arg(long, help = "Emit JSON response contract instead of styled text")]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mreviewgen encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            reviews_file,
            reviews,
            kind,
            tone,
            impression,
            json,
        } => {
            let rt = Runtime::new()?;
            rt.block_on(reviewgen::cli::commands::generate::run(GenerateOptions {
                reviews_file,
                reviews,
                kind,
                tone,
                impression,
                json,
                config_file: cli.config,
            }))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                reviewgen::cli::commands::config::show(global, &format)?;
            }
            ConfigAction::Path => {
                reviewgen::cli::commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    reviewgen::cli::commands::config::init_global(force)?;
                } else {
                    reviewgen::cli::commands::config::init_project()?;
                }
            }
        },
    }

    Ok(())
}
