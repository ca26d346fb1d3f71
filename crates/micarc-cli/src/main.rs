//! MicArc CLI - broadband/tonal decomposition of microphone-array recordings.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "micarc")]
#[command(author, version, about = "MicArc acoustic analysis CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show WAV file metadata
    Info(commands::info::InfoArgs),

    /// Split a recording into broadband and tonal SPL
    Analyze(commands::analyze::AnalyzeArgs),

    /// Estimate the frequency of the dominant tone
    PeakFreq(commands::peak_freq::PeakFreqArgs),

    /// Write selected microphone channels to a new WAV file
    Export(commands::export::ExportArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let fallback = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::PeakFreq(args) => commands::peak_freq::run(args),
        Commands::Export(args) => commands::export::run(args),
    }
}
