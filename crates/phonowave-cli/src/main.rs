//! PhonoWave CLI - Acoustic wave simulation and phonetic feature extraction.
//!
//! # Commands
//!
//! - `phonowave simulate` - Run the 2D FDTD solver and record a microphone to WAV
//! - `phonowave analyze <files>` - Extract phonetic features from WAV files
//! - `phonowave completions <shell>` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # 0.1 s of a 440 Hz membrane on a 128×128 grid
//! phonowave simulate --width 128 --height 128 --source membrane --output drum.wav
//!
//! # Simulate from a configuration file
//! phonowave simulate --config room.toml
//!
//! # Feature report as JSON
//! phonowave analyze drum.wav vowel.wav --format json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;

use commands::{analyze, simulate, OutputFormat, SourceShape};

/// PhonoWave - acoustic FDTD simulation and phonetic analysis
#[derive(Parser)]
#[command(name = "phonowave")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the wave solver and write the microphone signal to WAV
    Simulate {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of time steps
        #[arg(short = 'n', long)]
        steps: Option<u64>,

        /// Grid width in cells
        #[arg(long)]
        width: Option<usize>,

        /// Grid height in cells
        #[arg(long)]
        height: Option<usize>,

        /// Replace configured sources with one centred source
        #[arg(short, long, value_enum)]
        source: Option<SourceShape>,

        /// Source frequency in Hz
        #[arg(short, long)]
        frequency: Option<f32>,

        /// Source amplitude
        #[arg(short, long)]
        amplitude: Option<f32>,

        /// Output WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Steps between progress updates
        #[arg(long)]
        progress_interval: Option<u64>,
    },

    /// Extract phonetic features from WAV files
    Analyze {
        /// Input WAV files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Number of MFCC coefficients
        #[arg(long)]
        mfcc: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Simulate {
            config,
            steps,
            width,
            height,
            source,
            frequency,
            amplitude,
            output,
            progress_interval,
        } => {
            let args = simulate::SimulateArgs {
                config,
                steps,
                width,
                height,
                source,
                frequency,
                amplitude,
                output,
                progress_interval,
            };
            simulate::execute(args, cli.quiet).await
        }

        Commands::Analyze {
            files,
            config,
            format,
            mfcc,
        } => analyze::execute(&files, config.as_deref(), format, mfcc, cli.quiet).await,

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "phonowave",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
