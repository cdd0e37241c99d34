//! `phonowave simulate` command - Run the FDTD solver and record the microphone.

use std::path::{Path, PathBuf};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use phonowave_sim::{
    RunOutcome, SimulationRunner, SimulationStats, SourceDescriptor, WaveFieldSolver,
};

use crate::config::FileConfig;
use crate::error::{CliError, CliResult};

use super::SourceShape;

/// Steps run when neither the file nor the flags set a count (0.1 s at the default rate).
pub const DEFAULT_STEPS: u64 = 8820;

/// Default frequency of a command-line source.
pub const DEFAULT_FREQUENCY: f32 = 440.0;

/// Default WAV output path.
pub const DEFAULT_OUTPUT: &str = "phonowave.wav";

/// Options gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct SimulateArgs {
    /// TOML configuration file.
    pub config: Option<PathBuf>,
    /// Step count override.
    pub steps: Option<u64>,
    /// Grid width override.
    pub width: Option<usize>,
    /// Grid height override.
    pub height: Option<usize>,
    /// Replace file sources with one generated source.
    pub source: Option<SourceShape>,
    /// Frequency of the generated source.
    pub frequency: Option<f32>,
    /// Amplitude of the generated source.
    pub amplitude: Option<f32>,
    /// WAV output path override.
    pub output: Option<PathBuf>,
    /// Progress interval override.
    pub progress_interval: Option<u64>,
}

/// Fully resolved run settings.
pub struct SimulationPlan {
    /// Solver with its sources registered.
    pub solver: WaveFieldSolver,
    /// Steps to run.
    pub steps: u64,
    /// Steps between progress reports.
    pub progress_interval: Option<u64>,
    /// WAV destination.
    pub output: PathBuf,
}

impl SimulationPlan {
    /// Merge the configuration file with command-line overrides.
    pub fn resolve(args: &SimulateArgs) -> CliResult<Self> {
        let file = FileConfig::load(args.config.as_deref())?;
        let section = file.simulation;

        let mut config = section.solver;
        if let Some(width) = args.width {
            config.width = width;
        }
        if let Some(height) = args.height {
            config.height = height;
        }

        let steps = args.steps.or(section.steps).unwrap_or(DEFAULT_STEPS);
        if steps == 0 {
            return Err(CliError::InvalidArgument(
                "step count must be positive".to_string(),
            ));
        }

        let mut sources = section.sources;
        if args.source.is_some() || sources.is_empty() {
            let shape = args.source.unwrap_or(SourceShape::Point);
            let frequency = args.frequency.unwrap_or(DEFAULT_FREQUENCY);
            let amplitude = args.amplitude.unwrap_or(1.0);
            if !(frequency.is_finite() && frequency > 0.0) {
                return Err(CliError::InvalidArgument(format!(
                    "frequency must be positive, got {}",
                    frequency
                )));
            }
            sources = vec![default_source(shape, config.width, config.height, frequency, amplitude)];
        }

        let mut solver = WaveFieldSolver::new(config)?;
        for source in sources {
            solver.add_source(source);
        }

        Ok(Self {
            solver,
            steps,
            progress_interval: args.progress_interval.or(section.progress_interval),
            output: args
                .output
                .clone()
                .or(section.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        })
    }
}

/// Place a source of `shape` relative to a `width`×`height` grid.
pub fn default_source(
    shape: SourceShape,
    width: usize,
    height: usize,
    frequency: f32,
    amplitude: f32,
) -> SourceDescriptor {
    let (w, h) = (width as i32, height as i32);
    match shape {
        SourceShape::Point => SourceDescriptor::point(w / 2, h / 2, frequency, amplitude),
        SourceShape::Line => {
            SourceDescriptor::line(w / 4, h / 2, 3 * w / 4, h / 2, frequency, amplitude)
        }
        SourceShape::Membrane => {
            let radius = (width.min(height) as f32 / 8.0).max(1.0);
            SourceDescriptor::membrane(w / 2, h / 2, radius, frequency, amplitude)
        }
    }
}

/// Execute the `simulate` command.
pub async fn execute(args: SimulateArgs, quiet: bool) -> CliResult<()> {
    let plan = SimulationPlan::resolve(&args)?;
    let config = plan.solver.config().clone();

    if !quiet {
        println!("{} Running acoustic simulation", "→".bright_cyan());
        println!(
            "  {} Grid: {}",
            "•".dimmed(),
            format!("{}×{} cells of {} m", config.width, config.height, config.cell_size)
                .bright_yellow()
        );
        println!(
            "  {} Time step: {}",
            "•".dimmed(),
            format!("{:.3e} s (Courant {:.3})", config.time_step, config.courant_number())
                .bright_yellow()
        );
        println!(
            "  {} Sources: {}",
            "•".dimmed(),
            plan.solver.sources().len().to_string().bright_yellow()
        );
        if plan.solver.cfl_clamped() {
            println!(
                "{} Time step reduced to satisfy the CFL condition",
                "Warning:".yellow()
            );
        }
        println!();
    }

    let outcome = run(plan.solver, plan.steps, plan.progress_interval, quiet).await?;
    let sample_rate = outcome.sample_rate();

    let output = plan.output;
    let audio = outcome.audio;
    let path = output.clone();
    tokio::task::spawn_blocking(move || audio.write_wav(&path, sample_rate)).await??;

    if !quiet {
        print_summary(&outcome.stats, outcome.steps_completed, sample_rate, &output);
    }
    Ok(())
}

async fn run(
    solver: WaveFieldSolver,
    steps: u64,
    progress_interval: Option<u64>,
    quiet: bool,
) -> CliResult<RunOutcome> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(steps);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );
        bar
    };

    let mut runner = SimulationRunner::new(solver, steps);
    if let Some(interval) = progress_interval {
        runner = runner.with_progress_interval(interval);
    }
    let handle = runner.spawn()?;

    let outcome = tokio::task::spawn_blocking(move || {
        for progress in handle.progress().iter() {
            bar.set_position(progress.step);
            bar.set_message(format!("max |p| {:.3e}", progress.stats.max_pressure));
        }
        bar.finish_and_clear();
        handle.join()
    })
    .await??;

    debug!(
        "Simulation finished after {} steps (cancelled: {})",
        outcome.steps_completed, outcome.cancelled
    );
    Ok(outcome)
}

fn print_summary(
    stats: &SimulationStats,
    steps: u64,
    sample_rate: u32,
    output: &Path,
) {
    println!("{}:", "Simulation Summary".bright_white().underline());
    println!();
    println!("  Steps:          {}", steps.to_string().bright_white());
    println!("  Simulated time: {:.4} s", stats.elapsed_time);
    println!("  Max pressure:   {:.4e}", stats.max_pressure);
    println!("  Field energy:   {:.4e}", stats.energy_content);
    println!("  Sample rate:    {} Hz", sample_rate);
    println!();
    println!(
        "{} Wrote {}",
        "✓".bright_green().bold(),
        output.display().to_string().bright_yellow()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use phonowave_sim::SourceKind;
    use std::fs;

    #[test]
    fn test_default_plan() {
        let plan = SimulationPlan::resolve(&SimulateArgs::default()).unwrap();
        assert_eq!(plan.steps, DEFAULT_STEPS);
        assert_eq!(plan.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(plan.solver.sources().len(), 1);
        assert!(matches!(
            plan.solver.sources()[0].kind,
            SourceKind::Point { x: 32, y: 32, .. }
        ));
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        fs::write(
            &path,
            "[simulation]\nwidth = 40\nheight = 20\nsteps = 10\noutput = \"file.wav\"\n\n\
             [[simulation.sources]]\ntype = \"point\"\nx = 1\ny = 1\nfrequency = 100.0\namplitude = 1.0\n",
        )
        .unwrap();

        let from_file = SimulationPlan::resolve(&SimulateArgs {
            config: Some(path.clone()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(from_file.steps, 10);
        assert_eq!(from_file.solver.width(), 40);
        assert_eq!(from_file.output, PathBuf::from("file.wav"));
        assert!(matches!(
            from_file.solver.sources()[0].kind,
            SourceKind::Point { x: 1, y: 1, .. }
        ));

        let overridden = SimulationPlan::resolve(&SimulateArgs {
            config: Some(path),
            steps: Some(25),
            width: Some(64),
            source: Some(SourceShape::Line),
            frequency: Some(220.0),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(overridden.steps, 25);
        assert_eq!(overridden.solver.width(), 64);
        assert_eq!(overridden.solver.sources().len(), 1);
        assert!(matches!(
            overridden.solver.sources()[0].kind,
            SourceKind::Line { x0: 16, y0: 10, x1: 48, y1: 10, .. }
        ));
        assert_eq!(overridden.solver.sources()[0].frequency(), 220.0);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let zero_steps = SimulateArgs {
            steps: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            SimulationPlan::resolve(&zero_steps),
            Err(CliError::InvalidArgument(_))
        ));

        let bad_frequency = SimulateArgs {
            frequency: Some(-5.0),
            ..Default::default()
        };
        assert!(SimulationPlan::resolve(&bad_frequency).is_err());
    }

    #[test]
    fn test_membrane_radius() {
        let source = default_source(SourceShape::Membrane, 64, 32, 440.0, 1.0);
        assert!(matches!(
            source.kind,
            SourceKind::Membrane { cx: 32, cy: 16, radius, .. } if radius == 4.0
        ));
    }

    #[tokio::test]
    async fn test_execute_writes_wav() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.wav");
        let args = SimulateArgs {
            steps: Some(50),
            width: Some(16),
            height: Some(16),
            output: Some(output.clone()),
            progress_interval: Some(10),
            ..Default::default()
        };
        execute(args, true).await.unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.len(), 50);
        assert_eq!(reader.spec().sample_rate, 88_200);
    }
}
