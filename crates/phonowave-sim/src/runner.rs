//! Background stepping for long simulations.
//!
//! The runner moves a [`WaveFieldSolver`] onto its own thread, records the
//! microphone after every step and reports progress through a channel. The
//! caller keeps a [`RunnerHandle`] to watch progress, read the most recent
//! published field snapshot, or cancel. Cancellation is checked between
//! steps only, so a step is never interrupted half way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::accumulator::AudioAccumulator;
use crate::error::{Result, SimError};
use crate::field::FieldSnapshot;
use crate::solver::WaveFieldSolver;
use crate::stats::SimulationStats;

/// Default number of steps between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// Progress report sent by the runner thread.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    /// Steps completed so far.
    pub step: u64,
    /// Steps requested.
    pub total: u64,
    /// Statistics after `step`.
    pub stats: SimulationStats,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.step as f64 / self.total as f64
        }
    }
}

/// What a finished (or cancelled) run hands back.
pub struct RunOutcome {
    /// The solver, ready for further stepping.
    pub solver: WaveFieldSolver,
    /// Microphone samples, one per completed step.
    pub audio: AudioAccumulator,
    /// Steps actually taken.
    pub steps_completed: u64,
    /// True when the run stopped early on request.
    pub cancelled: bool,
    /// Statistics after the last completed step.
    pub stats: SimulationStats,
}

impl RunOutcome {
    /// Sample rate of `audio`, i.e. one sample per time step.
    pub fn sample_rate(&self) -> u32 {
        (1.0 / self.solver.config().time_step as f64).round() as u32
    }
}

/// Builder for a background simulation run.
pub struct SimulationRunner {
    solver: WaveFieldSolver,
    steps: u64,
    progress_interval: u64,
}

impl SimulationRunner {
    /// Prepare a run of `steps` steps.
    pub fn new(solver: WaveFieldSolver, steps: u64) -> Self {
        Self {
            solver,
            steps,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Report progress every `interval` steps (at least 1).
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Start stepping on a dedicated thread.
    pub fn spawn(self) -> Result<RunnerHandle> {
        let (tx, rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let snapshot = Arc::new(RwLock::new(None));
        let latest_stats = Arc::new(RwLock::new(SimulationStats::default()));

        let shared = Shared {
            cancel: cancel.clone(),
            snapshot: snapshot.clone(),
            latest_stats: latest_stats.clone(),
            progress: tx,
        };

        info!(
            "Starting simulation run: {} steps, progress every {}",
            self.steps, self.progress_interval
        );

        let thread = thread::Builder::new()
            .name("phonowave-runner".to_string())
            .spawn(move || self.drive(shared))
            .map_err(|e| SimError::runner(format!("Failed to spawn runner thread: {}", e)))?;

        Ok(RunnerHandle {
            progress: rx,
            cancel,
            snapshot,
            latest_stats,
            thread: Some(thread),
        })
    }

    fn drive(mut self, shared: Shared) -> RunOutcome {
        let mut audio = AudioAccumulator::with_capacity(self.steps.min(1 << 24) as usize);
        let mut steps_completed = 0;
        let mut cancelled = false;
        let mut stats = self.solver.stats();

        while steps_completed < self.steps {
            if shared.cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }

            stats = self.solver.advance();
            audio.add_sample(self.solver.microphone_signal());
            steps_completed += 1;

            if steps_completed % self.progress_interval == 0 || steps_completed == self.steps {
                shared.publish(&self.solver, steps_completed, self.steps, stats);
            }
        }

        info!(
            "Simulation run {}: {} of {} steps, max pressure {:.4}",
            if cancelled { "cancelled" } else { "finished" },
            steps_completed,
            self.steps,
            stats.max_pressure
        );

        RunOutcome {
            solver: self.solver,
            audio,
            steps_completed,
            cancelled,
            stats,
        }
    }
}

/// State shared between the runner thread and its handle.
struct Shared {
    cancel: Arc<AtomicBool>,
    snapshot: Arc<RwLock<Option<FieldSnapshot>>>,
    latest_stats: Arc<RwLock<SimulationStats>>,
    progress: Sender<Progress>,
}

impl Shared {
    fn publish(&self, solver: &WaveFieldSolver, step: u64, total: u64, stats: SimulationStats) {
        *self.snapshot.write() = Some(solver.pressure_snapshot());
        *self.latest_stats.write() = stats;
        debug!("Progress {}/{}: max pressure {:.4}", step, total, stats.max_pressure);

        // A dropped receiver only means nobody is listening.
        let _ = self.progress.send(Progress { step, total, stats });
    }
}

/// Handle to a running simulation.
pub struct RunnerHandle {
    progress: Receiver<Progress>,
    cancel: Arc<AtomicBool>,
    snapshot: Arc<RwLock<Option<FieldSnapshot>>>,
    latest_stats: Arc<RwLock<SimulationStats>>,
    thread: Option<JoinHandle<RunOutcome>>,
}

impl RunnerHandle {
    /// Progress reports, closed once the runner finishes.
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    /// Ask the runner to stop before its next step.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Check if the runner thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Pressure snapshot published at the most recent progress tick.
    pub fn latest_snapshot(&self) -> Option<FieldSnapshot> {
        self.snapshot.read().clone()
    }

    /// Statistics published at the most recent progress tick.
    pub fn latest_stats(&self) -> SimulationStats {
        *self.latest_stats.read()
    }

    /// Wait for the runner and take back the solver and recorded audio.
    pub fn join(mut self) -> Result<RunOutcome> {
        let thread = self
            .thread
            .take()
            .ok_or_else(|| SimError::runner("Runner already joined"))?;
        thread
            .join()
            .map_err(|_| SimError::runner("Runner thread panicked"))
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.cancel.store(true, Ordering::Relaxed);
            let _ = thread.join();
        }
    }
}
