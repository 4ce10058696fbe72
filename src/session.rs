//! The driver that owns the display copy and starts runs.
//!
//! A [`Session`] holds what a visualizer shows between runs (the array, its
//! highlights, the chosen algorithm and delay) and guards the engine: at most
//! one run is active, and nothing the run depends on may change while it is.

use crate::algo::{self, Algorithm};
use crate::config::{self, ConfigError, SessionConfig};
use crate::core::{
    CounterSnapshot, Counters, Element, Frame, Highlight, Observer, ObserverError, Pacer, Snapshot,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Errors returned by [`Session`] operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("a sort is already running")]
    Busy,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("run aborted by observer: {0}")]
    Observer(#[from] ObserverError),
}

/// Where the session is in its run lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Completed,
    /// The last run stopped early; the display shows its last frame.
    Faulted,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub algorithm: Algorithm,
    pub len: usize,
    pub elapsed: Duration,
    pub comparisons: u64,
    pub writes: u64,
}

struct SessionState<T> {
    algorithm: Algorithm,
    delay: Duration,
    display: Snapshot<T>,
    phase: Phase,
    last_report: Option<RunReport>,
    rng: StdRng,
    value_range: (u32, u32),
}

/// Driver for a single visualizer.
///
/// All methods take `&self`, so the session can sit in an `Arc` shared by a
/// renderer and the task running the sort. The state lock is never held
/// across a suspension point.
pub struct Session<T = u32> {
    state: Mutex<SessionState<T>>,
    running: AtomicBool,
    counters: Arc<Counters>,
}

impl Session<u32> {
    /// Starts from a random array described by `config`.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let values =
            config::random_array(&mut rng, config.array_size, config.min_value, config.max_value);

        let session = Self::with_array(values, config.algorithm, config.delay());
        {
            let mut state = session.lock();
            state.rng = rng;
            state.value_range = (config.min_value, config.max_value);
        }
        Ok(session)
    }

    /// Replaces the array with `size` fresh random values.
    pub fn set_array_size(&self, size: usize) -> Result<(), SessionError> {
        config::validate_array_size(size)?;
        let mut state = self.lock();
        ensure_idle(&state, "resize array")?;
        let (min, max) = state.value_range;
        let values = config::random_array(&mut state.rng, size, min, max);
        install(&mut state, values);
        self.counters.reset();
        Ok(())
    }

    /// Replaces the array with fresh random values of the same length.
    pub fn regenerate(&self) -> Result<(), SessionError> {
        let mut state = self.lock();
        ensure_idle(&state, "regenerate array")?;
        let size = state.display.array.len();
        let (min, max) = state.value_range;
        let values = config::random_array(&mut state.rng, size, min, max);
        install(&mut state, values);
        self.counters.reset();
        Ok(())
    }
}

impl<T: Element> Session<T> {
    /// Starts from caller-supplied values.
    pub fn with_array(values: Vec<T>, algorithm: Algorithm, delay: Duration) -> Self {
        let len = values.len();
        Self {
            state: Mutex::new(SessionState {
                algorithm,
                delay,
                display: Snapshot {
                    array: values,
                    highlights: vec![Highlight::Default; len],
                    comparisons: 0,
                    writes: 0,
                },
                phase: Phase::Idle,
                last_report: None,
                rng: StdRng::seed_from_u64(0),
                value_range: (config::MIN_VALUE, config::MAX_VALUE),
            }),
            running: AtomicBool::new(false),
            counters: Arc::new(Counters::new()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.lock().algorithm
    }

    /// Selects the algorithm for the next run and clears the last results.
    pub fn set_algorithm(&self, algorithm: Algorithm) -> Result<(), SessionError> {
        let mut state = self.lock();
        ensure_idle(&state, "change algorithm")?;
        state.algorithm = algorithm;
        clear_results(&mut state);
        self.counters.reset();
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        self.lock().delay
    }

    /// Sets the pacing delay. A run already in progress keeps its own delay.
    pub fn set_delay(&self, delay: Duration) {
        self.lock().delay = delay;
    }

    /// Replaces the array with caller-supplied values.
    pub fn load_array(&self, values: Vec<T>) -> Result<(), SessionError> {
        let mut state = self.lock();
        ensure_idle(&state, "load array")?;
        install(&mut state, values);
        self.counters.reset();
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The display copy: the last frame a run published, or the idle array.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.lock().display.clone()
    }

    /// Samples the live counters of the current or last run.
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Shared counters, for a renderer that samples on its own timer.
    pub fn counters_handle(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }

    pub fn last_report(&self) -> Option<RunReport> {
        self.lock().last_report
    }

    /// Sorts the current array, publishing every step to `observer`.
    ///
    /// Rejected with [`SessionError::Busy`] while another run is active. If
    /// the observer fails, the session keeps its last published frame, moves
    /// to [`Phase::Faulted`], and accepts a new run.
    pub async fn run<O>(&self, observer: O) -> Result<RunReport, SessionError>
    where
        O: Observer<T> + Send,
    {
        // Taking the flag and entering `Running` share one critical section,
        // so a control that holds the lock sees either no run or a started one.
        let (_guard, algorithm, pacer, input) = {
            let mut state = self.lock();
            let input = state.display.array.clone();
            let guard = RunGuard::acquire(&self.running, &self.state).ok_or_else(|| {
                warn!("run rejected: a sort is already running");
                SessionError::Busy
            })?;
            let len = input.len();
            state.phase = Phase::Running;
            state.last_report = None;
            state.display.highlights = vec![Highlight::Default; len];
            state.display.comparisons = 0;
            state.display.writes = 0;
            (guard, state.algorithm, Pacer::new(state.delay), input)
        };
        let len = input.len();
        self.counters.reset();

        let mirror = Mirror {
            state: &self.state,
            inner: observer,
        };
        let started = Instant::now();
        let result = algo::run(algorithm, input, pacer, &self.counters, mirror).await;
        let elapsed = started.elapsed();

        let mut state = self.lock();
        match result {
            Ok(outcome) => {
                let report = RunReport {
                    algorithm,
                    len,
                    elapsed,
                    comparisons: outcome.comparisons,
                    writes: outcome.writes,
                };
                state.display = Snapshot {
                    array: outcome.array,
                    highlights: outcome.highlights,
                    comparisons: outcome.comparisons,
                    writes: outcome.writes,
                };
                state.phase = Phase::Completed;
                state.last_report = Some(report);
                info!(
                    %algorithm,
                    len,
                    elapsed = %config::format_elapsed(elapsed),
                    comparisons = report.comparisons,
                    writes = report.writes,
                    "sort completed"
                );
                Ok(report)
            }
            Err(err) => {
                state.phase = Phase::Faulted;
                error!(%algorithm, error = %err, "sort aborted");
                Err(err.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

}

/// Rejects a control while a run owns the array. Callers hold the state lock
/// for both this check and the change it guards.
fn ensure_idle<T>(state: &SessionState<T>, action: &str) -> Result<(), SessionError> {
    if state.phase == Phase::Running {
        warn!(action, "rejected while a sort is running");
        return Err(SessionError::Busy);
    }
    Ok(())
}

fn install<T>(state: &mut SessionState<T>, values: Vec<T>) {
    let len = values.len();
    state.display.array = values;
    state.display.highlights = vec![Highlight::Default; len];
    clear_results(state);
}

fn clear_results<T>(state: &mut SessionState<T>) {
    state.display.highlights.fill(Highlight::Default);
    state.display.comparisons = 0;
    state.display.writes = 0;
    state.phase = Phase::Idle;
    state.last_report = None;
}

/// Holds the re-entrancy flag for the duration of a run. Acquired while the
/// caller holds the state lock; released under that lock.
///
/// A run whose future is dropped before it finishes leaves the session
/// `Faulted` on its last published frame, the same as an observer failure.
struct RunGuard<'a, T> {
    flag: &'a AtomicBool,
    state: &'a Mutex<SessionState<T>>,
}

impl<'a, T> RunGuard<'a, T> {
    fn acquire(flag: &'a AtomicBool, state: &'a Mutex<SessionState<T>>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { flag, state })
    }
}

impl<T> Drop for RunGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.phase == Phase::Running {
            state.phase = Phase::Faulted;
        }
        self.flag.store(false, Ordering::Release);
    }
}

/// Copies each frame into the display before handing it on.
struct Mirror<'s, T, O> {
    state: &'s Mutex<SessionState<T>>,
    inner: O,
}

impl<T: Element, O: Observer<T>> Observer<T> for Mirror<'_, T, O> {
    fn publish(&mut self, frame: Frame<'_, T>) -> Result<(), ObserverError> {
        {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            state.display.array.clone_from_slice(frame.array);
            state.display.highlights.copy_from_slice(frame.highlights);
            state.display.comparisons = frame.counters.comparisons;
            state.display.writes = frame.counters.writes;
        }
        self.inner.publish(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sessions_generate_the_same_array() {
        let config = SessionConfig {
            seed: Some(11),
            array_size: 12,
            ..SessionConfig::default()
        };
        let a = Session::new(config.clone()).unwrap();
        let b = Session::new(config).unwrap();
        assert_eq!(a.snapshot().array, b.snapshot().array);
        assert_eq!(a.snapshot().array.len(), 12);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            array_size: 2,
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(SessionError::Config(ConfigError::ArraySize { size: 2, .. }))
        ));
    }

    #[test]
    fn guard_releases_on_drop() {
        let session = Session::with_array(vec![2, 1], Algorithm::Quick, Duration::ZERO);
        let guard = RunGuard::acquire(&session.running, &session.state).unwrap();
        assert!(session.is_running());
        assert!(RunGuard::acquire(&session.running, &session.state).is_none());
        drop(guard);
        assert!(!session.is_running());
        assert!(RunGuard::acquire(&session.running, &session.state).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_run_is_faulted() {
        let session =
            Session::with_array(vec![3, 2, 1], Algorithm::Bubble, Duration::from_millis(50));
        let outcome = tokio::time::timeout(Duration::from_millis(120), session.run(())).await;

        assert!(outcome.is_err());
        assert!(!session.is_running());
        assert_eq!(session.phase(), Phase::Faulted);
        assert!(session.run(()).await.is_ok());
    }
}
