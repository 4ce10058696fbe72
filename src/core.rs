//! Core traits and types shared by every engine.
//!
//! This module defines:
//! - [`Element`]: The bound on values the engines can sort.
//! - [`Highlight`] / [`Highlights`]: The per-index visualization state.
//! - [`Counters`]: Comparison and write counters, sampleable from another task.
//! - [`Pacer`]: The single suspension point of every engine.
//! - [`Observer`]: The seam through which frames reach a renderer.

use cuneiform::cuneiform;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Values the engines can sort.
///
/// Ordering is always ascending by [`PartialOrd`]. Equal elements keep their
/// relative order in the stable engines (bubble, insertion, merge), which is
/// observable with a keyed type whose `PartialOrd` ignores a payload.
pub trait Element: PartialOrd + Clone + Send + Sync {}

impl<T: PartialOrd + Clone + Send + Sync> Element for T {}

/// Role of an array index at a given moment of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    #[default]
    Default,
    Comparing,
    Swapping,
    Sorted,
}

/// Highlight tags for every index of the array being sorted.
///
/// `Sorted` is sticky: once an index is settled, later attempts to retag it
/// are ignored for the lifetime of this value. A new run starts from a fresh
/// [`Highlights::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlights {
    tags: Vec<Highlight>,
}

impl Highlights {
    /// All-default tags for an array of `len` elements.
    pub fn new(len: usize) -> Self {
        Self {
            tags: vec![Highlight::Default; len],
        }
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Highlight> {
        self.tags.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Highlight] {
        &self.tags
    }

    /// Tags `index`, unless it is already sorted.
    pub fn set(&mut self, index: usize, tag: Highlight) {
        let slot = &mut self.tags[index];
        if *slot != Highlight::Sorted {
            *slot = tag;
        }
    }

    /// Returns every non-sorted index in `range` to `Default`.
    pub fn reset_range(&mut self, range: RangeInclusive<usize>) {
        for index in range {
            self.set(index, Highlight::Default);
        }
    }

    pub fn mark_all_sorted(&mut self) {
        self.tags.fill(Highlight::Sorted);
    }

    pub fn all(&self, tag: Highlight) -> bool {
        self.tags.iter().all(|&t| t == tag)
    }

    pub fn into_vec(self) -> Vec<Highlight> {
        self.tags
    }
}

/// Comparison and write counters for the active run.
///
/// Engines bump them synchronously; a renderer may sample them on its own
/// timer through a shared reference. Relaxed ordering is enough because a
/// sample only has to be eventually consistent.
#[cuneiform]
#[derive(Debug, Default)]
pub struct Counters {
    comparisons: AtomicU64,
    writes: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn record_comparison(&self) {
        self.comparisons.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn comparisons(&self) -> u64 {
        self.comparisons.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Zeroes both counters. Only called between runs.
    pub fn reset(&self) {
        self.comparisons.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            comparisons: self.comparisons(),
            writes: self.writes(),
        }
    }
}

/// Point-in-time copy of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub comparisons: u64,
    pub writes: u64,
}

/// Pacing delay applied at every suspension point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Suspends for at least the configured delay.
    ///
    /// A zero delay still yields once to the scheduler, so other tasks (a
    /// renderer, a counter sampler) get to run between any two steps.
    pub async fn pace(&self) {
        if self.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Borrowed view of the run state handed to an [`Observer`].
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a, T> {
    pub array: &'a [T],
    pub highlights: &'a [Highlight],
    pub counters: CounterSnapshot,
}

impl<T: Clone> Frame<'_, T> {
    pub fn to_snapshot(&self) -> Snapshot<T> {
        Snapshot {
            array: self.array.to_vec(),
            highlights: self.highlights.to_vec(),
            comparisons: self.counters.comparisons,
            writes: self.counters.writes,
        }
    }
}

/// Owned copy of a [`Frame`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub array: Vec<T>,
    pub highlights: Vec<Highlight>,
    pub comparisons: u64,
    pub writes: u64,
}

impl<T> Snapshot<T> {
    pub fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            comparisons: self.comparisons,
            writes: self.writes,
        }
    }

    pub fn as_frame(&self) -> Frame<'_, T> {
        Frame {
            array: &self.array,
            highlights: &self.highlights,
            counters: self.counters(),
        }
    }
}

/// Errors raised by an [`Observer`]. Any of them aborts the run.
#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("observer rejected frame: {0}")]
    Rejected(String),

    #[error("snapshot channel closed")]
    ChannelClosed,

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Receives a frame at every suspension point and once on completion.
///
/// Observers must not block: they run on the engine's task between two
/// steps. Returning an error stops the run where it is.
///
/// # Examples
///
/// ```
/// use sortviz::core::{Frame, Observer, ObserverError};
///
/// struct FrameCount(usize);
///
/// impl<T> Observer<T> for FrameCount {
///     fn publish(&mut self, _frame: Frame<'_, T>) -> Result<(), ObserverError> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer<T> {
    fn publish(&mut self, frame: Frame<'_, T>) -> Result<(), ObserverError>;
}

/// Discards every frame.
impl<T> Observer<T> for () {
    fn publish(&mut self, _frame: Frame<'_, T>) -> Result<(), ObserverError> {
        Ok(())
    }
}

impl<T, O: Observer<T> + ?Sized> Observer<T> for &mut O {
    fn publish(&mut self, frame: Frame<'_, T>) -> Result<(), ObserverError> {
        (**self).publish(frame)
    }
}

/// Latest frame wins; renderers hold the receiving end.
///
/// Frames keep flowing after every receiver is gone, matching a display that
/// was closed mid-run.
impl<T: Clone> Observer<T> for watch::Sender<Snapshot<T>> {
    fn publish(&mut self, frame: Frame<'_, T>) -> Result<(), ObserverError> {
        self.send_replace(frame.to_snapshot());
        Ok(())
    }
}

/// Observer backed by a closure, see [`from_fn`].
#[derive(Debug, Clone)]
pub struct FnObserver<F>(F);

/// Wraps a closure as an [`Observer`].
///
/// ```
/// use sortviz::core::{from_fn, Frame};
///
/// let mut frames = 0;
/// let _observer = from_fn(|_frame: Frame<'_, u32>| {
///     frames += 1;
///     Ok(())
/// });
/// ```
pub fn from_fn<T, F>(f: F) -> FnObserver<F>
where
    F: FnMut(Frame<'_, T>) -> Result<(), ObserverError>,
{
    FnObserver(f)
}

impl<T, F> Observer<T> for FnObserver<F>
where
    F: FnMut(Frame<'_, T>) -> Result<(), ObserverError>,
{
    fn publish(&mut self, frame: Frame<'_, T>) -> Result<(), ObserverError> {
        (self.0)(frame)
    }
}

/// Keeps an owned copy of every frame, in publication order.
#[derive(Debug, Clone)]
pub struct Recorder<T> {
    frames: Vec<Snapshot<T>>,
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<T> Recorder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Snapshot<T>] {
        &self.frames
    }

    pub fn last(&self) -> Option<&Snapshot<T>> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<Snapshot<T>> {
        self.frames
    }
}

impl<T: Clone> Observer<T> for Recorder<T> {
    fn publish(&mut self, frame: Frame<'_, T>) -> Result<(), ObserverError> {
        self.frames.push(frame.to_snapshot());
        Ok(())
    }
}
