//! Instrumented sorting engines.
//!
//! Each engine sorts an owned copy of the input in ascending order while it:
//! - counts every element comparison and every element write in [`Counters`],
//! - tags the indices it touches with a [`Highlight`],
//! - publishes a [`Frame`] to an [`Observer`] and suspends through the
//!   [`Pacer`] after every observable step.
//!
//! The pacer is the only suspension point, so all mutations happen in a
//! strict serial order and a renderer can redraw between any two of them.
//!
//! The main entry point is [`run`].

mod bubble;
mod heap;
mod insertion;
mod merge;
mod quick;

use crate::core::{
    CounterSnapshot, Counters, Element, Frame, Highlight, Highlights, Observer, ObserverError,
    Pacer,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::ops::RangeInclusive;
use std::pin::Pin;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// The sorting algorithms available to a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Bubble,
    Insertion,
    Merge,
    Quick,
    Heap,
}

/// Asymptotic cost of an algorithm, as shown next to the run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Complexity {
    pub best: &'static str,
    pub average: &'static str,
    pub worst: &'static str,
    pub space: &'static str,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bubble,
        Algorithm::Insertion,
        Algorithm::Merge,
        Algorithm::Quick,
        Algorithm::Heap,
    ];

    /// Stable identifier, accepted back by [`FromStr`].
    pub fn id(self) -> &'static str {
        match self {
            Algorithm::Bubble => "bubble",
            Algorithm::Insertion => "insertion",
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
            Algorithm::Heap => "heap",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Insertion => "Insertion Sort",
            Algorithm::Merge => "Merge Sort",
            Algorithm::Quick => "Quick Sort",
            Algorithm::Heap => "Heap Sort",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Adjacent comparison & swap",
            Algorithm::Insertion => "Shift & insert in place",
            Algorithm::Merge => "Recursive divide & conquer",
            Algorithm::Quick => "Pivot-based partitioning",
            Algorithm::Heap => "Max-heap extraction",
        }
    }

    pub fn complexity(self) -> Complexity {
        const N_LOG_N: &str = "O(n log n)";
        match self {
            Algorithm::Bubble | Algorithm::Insertion => Complexity {
                best: "O(n)",
                average: "O(n²)",
                worst: "O(n²)",
                space: "O(1)",
            },
            Algorithm::Merge => Complexity {
                best: N_LOG_N,
                average: N_LOG_N,
                worst: N_LOG_N,
                space: "O(n)",
            },
            Algorithm::Quick => Complexity {
                best: N_LOG_N,
                average: N_LOG_N,
                worst: "O(n²)",
                space: "O(log n)",
            },
            Algorithm::Heap => Complexity {
                best: N_LOG_N,
                average: N_LOG_N,
                worst: N_LOG_N,
                space: "O(1)",
            },
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An algorithm identifier outside the supported set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sorting algorithm `{0}` (expected one of: bubble, insertion, merge, quick, heap)")]
pub struct ParseAlgorithmError(pub String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.id().eq_ignore_ascii_case(id))
            .ok_or_else(|| ParseAlgorithmError(s.to_string()))
    }
}

/// Final state of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub array: Vec<T>,
    pub highlights: Vec<Highlight>,
    pub comparisons: u64,
    pub writes: u64,
}

impl<T> Outcome<T> {
    pub fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            comparisons: self.comparisons,
            writes: self.writes,
        }
    }
}

/// Sorts `input` with `algorithm`, publishing every step to `observer`.
///
/// `counters` is zeroed first and then only grows until the run ends, so a
/// renderer can sample it concurrently. Every index is tagged
/// [`Highlight::Sorted`] in the returned [`Outcome`].
///
/// An error from the observer stops the run at the step that produced it.
///
/// # Examples
///
/// ```
/// use sortviz::algo::{run, Algorithm};
/// use sortviz::core::{Counters, Pacer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), sortviz::core::ObserverError> {
/// let counters = Counters::new();
/// let outcome = run(Algorithm::Bubble, vec![5, 3, 8, 1], Pacer::default(), &counters, ()).await?;
///
/// assert_eq!(outcome.array, vec![1, 3, 5, 8]);
/// assert_eq!((outcome.comparisons, outcome.writes), (6, 4));
/// # Ok(())
/// # }
/// ```
pub async fn run<T, O>(
    algorithm: Algorithm,
    input: Vec<T>,
    pacer: Pacer,
    counters: &Counters,
    observer: O,
) -> Result<Outcome<T>, ObserverError>
where
    T: Element,
    O: Observer<T> + Send,
{
    counters.reset();
    debug!(%algorithm, len = input.len(), delay = ?pacer.delay(), "engine starting");

    let mut stage = Stage::new(input, pacer, counters, observer);
    match algorithm {
        Algorithm::Bubble => bubble::sort(&mut stage).await?,
        Algorithm::Insertion => insertion::sort(&mut stage).await?,
        Algorithm::Merge => merge::sort(&mut stage).await?,
        Algorithm::Quick => quick::sort(&mut stage).await?,
        Algorithm::Heap => heap::sort(&mut stage).await?,
    }

    let outcome = stage.finish()?;
    debug!(
        %algorithm,
        comparisons = outcome.comparisons,
        writes = outcome.writes,
        "engine finished"
    );
    Ok(outcome)
}

/// Future returned by the recursive engine helpers.
type StepFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ObserverError>> + Send + 'a>>;

/// Exclusive context of a single run: the array, its highlights, the
/// counters, the pacer, and the observer frames go to.
struct Stage<'c, T, O> {
    array: Vec<T>,
    highlights: Highlights,
    counters: &'c Counters,
    pacer: Pacer,
    observer: O,
}

impl<'c, T, O> Stage<'c, T, O>
where
    T: Element,
    O: Observer<T> + Send,
{
    fn new(array: Vec<T>, pacer: Pacer, counters: &'c Counters, observer: O) -> Self {
        let highlights = Highlights::new(array.len());
        Self {
            array,
            highlights,
            counters,
            pacer,
            observer,
        }
    }

    fn len(&self) -> usize {
        self.array.len()
    }

    /// Counts one comparison and reports whether `array[a] > array[b]`.
    fn greater(&self, a: usize, b: usize) -> bool {
        self.counters.record_comparison();
        self.array[a] > self.array[b]
    }

    /// Exchanges two elements as a single write.
    fn swap(&mut self, a: usize, b: usize) {
        self.array.swap(a, b);
        self.counters.record_write();
    }

    /// Overwrites one element as a single write.
    fn put(&mut self, index: usize, value: T) {
        self.array[index] = value;
        self.counters.record_write();
    }

    fn mark(&mut self, index: usize, tag: Highlight) {
        self.highlights.set(index, tag);
    }

    fn mark_pair(&mut self, a: usize, b: usize, tag: Highlight) {
        self.highlights.set(a, tag);
        self.highlights.set(b, tag);
    }

    fn reset(&mut self, range: RangeInclusive<usize>) {
        self.highlights.reset_range(range);
    }

    fn mark_all_sorted(&mut self) {
        self.highlights.mark_all_sorted();
    }

    fn publish(&mut self) -> Result<(), ObserverError> {
        let frame = Frame {
            array: &self.array,
            highlights: self.highlights.as_slice(),
            counters: self.counters.snapshot(),
        };
        self.observer.publish(frame)
    }

    /// Publishes the current state, then suspends for one pacing delay.
    async fn pause(&mut self) -> Result<(), ObserverError> {
        self.publish()?;
        self.pacer.pace().await;
        Ok(())
    }

    fn finish(mut self) -> Result<Outcome<T>, ObserverError> {
        self.publish()?;
        let counters = self.counters.snapshot();
        Ok(Outcome {
            array: self.array,
            highlights: self.highlights.into_vec(),
            comparisons: counters.comparisons,
            writes: counters.writes,
        })
    }
}
