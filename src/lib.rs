//! # Sortviz
//!
//! `sortviz` runs classic sorting algorithms as observable, paced processes, so a
//! visualizer can show every comparison and write as it happens.
//!
//! Five engines are provided: **bubble**, **insertion**, **merge**, **quick**
//! (Lomuto, last-element pivot) and **heap** sort. Each one sorts an owned copy of
//! the input in ascending order and, after every observable step, tags the indices
//! involved, hands a frame to an [`Observer`], and suspends for a configurable delay.
//!
//! ## Key Features
//!
//! - **Single suspension point**: Engines only ever suspend inside [`Pacer::pace`],
//!   so array mutations happen in a strict serial order. A zero delay still yields
//!   once per step, giving a renderer a chance to draw at full speed.
//! - **Highlight bookkeeping**: Each index carries a [`Highlight`] tag. `Sorted`
//!   never reverts within a run and every index is `Sorted` when a run completes.
//! - **Exact counters**: [`Counters`] tracks comparisons and writes with fixed,
//!   deterministic semantics and can be sampled from another task mid-run.
//! - **Driver with guards**: [`Session`] rejects a second run, or changes to the
//!   array and algorithm, while a run is active, and keeps a display copy of the
//!   last published frame.
//!
//! ## Usage
//!
//! ### Running an engine
//!
//! ```rust
//! use sortviz::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ObserverError> {
//! let counters = Counters::new();
//! let mut frames = Recorder::new();
//!
//! let outcome = run(Algorithm::Quick, vec![1, 2, 3, 4], Pacer::default(), &counters, &mut frames).await?;
//!
//! assert_eq!(outcome.array, vec![1, 2, 3, 4]);
//! assert_eq!(outcome.comparisons, 6); // last-element pivot on sorted input
//! assert!(frames.len() > 1);
//! # Ok(())
//! # }
//! ```
//!
//! ### Driving runs from a session
//!
//! ```rust
//! use sortviz::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), SessionError> {
//! let session = Session::with_array(vec![4, 4, 1, 3, 2], Algorithm::Heap, Duration::ZERO);
//! let report = session.run(()).await?;
//!
//! assert_eq!(session.snapshot().array, vec![1, 2, 3, 4, 4]);
//! assert_eq!(session.phase(), Phase::Completed);
//! assert_eq!(report.len, 5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Counting Rules
//!
//! - A **comparison** is one element-vs-element (or element-vs-key/pivot) test.
//! - A **write** is one relocation: a swap counts once, a shift or a merge
//!   copy-back counts once per element.
//!
//! Counts depend only on the input and the algorithm, never on timing.

pub mod algo;
pub mod config;
pub mod core;
pub mod session;

pub use algo::{Algorithm, Outcome, run};
pub use core::{
    Counters, Frame, Highlight, Highlights, Observer, ObserverError, Pacer, Recorder, Snapshot,
};
pub use session::{Phase, RunReport, Session, SessionError};

pub mod prelude {
    pub use crate::algo::{Algorithm, Outcome, run};
    pub use crate::config::SessionConfig;
    pub use crate::core::{
        CounterSnapshot, Counters, Frame, Highlight, Observer, ObserverError, Pacer, Recorder,
        Snapshot, from_fn,
    };
    pub use crate::session::{Phase, RunReport, Session, SessionError};
}
