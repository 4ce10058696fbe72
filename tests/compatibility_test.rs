use sortviz::core::{Frame, Observer, ObserverError};
use sortviz::prelude::*;
use std::cmp::Ordering;
use tokio::sync::watch;

// Orders by `key` only, so `origin` reveals how equal keys were moved.
#[derive(Debug, Clone, PartialEq)]
struct Tagged {
    key: u32,
    origin: usize,
}

impl PartialOrd for Tagged {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.key.partial_cmp(&other.key)
    }
}

fn tagged(keys: &[u32]) -> Vec<Tagged> {
    keys.iter()
        .enumerate()
        .map(|(origin, &key)| Tagged { key, origin })
        .collect()
}

// Observer implemented outside the crate, counting frames per highlight.
#[derive(Default)]
struct SwapCounter {
    frames: usize,
    swapping_frames: usize,
}

impl<T> Observer<T> for SwapCounter {
    fn publish(&mut self, frame: Frame<'_, T>) -> Result<(), ObserverError> {
        self.frames += 1;
        if frame.highlights.contains(&Highlight::Swapping) {
            self.swapping_frames += 1;
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_merge_prefers_left_on_ties() {
    let counters = Counters::new();
    let outcome = run(
        Algorithm::Merge,
        tagged(&[2, 2, 1, 1]),
        Pacer::default(),
        &counters,
        (),
    )
    .await
    .unwrap();

    let order: Vec<(u32, usize)> = outcome.array.iter().map(|t| (t.key, t.origin)).collect();
    assert_eq!(order, vec![(1, 2), (1, 3), (2, 0), (2, 1)]);
}

#[tokio::test]
async fn test_stable_engines_keep_equal_keys_in_order() {
    let input = tagged(&[3, 1, 3, 2, 1, 3, 2]);

    for algorithm in [Algorithm::Bubble, Algorithm::Insertion, Algorithm::Merge] {
        let counters = Counters::new();
        let outcome = run(algorithm, input.clone(), Pacer::default(), &counters, ())
            .await
            .unwrap();

        for pair in outcome.array.windows(2) {
            assert!(pair[0].key <= pair[1].key, "{algorithm}");
            if pair[0].key == pair[1].key {
                assert!(pair[0].origin < pair[1].origin, "{algorithm}");
            }
        }
    }
}

#[tokio::test]
async fn test_external_observer() {
    let counters = Counters::new();
    let mut observer = SwapCounter::default();
    run(
        Algorithm::Bubble,
        vec![5, 3, 8, 1],
        Pacer::default(),
        &counters,
        &mut observer,
    )
    .await
    .unwrap();

    // Ten pauses (six comparisons, four swaps) plus the final frame.
    assert_eq!(observer.frames, 11);
    assert_eq!(observer.swapping_frames, 4);
}

#[tokio::test]
async fn test_closure_observer() {
    let counters = Counters::new();
    let mut max_writes = 0;
    let observer = from_fn(|frame: Frame<'_, i64>| {
        max_writes = max_writes.max(frame.counters.writes);
        Ok(())
    });

    let outcome = run(
        Algorithm::Insertion,
        vec![3, -1, 2],
        Pacer::default(),
        &counters,
        observer,
    )
    .await
    .unwrap();

    assert_eq!(outcome.array, vec![-1, 2, 3]);
    assert_eq!(max_writes, outcome.writes);
}

#[tokio::test]
async fn test_watch_channel_observer() {
    let (tx, rx) = watch::channel(Snapshot::<u32>::default());
    let counters = Counters::new();

    run(Algorithm::Heap, vec![2, 9, 4], Pacer::default(), &counters, tx)
        .await
        .unwrap();

    let latest = rx.borrow().clone();
    assert_eq!(latest.array, vec![2, 4, 9]);
    assert_eq!(latest.highlights, vec![Highlight::Sorted; 3]);
}

#[tokio::test]
async fn test_failing_observer_stops_the_run() {
    let counters = Counters::new();
    let mut seen = 0;
    let observer = from_fn(|_frame: Frame<'_, u32>| {
        seen += 1;
        if seen == 3 {
            return Err(ObserverError::Rejected("display gone".to_string()));
        }
        Ok(())
    });

    let err = run(
        Algorithm::Quick,
        vec![4, 3, 2, 1],
        Pacer::default(),
        &counters,
        observer,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ObserverError::Rejected(ref msg) if msg == "display gone"));
    assert_eq!(seen, 3);
    // Partition had counted two comparisons when the third frame was refused.
    assert_eq!(counters.comparisons(), 2);
}
