use sortviz::core::{Frame, ObserverError};
use sortviz::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

fn session(values: Vec<u32>, algorithm: Algorithm, delay_ms: u64) -> Session {
    Session::with_array(values, algorithm, Duration::from_millis(delay_ms))
}

#[tokio::test]
async fn test_run_updates_display_and_report() {
    let session = session(vec![5, 3, 8, 1], Algorithm::Bubble, 0);
    assert_eq!(session.phase(), Phase::Idle);

    let report = session.run(()).await.unwrap();

    assert_eq!(report.algorithm, Algorithm::Bubble);
    assert_eq!(report.len, 4);
    assert_eq!((report.comparisons, report.writes), (6, 4));
    assert_eq!(session.phase(), Phase::Completed);
    assert_eq!(session.last_report(), Some(report));
    assert!(!session.is_running());

    let display = session.snapshot();
    assert_eq!(display.array, vec![1, 3, 5, 8]);
    assert_eq!(display.highlights, vec![Highlight::Sorted; 4]);
    assert_eq!(session.counters(), display.counters());
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_covers_every_pause() {
    // Bubble over [5, 3, 8, 1] pauses ten times.
    let session = session(vec![5, 3, 8, 1], Algorithm::Bubble, 20);
    let report = session.run(()).await.unwrap();
    assert!(report.elapsed >= Duration::from_millis(200), "{:?}", report.elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_second_run_is_rejected() {
    let session = session(vec![4, 3, 2, 1], Algorithm::Insertion, 10);

    let (first, second) = tokio::join!(session.run(()), async {
        // The first run is suspended at its first pause by now.
        assert!(session.is_running());
        assert_eq!(session.phase(), Phase::Running);
        session.run(()).await
    });

    assert!(first.is_ok());
    assert!(matches!(second, Err(SessionError::Busy)));
    assert_eq!(session.snapshot().array, vec![1, 2, 3, 4]);
}

#[tokio::test(start_paused = true)]
async fn test_changes_rejected_while_running() {
    let session = session(vec![9, 7, 5, 3, 1], Algorithm::Merge, 10);

    let (run, changes) = tokio::join!(session.run(()), async {
        (
            session.set_algorithm(Algorithm::Heap),
            session.load_array(vec![1, 2]),
        )
    });

    assert!(run.is_ok());
    assert!(matches!(changes.0, Err(SessionError::Busy)));
    assert!(matches!(changes.1, Err(SessionError::Busy)));
    assert_eq!(session.algorithm(), Algorithm::Merge);

    // Once idle again, the same changes go through and reset the results.
    session.set_algorithm(Algorithm::Heap).unwrap();
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.last_report(), None);
    assert_eq!(session.counters(), CounterSnapshot::default());
    assert!(session.snapshot().highlights.iter().all(|&h| h == Highlight::Default));

    session.load_array(vec![2, 1]).unwrap();
    assert_eq!(session.snapshot().array, vec![2, 1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_load_from_another_thread_is_rejected_mid_run() {
    let session = Arc::new(session(vec![5, 4, 3, 2, 1], Algorithm::Insertion, 20));

    let runner = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.run(()).await }
    });
    while !session.is_running() {
        tokio::task::yield_now().await;
    }

    let loader = Arc::clone(&session);
    let loaded = std::thread::spawn(move || loader.load_array(vec![1, 2]))
        .join()
        .unwrap();
    assert!(matches!(loaded, Err(SessionError::Busy)));

    let report = runner.await.unwrap().unwrap();
    assert_eq!(report.len, 5);
    assert_eq!(session.snapshot().array, vec![1, 2, 3, 4, 5]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_loads_never_reach_a_running_sort() {
    let session = Arc::new(session(vec![3, 1, 2], Algorithm::Bubble, 0));
    let stop = Arc::new(AtomicBool::new(false));

    // Alternating lengths: a load that slipped into a run would make the
    // display and the engine's array disagree.
    let loader = std::thread::spawn({
        let session = Arc::clone(&session);
        let stop = Arc::clone(&stop);
        move || {
            let mut long = false;
            while !stop.load(Ordering::Relaxed) {
                let values = if long { vec![5, 4, 3, 2, 1] } else { vec![2, 1] };
                let _ = session.load_array(values);
                long = !long;
            }
        }
    });

    for _ in 0..300 {
        let report = session.run(()).await.unwrap();
        assert!([2, 3, 5].contains(&report.len), "len {}", report.len);
    }
    stop.store(true, Ordering::Relaxed);
    loader.join().unwrap();
}

#[tokio::test]
async fn test_observer_fault_keeps_last_frame() {
    let session = session(vec![3, 2, 1], Algorithm::Bubble, 0);
    let mut frames = 0;
    let observer = from_fn(|frame: Frame<'_, u32>| {
        frames += 1;
        if frames == 3 {
            return Err(ObserverError::Rejected("renderer crashed".to_string()));
        }
        assert_eq!(frame.array.len(), 3);
        Ok(())
    });

    let err = session.run(observer).await.unwrap_err();
    assert!(matches!(err, SessionError::Observer(ObserverError::Rejected(_))));
    assert_eq!(session.phase(), Phase::Faulted);
    assert!(!session.is_running());
    assert_eq!(session.last_report(), None);

    // The display holds the frame the failing observer was offered:
    // the second comparison, after the first swap.
    let display = session.snapshot();
    assert_eq!(display.array, vec![2, 3, 1]);
    assert_eq!(
        display.highlights,
        vec![Highlight::Default, Highlight::Comparing, Highlight::Comparing]
    );
    assert_eq!((display.comparisons, display.writes), (2, 1));

    // A fresh run recovers from where the display stands.
    let report = session.run(()).await.unwrap();
    assert_eq!(report.len, 3);
    assert_eq!(session.snapshot().array, vec![1, 2, 3]);
    assert_eq!(session.phase(), Phase::Completed);
}

#[tokio::test]
async fn test_zero_delay_still_yields() {
    let session = session((0..30).rev().collect(), Algorithm::Heap, 0);
    let ticks = Arc::new(AtomicUsize::new(0));

    let ticker = tokio::spawn({
        let ticks = Arc::clone(&ticks);
        async move {
            loop {
                ticks.fetch_add(1, Ordering::Relaxed);
                tokio::task::yield_now().await;
            }
        }
    });

    session.run(()).await.unwrap();
    ticker.abort();

    assert!(ticks.load(Ordering::Relaxed) > 0);
}

#[tokio::test(start_paused = true)]
async fn test_counters_sampled_mid_run() {
    let session = Arc::new(session(vec![6, 5, 4, 3, 2, 1], Algorithm::Bubble, 10));
    let counters = session.counters_handle();

    let runner = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.run(()).await }
    });

    let mut samples = Vec::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(15));
    while !runner.is_finished() {
        ticker.tick().await;
        samples.push(counters.snapshot());
    }
    let report = runner.await.unwrap().unwrap();

    assert!(samples.windows(2).all(|w| w[0].comparisons <= w[1].comparisons));
    assert!(samples.iter().all(|s| s.comparisons <= report.comparisons));
    assert_eq!(counters.snapshot().comparisons, 15);
    assert_eq!(report.writes, 15);
}

#[tokio::test]
async fn test_random_session_controls() {
    let config = SessionConfig {
        array_size: 10,
        seed: Some(3),
        delay_ms: 5,
        ..SessionConfig::default()
    };
    let session = Session::new(config).unwrap();
    assert_eq!(session.snapshot().array.len(), 10);
    assert_eq!(session.delay(), Duration::from_millis(5));

    session.set_array_size(30).unwrap();
    assert_eq!(session.snapshot().array.len(), 30);
    let resized = session.snapshot().array;
    assert!(resized.iter().all(|v| (10..=400).contains(v)));

    assert!(matches!(
        session.set_array_size(50),
        Err(SessionError::Config(_))
    ));

    let before = session.snapshot().array;
    session.regenerate().unwrap();
    assert_eq!(session.snapshot().array.len(), before.len());

    session.set_delay(Duration::ZERO);
    session.run(()).await.unwrap();
    let sorted = session.snapshot().array;
    assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
}
