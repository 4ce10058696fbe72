//! Quicksort with Lomuto partitioning around the last element of each range.

use super::{Stage, StepFuture};
use crate::core::{Element, Highlight, Observer, ObserverError};

pub(super) async fn sort<T, O>(stage: &mut Stage<'_, T, O>) -> Result<(), ObserverError>
where
    T: Element,
    O: Observer<T> + Send,
{
    if let Some(last) = stage.len().checked_sub(1) {
        sort_range(stage, 0, last).await?;
    }
    stage.mark_all_sorted();
    Ok(())
}

fn sort_range<'a, 'c, T, O>(
    stage: &'a mut Stage<'c, T, O>,
    low: usize,
    high: usize,
) -> StepFuture<'a>
where
    T: Element + 'a,
    O: Observer<T> + Send + 'a,
{
    Box::pin(async move {
        if low >= high {
            return Ok(());
        }

        let pivot = partition(stage, low, high).await?;
        if pivot > low {
            sort_range(stage, low, pivot - 1).await?;
        }
        sort_range(stage, pivot + 1, high).await
    })
}

/// Partitions `[low, high]` so every element `<=` the pivot precedes it.
///
/// Returns the pivot's final index.
async fn partition<T, O>(
    stage: &mut Stage<'_, T, O>,
    low: usize,
    high: usize,
) -> Result<usize, ObserverError>
where
    T: Element,
    O: Observer<T> + Send,
{
    stage.mark(high, Highlight::Comparing);
    stage.pause().await?;

    // Next free slot of the `<= pivot` prefix.
    let mut store = low;

    for j in low..high {
        let exceeds = stage.greater(j, high);
        stage.mark_pair(j, high, Highlight::Comparing);
        stage.pause().await?;

        if !exceeds {
            stage.mark_pair(store, j, Highlight::Swapping);
            stage.swap(store, j);
            stage.pause().await?;
            store += 1;
        }

        stage.mark(j, Highlight::Default);
        if store > low && store - 1 != j {
            stage.mark(store - 1, Highlight::Default);
        }
        stage.mark(high, Highlight::Comparing);
    }

    stage.mark_pair(store, high, Highlight::Swapping);
    stage.swap(store, high);
    stage.pause().await?;

    stage.reset(low..=high);
    Ok(store)
}
