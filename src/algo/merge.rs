//! Top-down merge sort over inclusive index ranges.

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
    left: usize,
    right: usize,
) -> StepFuture<'a>
where
    T: Element + 'a,
    O: Observer<T> + Send + 'a,
{
    Box::pin(async move {
        if left >= right {
            return Ok(());
        }

        let mid = left + (right - left) / 2;
        sort_range(stage, left, mid).await?;
        sort_range(stage, mid + 1, right).await?;
        merge(stage, left, mid, right).await
    })
}

/// Merges the sorted runs `[left, mid]` and `[mid + 1, right]` in place.
///
/// Ties take the left element, which keeps the sort stable.
async fn merge<T, O>(
    stage: &mut Stage<'_, T, O>,
    left: usize,
    mid: usize,
    right: usize,
) -> Result<(), ObserverError>
where
    T: Element,
    O: Observer<T> + Send,
{
    let lower = stage.array[left..=mid].to_vec();
    let upper = stage.array[mid + 1..=right].to_vec();

    let (mut i, mut j, mut k) = (0, 0, left);

    while i < lower.len() && j < upper.len() {
        stage.counters.record_comparison();
        stage.mark_pair(left + i, mid + 1 + j, Highlight::Comparing);
        stage.pause().await?;

        if lower[i] <= upper[j] {
            stage.put(k, lower[i].clone());
            i += 1;
        } else {
            stage.put(k, upper[j].clone());
            j += 1;
        }

        stage.reset(left..=right);
        stage.mark(k, Highlight::Swapping);
        stage.pause().await?;
        stage.mark(k, Highlight::Default);
        k += 1;
    }

    for value in lower[i..].iter().chain(&upper[j..]) {
        stage.put(k, value.clone());
        stage.mark(k, Highlight::Swapping);
        stage.pause().await?;
        stage.mark(k, Highlight::Default);
        k += 1;
    }

    Ok(())
}
