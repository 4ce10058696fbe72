//! Heapsort: build a max-heap, then repeatedly move the root behind the heap.

use super::{Stage, StepFuture};
use crate::core::{Element, Highlight, Observer, ObserverError};

pub(super) async fn sort<T, O>(stage: &mut Stage<'_, T, O>) -> Result<(), ObserverError>
where
    T: Element,
    O: Observer<T> + Send,
{
    let n = stage.len();

    for node in (0..n / 2).rev() {
        sift_down(stage, n, node).await?;
    }

    for end in (1..n).rev() {
        stage.mark_pair(0, end, Highlight::Swapping);
        stage.swap(0, end);
        stage.pause().await?;

        stage.mark(0, Highlight::Default);
        stage.mark(end, Highlight::Sorted);

        sift_down(stage, end, 0).await?;
    }

    // The last heap root is the minimum.
    if n > 0 {
        stage.mark(0, Highlight::Sorted);
    }
    Ok(())
}

/// Restores the max-heap property below `node` within the first `size` slots.
fn sift_down<'a, 'c, T, O>(
    stage: &'a mut Stage<'c, T, O>,
    size: usize,
    node: usize,
) -> StepFuture<'a>
where
    T: Element + 'a,
    O: Observer<T> + Send + 'a,
{
    Box::pin(async move {
        let children: Vec<usize> = [2 * node + 1, 2 * node + 2]
            .into_iter()
            .filter(|&child| child < size)
            .collect();

        stage.mark(node, Highlight::Comparing);
        for &child in &children {
            stage.mark(child, Highlight::Comparing);
        }
        stage.pause().await?;

        let mut largest = node;
        for &child in &children {
            if stage.greater(child, largest) {
                largest = child;
            }
        }

        if largest == node {
            stage.mark(node, Highlight::Default);
            for &child in &children {
                stage.mark(child, Highlight::Default);
            }
            return Ok(());
        }

        stage.mark_pair(node, largest, Highlight::Swapping);
        for &child in &children {
            if child != largest {
                stage.mark(child, Highlight::Default);
            }
        }
        stage.swap(node, largest);
        stage.pause().await?;
        stage.mark_pair(node, largest, Highlight::Default);

        sift_down(stage, size, largest).await
    })
}
