//! Bubble sort: adjacent compare-and-swap passes over a shrinking prefix.

use super::Stage;
use crate::core::{Element, Highlight, Observer, ObserverError};

pub(super) async fn sort<T, O>(stage: &mut Stage<'_, T, O>) -> Result<(), ObserverError>
where
    T: Element,
    O: Observer<T> + Send,
{
    let n = stage.len();

    for pass in 0..n.saturating_sub(1) {
        for j in 0..n - pass - 1 {
            stage.mark_pair(j, j + 1, Highlight::Comparing);
            let out_of_order = stage.greater(j, j + 1);
            stage.pause().await?;

            if out_of_order {
                stage.mark_pair(j, j + 1, Highlight::Swapping);
                stage.swap(j, j + 1);
                stage.pause().await?;
            }

            stage.reset(j..=j + 1);
        }
        // The largest remaining element has bubbled to the end of the prefix.
        stage.mark(n - 1 - pass, Highlight::Sorted);
    }

    // Index 0 is settled by elimination; an empty array has nothing to mark.
    if n > 0 {
        stage.mark(0, Highlight::Sorted);
    }
    Ok(())
}
