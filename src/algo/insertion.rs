//! Insertion sort: shift larger elements right, drop the key into the gap.

use super::Stage;
use crate::core::{Element, Highlight, Observer, ObserverError};

pub(super) async fn sort<T, O>(stage: &mut Stage<'_, T, O>) -> Result<(), ObserverError>
where
    T: Element,
    O: Observer<T> + Send,
{
    let n = stage.len();

    for i in 1..n {
        let key = stage.array[i].clone();
        stage.mark(i, Highlight::Comparing);
        stage.pause().await?;

        // `hole` is the slot the key would land in if the scan stopped now.
        let mut hole = i;
        while hole > 0 {
            let j = hole - 1;
            stage.counters.record_comparison();
            let shifts = stage.array[j] > key;
            if !shifts {
                // The comparison that ends the scan still counts.
                break;
            }

            stage.mark(j, Highlight::Comparing);
            stage.mark(hole, Highlight::Swapping);
            stage.pause().await?;

            let shifted = stage.array[j].clone();
            stage.put(hole, shifted);
            stage.reset(j..=hole);
            hole = j;
        }

        stage.put(hole, key);
        stage.reset(0..=i);
        stage.pause().await?;
    }

    stage.mark_all_sorted();
    Ok(())
}
