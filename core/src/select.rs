//! Bounded top-K selection shared by ranking and summarization.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::DocId;

/// Keep the `k` greatest items, returned greatest first.
///
/// A min-heap of size `k` holds the current winners, so selection costs
/// O(n log k). Ordering among equal items is whatever `T: Ord` says; callers
/// encode their tie-break in the type.
pub fn top_k<T: Ord>(items: impl IntoIterator<Item = T>, k: usize) -> Vec<T> {
    if k == 0 {
        return Vec::new();
    }
    let mut heap: BinaryHeap<Reverse<T>> = BinaryHeap::with_capacity(k + 1);
    for item in items {
        heap.push(Reverse(item));
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut out: Vec<T> = heap.into_iter().map(|Reverse(t)| t).collect();
    out.sort_unstable_by(|a, b| b.cmp(a));
    out
}

/// Heap key for a scored document: higher score first, then the *lower*
/// document id, so equal scores rank the earlier document first.
pub type Candidate = (OrderedFloat<f64>, Reverse<DocId>);

pub fn candidate(doc_id: DocId, score: f64) -> Candidate {
    (OrderedFloat(score), Reverse(doc_id))
}
