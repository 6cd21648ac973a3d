//! Heap-based setwise top-k selection
//!
//! Candidates are arranged in a c-ary max-heap whose "greater than" is
//! decided by the oracle: each sift step shows the oracle a parent and its
//! children at once and promotes whichever it prefers. Extracting the root
//! k times yields the top-k in order without ranking the whole pool.

use super::{ComparisonOracle, RerankCandidate, Reranker};
use litrank_core::{Error, Result, WorkId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Default number of children per heap node
pub const DEFAULT_CHILDREN: usize = 2;

/// Upper bound on children so a comparison set fits the passage labels
pub const MAX_CHILDREN: usize = 25;

/// Setwise reranker over a comparison oracle
pub struct SetwiseReranker {
    oracle: Arc<dyn ComparisonOracle>,
    children: usize,
}

impl SetwiseReranker {
    /// Create a reranker with [`DEFAULT_CHILDREN`]
    pub fn new(oracle: Arc<dyn ComparisonOracle>) -> Self {
        SetwiseReranker {
            oracle,
            children: DEFAULT_CHILDREN,
        }
    }

    /// Builder: children per node, clamped to `1..=MAX_CHILDREN`
    pub fn with_children(mut self, children: usize) -> Self {
        self.children = children.clamp(1, MAX_CHILDREN);
        self
    }

    /// Children per node
    pub fn children(&self) -> usize {
        self.children
    }

    /// Sift `heap[i]` down within `heap[..size]`; returns oracle calls made
    fn sift_down(
        &self,
        query: &str,
        candidates: &[RerankCandidate],
        heap: &mut [usize],
        size: usize,
        mut i: usize,
    ) -> Result<usize> {
        let mut calls = 0;
        loop {
            let first_child = self.children * i + 1;
            if first_child >= size {
                return Ok(calls);
            }
            let last_child = (first_child + self.children).min(size);

            let mut slots = Vec::with_capacity(self.children + 1);
            slots.push(i);
            slots.extend(first_child..last_child);
            let group: Vec<RerankCandidate> =
                slots.iter().map(|&s| candidates[heap[s]].clone()).collect();

            let order = self.oracle.compare(query, &group)?;
            calls += 1;

            let best = order
                .iter()
                .find_map(|id| group.iter().position(|c| c.id == *id))
                .unwrap_or_else(|| {
                    tracing::debug!(
                        target: "litrank::rerank",
                        "Oracle named no candidate of the set, keeping parent"
                    );
                    0
                });
            let largest = slots[best];
            if largest == i {
                return Ok(calls);
            }
            heap.swap(i, largest);
            i = largest;
        }
    }
}

impl Reranker for SetwiseReranker {
    fn rerank(
        &self,
        query: &str,
        candidates: &[RerankCandidate],
        k: usize,
    ) -> Result<Vec<WorkId>> {
        if let Some(c) = candidates.iter().find(|c| c.text.trim().is_empty()) {
            return Err(Error::MissingText(c.id));
        }
        let mut seen = HashSet::with_capacity(candidates.len());
        if let Some(c) = candidates.iter().find(|c| !seen.insert(c.id)) {
            return Err(Error::invalid_input(format!(
                "duplicate rerank candidate {}",
                c.id
            )));
        }

        let n = candidates.len();
        if n == 0 || k == 0 {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let mut calls = 0;

        // Build the heap bottom-up
        let mut heap: Vec<usize> = (0..n).collect();
        for i in (0..=n / self.children).rev() {
            calls += self.sift_down(query, candidates, &mut heap, n, i)?;
        }

        // Extract the root k times
        let mut ranked = Vec::with_capacity(k.min(n));
        let mut size = n;
        while size > 0 {
            ranked.push(candidates[heap[0]].id);
            size -= 1;
            if ranked.len() == k || size == 0 {
                break;
            }
            heap.swap(0, size);
            calls += self.sift_down(query, candidates, &mut heap, size, 0)?;
        }

        tracing::debug!(
            target: "litrank::rerank",
            candidates = n,
            k,
            children = self.children,
            oracle_calls = calls,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Setwise rerank complete"
        );
        Ok(ranked)
    }
}
