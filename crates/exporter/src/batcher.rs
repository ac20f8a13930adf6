//! Size-bounded span batching
//!
//! [`Batcher`] only decides *when* a batch is complete; sending is left to the
//! caller, so the same accumulator serves both the exporter's push loop and
//! tests that inspect batch boundaries directly.
//!
//! ```
//! use exporter::batcher::Batcher;
//! # use exporter::model::OutputSpan;
//! # fn spans() -> Vec<OutputSpan> { Vec::new() }
//! use std::num::NonZeroUsize;
//!
//! let mut batcher = Batcher::new(NonZeroUsize::new(100).unwrap());
//! for span in spans() {
//!     if let Some(batch) = batcher.push(span) {
//!         // send the full batch
//! #       drop(batch);
//!     }
//! }
//! if let Some(rest) = batcher.finish() {
//!     // send the remainder
//! #   drop(rest);
//! }
//! ```

use crate::model::OutputSpan;
use std::num::NonZeroUsize;

/// Accumulates spans until the configured maximum batch size is reached
#[derive(Debug)]
pub struct Batcher {
    max_batch_size: NonZeroUsize,
    pending: Vec<OutputSpan>,
}

impl Batcher {
    pub fn new(max_batch_size: NonZeroUsize) -> Self {
        Self {
            max_batch_size,
            pending: Vec::new(),
        }
    }

    /// Adds a span; returns the full batch once it reaches the size bound and
    /// starts a new empty one
    pub fn push(&mut self, span: OutputSpan) -> Option<Vec<OutputSpan>> {
        self.pending.push(span);

        if self.pending.len() >= self.max_batch_size.get() {
            Some(std::mem::take(&mut self.pending))
        } else {
            None
        }
    }

    /// Returns the pending spans as a final batch, `None` when nothing is pending
    pub fn finish(self) -> Option<Vec<OutputSpan>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending)
        }
    }

    /// Returns the number of pending spans
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size.get()
    }
}
