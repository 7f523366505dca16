//! Cooperative batching
//!
//! Large documents are resolved a bounded number of placeholders at a time,
//! handing control back to the scheduler between batches.

use std::future::Future;

use crate::resolver::placeholder::Placeholder;

/// Something that gives the scheduler a chance to run other work
pub trait YieldHook {
    fn yield_now(&self) -> impl Future<Output = ()> + Send;
}

/// Yields to the tokio scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioYield;

impl YieldHook for TokioYield {
    fn yield_now(&self) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}

/// Never yields; for synchronous callers and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoYield;

impl YieldHook for NoYield {
    fn yield_now(&self) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}

/// Splits placeholders into consecutive batches of at most `batch_size`
#[derive(Debug, Clone)]
pub struct PlaceholderBatches<'a> {
    remaining: &'a [Placeholder],
    batch_size: usize,
}

impl<'a> PlaceholderBatches<'a> {
    /// A batch size of zero is treated as one
    pub fn new(placeholders: &'a [Placeholder], batch_size: usize) -> Self {
        Self {
            remaining: placeholders,
            batch_size: batch_size.max(1),
        }
    }
}

impl<'a> Iterator for PlaceholderBatches<'a> {
    type Item = &'a [Placeholder];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }
        let split = self.batch_size.min(self.remaining.len());
        let (batch, rest) = self.remaining.split_at(split);
        self.remaining = rest;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.remaining.len().div_ceil(self.batch_size);
        (count, Some(count))
    }
}

impl ExactSizeIterator for PlaceholderBatches<'_> {}
