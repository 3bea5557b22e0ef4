//! Global result budget
//!
//! The budget tracks how many records have been emitted (`confirmed`) and how
//! many detail items listing loops have scheduled (`planned`) against the
//! configured maximum. Both counters only ever grow.

use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide record budget shared by every handler of a run
#[derive(Debug)]
pub struct ResultBudget {
    max_results: u64,
    confirmed: AtomicU64,
    planned: AtomicU64,
}

impl ResultBudget {
    /// Creates a budget with both counters at zero
    pub fn new(max_results: u64) -> Self {
        Self {
            max_results,
            confirmed: AtomicU64::new(0),
            planned: AtomicU64::new(0),
        }
    }

    /// True once `confirmed >= max_results`
    pub fn reached_limit(&self) -> bool {
        self.confirmed.load(Ordering::SeqCst) >= self.max_results
    }

    /// Counts one emitted record
    ///
    /// Callers must have checked `reached_limit` first. Detail handlers use
    /// `try_record_confirmed` instead, which does both in one step.
    pub fn record_confirmed(&self) {
        self.confirmed.fetch_add(1, Ordering::SeqCst);
    }

    /// Checks the limit and counts one emitted record atomically
    ///
    /// Returns false, leaving the counter untouched, when the limit has been
    /// reached. At most `max_results` calls ever return true.
    pub fn try_record_confirmed(&self) -> bool {
        let max = self.max_results;
        self.confirmed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (current < max).then_some(current + 1)
            })
            .is_ok()
    }

    /// Adds `n` items discovered on a listing page to the planned total
    pub fn reserve(&self, n: u64) {
        self.planned.fetch_add(n, Ordering::SeqCst);
    }

    /// True while `planned + confirmed <= max_results`
    pub fn within_planned_limit(&self) -> bool {
        let planned = self.planned.load(Ordering::SeqCst);
        let confirmed = self.confirmed.load(Ordering::SeqCst);
        planned.saturating_add(confirmed) <= self.max_results
    }

    pub fn max_results(&self) -> u64 {
        self.max_results
    }

    pub fn confirmed(&self) -> u64 {
        self.confirmed.load(Ordering::SeqCst)
    }

    pub fn planned(&self) -> u64 {
        self.planned.load(Ordering::SeqCst)
    }
}
