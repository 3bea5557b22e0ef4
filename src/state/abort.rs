use std::sync::atomic::{AtomicBool, Ordering};

/// One-way run abort flag
///
/// Once triggered it stays triggered for the rest of the run. The driver stops
/// dispatching new work; handlers already in flight are left to finish.
#[derive(Debug, Default)]
pub struct AbortSignal {
    triggered: AtomicBool,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers the abort. Returns true only for the call that flipped it.
    pub fn trigger(&self) -> bool {
        !self.triggered.swap(true, Ordering::SeqCst)
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}
