//! State module for tracking crawl progress
//!
//! This module provides the shared run state and the unit of crawl work.
//!
//! # Components
//!
//! - `WorkItem` / `TargetKind`: a classified URL and what kind of page it points at
//! - `ResultBudget`: process-wide counter capping the number of emitted records
//! - `AbortSignal`: one-way flag that stops new work from being dispatched

mod abort;
mod budget;
mod work_item;

// Re-export main types
pub use abort::AbortSignal;
pub use budget::ResultBudget;
pub use work_item::{TargetKind, WorkItem};
