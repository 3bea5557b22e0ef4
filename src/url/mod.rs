//! URL handling module for Tomato-Harvest
//!
//! This module provides URL normalization and the classifier that turns raw
//! URLs into canonical work items.

mod classifier;
mod normalize;

// Re-export main functions
pub use classifier::UrlClassifier;
pub use normalize::{normalize_url, path_segments};
