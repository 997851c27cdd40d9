//! Machine learning building blocks for training and inference.
//!
//! These utilities are developer-facing: the training binary drives them end
//! to end, and tests exercise them directly.

pub mod metrics;
pub mod scaler;
pub mod softmax;
