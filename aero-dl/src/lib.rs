//! Core library for the aircraft multi-task detector.
//!
//! It covers dataset ingestion and splitting, per-sample loading and batch
//! streaming, the paired image/box augmentation processors, the
//! backbone-selectable multi-task model, the combined loss, and the
//! evaluation metrics. The `train` and `submit` binaries are thin
//! front-ends over this crate.

pub mod classes;
pub mod common;
pub mod dataset;
pub mod loss;
pub mod metric;
pub mod model;
pub mod processor;
pub mod utils;
