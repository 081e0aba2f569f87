//! # Pipeline Module
//!
//! High-level orchestration: the multi-restart EM driver that runs
//! independent clustering attempts across a worker pool and keeps the best
//! one.

pub mod binning;

pub use binning::BinningPipeline;
