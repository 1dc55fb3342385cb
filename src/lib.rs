//! Club league engine.
//!
//! ```text
//! ingest → aggregate → classify ─┐
//!                    → raw metrics → population stats → normalize → combine → rank
//! ```
//!
//! Normalization is global: min/max come from every club in the run, never from a
//! single category, so small categories are scored on the same scale as large ones.

pub mod classify;
pub mod combine;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod scoring;
pub mod sentiment;
