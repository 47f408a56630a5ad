//! services/api/src/lib.rs
//!
//! The explainer HTTP service: adapters for the generation model and PDF toolchain,
//! configuration, and the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
