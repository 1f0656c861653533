//! zenfocus - Calm task capture, focus timer and time-tracking statistics
//!
//! This library provides the core functionality for the zenfocus application.

pub mod app;
pub mod assist;
pub mod config;
pub mod focus_timing;
pub mod logging;
pub mod task;
