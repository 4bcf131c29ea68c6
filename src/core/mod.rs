//! Core application module
//!
//! This module contains:
//! - The command-line entry point
//! - Completion signalling once an upload succeeds

pub mod app;
pub mod notify;
