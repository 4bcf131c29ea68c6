//! Screenshot annotation and upload
//!
//! A captured bitmap is annotated with shapes and text through an operation
//! log with undo/redo, rendered to PNG, and handed to a local image host.

pub mod annotations;
pub mod capture;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod render;
pub mod session;
pub mod upload;
