//! Annotation rendering module
//!
//! This module contains:
//! - Geometry calculations shared between preview and committed renders
//! - Pixmap rendering using tiny-skia
//! - Text rasterization using ab_glyph

pub mod geometry;
pub mod image;
pub mod text;
