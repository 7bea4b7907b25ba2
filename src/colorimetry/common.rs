//! Common utilities module
//!
//! This module contains shared utilities used across the colorimetry pipeline.

pub mod error;

pub use error::{ColorimetryError, Result};
