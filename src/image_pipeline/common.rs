//! Common utilities module
//!
//! This module contains shared utilities used across the export pipeline.

pub mod error;

pub use error::{ConversionError, Result};
