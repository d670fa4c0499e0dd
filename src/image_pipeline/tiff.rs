//! TIFF writing module
//!
//! This module provides calibrated multi-page TIFF output and the export configuration.

mod writer;
mod standard_tiff_writer;
pub mod types;

pub use writer::ImageWriter;
pub use standard_tiff_writer::StandardTiffWriter;
pub use types::{BitDepth, ExportConfig, ExportConfigBuilder, PageMetadata, MICRON_UNIT};
