//! Pipeline conversions module
//!
//! This module contains the orchestration that turns one input container into
//! calibrated TIFF files.

mod container_to_tiff;
mod unlinked;


pub use container_to_tiff::{ContainerKind, ContainerToTiffPipeline, OUTPUT_EXTENSION};
pub use unlinked::{NoContainer, Unlinked};
