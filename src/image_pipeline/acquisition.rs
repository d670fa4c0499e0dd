//! Acquisition container module
//!
//! This module describes what the export pipeline needs from a multi-dimensional
//! acquisition container: its dimension layout, per-scene shapes, embedded
//! metadata, and plane/mosaic reads. Decoding the container itself happens
//! behind the [`AcquisitionReader`] trait.

mod reader;
pub mod types;

pub use reader::{AcquisitionContainer, AcquisitionReader, MOSAIC_SCALE_FACTOR};
pub use types::{
    Axis, AxisRange, BoundingBox, DimensionDescriptor, DistanceRecord, LabeledArray,
    MetadataDocument, PixelArray, PlaneSelection, ShapeEntry, ShapeTable,
};
