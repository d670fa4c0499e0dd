//! Microscopy export pipeline module
//!
//! This module turns multi-dimensional acquisition containers into calibrated
//! TIFF stacks, with separate modules for container access, calibration,
//! entry classification, plane assembly, TIFF writing and orchestration.

pub mod acquisition;
pub mod assemble;
pub mod calibration;
pub mod classify;
pub mod common;
pub mod conversions;
pub mod flat;
pub mod tiff;

#[cfg(test)]
mod testing;

pub use common::{
    ConversionError,
    Result,
};

pub use acquisition::{
    AcquisitionContainer,
    AcquisitionReader,
    DimensionDescriptor,
    MetadataDocument,
    ShapeTable,
};

pub use assemble::{CanonicalArray, PlaneAssembler};

pub use calibration::{CalibrationOutcome, CalibrationVector};

pub use classify::{Entry, Strategy};

pub use flat::{FlatContainer, FlatContainerReader, FlatImageInfo};

pub use self::tiff::{
    BitDepth,
    ExportConfig,
    ExportConfigBuilder,
    ImageWriter,
    StandardTiffWriter,
};

pub use conversions::{
    ContainerKind,
    ContainerToTiffPipeline,
};
