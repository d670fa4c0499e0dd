//! Export configuration types

use std::path::PathBuf;

use crate::image_pipeline::calibration::CalibrationVector;
use crate::image_pipeline::common::error::ConversionError;

/// Unit recorded with every exported resolution.
pub const MICRON_UNIT: &str = "micron";

/// Sample format of the exported pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// 8-bit unsigned, values above 255 saturate
    Eight,
    /// 16-bit unsigned, samples written as read
    Sixteen,
    /// 32-bit IEEE float
    ThirtyTwo,
}

impl BitDepth {
    pub fn bits(self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::ThirtyTwo => 32,
        }
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = ConversionError;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            32 => Ok(BitDepth::ThirtyTwo),
            other => Err(ConversionError::InvalidConfig(format!(
                "unsupported bit depth {} (expected 8, 16 or 32)",
                other
            ))),
        }
    }
}

/// Configuration for container export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Directory receiving the exported files, created on first write
    pub output_dir: PathBuf,
    /// Sample format of the written pages
    pub bit_depth: BitDepth,
    /// Whether to reject entries with an empty image plane before writing
    pub validate_dimensions: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("tif"),
            bit_depth: BitDepth::Sixteen,
            validate_dimensions: true,
        }
    }
}

impl ExportConfig {
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }
}

/// Builder for ExportConfig
#[derive(Default)]
pub struct ExportConfigBuilder {
    output_dir: Option<PathBuf>,
    bit_depth: Option<BitDepth>,
    validate_dimensions: Option<bool>,
}

impl ExportConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn bit_depth(mut self, bit_depth: BitDepth) -> Self {
        self.bit_depth = Some(bit_depth);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> ExportConfig {
        let default = ExportConfig::default();
        ExportConfig {
            output_dir: self.output_dir.unwrap_or(default.output_dir),
            bit_depth: self.bit_depth.unwrap_or(default.bit_depth),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}

/// Per-file metadata handed to the writer alongside the pixels
#[derive(Debug, Clone, PartialEq)]
pub struct PageMetadata {
    /// Pixels per unit along X and Y
    pub resolution: (f64, f64),
    pub unit: &'static str,
    /// Distance between focal planes, in `unit`
    pub spacing: Option<f64>,
    /// Keep outer axes as separate pages described as a hyperstack
    pub volumetric: bool,
}

impl PageMetadata {
    pub fn calibrated(calibration: &CalibrationVector) -> Self {
        Self {
            resolution: calibration.resolution(),
            unit: MICRON_UNIT,
            spacing: calibration.z_spacing(),
            volumetric: true,
        }
    }
}
