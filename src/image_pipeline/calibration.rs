//! Physical pixel calibration
//!
//! Resolves pixels-per-micron along X, Y and optionally Z from the `Distance`
//! records of an acquisition's metadata document.

use crate::image_pipeline::acquisition::MetadataDocument;
use crate::image_pipeline::common::error::{ConversionError, Result};

const MICRONS_PER_METER: f64 = 1e6;

/// Pixels per micron along X, Y and, for volumetric acquisitions, Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationVector {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Default for CalibrationVector {
    fn default() -> Self {
        Self {
            x: 1.0,
            y: 1.0,
            z: Some(1.0),
        }
    }
}

impl CalibrationVector {
    /// Returns `None` unless every component is finite and strictly positive.
    pub fn new(x: f64, y: f64, z: Option<f64>) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(x) && valid(y) && z.is_none_or(valid) {
            Some(Self { x, y, z })
        } else {
            None
        }
    }

    pub fn components(&self) -> Vec<f64> {
        let mut components = vec![self.x, self.y];
        components.extend(self.z);
        components
    }

    /// The 2-D resolution written alongside each plane.
    pub fn resolution(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Distance between consecutive focal planes in microns.
    pub fn z_spacing(&self) -> Option<f64> {
        self.z.map(|z| 1.0 / z)
    }
}

/// Result of calibration resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationOutcome {
    Measured(CalibrationVector),
    /// The document has no X distance; callers fall back to the default vector.
    Missing,
}

impl CalibrationOutcome {
    pub fn vector(&self) -> CalibrationVector {
        match self {
            CalibrationOutcome::Measured(vector) => *vector,
            CalibrationOutcome::Missing => CalibrationVector::default(),
        }
    }
}

/// Extracts the calibration vector from `metadata`.
///
/// A missing X distance is not an error and yields [`CalibrationOutcome::Missing`].
/// Once X is present, Y must be present and numeric. Z is optional and any
/// problem with it degrades the result to a 2-component vector.
pub fn resolve_calibration(metadata: &MetadataDocument) -> Result<CalibrationOutcome> {
    let Some(x_text) = metadata.distance_value("X") else {
        return Ok(CalibrationOutcome::Missing);
    };
    let x = pixels_per_micron("X", x_text)?;

    let y_text = metadata
        .distance_value("Y")
        .ok_or_else(|| ConversionError::CalibrationMalformed {
            axis: "Y".to_string(),
            reason: "X distance present without Y".to_string(),
        })?;
    let y = pixels_per_micron("Y", y_text)?;

    let z = metadata
        .distance_value("Z")
        .and_then(|text| pixels_per_micron("Z", text).ok());

    Ok(CalibrationOutcome::Measured(CalibrationVector { x, y, z }))
}

fn pixels_per_micron(axis: &str, meters_text: &str) -> Result<f64> {
    let malformed = |reason: String| ConversionError::CalibrationMalformed {
        axis: axis.to_string(),
        reason,
    };

    let meters: f64 = meters_text
        .trim()
        .parse()
        .map_err(|_| malformed(format!("{:?} is not a number", meters_text)))?;
    let value = 1.0 / (meters * MICRONS_PER_METER);

    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(malformed(format!("{} m does not give a positive pixel size", meters)))
    }
}
