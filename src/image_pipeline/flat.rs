//! Flat multi-image containers
//!
//! Containers that hold a plain list of named images with no scene, mosaic
//! or stack structure. Each image is exported as it is stored.

use std::path::Path;

use crate::image_pipeline::acquisition::LabeledArray;
use crate::image_pipeline::calibration::CalibrationVector;
use crate::image_pipeline::common::error::Result;

/// Declared properties of one image in a flat container.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatImageInfo {
    pub name: String,
    /// Pixels per micron along X, Y, Z, when the container records it.
    pub scale: Option<[f64; 3]>,
}

impl FlatImageInfo {
    pub fn new(name: impl Into<String>, scale: Option<[f64; 3]>) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }

    /// The recorded scale, or `None` when it is absent or not strictly positive.
    pub fn calibration(&self) -> Option<CalibrationVector> {
        self.scale
            .and_then(|[x, y, z]| CalibrationVector::new(x, y, Some(z)))
    }
}

pub trait FlatContainerReader {
    type Container: FlatContainer;

    fn open(&self, path: &Path) -> Result<Self::Container>;

    /// Whether this reader can decode anything at all.
    fn is_linked(&self) -> bool {
        true
    }
}

pub trait FlatContainer {
    /// The container's image list, in declaration order.
    fn images(&self) -> Result<Vec<FlatImageInfo>>;

    /// Pixel data of the image at `index`; only read when the image is exported.
    fn frame(&mut self, index: usize) -> Result<LabeledArray>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_from_scale() {
        let info = FlatImageInfo::new("a", Some([2.0, 2.0, 0.5]));
        assert_eq!(
            info.calibration(),
            CalibrationVector::new(2.0, 2.0, Some(0.5))
        );
    }

    #[test]
    fn test_invalid_scale_is_ignored() {
        assert_eq!(FlatImageInfo::new("a", None).calibration(), None);
        assert_eq!(FlatImageInfo::new("a", Some([0.0, 1.0, 1.0])).calibration(), None);
    }
}
