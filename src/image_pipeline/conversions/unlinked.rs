use std::path::Path;

use crate::image_pipeline::acquisition::{
    AcquisitionContainer, AcquisitionReader, BoundingBox, DimensionDescriptor, LabeledArray,
    MetadataDocument, PixelArray, PlaneSelection, ShapeTable,
};
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::flat::{FlatContainer, FlatContainerReader, FlatImageInfo};

/// Placeholder backend for builds without container decoders.
///
/// Every open fails with `BackendUnavailable`, so no container value can exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlinked;

/// Uninhabited container type of [`Unlinked`].
#[derive(Debug)]
pub enum NoContainer {}

impl AcquisitionReader for Unlinked {
    type Container = NoContainer;

    fn open(&self, _path: &Path) -> Result<NoContainer> {
        Err(ConversionError::BackendUnavailable("acquisition container"))
    }

    fn is_linked(&self) -> bool {
        false
    }
}

impl FlatContainerReader for Unlinked {
    type Container = NoContainer;

    fn open(&self, _path: &Path) -> Result<NoContainer> {
        Err(ConversionError::BackendUnavailable("flat container"))
    }

    fn is_linked(&self) -> bool {
        false
    }
}

impl AcquisitionContainer for NoContainer {
    fn dimensions(&self) -> Result<DimensionDescriptor> {
        match *self {}
    }

    fn shape_table(&self) -> Result<ShapeTable> {
        match *self {}
    }

    fn metadata(&self) -> Result<MetadataDocument> {
        match *self {}
    }

    fn read_plane(&mut self, _selection: &PlaneSelection) -> Result<LabeledArray> {
        match *self {}
    }

    fn tile_bounding_boxes(&mut self) -> Result<Vec<BoundingBox>> {
        match *self {}
    }

    fn read_mosaic_region(
        &mut self,
        _region: &BoundingBox,
        _scale_factor: f32,
        _selection: &PlaneSelection,
    ) -> Result<PixelArray> {
        match *self {}
    }
}

impl FlatContainer for NoContainer {
    fn images(&self) -> Result<Vec<FlatImageInfo>> {
        match *self {}
    }

    fn frame(&mut self, _index: usize) -> Result<LabeledArray> {
        match *self {}
    }
}
