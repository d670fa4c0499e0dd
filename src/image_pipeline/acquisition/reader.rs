use std::path::Path;

use crate::image_pipeline::acquisition::types::{
    BoundingBox, DimensionDescriptor, LabeledArray, MetadataDocument, PixelArray, PlaneSelection,
    ShapeTable,
};
use crate::image_pipeline::common::error::Result;

/// Scale factor passed to every mosaic read; mosaics are exported at full resolution.
pub const MOSAIC_SCALE_FACTOR: f32 = 1.0;

/// Opens acquisition containers from disk.
pub trait AcquisitionReader {
    type Container: AcquisitionContainer;

    /// Opens the container at `path`, failing with `InputReadError` on corrupt or missing files.
    fn open(&self, path: &Path) -> Result<Self::Container>;

    /// Whether this reader can decode anything at all.
    fn is_linked(&self) -> bool {
        true
    }
}

/// An open acquisition container.
///
/// Descriptor, shape table and metadata are immutable for the lifetime of the
/// handle. Reads take `&mut self` since decoders usually seek.
pub trait AcquisitionContainer {
    fn dimensions(&self) -> Result<DimensionDescriptor>;

    fn shape_table(&self) -> Result<ShapeTable>;

    fn metadata(&self) -> Result<MetadataDocument>;

    /// Reads the plane(s) matching `selection`, together with the label of each returned axis.
    fn read_plane(&mut self, selection: &PlaneSelection) -> Result<LabeledArray>;

    /// Bounding boxes of the mosaic tile groups, in declaration order.
    ///
    /// A scene's mosaic is read from the box at that scene's index, so readers
    /// must return one box per scene in scene order. Containers without scenes
    /// use the first box.
    fn tile_bounding_boxes(&mut self) -> Result<Vec<BoundingBox>>;

    /// Reads and stitches the tiles covering `region`.
    fn read_mosaic_region(
        &mut self,
        region: &BoundingBox,
        scale_factor: f32,
        selection: &PlaneSelection,
    ) -> Result<PixelArray>;
}
