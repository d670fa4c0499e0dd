//! Plane assembly
//!
//! Turns the reads of one [`Entry`] into a single canonically ordered array.
//! Each strategy issues its reads and stacks them; [`normalize`] then gives
//! every strategy's output the same axis conventions.

use ndarray::{Axis as NdAxis, IxDyn};
use tracing::debug;

use crate::image_pipeline::acquisition::{
    AcquisitionContainer, Axis, BoundingBox, LabeledArray, PixelArray, PlaneSelection,
    MOSAIC_SCALE_FACTOR,
};
use crate::image_pipeline::classify::{Entry, Strategy};
use crate::image_pipeline::common::error::{ConversionError, Result};

/// Normalized pixel array of one entry: outer depth/channel axes first, image
/// rows and columns last, no singleton axes.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalArray {
    data: PixelArray,
    axes: Vec<char>,
}

impl CanonicalArray {
    /// Wraps a frame that needs no assembly, such as an image of a flat container.
    pub fn from_frame(frame: LabeledArray) -> Self {
        Self {
            data: frame.data,
            axes: frame.axes,
        }
    }

    pub fn data(&self) -> &PixelArray {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn axes(&self) -> &[char] {
        &self.axes
    }

    pub fn axis_string(&self) -> String {
        self.axes.iter().collect()
    }

    /// Length of the axis labelled `axis`, if any.
    pub fn axis_len(&self, axis: Axis) -> Option<usize> {
        self.axes
            .iter()
            .position(|&label| label == axis.code())
            .map(|i| self.data.shape()[i])
    }

    /// `(height, width)` of each image plane. Arrays of rank below two are a single row.
    pub fn plane_dims(&self) -> (usize, usize) {
        match self.data.shape() {
            [] => (1, 1),
            [width] => (1, *width),
            [.., height, width] => (*height, *width),
        }
    }

    pub fn page_count(&self) -> usize {
        let (height, width) = self.plane_dims();
        let plane = height * width;
        if plane == 0 { 0 } else { self.data.len() / plane }
    }
}

/// Drops singleton axes, then swaps the two leading axes when more than three remain.
pub fn normalize(raw: LabeledArray) -> CanonicalArray {
    let LabeledArray { mut data, mut axes } = raw;

    for i in (0..data.ndim()).rev() {
        if data.shape()[i] == 1 {
            data = data.remove_axis(NdAxis(i));
            axes.remove(i);
        }
    }

    if data.ndim() > 3 {
        data.swap_axes(0, 1);
        axes.swap(0, 1);
    }

    CanonicalArray { data, axes }
}

/// Reads and assembles entries of one open container.
pub struct PlaneAssembler<'a, C: AcquisitionContainer> {
    container: &'a mut C,
}

impl<'a, C: AcquisitionContainer> PlaneAssembler<'a, C> {
    pub fn new(container: &'a mut C) -> Self {
        Self { container }
    }

    pub fn assemble(&mut self, entry: &Entry) -> Result<CanonicalArray> {
        let raw = self.extract(entry)?;
        let canonical = normalize(raw);
        debug!(
            entry = entry.index,
            shape = ?canonical.shape(),
            axes = %canonical.axis_string(),
            "Assembled entry"
        );
        Ok(canonical)
    }

    /// Runs the strategy of `entry` without normalizing its output.
    pub fn extract(&mut self, entry: &Entry) -> Result<LabeledArray> {
        match entry.strategy() {
            Strategy::Scene => self.container.read_plane(&PlaneSelection::scene(entry.scene)),
            Strategy::DepthStack => self.read_depth_stack(entry),
            Strategy::Mosaic => self.read_mosaic(entry),
            Strategy::MosaicStack => self.read_mosaic_stack(entry),
        }
    }

    fn read_depth_stack(&mut self, entry: &Entry) -> Result<LabeledArray> {
        let mut planes = Vec::with_capacity(entry.depth_count * entry.channel_count);
        for z in 0..entry.depth_count {
            for c in 0..entry.channel_count {
                let selection = PlaneSelection::scene(entry.scene).with_depth(z).with_channel(c);
                planes.push(self.container.read_plane(&selection)?);
            }
        }
        stack_planes(
            &[entry.depth_count, entry.channel_count],
            &[Axis::Depth.code(), Axis::Channel.code()],
            planes,
        )
    }

    fn read_mosaic(&mut self, entry: &Entry) -> Result<LabeledArray> {
        let region = self.mosaic_region(entry)?;
        let mut planes = Vec::with_capacity(entry.channel_count);
        for c in 0..entry.channel_count {
            let selection = PlaneSelection::default().with_channel(c);
            let data = self
                .container
                .read_mosaic_region(&region, MOSAIC_SCALE_FACTOR, &selection)?;
            planes.push(LabeledArray::unlabeled(data));
        }
        let stacked = stack_planes(&[entry.channel_count], &[Axis::Channel.code()], planes)?;

        // Synthetic depth axis of length 1 so the outer order matches the stacked strategies.
        let LabeledArray { data, mut axes } = stacked;
        let mut data = data.insert_axis(NdAxis(1));
        axes.insert(1, Axis::Depth.code());
        data.swap_axes(0, 1);
        axes.swap(0, 1);
        Ok(LabeledArray { data, axes })
    }

    fn read_mosaic_stack(&mut self, entry: &Entry) -> Result<LabeledArray> {
        let region = self.mosaic_region(entry)?;
        let mut planes = Vec::with_capacity(entry.channel_count * entry.depth_count);
        for c in 0..entry.channel_count {
            for z in 0..entry.depth_count {
                let selection = PlaneSelection::default().with_channel(c).with_depth(z);
                let data = self
                    .container
                    .read_mosaic_region(&region, MOSAIC_SCALE_FACTOR, &selection)?;
                planes.push(LabeledArray::unlabeled(data));
            }
        }
        stack_planes(
            &[entry.channel_count, entry.depth_count],
            &[Axis::Channel.code(), Axis::Depth.code()],
            planes,
        )
    }

    /// Bounding box of the entry's scene, or the first declared one.
    fn mosaic_region(&mut self, entry: &Entry) -> Result<BoundingBox> {
        let boxes = self.container.tile_bounding_boxes()?;
        entry
            .scene
            .and_then(|scene| boxes.get(scene))
            .or_else(|| boxes.first())
            .copied()
            .ok_or(ConversionError::MissingBoundingBox(entry.index))
    }
}

/// Stacks equally shaped planes under new outer axes, in row-major read order.
fn stack_planes(
    outer_shape: &[usize],
    outer_axes: &[char],
    planes: Vec<LabeledArray>,
) -> Result<LabeledArray> {
    let Some(first) = planes.first() else {
        return Err(ConversionError::StructuralInconsistency(
            "no planes to stack".to_string(),
        ));
    };
    let plane_shape = first.shape().to_vec();

    let mut axes = outer_axes.to_vec();
    axes.extend_from_slice(&first.axes);

    let mut shape = outer_shape.to_vec();
    shape.extend_from_slice(&plane_shape);

    let mut data = Vec::with_capacity(shape.iter().product());
    for plane in &planes {
        if plane.shape() != plane_shape.as_slice() {
            return Err(ConversionError::ShapeMismatch {
                expected: plane_shape,
                found: plane.shape().to_vec(),
            });
        }
        data.extend(plane.data.iter().copied());
    }

    let data = PixelArray::from_shape_vec(IxDyn(&shape), data).map_err(|e| {
        ConversionError::StructuralInconsistency(format!("cannot stack planes: {}", e))
    })?;
    Ok(LabeledArray { data, axes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::acquisition::ShapeTable;
    use crate::image_pipeline::testing::{Call, MockContainer};

    fn entry(is_mosaic: bool, has_stack: bool, depth_count: usize, channel_count: usize) -> Entry {
        Entry {
            index: 0,
            scene: Some(0),
            is_mosaic,
            has_stack,
            depth_count,
            channel_count,
        }
    }

    fn container() -> MockContainer {
        MockContainer::new("SMCZYX", ShapeTable::default())
    }

    #[test]
    fn test_scene_strategy_reads_once() {
        let mut mock = container();
        let raw = PlaneAssembler::new(&mut mock).extract(&entry(false, false, 1, 1)).unwrap();

        assert_eq!(mock.calls(), vec![Call::Plane(PlaneSelection::scene(Some(0)))]);
        assert_eq!(raw.shape(), &[1, 1, 4, 5]);
    }

    #[test]
    fn test_depth_stack_reads_every_plane() {
        let mut mock = container();
        let raw = PlaneAssembler::new(&mut mock).extract(&entry(false, true, 3, 2)).unwrap();

        assert_eq!(mock.count(|c| matches!(c, Call::Plane(_))), 6);
        assert_eq!(raw.shape(), &[3, 2, 1, 1, 4, 5]);
        assert_eq!(raw.axis_string(), "ZCTCYX");

        // Third read is z=1, c=0.
        assert_eq!(
            mock.calls()[2],
            Call::Plane(PlaneSelection::scene(Some(0)).with_depth(1).with_channel(0))
        );
        assert_eq!(raw.data[[1, 0, 0, 0, 0, 0]], 2);
    }

    #[test]
    fn test_mosaic_without_depth_swaps_leading_axes() {
        let mut mock = container();
        mock.mosaic_shape = vec![6, 7];
        let raw = PlaneAssembler::new(&mut mock).extract(&entry(true, false, 1, 2)).unwrap();

        assert_eq!(mock.count(|c| matches!(c, Call::BoundingBoxes)), 1);
        assert_eq!(mock.count(|c| matches!(c, Call::Mosaic(..))), 2);
        assert_eq!(raw.shape(), &[1, 2, 6, 7]);
        assert_eq!(raw.axis_string(), "ZCYX");
        assert_eq!(raw.data[[0, 1, 0, 0]], 1);
    }

    #[test]
    fn test_mosaic_stack_keeps_channel_depth_order() {
        let mut mock = container();
        let raw = PlaneAssembler::new(&mut mock).extract(&entry(true, true, 3, 2)).unwrap();

        assert_eq!(mock.count(|c| matches!(c, Call::BoundingBoxes)), 1);
        assert_eq!(mock.count(|c| matches!(c, Call::Mosaic(..))), 6);
        assert_eq!(&raw.shape()[..2], &[2, 3]);
        assert_eq!(raw.axis_string(), "CZ?YX");
        // c=1, z=0 is the fourth read.
        assert_eq!(raw.data[[1, 0, 0, 0, 0]], 3);
    }

    #[test]
    fn test_mosaic_reads_use_one_region_per_entry() {
        let mut mock = container();
        mock.boxes = vec![
            BoundingBox { x: 0, y: 0, width: 7, height: 6 },
            BoundingBox { x: 100, y: 50, width: 7, height: 6 },
        ];
        let mut second_scene = entry(true, false, 1, 2);
        second_scene.scene = Some(1);

        PlaneAssembler::new(&mut mock).extract(&second_scene).unwrap();

        for call in mock.calls() {
            if let Call::Mosaic(region, _) = call {
                assert_eq!(region.x, 100);
            }
        }
    }

    #[test]
    fn test_mosaic_without_bounding_box_fails() {
        let mut mock = container();
        mock.boxes.clear();
        let result = PlaneAssembler::new(&mut mock).assemble(&entry(true, false, 1, 1));
        assert!(matches!(result, Err(ConversionError::MissingBoundingBox(0))));
    }

    #[test]
    fn test_failed_read_aborts_entry() {
        let mut mock = container();
        mock.fail_on_read = Some(3);
        let result = PlaneAssembler::new(&mut mock).assemble(&entry(false, true, 2, 3));

        assert!(matches!(result, Err(ConversionError::PlaneReadError(_))));
        assert_eq!(mock.count(|c| matches!(c, Call::Plane(_))), 4);
    }

    #[test]
    fn test_normalize_squeezes_singletons() {
        let raw = LabeledArray::new(
            PixelArray::zeros(IxDyn(&[3, 1, 1, 1, 4, 5])),
            vec!['Z', 'C', 'T', 'C', 'Y', 'X'],
        );
        let canonical = normalize(raw);

        assert_eq!(canonical.shape(), &[3, 4, 5]);
        assert_eq!(canonical.axis_string(), "ZYX");
    }

    #[test]
    fn test_normalize_swaps_when_depth_and_channel_coexist() {
        let mut data = PixelArray::zeros(IxDyn(&[3, 2, 4, 5]));
        data[[2, 1, 0, 0]] = 9;
        let canonical = normalize(LabeledArray::new(data, vec!['Z', 'C', 'Y', 'X']));

        assert_eq!(canonical.shape(), &[2, 3, 4, 5]);
        assert_eq!(canonical.axis_string(), "CZYX");
        assert_eq!(canonical.data()[[1, 2, 0, 0]], 9);
    }

    #[test]
    fn test_assembled_mosaic_stack_is_depth_first() {
        let mut mock = container();
        mock.mosaic_shape = vec![6, 7];
        let canonical = PlaneAssembler::new(&mut mock).assemble(&entry(true, true, 3, 2)).unwrap();

        assert_eq!(canonical.shape(), &[3, 2, 6, 7]);
        assert_eq!(canonical.axis_len(Axis::Depth), Some(3));
        assert_eq!(canonical.axis_len(Axis::Channel), Some(2));
        assert_eq!(canonical.page_count(), 6);
    }

    #[test]
    fn test_assembled_single_channel_mosaic_is_plain_image() {
        let mut mock = container();
        let canonical = PlaneAssembler::new(&mut mock).assemble(&entry(true, false, 1, 1)).unwrap();

        assert_eq!(canonical.shape(), &[6, 7]);
        assert_eq!(canonical.plane_dims(), (6, 7));
        assert_eq!(canonical.page_count(), 1);
    }

    #[test]
    fn test_mismatched_planes_are_rejected() {
        let planes = vec![
            LabeledArray::unlabeled(PixelArray::zeros(IxDyn(&[4, 5]))),
            LabeledArray::unlabeled(PixelArray::zeros(IxDyn(&[4, 6]))),
        ];
        let result = stack_planes(&[2], &['C'], planes);
        assert!(matches!(result, Err(ConversionError::ShapeMismatch { .. })));
    }
}
