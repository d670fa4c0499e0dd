//! Entry enumeration
//!
//! Decides how many logical entries an acquisition holds and which extraction
//! strategy each of them needs.

use crate::image_pipeline::acquisition::{Axis, DimensionDescriptor, ShapeEntry, ShapeTable};
use crate::image_pipeline::common::error::{ConversionError, Result};

/// Extraction strategy, selected by `(is_mosaic, has_stack)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Scene,
    DepthStack,
    Mosaic,
    MosaicStack,
}

/// One unit of export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Position in the export order, used in the output file name.
    pub index: usize,
    /// Scene selector for plane reads, `None` when the acquisition has no scene axis.
    pub scene: Option<usize>,
    pub is_mosaic: bool,
    pub has_stack: bool,
    pub depth_count: usize,
    pub channel_count: usize,
}

impl Entry {
    pub fn strategy(&self) -> Strategy {
        match (self.is_mosaic, self.has_stack) {
            (false, false) => Strategy::Scene,
            (false, true) => Strategy::DepthStack,
            (true, false) => Strategy::Mosaic,
            (true, true) => Strategy::MosaicStack,
        }
    }
}

/// Enumerates the entries of an acquisition.
///
/// With a scene axis and a homogeneous table (one row per declared scene, or a
/// single row for several scenes) there is one entry per scene. Otherwise there
/// is one entry per table row.
pub fn classify(dims: &DimensionDescriptor, shapes: &ShapeTable) -> Result<Vec<Entry>> {
    let Some(first) = shapes.get(0) else {
        if dims.has_scenes() {
            return Err(ConversionError::StructuralInconsistency(
                "scene axis declared but the shape table is empty".to_string(),
            ));
        }
        return Ok(Vec::new());
    };

    let scene_count = first.scene.map(|range| range.count);

    let entries = match scene_count {
        Some(count) if dims.has_scenes() && is_homogeneous(shapes.len(), count) => (0..count)
            .map(|scene| {
                let row = if shapes.len() == 1 { first } else { &shapes.entries()[scene] };
                build_entry(dims, scene, Some(scene), row)
            })
            .collect(),
        _ => shapes
            .entries()
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let scene = row
                    .scene
                    .filter(|_| dims.has_scenes())
                    .map(|range| range.start);
                build_entry(dims, index, scene, row)
            })
            .collect(),
    };

    Ok(entries)
}

fn is_homogeneous(rows: usize, scene_count: usize) -> bool {
    rows == scene_count || (rows == 1 && scene_count > 1)
}

fn build_entry(
    dims: &DimensionDescriptor,
    index: usize,
    scene: Option<usize>,
    row: &ShapeEntry,
) -> Entry {
    Entry {
        index,
        scene,
        is_mosaic: dims.has_mosaics() && row.mosaic.is_some_and(|range| range.count > 0),
        has_stack: dims.has_stacks(),
        depth_count: axis_count(row, Axis::Depth),
        channel_count: axis_count(row, Axis::Channel),
    }
}

// Absent or empty axes contribute a single index.
fn axis_count(row: &ShapeEntry, axis: Axis) -> usize {
    row.range(axis).map_or(1, |range| range.count.max(1))
}
