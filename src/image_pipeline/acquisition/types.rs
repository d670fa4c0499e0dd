//! Acquisition data model

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayD;

use crate::image_pipeline::common::error::ConversionError;

/// Pixel buffer as delivered by the container readers.
pub type PixelArray = ArrayD<u16>;

/// Label used for axes whose meaning the reader did not report.
pub const UNKNOWN_AXIS: char = '?';

/// Logical dimension of an acquisition, identified by a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Scene,
    Mosaic,
    Depth,
    Channel,
    Time,
    Row,
    Column,
    Other(char),
}

impl Axis {
    pub fn from_code(code: char) -> Self {
        match code.to_ascii_uppercase() {
            'S' => Axis::Scene,
            'M' => Axis::Mosaic,
            'Z' => Axis::Depth,
            'C' => Axis::Channel,
            'T' => Axis::Time,
            'Y' => Axis::Row,
            'X' => Axis::Column,
            other => Axis::Other(other),
        }
    }

    pub fn code(self) -> char {
        match self {
            Axis::Scene => 'S',
            Axis::Mosaic => 'M',
            Axis::Depth => 'Z',
            Axis::Channel => 'C',
            Axis::Time => 'T',
            Axis::Row => 'Y',
            Axis::Column => 'X',
            Axis::Other(code) => code,
        }
    }
}

/// Ordered set of axes present in an acquisition, e.g. `STCZYX`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimensionDescriptor {
    axes: Vec<Axis>,
}

impl DimensionDescriptor {
    pub fn new(axes: impl IntoIterator<Item = Axis>) -> Self {
        let mut unique = Vec::new();
        for axis in axes {
            if !unique.contains(&axis) {
                unique.push(axis);
            }
        }
        Self { axes: unique }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn contains(&self, axis: Axis) -> bool {
        self.axes.contains(&axis)
    }

    pub fn has_scenes(&self) -> bool {
        self.contains(Axis::Scene)
    }

    pub fn has_mosaics(&self) -> bool {
        self.contains(Axis::Mosaic)
    }

    pub fn has_stacks(&self) -> bool {
        self.contains(Axis::Depth)
    }
}

impl FromStr for DimensionDescriptor {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(bad) = s.chars().find(|c| !c.is_ascii_alphabetic()) {
            return Err(ConversionError::StructuralInconsistency(format!(
                "invalid axis code {:?} in dimension string {:?}",
                bad, s
            )));
        }
        Ok(Self::new(s.chars().map(Axis::from_code)))
    }
}

impl fmt::Display for DimensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for axis in &self.axes {
            write!(f, "{}", axis.code())?;
        }
        Ok(())
    }
}

/// Valid index span `(start, count)` of one axis within a shape entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub start: usize,
    pub count: usize,
}

impl AxisRange {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }
}

/// Index spans of one shape entry. `None` means the axis is absent from the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeEntry {
    pub scene: Option<AxisRange>,
    pub mosaic: Option<AxisRange>,
    pub depth: Option<AxisRange>,
    pub channel: Option<AxisRange>,
    pub time: Option<AxisRange>,
}

impl ShapeEntry {
    /// Sets the span of `axis`. Axes without a dedicated field are ignored.
    pub fn with(mut self, axis: Axis, start: usize, count: usize) -> Self {
        let range = Some(AxisRange::new(start, count));
        match axis {
            Axis::Scene => self.scene = range,
            Axis::Mosaic => self.mosaic = range,
            Axis::Depth => self.depth = range,
            Axis::Channel => self.channel = range,
            Axis::Time => self.time = range,
            Axis::Row | Axis::Column | Axis::Other(_) => {}
        }
        self
    }

    pub fn range(&self, axis: Axis) -> Option<AxisRange> {
        match axis {
            Axis::Scene => self.scene,
            Axis::Mosaic => self.mosaic,
            Axis::Depth => self.depth,
            Axis::Channel => self.channel,
            Axis::Time => self.time,
            Axis::Row | Axis::Column | Axis::Other(_) => None,
        }
    }
}

/// Per-scene shape declarations. One row means a uniform shape for all scenes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShapeTable {
    entries: Vec<ShapeEntry>,
}

impl ShapeTable {
    pub fn new(entries: Vec<ShapeEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ShapeEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ShapeEntry] {
        &self.entries
    }
}

/// Pixel-space rectangle covering all tiles of a mosaic tile group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Axis selectors for a read. `None` leaves the axis unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaneSelection {
    pub scene: Option<usize>,
    pub depth: Option<usize>,
    pub channel: Option<usize>,
}

impl PlaneSelection {
    pub fn scene(scene: Option<usize>) -> Self {
        Self {
            scene,
            ..Self::default()
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn with_channel(mut self, channel: usize) -> Self {
        self.channel = Some(channel);
        self
    }
}

/// A `Distance` record of the embedded metadata. `value` is the raw text, in meters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceRecord {
    pub id: String,
    pub value: Option<String>,
}

impl DistanceRecord {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: Some(value.into()),
        }
    }
}

/// The parts of the container's metadata document the pipeline consumes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataDocument {
    pub distances: Vec<DistanceRecord>,
}

impl MetadataDocument {
    pub fn with_distance(mut self, id: &str, meters: &str) -> Self {
        self.distances.push(DistanceRecord::new(id, meters));
        self
    }

    /// Text of the first `id` distance record that carries a value.
    pub fn distance_value(&self, id: &str) -> Option<&str> {
        self.distances
            .iter()
            .filter(|record| record.id == id)
            .find_map(|record| record.value.as_deref())
    }
}

/// Pixel data with one label per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    pub data: PixelArray,
    pub axes: Vec<char>,
}

impl LabeledArray {
    /// Pairs `data` with `axes`, falling back to [`LabeledArray::unlabeled`]
    /// when the label count does not match the array rank.
    pub fn new(data: PixelArray, axes: Vec<char>) -> Self {
        if axes.len() == data.ndim() {
            Self { data, axes }
        } else {
            Self::unlabeled(data)
        }
    }

    /// Labels the two trailing axes `Y`, `X` and everything before them as unknown.
    pub fn unlabeled(data: PixelArray) -> Self {
        let ndim = data.ndim();
        let axes = (0..ndim)
            .map(|i| match ndim - i {
                1 => Axis::Column.code(),
                2 => Axis::Row.code(),
                _ => UNKNOWN_AXIS,
            })
            .collect();
        Self { data, axes }
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn axis_string(&self) -> String {
        self.axes.iter().collect()
    }
}
