//! Mock collaborators shared by the unit tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ndarray::IxDyn;

use crate::image_pipeline::acquisition::{
    AcquisitionContainer, AcquisitionReader, BoundingBox, DimensionDescriptor, LabeledArray,
    MetadataDocument, PixelArray, PlaneSelection, ShapeTable,
};
use crate::image_pipeline::assemble::CanonicalArray;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::flat::{FlatContainer, FlatContainerReader, FlatImageInfo};
use crate::image_pipeline::tiff::{ExportConfig, ImageWriter, PageMetadata};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(PathBuf),
    Plane(PlaneSelection),
    BoundingBoxes,
    Mosaic(BoundingBox, PlaneSelection),
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[derive(Clone)]
pub struct MockContainer {
    pub dims: DimensionDescriptor,
    pub shapes: ShapeTable,
    pub metadata: MetadataDocument,
    /// Shape and labels returned by every single-plane read.
    pub plane_shape: Vec<usize>,
    pub plane_axes: Vec<char>,
    /// Shape returned by every mosaic read.
    pub mosaic_shape: Vec<usize>,
    pub boxes: Vec<BoundingBox>,
    /// Fails the read with this (zero-based) ordinal.
    pub fail_on_read: Option<usize>,
    pub calls: CallLog,
}

impl MockContainer {
    pub fn new(dims: &str, shapes: ShapeTable) -> Self {
        Self {
            dims: dims.parse().unwrap(),
            shapes,
            metadata: MetadataDocument::default(),
            plane_shape: vec![1, 1, 4, 5],
            plane_axes: vec!['T', 'C', 'Y', 'X'],
            mosaic_shape: vec![1, 6, 7],
            boxes: vec![BoundingBox { x: 0, y: 0, width: 7, height: 6 }],
            fail_on_read: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record_read(&self, call: Call) -> Result<usize> {
        let mut calls = self.calls.lock().unwrap();
        let ordinal = calls
            .iter()
            .filter(|c| matches!(c, Call::Plane(_) | Call::Mosaic(..)))
            .count();
        calls.push(call);
        if self.fail_on_read == Some(ordinal) {
            return Err(ConversionError::PlaneReadError(format!("mock read {} failed", ordinal)));
        }
        Ok(ordinal)
    }
}

// Each read fills its plane with the read ordinal so tests can check placement.
fn filled(shape: &[usize], ordinal: usize) -> PixelArray {
    PixelArray::from_elem(IxDyn(shape), ordinal as u16)
}

impl AcquisitionContainer for MockContainer {
    fn dimensions(&self) -> Result<DimensionDescriptor> {
        Ok(self.dims.clone())
    }

    fn shape_table(&self) -> Result<ShapeTable> {
        Ok(self.shapes.clone())
    }

    fn metadata(&self) -> Result<MetadataDocument> {
        Ok(self.metadata.clone())
    }

    fn read_plane(&mut self, selection: &PlaneSelection) -> Result<LabeledArray> {
        let ordinal = self.record_read(Call::Plane(*selection))?;
        Ok(LabeledArray::new(filled(&self.plane_shape, ordinal), self.plane_axes.clone()))
    }

    fn tile_bounding_boxes(&mut self) -> Result<Vec<BoundingBox>> {
        self.calls.lock().unwrap().push(Call::BoundingBoxes);
        Ok(self.boxes.clone())
    }

    fn read_mosaic_region(
        &mut self,
        region: &BoundingBox,
        _scale_factor: f32,
        selection: &PlaneSelection,
    ) -> Result<PixelArray> {
        let ordinal = self.record_read(Call::Mosaic(*region, *selection))?;
        Ok(filled(&self.mosaic_shape, ordinal))
    }
}

pub struct MockAcquisitionReader {
    pub container: MockContainer,
    pub fail_open: bool,
}

impl MockAcquisitionReader {
    pub fn new(container: MockContainer) -> Self {
        Self { container, fail_open: false }
    }
}

impl AcquisitionReader for MockAcquisitionReader {
    type Container = MockContainer;

    fn open(&self, path: &Path) -> Result<MockContainer> {
        self.container.calls.lock().unwrap().push(Call::Open(path.to_path_buf()));
        if self.fail_open {
            return Err(ConversionError::InputReadError(format!("{}: corrupt", path.display())));
        }
        Ok(self.container.clone())
    }
}

#[derive(Clone)]
pub struct MockFlatContainer {
    pub images: Vec<FlatImageInfo>,
    pub frame_shape: Vec<usize>,
    pub opens: Arc<Mutex<usize>>,
    pub frames_read: Arc<Mutex<Vec<usize>>>,
}

impl MockFlatContainer {
    pub fn new(images: Vec<FlatImageInfo>) -> Self {
        Self {
            images,
            frame_shape: vec![8, 9],
            opens: Arc::new(Mutex::new(0)),
            frames_read: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FlatContainer for MockFlatContainer {
    fn images(&self) -> Result<Vec<FlatImageInfo>> {
        Ok(self.images.clone())
    }

    fn frame(&mut self, index: usize) -> Result<LabeledArray> {
        self.frames_read.lock().unwrap().push(index);
        Ok(LabeledArray::unlabeled(filled(&self.frame_shape, index)))
    }
}

pub struct MockFlatReader {
    pub container: MockFlatContainer,
}

impl FlatContainerReader for MockFlatReader {
    type Container = MockFlatContainer;

    fn open(&self, _path: &Path) -> Result<MockFlatContainer> {
        *self.container.opens.lock().unwrap() += 1;
        Ok(self.container.clone())
    }
}

#[derive(Debug, Clone)]
pub struct WrittenImage {
    pub shape: Vec<usize>,
    pub axes: String,
    pub metadata: PageMetadata,
}

#[derive(Clone, Default)]
pub struct MockWriter {
    pub should_fail: bool,
    pub written: Arc<Mutex<Vec<WrittenImage>>>,
}

impl MockWriter {
    pub fn written(&self) -> Vec<WrittenImage> {
        self.written.lock().unwrap().clone()
    }
}

impl ImageWriter for MockWriter {
    fn write_tiff(
        &self,
        image: &CanonicalArray,
        metadata: &PageMetadata,
        output: &mut dyn Write,
        _config: &ExportConfig,
    ) -> Result<()> {
        if self.should_fail {
            return Err(ConversionError::EncodeError("Mock encode error".to_string()));
        }
        output.write_all(b"mock")?;
        self.written.lock().unwrap().push(WrittenImage {
            shape: image.shape().to_vec(),
            axes: image.axis_string(),
            metadata: metadata.clone(),
        });
        Ok(())
    }
}
