use tracing::{debug, info, instrument, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::image_pipeline::{
    acquisition::{AcquisitionContainer, AcquisitionReader},
    assemble::{CanonicalArray, PlaneAssembler},
    calibration::{resolve_calibration, CalibrationOutcome, CalibrationVector},
    classify::classify,
    common::error::{ConversionError, Result},
    conversions::unlinked::Unlinked,
    flat::{FlatContainer, FlatContainerReader},
    tiff::{ExportConfig, ImageWriter, PageMetadata, StandardTiffWriter},
};

pub const OUTPUT_EXTENSION: &str = "tif";

/// Container kinds, told apart by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Scene/mosaic/stack acquisition (`.czi`)
    Acquisition,
    /// Flat list of named images (`.lif`)
    Flat,
}

impl ContainerKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("czi") => Ok(ContainerKind::Acquisition),
            Some("lif") => Ok(ContainerKind::Flat),
            _ => Err(ConversionError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub struct ContainerToTiffPipeline<A: AcquisitionReader, F: FlatContainerReader, W: ImageWriter> {
    acquisition: A,
    flat: F,
    writer: W,
    config: ExportConfig,
}

impl ContainerToTiffPipeline<Unlinked, Unlinked, StandardTiffWriter> {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            acquisition: Unlinked,
            flat: Unlinked,
            writer: StandardTiffWriter,
            config,
        }
    }
}

impl<A, F, W> ContainerToTiffPipeline<A, F, W>
where
    A: AcquisitionReader,
    F: FlatContainerReader,
    W: ImageWriter,
{
    pub fn with_custom(acquisition: A, flat: F, writer: W, config: ExportConfig) -> Self {
        Self {
            acquisition,
            flat,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    /// Exports every entry (or image) of the container at `path`.
    ///
    /// Returns the written files in export order. Files written before a
    /// failure stay on disk.
    #[instrument(skip(self, path), fields(input = %path.display()))]
    pub fn export_file(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let kind = ContainerKind::from_path(path)?;
        info!(?kind, "Exporting container");

        let written = match kind {
            ContainerKind::Acquisition => self.export_acquisition(path)?,
            ContainerKind::Flat => self.export_flat(path)?,
        };

        info!(files = written.len(), "Export complete");
        Ok(written)
    }

    fn export_acquisition(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut container = {
            let _span = tracing::info_span!("open_container").entered();
            self.acquisition.open(path)?
        };

        let calibration = match resolve_calibration(&container.metadata()?)? {
            CalibrationOutcome::Measured(vector) => {
                debug!(calibration = ?vector.components(), "Resolved calibration");
                vector
            }
            CalibrationOutcome::Missing => {
                warn!("No resolution found in metadata, assuming 1 pixel per micron");
                CalibrationVector::default()
            }
        };

        let dims = container.dimensions()?;
        let shapes = container.shape_table()?;
        let entries = classify(&dims, &shapes)?;
        info!(
            dims = %dims,
            shape_rows = shapes.len(),
            entries = entries.len(),
            "Classified acquisition"
        );

        let stem = file_stem(path);
        let metadata = PageMetadata::calibrated(&calibration);
        let mut written = Vec::with_capacity(entries.len());

        for entry in &entries {
            let _span = tracing::info_span!(
                "export_entry",
                index = entry.index,
                strategy = ?entry.strategy()
            )
            .entered();

            let image = PlaneAssembler::new(&mut container).assemble(entry)?;
            written.push(self.write_output(&stem, &entry.index.to_string(), &image, &metadata)?);
        }

        Ok(written)
    }

    fn export_flat(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut container = {
            let _span = tracing::info_span!("open_container").entered();
            self.flat.open(path)?
        };

        let images = container.images()?;
        info!(images = images.len(), "Listed flat container");

        let stem = file_stem(path);
        let mut written = Vec::with_capacity(images.len());

        for (index, info) in images.iter().enumerate() {
            let _span = tracing::info_span!("export_image", name = %info.name).entered();

            let calibration = info.calibration().unwrap_or_else(|| {
                if info.scale.is_some() {
                    warn!(scale = ?info.scale, "Ignoring invalid image scale");
                }
                CalibrationVector::default()
            });

            let image = CanonicalArray::from_frame(container.frame(index)?);
            let metadata = PageMetadata::calibrated(&calibration);
            written.push(self.write_output(&stem, &sanitize_name(&info.name), &image, &metadata)?);
        }

        Ok(written)
    }

    fn write_output(
        &self,
        stem: &str,
        id: &str,
        image: &CanonicalArray,
        metadata: &PageMetadata,
    ) -> Result<PathBuf> {
        let (height, width) = image.plane_dims();
        {
            let _span = tracing::info_span!("validate_dimensions", width, height).entered();
            self.validate_dimensions(width, height)?;
        }

        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|e| {
            ConversionError::OutputWriteError(format!("{}: {}", output_dir.display(), e))
        })?;

        let output_path = output_dir.join(format!("{}_{}.{}", stem, id, OUTPUT_EXTENSION));

        // The file only appears once the whole entry has encoded.
        let mut encoded = Vec::new();
        {
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_tiff(image, metadata, &mut encoded, &self.config)?;
        }

        {
            let _span = tracing::info_span!("write_output_file").entered();
            fs::write(&output_path, &encoded).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
        }

        info!(
            output = %output_path.display(),
            shape = ?image.shape(),
            axes = %image.axis_string(),
            "Wrote file"
        );
        Ok(output_path)
    }

    /// Whether files of `kind` can be opened with the linked readers.
    pub fn supports(&self, kind: ContainerKind) -> bool {
        match kind {
            ContainerKind::Acquisition => self.acquisition.is_linked(),
            ContainerKind::Flat => self.flat.is_linked(),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ExportConfig) {
        self.config = config;
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Image names may contain path separators.
fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}
