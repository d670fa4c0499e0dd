use std::io::Write;
use crate::image_pipeline::assemble::CanonicalArray;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::tiff::types::{ExportConfig, PageMetadata};

pub trait ImageWriter {
    fn write_tiff(
        &self,
        image: &CanonicalArray,
        metadata: &PageMetadata,
        output: &mut dyn Write,
        config: &ExportConfig,
    ) -> Result<()>;
}
