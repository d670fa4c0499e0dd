use std::io::{Cursor, Write};
use ndarray::ArrayViewD;
use tracing::debug;
use ::tiff::encoder::colortype::{ColorType, Gray16, Gray32Float, Gray8};
use ::tiff::encoder::{Rational, TiffEncoder, TiffValue};
use ::tiff::tags::{ResolutionUnit, Tag};
use crate::image_pipeline::acquisition::Axis;
use crate::image_pipeline::assemble::CanonicalArray;
use crate::image_pipeline::common::error::{Result, ConversionError};
use crate::image_pipeline::tiff::types::{BitDepth, ExportConfig, PageMetadata};
use crate::image_pipeline::tiff::writer::ImageWriter;

/// Denominator used to store fractional resolutions as TIFF rationals.
const RESOLUTION_DENOMINATOR: u32 = 1_000_000;

/// Writes one grayscale page per image plane, row-major over the outer axes.
///
/// Channel/depth volumes are paged slice by slice with the channel varying
/// fastest, the order ImageJ expects of a hyperstack.
pub struct StandardTiffWriter;

impl ImageWriter for StandardTiffWriter {
    fn write_tiff(
        &self,
        image: &CanonicalArray,
        metadata: &PageMetadata,
        output: &mut dyn Write,
        config: &ExportConfig,
    ) -> Result<()> {
        let (height, width) = image.plane_dims();
        if height == 0 || width == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        debug!(
            "Encoding TIFF image: {} page(s) of {}x{}, {}-bit",
            image.page_count(),
            width,
            height,
            config.bit_depth.bits()
        );

        let mut buffer = Vec::new();
        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

        let (pages, axes) = hyperstack_order(image);
        let description = metadata
            .volumetric
            .then(|| imagej_description(image.page_count(), &pages, &axes, metadata));
        let samples: Vec<u16> = pages.iter().copied().collect();

        for (page, plane) in samples.chunks(height * width).enumerate() {
            let page_description = if page == 0 { description.as_deref() } else { None };
            let page = Page { width, height, metadata, description: page_description };
            match config.bit_depth {
                BitDepth::Eight => {
                    let data: Vec<u8> =
                        plane.iter().map(|&v| v.min(u8::MAX as u16) as u8).collect();
                    write_page::<Gray8>(&mut encoder, &page, &data)?;
                }
                BitDepth::Sixteen => write_page::<Gray16>(&mut encoder, &page, plane)?,
                BitDepth::ThirtyTwo => {
                    let data: Vec<f32> = plane.iter().map(|&v| v as f32).collect();
                    write_page::<Gray32Float>(&mut encoder, &page, &data)?;
                }
            }
        }
        drop(encoder);

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}

struct Page<'a> {
    width: usize,
    height: usize,
    metadata: &'a PageMetadata,
    description: Option<&'a str>,
}

fn write_page<C: ColorType>(
    encoder: &mut TiffEncoder<Cursor<&mut Vec<u8>>>,
    page: &Page<'_>,
    data: &[C::Inner],
) -> Result<()>
where
    [C::Inner]: TiffValue,
{
    let encode_err = |e: ::tiff::TiffError| ConversionError::EncodeError(e.to_string());

    let mut image = encoder
        .new_image::<C>(page.width as u32, page.height as u32)
        .map_err(encode_err)?;

    let (x, y) = page.metadata.resolution;
    image.x_resolution(to_rational(x));
    image.y_resolution(to_rational(y));
    image.resolution_unit(ResolutionUnit::None);

    if let Some(description) = page.description {
        image
            .encoder()
            .write_tag(Tag::ImageDescription, description)
            .map_err(encode_err)?;
    }

    image.write_data(data).map_err(encode_err)
}

fn to_rational(value: f64) -> Rational {
    let scaled = (value * RESOLUTION_DENOMINATOR as f64).round();
    Rational {
        n: scaled.clamp(1.0, u32::MAX as f64) as u32,
        d: RESOLUTION_DENOMINATOR,
    }
}

/// Page order of `image` with its axis labels: depth outside channel.
///
/// Only the view is reordered; the stored array keeps its canonical layout.
fn hyperstack_order(image: &CanonicalArray) -> (ArrayViewD<'_, u16>, Vec<char>) {
    let mut view = image.data().view();
    let mut axes = image.axes().to_vec();

    let channel = axes.iter().position(|&label| label == Axis::Channel.code());
    let depth = axes.iter().position(|&label| label == Axis::Depth.code());
    if let (Some(channel), Some(depth)) = (channel, depth) {
        if channel < depth {
            view.swap_axes(channel, depth);
            axes.swap(channel, depth);
        }
    }

    (view, axes)
}

/// ImageJ-style description so viewers restore the unit, spacing and outer axes.
fn imagej_description(
    page_count: usize,
    pages: &ArrayViewD<'_, u16>,
    axes: &[char],
    metadata: &PageMetadata,
) -> String {
    let axis_len = |axis: Axis| {
        axes.iter()
            .position(|&label| label == axis.code())
            .map(|i| pages.shape()[i])
    };
    let mut lines = vec!["ImageJ=1.11a".to_string(), format!("images={}", page_count)];

    let channels = axis_len(Axis::Channel);
    let slices = axis_len(Axis::Depth);
    if let Some(channels) = channels {
        lines.push(format!("channels={}", channels));
    }
    if let Some(slices) = slices {
        lines.push(format!("slices={}", slices));
    }
    if channels.is_some() && slices.is_some() {
        lines.push("hyperstack=true".to_string());
    }

    lines.push(format!("unit={}", metadata.unit));
    if let Some(spacing) = metadata.spacing {
        lines.push(format!("spacing={}", spacing));
    }
    lines.push(format!("axes={}", axes.iter().collect::<String>()));
    lines.push("loop=false".to_string());

    let mut description = lines.join("\n");
    description.push('\n');
    description
}
