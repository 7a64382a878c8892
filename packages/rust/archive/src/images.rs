//! Image size normalization.
//!
//! Pictures over the size threshold are re-encoded in their own format and
//! shrunk step by step until they fit the target size. Failures never abort
//! a build: the original bytes are kept and a warning is logged.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::imageops::FilterType as ResizeFilter;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, info, instrument, warn};

use booklet_shared::{BookletError, ImageBudget, Result};

/// Shrink `data` to fit `budget`. Returns the input unchanged when it is
/// already under the threshold or cannot be processed. The result is never
/// larger than the input.
#[instrument(skip_all, fields(file = file_name, bytes = data.len()))]
pub fn normalize_image(data: Vec<u8>, file_name: &str, budget: &ImageBudget) -> Vec<u8> {
    if data.len() <= budget.threshold_bytes {
        return data;
    }

    match shrink(&data, file_name, budget) {
        Ok(Some(smaller)) => {
            info!(
                before_kb = data.len() / 1024,
                after_kb = smaller.len() / 1024,
                "image normalized"
            );
            smaller
        }
        Ok(None) => {
            debug!("re-encoding did not reduce size, keeping original");
            data
        }
        Err(e) => {
            warn!(error = %e, "image normalization failed, keeping original");
            data
        }
    }
}

/// Format from magic bytes, falling back to the file extension. Only PNG
/// and JPEG are re-encoded.
fn detect_format(data: &[u8], file_name: &str) -> Option<ImageFormat> {
    let format = image::guess_format(data)
        .ok()
        .or_else(|| ImageFormat::from_path(Path::new(file_name)).ok())?;
    matches!(format, ImageFormat::Png | ImageFormat::Jpeg).then_some(format)
}

fn encode(img: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(BookletError::image)?;
        }
        _ => {
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Default, FilterType::Adaptive);
            img.write_with_encoder(encoder).map_err(BookletError::image)?;
        }
    }
    Ok(buf)
}

/// Returns the smallest attempt if it beats the input, `None` otherwise.
fn shrink(data: &[u8], file_name: &str, budget: &ImageBudget) -> Result<Option<Vec<u8>>> {
    let format = detect_format(data, file_name)
        .ok_or_else(|| BookletError::image(format!("unsupported image format: {file_name}")))?;
    let mut img = image::load_from_memory_with_format(data, format).map_err(BookletError::image)?;

    let mut best: Option<Vec<u8>> = None;
    let mut iteration = 0;
    loop {
        iteration += 1;
        let encoded = encode(&img, format, budget.jpeg_quality)?;
        let size = encoded.len();
        debug!(iteration, width = img.width(), height = img.height(), size, "encoded");

        if best.as_ref().is_none_or(|b| size < b.len()) {
            best = Some(encoded);
        }

        if size <= budget.target_bytes {
            break;
        }
        if img.width() < budget.min_dimension
            || img.height() < budget.min_dimension
            || iteration > budget.max_iterations
        {
            warn!(
                iteration,
                size_kb = size / 1024,
                "could not reach target size, stopping"
            );
            break;
        }

        let width = ((img.width() as f32 * budget.scale) as u32).max(1);
        let height = ((img.height() as f32 * budget.scale) as u32).max(1);
        img = img.resize_exact(width, height, ResizeFilter::Lanczos3);
    }

    Ok(best.filter(|b| b.len() < data.len()))
}
