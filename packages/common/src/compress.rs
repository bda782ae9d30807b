//! Size-targeted re-encoding of oversized uploads.
//!
//! Full-colour images are re-encoded as JPEG while a binary search walks the
//! quality range toward the policy's target size. A candidate within 10% of
//! the target is accepted as soon as it is produced, so the result is an
//! approximation of the target, not an exact match. Images that are not
//! full-colour after alpha flattening (grayscale) get one lossless PNG encode.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageError, Rgb, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::config::CompressionPolicy;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] ImageError),
}

/// Container format of a compressed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Result of a compression run.
#[derive(Debug, Clone)]
pub struct CompressOutcome {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// JPEG quality of the returned candidate; `None` for lossless output.
    pub quality: Option<u8>,
    /// Number of encodes performed.
    pub steps: u32,
}

/// Quality binary search bound to a [`CompressionPolicy`].
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    policy: CompressionPolicy,
}

impl Compressor {
    pub fn new(policy: CompressionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CompressionPolicy {
        &self.policy
    }

    /// Decode `data` and re-encode it as close to the target size as the
    /// quality bounds allow.
    pub fn compress(&self, data: &[u8]) -> Result<CompressOutcome, CompressError> {
        let img = image::load_from_memory(data).map_err(CompressError::Decode)?;
        self.compress_image(flatten_alpha(img))
    }

    fn compress_image(&self, img: DynamicImage) -> Result<CompressOutcome, CompressError> {
        if !is_full_colour(&img) {
            let bytes = encode_png(&img)?;
            debug!(size = bytes.len(), "Lossless re-encode");
            return Ok(CompressOutcome {
                bytes,
                format: OutputFormat::Png,
                quality: None,
                steps: 1,
            });
        }

        let rgb = img.to_rgb8();
        let target = self.policy.target_bytes();
        let tolerance = target as f64 * 0.1;

        let mut high = self.policy.max_quality.clamp(1, 100);
        let mut low = self.policy.min_quality.clamp(1, high);
        let mut steps = 0u32;
        let mut best_under: Option<(u8, Vec<u8>)> = None;
        let mut last: Option<(u8, Vec<u8>)> = None;

        while low <= high {
            let quality = low + (high - low) / 2;
            let candidate = encode_jpeg(&rgb, quality)?;
            steps += 1;
            let size = candidate.len() as u64;
            debug!(quality, size, target, "Compression candidate");

            if (size as f64 - target as f64).abs() < tolerance {
                return Ok(CompressOutcome {
                    bytes: candidate,
                    format: OutputFormat::Jpeg,
                    quality: Some(quality),
                    steps,
                });
            }

            if size > target {
                high = quality - 1;
                last = Some((quality, candidate));
            } else {
                low = quality + 1;
                let larger = best_under
                    .as_ref()
                    .is_none_or(|(_, best)| candidate.len() > best.len());
                if larger {
                    best_under = Some((quality, candidate.clone()));
                }
                last = Some((quality, candidate));
            }
        }

        let (quality, bytes) = match best_under.or(last) {
            Some(found) => found,
            // Unreachable with a non-empty quality range; encode once at the floor.
            None => {
                steps += 1;
                (low, encode_jpeg(&rgb, low)?)
            }
        };

        Ok(CompressOutcome {
            bytes,
            format: OutputFormat::Jpeg,
            quality: Some(quality),
            steps,
        })
    }
}

/// Composite any alpha channel onto an opaque white background.
fn flatten_alpha(img: DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }

    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        *dst = Rgb([blend(src[0]), blend(src[1]), blend(src[2])]);
    }
    DynamicImage::ImageRgb8(out)
}

fn is_full_colour(img: &DynamicImage) -> bool {
    matches!(
        img,
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_)
    )
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, CompressError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(CompressError::Encode)?;
    Ok(buf)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, CompressError> {
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .map_err(CompressError::Encode)?;
    Ok(buf)
}
