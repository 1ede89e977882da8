//! Artifact rendering: pixel volumes to raster images.
//!
//! All functions here are pure; the device strategies decide which of them
//! apply to a given storage class.

use crate::error::{OculexError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use dicom_pixeldata::image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// Decoded pixel data laid out as `frames * rows * columns * samples`
/// contiguous 8-bit samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelVolume {
    pub frames: usize,
    pub rows: u32,
    pub columns: u32,
    pub samples: u16,
    pub data: Vec<u8>,
}

impl PixelVolume {
    pub fn new(frames: usize, rows: u32, columns: u32, samples: u16, data: Vec<u8>) -> Result<Self> {
        let expected = frames * rows as usize * columns as usize * samples as usize;
        if frames == 0 || expected != data.len() {
            return Err(OculexError::Render(format!(
                "pixel buffer of {} bytes does not match {} frames of {}x{}x{}",
                data.len(),
                frames,
                rows,
                columns,
                samples
            )));
        }
        Ok(Self {
            frames,
            rows,
            columns,
            samples,
            data,
        })
    }

    pub fn frame_len(&self) -> usize {
        self.rows as usize * self.columns as usize * self.samples as usize
    }

    pub fn frame(&self, index: usize) -> &[u8] {
        let len = self.frame_len();
        &self.data[index * len..(index + 1) * len]
    }
}

fn frame_image(volume: &PixelVolume, index: usize) -> Result<DynamicImage> {
    let bytes = volume.frame(index).to_vec();
    match volume.samples {
        1 => GrayImage::from_raw(volume.columns, volume.rows, bytes)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(|| OculexError::Render("frame buffer too short".into())),
        3 => RgbImage::from_raw(volume.columns, volume.rows, bytes)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| OculexError::Render("frame buffer too short".into())),
        n => Err(OculexError::Render(format!(
            "unsupported samples per pixel: {n}"
        ))),
    }
}

/// One image per leading-axis slice, named positionally and 1-indexed.
pub fn rasterize_frames(volume: &PixelVolume) -> Result<Vec<(String, DynamicImage)>> {
    (0..volume.frames)
        .map(|i| Ok((format!("frame {}", i + 1), frame_image(volume, i)?)))
        .collect()
}

/// Single-frame rendering for photography storage classes.
pub fn rasterize_single(volume: &PixelVolume) -> Result<DynamicImage> {
    frame_image(volume, 0)
}

/// Single-frame rendering with the fixed YCbCr-to-RGB transform some
/// devices require before the samples are meaningful as color.
///
/// The channels are rewritten in place, sequentially: green is derived from
/// the already-converted red, and blue from the already-converted green.
pub fn rasterize_single_ycbcr(volume: &PixelVolume) -> Result<DynamicImage> {
    if volume.samples != 3 {
        return Err(OculexError::Render(format!(
            "color transform needs 3 samples per pixel, got {}",
            volume.samples
        )));
    }
    let mut converted = volume.clone();
    for px in converted.data.chunks_exact_mut(3) {
        let y = f32::from(px[0]);
        let cb = f32::from(px[1]);
        let cr = f32::from(px[2]);
        let r = y + 1.402 * (cr - 128.0);
        let g = r - 0.344_136 * (cb - 128.0) - 0.714_136 * (cr - 128.0);
        let b = r + 1.772 * (g - 128.0);
        px[0] = r.clamp(0.0, 255.0) as u8;
        px[1] = g.clamp(0.0, 255.0) as u8;
        px[2] = b.clamp(0.0, 255.0) as u8;
    }
    frame_image(&converted, 0)
}

/// Collapses the row (depth) axis of a grayscale volume with an element-wise
/// maximum, yielding an en-face projection of `frames` rows by `columns`
/// columns.
pub fn project_max(volume: &PixelVolume) -> Result<DynamicImage> {
    if volume.samples != 1 {
        return Err(OculexError::Render(
            "en-face projection is defined for grayscale volumes only".into(),
        ));
    }
    let rows = volume.rows as usize;
    let columns = volume.columns as usize;
    let mut out = vec![0u8; volume.frames * columns];
    for f in 0..volume.frames {
        let frame = volume.frame(f);
        for r in 0..rows {
            for c in 0..columns {
                let v = frame[r * columns + c];
                let slot = &mut out[f * columns + c];
                if v > *slot {
                    *slot = v;
                }
            }
        }
    }
    GrayImage::from_raw(volume.columns, volume.frames as u32, out)
        .map(DynamicImage::ImageLuma8)
        .ok_or_else(|| OculexError::Render("projection buffer too short".into()))
}

/// PNG-encodes an image as a `data:` URI suitable for inlining in the
/// sidecar document.
pub fn encode_png_data_uri(image: &DynamicImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| OculexError::Render(e.to_string()))?;
    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(buffer.into_inner())
    ))
}
