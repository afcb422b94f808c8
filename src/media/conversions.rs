// SPDX-License-Identifier: GPL-3.0-only

//! Frame to decoder buffer conversion
//!
//! Camera frames are validated and wrapped as `BGR4` buffers without copying,
//! then reduced to the 8-bit `Y800` luminance image barcode decoders scan.

use crate::constants::{BYTES_PER_PIXEL, LUMA_WEIGHT_B, LUMA_WEIGHT_G, LUMA_WEIGHT_R};
use crate::errors::{FormatError, ScanError, ScanResult};
use crate::media::frame::VideoFrame;
use tracing::trace;

/// Four character code identifying a decoder pixel layout
pub type FourCc = [u8; 4];

/// Packed 32-bit B G R X
pub const FOURCC_BGR4: FourCc = *b"BGR4";
/// 8-bit luminance
pub const FOURCC_Y800: FourCc = *b"Y800";

/// Frame bytes tagged with the layout the decoder should read them as
///
/// Borrows the frame's data; nothing is copied until luminance conversion.
#[derive(Debug, Clone, Copy)]
pub struct TaggedBuffer<'a> {
    pub fourcc: FourCc,
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// Validate a frame and wrap its bytes as a `BGR4` buffer
///
/// Width is taken from the stride, not from `frame.width`, so row padding is
/// scanned as image content, matching what the decoder expects of a packed
/// buffer.
pub fn convert(frame: &VideoFrame) -> ScanResult<TaggedBuffer<'_>> {
    if !frame.format.is_scannable() {
        return Err(FormatError::UnsupportedPixelFormat(frame.format).into());
    }

    let stride = frame.stride;
    if stride % BYTES_PER_PIXEL != 0 {
        return Err(FormatError::StrideNotAligned { stride }.into());
    }

    let width = stride / BYTES_PER_PIXEL;
    let height = frame.height;
    let required = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL as usize))
        .ok_or_else(|| ScanError::Conversion("frame geometry overflows".to_string()))?;
    let actual = frame.data.len();
    if required > actual {
        return Err(FormatError::BufferTooSmall { required, actual }.into());
    }

    Ok(TaggedBuffer {
        fourcc: FOURCC_BGR4,
        width,
        height,
        data: &frame.data,
    })
}

/// Integer box-filter factor that brings the larger side within `max_dimension`
pub fn downscale_factor(width: u32, height: u32, max_dimension: Option<u32>) -> u32 {
    match max_dimension {
        Some(max) if max > 0 => width.max(height).div_ceil(max).max(1),
        _ => 1,
    }
}

/// 8-bit luminance image handed to symbol decoders
///
/// The worker keeps one of these alive and refills it for every frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LumaImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl LumaImage {
    /// Create an empty image
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap existing luminance bytes, checking the length
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Luminance at (x, y); out-of-range reads return black
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Drop the previous frame's contents, keeping the allocation
    pub fn recycle(&mut self) {
        self.data.clear();
        self.width = 0;
        self.height = 0;
    }

    /// Refill from a `BGR4` buffer, box-filtering by `factor` in both axes
    pub fn fill_from_bgr4(&mut self, buffer: &TaggedBuffer<'_>, factor: u32) -> ScanResult<()> {
        if buffer.fourcc != FOURCC_BGR4 {
            return Err(ScanError::Conversion(format!(
                "unexpected source layout {}",
                String::from_utf8_lossy(&buffer.fourcc)
            )));
        }

        let src_w = buffer.width as usize;
        let src_h = buffer.height as usize;
        if buffer.data.len() < src_w * src_h * 4 {
            return Err(ScanError::Conversion(format!(
                "buffer holds {} bytes, {}x{} BGR4 needs {}",
                buffer.data.len(),
                src_w,
                src_h,
                src_w * src_h * 4
            )));
        }

        self.recycle();
        // A factor past the larger side collapses to one output pixel anyway
        let factor = (factor as usize).clamp(1, src_w.max(src_h).max(1));

        if factor == 1 {
            self.data.reserve(src_w * src_h);
            for px in buffer.data[..src_w * src_h * 4].chunks_exact(4) {
                self.data.push(bgr_to_luma(px[0], px[1], px[2]));
            }
            self.width = buffer.width;
            self.height = buffer.height;
            return Ok(());
        }

        let dst_w = if src_w == 0 { 0 } else { (src_w / factor).max(1) };
        let dst_h = if src_h == 0 { 0 } else { (src_h / factor).max(1) };
        self.data.reserve(dst_w * dst_h);

        let samples = (factor * factor) as u64;
        for oy in 0..dst_h {
            for ox in 0..dst_w {
                let mut sum = 0u64;
                for dy in 0..factor {
                    let sy = (oy * factor + dy).min(src_h - 1);
                    for dx in 0..factor {
                        let sx = (ox * factor + dx).min(src_w - 1);
                        let offset = (sy * src_w + sx) * 4;
                        let px = &buffer.data[offset..offset + 4];
                        sum += bgr_to_luma(px[0], px[1], px[2]) as u64;
                    }
                }
                self.data.push(((sum + samples / 2) / samples) as u8);
            }
        }

        self.width = dst_w as u32;
        self.height = dst_h as u32;
        trace!(
            src_w,
            src_h,
            dst_w,
            dst_h,
            factor,
            "Downscaled luminance image"
        );
        Ok(())
    }
}

/// BT.601 luminance in 8.8 fixed point
fn bgr_to_luma(b: u8, g: u8, r: u8) -> u8 {
    ((r as u32 * LUMA_WEIGHT_R + g as u32 * LUMA_WEIGHT_G + b as u32 * LUMA_WEIGHT_B + 128) >> 8)
        as u8
}
