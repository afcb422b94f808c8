// SPDX-License-Identifier: GPL-3.0-only

//! Video frame types handed from the capture side to the scan worker

use std::sync::Arc;
use std::time::Instant;

/// Frame data storage - either shared bytes or a buffer owned by the frame
///
/// Capture pipelines that keep frames around for preview hand over a shared
/// `Arc<[u8]>`; one-shot producers (file loaders, tests) can move their
/// `Vec<u8>` in without copying.
#[derive(Clone)]
pub enum FrameData {
    /// Reference counted bytes shared with other consumers
    Shared(Arc<[u8]>),
    /// Bytes owned by this frame alone
    Owned(Vec<u8>),
}

impl FrameData {
    /// Get the length of the frame data in bytes
    pub fn len(&self) -> usize {
        match self {
            FrameData::Shared(data) => data.len(),
            FrameData::Owned(data) => data.len(),
        }
    }

    /// Check if the frame data is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameData::Shared(data) => write!(f, "FrameData::Shared({} bytes)", data.len()),
            FrameData::Owned(data) => write!(f, "FrameData::Owned({} bytes)", data.len()),
        }
    }
}

impl AsRef<[u8]> for FrameData {
    fn as_ref(&self) -> &[u8] {
        match self {
            FrameData::Shared(data) => data.as_ref(),
            FrameData::Owned(data) => data.as_slice(),
        }
    }
}

impl std::ops::Deref for FrameData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_ref()
    }
}

impl From<Vec<u8>> for FrameData {
    fn from(data: Vec<u8>) -> Self {
        FrameData::Owned(data)
    }
}

impl From<Arc<[u8]>> for FrameData {
    fn from(data: Arc<[u8]>) -> Self {
        FrameData::Shared(data)
    }
}

/// Pixel format of an incoming frame
///
/// Only the RGB32 family can be scanned. The remaining variants are formats
/// camera pipelines commonly deliver; they are rejected by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit 0xffRRGGBB words, B G R X in memory
    Rgb32,
    /// 32-bit 0xAARRGGBB words, B G R A in memory
    Argb32,
    /// Like `Argb32` with color channels premultiplied by alpha
    Argb32Premultiplied,
    /// RGBA - 32-bit with alpha (R G B A byte order)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
    /// NV12 - Semi-planar 4:2:0 (Y plane + interleaved UV plane)
    NV12,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    YUYV,
}

impl PixelFormat {
    /// Formats the scanner accepts
    pub const SCANNABLE: [PixelFormat; 3] = [
        PixelFormat::Rgb32,
        PixelFormat::Argb32,
        PixelFormat::Argb32Premultiplied,
    ];

    /// Check if frames in this format can be handed to the decoder
    pub fn is_scannable(&self) -> bool {
        matches!(
            self,
            Self::Rgb32 | Self::Argb32 | Self::Argb32Premultiplied
        )
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelFormat::Rgb32 => "RGB32",
            PixelFormat::Argb32 => "ARGB32",
            PixelFormat::Argb32Premultiplied => "ARGB32_Premultiplied",
            PixelFormat::RGBA => "RGBA",
            PixelFormat::RGB24 => "RGB24",
            PixelFormat::Gray8 => "GRAY8",
            PixelFormat::NV12 => "NV12",
            PixelFormat::YUYV => "YUYV",
        };
        write!(f, "{}", name)
    }
}

/// A single frame as delivered by the capture pipeline
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Raw pixel bytes
    pub data: FrameData,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl VideoFrame {
    /// Create a frame stamped with the current time
    pub fn new(
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
        data: impl Into<FrameData>,
    ) -> Self {
        Self {
            width,
            height,
            stride,
            format,
            data: data.into(),
            captured_at: Instant::now(),
        }
    }

    /// Build an `Argb32` frame from tightly packed RGBA bytes
    ///
    /// Used when frames come from image files rather than a camera.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Self {
        let mut data = Vec::with_capacity(rgba.len());
        for px in rgba.chunks_exact(4) {
            data.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
        }
        Self::new(width, height, width * 4, PixelFormat::Argb32, data)
    }
}
