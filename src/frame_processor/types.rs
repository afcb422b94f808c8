// SPDX-License-Identifier: MPL-2.0

//! Core types for frame scan results
//!
//! Decoders report [`Symbol`]s; the worker turns the ones that have not been
//! reported yet into [`DecodedResult`]s and delivers them as [`ScanEvent`]s.

use serde::Serialize;

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the scanned image, so
/// regions stay comparable when the image was downscaled before scanning.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        if frame_width == 0 || frame_height == 0 {
            return Self::default();
        }
        Self {
            x: x as f32 / frame_width as f32,
            y: y as f32 / frame_height as f32,
            width: width as f32 / frame_width as f32,
            height: height as f32 / frame_height as f32,
        }
    }

    /// Bounding box of a set of pixel points
    pub fn bounding(points: &[(i32, i32)], frame_width: u32, frame_height: u32) -> Self {
        let Some(&(first_x, first_y)) = points.first() else {
            return Self::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first_x, first_y, first_x, first_y);
        for &(x, y) in &points[1..] {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        let min_x = min_x.max(0) as u32;
        let min_y = min_y.max(0) as u32;
        let max_x = (max_x.max(0) as u32).min(frame_width);
        let max_y = (max_y.max(0) as u32).min(frame_height);
        Self::from_pixels(
            min_x,
            min_y,
            max_x.saturating_sub(min_x),
            max_y.saturating_sub(min_y),
            frame_width,
            frame_height,
        )
    }

    /// Check whether two regions share any area
    pub fn overlaps(&self, other: &FrameRegion) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Barcode symbology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolType {
    Ean8,
    Ean13,
    UpcA,
    UpcE,
    I25,
    Codabar,
    Code39,
    Code93,
    Code128,
    Pdf417,
    QrCode,
}

impl SymbolType {
    /// Human readable symbology name
    pub fn name(&self) -> &'static str {
        match self {
            SymbolType::Ean8 => "EAN-8",
            SymbolType::Ean13 => "EAN-13",
            SymbolType::UpcA => "UPC-A",
            SymbolType::UpcE => "UPC-E",
            SymbolType::I25 => "I2/5",
            SymbolType::Codabar => "CODABAR",
            SymbolType::Code39 => "CODE-39",
            SymbolType::Code93 => "CODE-93",
            SymbolType::Code128 => "CODE-128",
            SymbolType::Pdf417 => "PDF417",
            SymbolType::QrCode => "QR-Code",
        }
    }
}

impl std::fmt::Display for SymbolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A symbol as reported by a decoder
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub symbol_type: SymbolType,
    /// Decoded payload
    pub data: String,
    /// Location in normalized image coordinates
    pub bounds: FrameRegion,
    /// Number of earlier reports of this same physical symbol.
    /// Only symbols with a count of zero are delivered.
    pub count: u32,
}

impl Symbol {
    /// Create a symbol that has not been reported before
    pub fn new(symbol_type: SymbolType, data: impl Into<String>, bounds: FrameRegion) -> Self {
        Self {
            symbol_type,
            data: data.into(),
            bounds,
            count: 0,
        }
    }

    /// Whether this instance was already reported
    pub fn is_repeat(&self) -> bool {
        self.count != 0
    }
}

/// A decoded payload delivered to the listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedResult {
    pub symbol_type: SymbolType,
    pub text: String,
}

impl From<Symbol> for DecodedResult {
    fn from(symbol: Symbol) -> Self {
        Self {
            symbol_type: symbol.symbol_type,
            text: symbol.data,
        }
    }
}

/// Event emitted by the scan worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// One accepted symbol
    Decoded {
        symbol_type: SymbolType,
        text: String,
    },
    /// One failed frame
    Error { message: String },
}
