// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! This module implements QR code detection using the rqrr crate. The
//! luminance image is searched for finder patterns, each candidate grid is
//! decoded, and repeated detections of the same code are marked so only one
//! result per physical code is delivered.

use super::{SymbolDecoder, mark_repeats};
use crate::errors::ScanResult;
use crate::frame_processor::types::{FrameRegion, Symbol, SymbolType};
use crate::media::LumaImage;
use rqrr::PreparedImage;
use tracing::{debug, trace};

/// QR code detector backed by rqrr
#[derive(Debug, Default)]
pub struct QrDetector;

impl QrDetector {
    /// Create a new QR detector
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrDetector {
    fn scan(&mut self, image: &LumaImage) -> ScanResult<Vec<Symbol>> {
        let start = std::time::Instant::now();
        let width = image.width();
        let height = image.height();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let mut prepared = PreparedImage::prepare_from_greyscale(
            width as usize,
            height as usize,
            |x, y| image.get(x as u32, y as u32),
        );
        let grids = prepared.detect_grids();

        trace!(
            count = grids.len(),
            detection_ms = start.elapsed().as_millis(),
            "QR grid detection complete"
        );

        let mut symbols = Vec::with_capacity(grids.len());
        for grid in grids {
            let content = match grid.decode() {
                Ok((_, content)) => content,
                Err(e) => {
                    debug!(error = %e, "Failed to decode QR code");
                    continue;
                }
            };

            let corners: Vec<(i32, i32)> = grid.bounds.iter().map(|p| (p.x, p.y)).collect();
            let bounds = FrameRegion::bounding(&corners, width, height);

            debug!(
                content = %content,
                x = bounds.x,
                y = bounds.y,
                width = bounds.width,
                height = bounds.height,
                "Detected QR code"
            );

            symbols.push(Symbol::new(SymbolType::QrCode, content, bounds));
        }

        mark_repeats(&mut symbols);
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrcode::{Color, EcLevel, QrCode};

    const QUIET_MODULES: usize = 4;

    /// Render a QR code as luminance, `scale` pixels per module
    fn render(code: &QrCode, scale: usize) -> LumaImage {
        let modules = code.width();
        let colors = code.to_colors();
        let side = (modules + 2 * QUIET_MODULES) * scale;
        let mut data = vec![255u8; side * side];
        for y in 0..side {
            for x in 0..side {
                let module = (
                    (x / scale).checked_sub(QUIET_MODULES),
                    (y / scale).checked_sub(QUIET_MODULES),
                );
                let dark = match module {
                    (Some(mx), Some(my)) if mx < modules && my < modules => {
                        colors[my * modules + mx] == Color::Dark
                    }
                    _ => false,
                };
                if dark {
                    data[y * side + x] = 0;
                }
            }
        }
        LumaImage::from_raw(side as u32, side as u32, data).unwrap()
    }

    #[test]
    fn test_blank_image_has_no_symbols() {
        let image = LumaImage::from_raw(64, 64, vec![255; 64 * 64]).unwrap();
        let mut detector = QrDetector::new();
        assert!(detector.scan(&image).unwrap().is_empty());
    }

    #[test]
    fn test_empty_image() {
        let mut detector = QrDetector::new();
        assert!(detector.scan(&LumaImage::new()).unwrap().is_empty());
    }

    #[test]
    fn test_decodes_rendered_code() {
        let code = QrCode::new("framescan").unwrap();
        let image = render(&code, 6);

        let symbols = QrDetector::new().scan(&image).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].symbol_type, SymbolType::QrCode);
        assert_eq!(symbols[0].data, "framescan");
        assert_eq!(symbols[0].count, 0);
    }

    #[test]
    fn test_bounds_cover_the_code() {
        let code = QrCode::new("bounds").unwrap();
        let modules = code.width();
        let total = (modules + 2 * QUIET_MODULES) as f32;
        let image = render(&code, 6);

        let symbols = QrDetector::new().scan(&image).unwrap();
        assert_eq!(symbols.len(), 1);
        let bounds = symbols[0].bounds;
        let expected_origin = QUIET_MODULES as f32 / total;
        let expected_size = modules as f32 / total;
        assert!((bounds.x - expected_origin).abs() < 0.05, "{:?}", bounds);
        assert!((bounds.y - expected_origin).abs() < 0.05, "{:?}", bounds);
        assert!((bounds.width - expected_size).abs() < 0.05, "{:?}", bounds);
        assert!((bounds.height - expected_size).abs() < 0.05, "{:?}", bounds);
    }

    #[test]
    fn test_undecodable_grid_is_skipped() {
        let code = QrCode::with_error_correction_level("damaged", EcLevel::L).unwrap();
        let scale = 6;
        let mut image = render(&code, scale);
        let side = image.width() as usize;
        let modules = code.width();

        // Invert the bottom-right data block, well past what level L corrects
        let mut data = image.as_bytes().to_vec();
        let from = (QUIET_MODULES + modules - 8) * scale;
        let to = (QUIET_MODULES + modules) * scale;
        for y in from..to {
            for x in from..to {
                data[y * side + x] = 255 - data[y * side + x];
            }
        }
        image = LumaImage::from_raw(side as u32, side as u32, data).unwrap();

        let symbols = QrDetector::new().scan(&image).unwrap();
        assert!(symbols.iter().all(|s| s.data != "damaged"));
    }
}
