// SPDX-License-Identifier: GPL-3.0-only

//! Linear barcode decoding task
//!
//! Runs rxing's multi-format reader over the luminance image. It finds EAN,
//! UPC, Code 39/93/128, ITF, Codabar and PDF417 symbols, and QR codes unless
//! told to leave those to [`QrDetector`](super::QrDetector).

use super::{SymbolDecoder, mark_repeats};
use crate::errors::ScanResult;
use crate::frame_processor::types::{FrameRegion, Symbol, SymbolType};
use crate::media::LumaImage;
use rxing::BarcodeFormat;
use tracing::{debug, trace};

/// Multi-format barcode decoder backed by rxing
#[derive(Debug, Default)]
pub struct BarcodeDecoder {
    skip_qr: bool,
}

impl BarcodeDecoder {
    /// Decoder reporting every symbology it recognizes
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop QR codes from the results
    ///
    /// Use when chained after a [`QrDetector`](super::QrDetector).
    pub fn skip_qr_codes(mut self) -> Self {
        self.skip_qr = true;
        self
    }
}

impl SymbolDecoder for BarcodeDecoder {
    fn scan(&mut self, image: &LumaImage) -> ScanResult<Vec<Symbol>> {
        let width = image.width();
        let height = image.height();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        let start = std::time::Instant::now();
        // rxing reports "nothing found" as an error; a frame without a
        // barcode is the normal case
        let results =
            match rxing::helpers::detect_multiple_in_luma(image.as_bytes().to_vec(), width, height) {
                Ok(results) => results,
                Err(e) => {
                    trace!(error = %e, "No barcode found");
                    return Ok(Vec::new());
                }
            };

        trace!(
            count = results.len(),
            detection_ms = start.elapsed().as_millis(),
            "Barcode detection complete"
        );

        let mut symbols = Vec::with_capacity(results.len());
        for result in &results {
            let Some(symbol_type) = symbol_type(result.getBarcodeFormat()) else {
                debug!(format = ?result.getBarcodeFormat(), "Ignoring unsupported symbology");
                continue;
            };
            if self.skip_qr && symbol_type == SymbolType::QrCode {
                continue;
            }

            let points: Vec<(i32, i32)> = result
                .getPoints()
                .iter()
                .map(|p| (p.x.round() as i32, p.y.round() as i32))
                .collect();
            let bounds = FrameRegion::bounding(&points, width, height);

            debug!(
                symbol_type = %symbol_type,
                content = %result.getText(),
                "Detected barcode"
            );

            symbols.push(Symbol::new(symbol_type, result.getText(), bounds));
        }

        mark_repeats(&mut symbols);
        Ok(symbols)
    }
}

/// Map an rxing format to the symbologies the worker reports
fn symbol_type(format: &BarcodeFormat) -> Option<SymbolType> {
    match format {
        BarcodeFormat::EAN_8 => Some(SymbolType::Ean8),
        BarcodeFormat::EAN_13 => Some(SymbolType::Ean13),
        BarcodeFormat::UPC_A => Some(SymbolType::UpcA),
        BarcodeFormat::UPC_E => Some(SymbolType::UpcE),
        BarcodeFormat::ITF => Some(SymbolType::I25),
        BarcodeFormat::CODABAR => Some(SymbolType::Codabar),
        BarcodeFormat::CODE_39 => Some(SymbolType::Code39),
        BarcodeFormat::CODE_93 => Some(SymbolType::Code93),
        BarcodeFormat::CODE_128 => Some(SymbolType::Code128),
        BarcodeFormat::PDF_417 => Some(SymbolType::Pdf417),
        BarcodeFormat::QR_CODE => Some(SymbolType::QrCode),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mapping() {
        assert_eq!(symbol_type(&BarcodeFormat::EAN_13), Some(SymbolType::Ean13));
        assert_eq!(symbol_type(&BarcodeFormat::ITF), Some(SymbolType::I25));
        assert_eq!(symbol_type(&BarcodeFormat::QR_CODE), Some(SymbolType::QrCode));
        assert_eq!(symbol_type(&BarcodeFormat::AZTEC), None);
    }

    #[test]
    fn test_blank_image_has_no_symbols() {
        let image = LumaImage::from_raw(120, 40, vec![255; 120 * 40]).unwrap();
        assert!(BarcodeDecoder::new().scan(&image).unwrap().is_empty());
    }

    #[test]
    fn test_empty_image() {
        assert!(BarcodeDecoder::new().scan(&LumaImage::new()).unwrap().is_empty());
    }
}
