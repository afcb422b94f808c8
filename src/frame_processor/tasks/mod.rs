// SPDX-License-Identifier: GPL-3.0-only

//! Frame scanning tasks
//!
//! This module contains the decoder abstraction the worker scans through and
//! its implementations:
//! - [`QrDetector`]: QR codes via rqrr
//! - [`BarcodeDecoder`]: linear barcodes (EAN/UPC, Code 39/93/128, ...) via rxing
//! - [`ChainedDecoder`]: runs several decoders over the same image

pub mod barcode_decoder;
pub mod qr_detector;

pub use barcode_decoder::BarcodeDecoder;
pub use qr_detector::QrDetector;

use crate::errors::ScanResult;
use crate::frame_processor::types::Symbol;
use crate::media::LumaImage;

/// A barcode decoder working on luminance images
///
/// The worker owns its decoder and only ever calls it from the worker thread,
/// so implementations are free to keep scratch state between frames.
pub trait SymbolDecoder: Send {
    /// Find and decode every symbol in `image`
    ///
    /// Repeated detections of one physical symbol must carry a non-zero
    /// `count`; the worker drops them.
    fn scan(&mut self, image: &LumaImage) -> ScanResult<Vec<Symbol>>;
}

/// Runs each decoder in turn and merges their symbols
///
/// Symbols are reported in decoder order. A symbol found by more than one
/// decoder is marked as a repeat after the first.
#[derive(Default)]
pub struct ChainedDecoder {
    decoders: Vec<Box<dyn SymbolDecoder>>,
}

impl ChainedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoder to the chain
    pub fn with(mut self, decoder: impl SymbolDecoder + 'static) -> Self {
        self.decoders.push(Box::new(decoder));
        self
    }
}

impl SymbolDecoder for ChainedDecoder {
    fn scan(&mut self, image: &LumaImage) -> ScanResult<Vec<Symbol>> {
        let mut symbols = Vec::new();
        for decoder in &mut self.decoders {
            symbols.extend(decoder.scan(image)?);
        }
        mark_repeats(&mut symbols);
        Ok(symbols)
    }
}

/// Set `count` on every symbol that repeats an earlier one
///
/// A repeat has the same type and payload as an earlier symbol and overlaps
/// it. Distinct codes with the same payload in different places both count
/// as new.
pub fn mark_repeats(symbols: &mut [Symbol]) {
    for i in 1..symbols.len() {
        let (earlier, rest) = symbols.split_at_mut(i);
        let current = &mut rest[0];
        let repeats = earlier
            .iter()
            .filter(|prev| {
                prev.symbol_type == current.symbol_type
                    && prev.data == current.data
                    && prev.bounds.overlaps(&current.bounds)
            })
            .count();
        current.count = repeats as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScanError;
    use crate::frame_processor::types::{FrameRegion, SymbolType};

    fn region(x: u32, y: u32, size: u32) -> FrameRegion {
        FrameRegion::from_pixels(x, y, size, size, 100, 100)
    }

    /// Reports a fixed list of symbols for every image
    struct Fixed(Vec<Symbol>);

    impl SymbolDecoder for Fixed {
        fn scan(&mut self, _: &LumaImage) -> ScanResult<Vec<Symbol>> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl SymbolDecoder for Failing {
        fn scan(&mut self, _: &LumaImage) -> ScanResult<Vec<Symbol>> {
            Err(ScanError::Conversion("decoder unavailable".to_string()))
        }
    }

    #[test]
    fn test_overlapping_repeat_is_marked() {
        let mut symbols = vec![
            Symbol::new(SymbolType::QrCode, "same", region(10, 10, 30)),
            Symbol::new(SymbolType::QrCode, "same", region(12, 12, 30)),
        ];
        mark_repeats(&mut symbols);
        assert_eq!(symbols[0].count, 0);
        assert_eq!(symbols[1].count, 1);
        assert!(symbols[1].is_repeat());
    }

    #[test]
    fn test_separate_codes_are_not_repeats() {
        let mut symbols = vec![
            Symbol::new(SymbolType::QrCode, "same", region(0, 0, 20)),
            Symbol::new(SymbolType::QrCode, "same", region(60, 60, 20)),
            Symbol::new(SymbolType::QrCode, "other", region(1, 1, 20)),
        ];
        mark_repeats(&mut symbols);
        assert!(symbols.iter().all(|s| s.count == 0));
    }

    #[test]
    fn test_repeat_count_accumulates() {
        let mut symbols = vec![
            Symbol::new(SymbolType::QrCode, "x", region(10, 10, 30)),
            Symbol::new(SymbolType::QrCode, "x", region(11, 11, 30)),
            Symbol::new(SymbolType::QrCode, "x", region(12, 12, 30)),
        ];
        mark_repeats(&mut symbols);
        assert_eq!(
            symbols.iter().map(|s| s.count).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_chain_marks_symbols_found_twice() {
        let qr = Symbol::new(SymbolType::QrCode, "hello", region(10, 10, 40));
        let ean = Symbol::new(SymbolType::Ean13, "4006381333931", region(0, 80, 90));
        let mut chain = ChainedDecoder::new()
            .with(Fixed(vec![qr.clone()]))
            .with(Fixed(vec![qr, ean]));

        let symbols = chain.scan(&LumaImage::new()).unwrap();
        assert_eq!(
            symbols.iter().map(|s| s.count).collect::<Vec<_>>(),
            vec![0, 1, 0]
        );
        assert_eq!(symbols[2].symbol_type, SymbolType::Ean13);
    }

    #[test]
    fn test_chain_fails_when_any_decoder_fails() {
        let mut chain = ChainedDecoder::new()
            .with(Fixed(vec![Symbol::new(
                SymbolType::QrCode,
                "x",
                FrameRegion::default(),
            )]))
            .with(Failing);
        assert!(chain.scan(&LumaImage::new()).is_err());
    }

    #[test]
    fn test_empty_chain_finds_nothing() {
        assert!(ChainedDecoder::new().scan(&LumaImage::new()).unwrap().is_empty());
    }
}
