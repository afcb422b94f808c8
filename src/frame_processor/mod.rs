// SPDX-License-Identifier: MPL-2.0

//! Frame processor module for background barcode scanning
//!
//! Frames are queued from the capture side and scanned one at a time on a
//! dedicated worker thread. Decoded symbols and per-frame failures are
//! delivered to a [`ScanListener`].

pub mod listener;
pub mod tasks;
pub mod types;
pub mod worker;

pub use listener::{ChannelListener, ScanListener};
pub use tasks::{BarcodeDecoder, ChainedDecoder, QrDetector, SymbolDecoder};
pub use types::{DecodedResult, FrameRegion, ScanEvent, Symbol, SymbolType};
pub use worker::{FrameProcessor, FrameScanWorker, ScanHandle, WorkerState};
