// SPDX-License-Identifier: MPL-2.0

//! framescan - background barcode scanning for camera frames
//!
//! A producer (usually a camera pipeline) submits frames to a
//! [`FrameScanWorker`]; a dedicated thread converts each one to luminance,
//! runs a barcode decoder over it, and reports decoded payloads or errors to a
//! listener.
//!
//! # Architecture
//!
//! - [`media`]: frame types and pixel conversion
//! - [`frame_processor`]: the worker, decoders and listeners
//! - [`config`]: worker configuration
//! - [`errors`]: error types
//!
//! # Example
//!
//! ```ignore
//! use framescan::{ChannelListener, FrameScanWorker, QrDetector, ScanConfig};
//!
//! let (listener, mut events) = ChannelListener::new();
//! let worker = FrameScanWorker::spawn(ScanConfig::default(), QrDetector::new(), listener)?;
//! let producer = worker.handle();
//! // from the capture thread:
//! producer.submit(frame);
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod frame_processor;
pub mod media;

// Re-export commonly used types
pub use config::ScanConfig;
pub use errors::{AppError, AppResult, FormatError, ScanError, WorkerError};
pub use frame_processor::{
    BarcodeDecoder, ChainedDecoder, ChannelListener, DecodedResult, FrameScanWorker, QrDetector,
    ScanEvent, ScanHandle, ScanListener, SymbolDecoder, SymbolType, WorkerState,
};
pub use media::{FrameData, PixelFormat, VideoFrame};
