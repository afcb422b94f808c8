// SPDX-License-Identifier: MPL-2.0

//! Error types for the frame scanner

use crate::media::PixelFormat;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for per-frame scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Worker lifecycle errors
    Worker(WorkerError),
    /// Configuration errors
    Config(String),
    /// Image loading errors (CLI)
    Image(String),
}

/// Errors that abandon a single frame
///
/// These never stop the worker and never reach the caller; they are reported
/// to the listener as an error event and the next frame is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Frame layout rejected before decoding
    Format(FormatError),
    /// Failure while building the decoder buffer or decoding
    Conversion(String),
}

/// Frame layout errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Pixel format outside the RGB32 family
    UnsupportedPixelFormat(PixelFormat),
    /// Stride is not a whole number of 4-byte pixels
    StrideNotAligned { stride: u32 },
    /// Buffer too short for the geometry derived from stride and height
    BufferTooSmall { required: usize, actual: usize },
}

/// Worker lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// `start` called on a worker that already owns a thread
    AlreadyStarted,
    /// The OS refused to spawn the worker thread
    SpawnFailed(String),
    /// The worker thread panicked outside of frame processing
    Panicked(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Worker(e) => write!(f, "Worker error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Image(msg) => write!(f, "Image error: {}", msg),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Format(e) => write!(f, "{}", e),
            ScanError::Conversion(msg) => write!(f, "Frame conversion failed: {}", msg),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnsupportedPixelFormat(format) => {
                write!(f, "Invalid frame format: {}", format)
            }
            FormatError::StrideNotAligned { stride } => {
                write!(f, "Frame stride {} is not a multiple of 4 bytes", stride)
            }
            FormatError::BufferTooSmall { required, actual } => write!(
                f,
                "Frame buffer too small: {} bytes required, {} available",
                required, actual
            ),
        }
    }
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerError::AlreadyStarted => write!(f, "Worker thread already started"),
            WorkerError::SpawnFailed(msg) => write!(f, "Failed to spawn worker thread: {}", msg),
            WorkerError::Panicked(msg) => write!(f, "Worker thread panicked: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for ScanError {}
impl std::error::Error for FormatError {}
impl std::error::Error for WorkerError {}

// Conversions from sub-errors
impl From<FormatError> for ScanError {
    fn from(err: FormatError) -> Self {
        ScanError::Format(err)
    }
}

impl From<WorkerError> for AppError {
    fn from(err: WorkerError) -> Self {
        AppError::Worker(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(err.to_string())
    }
}

/// Render a panic payload as a message
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
