// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! Image files stand in for camera frames: each one is loaded, submitted to a
//! scan worker, and every event the worker reports is printed in order.

use framescan::{
    AppResult, BarcodeDecoder, ChainedDecoder, ChannelListener, FrameScanWorker, QrDetector,
    ScanConfig, ScanEvent, VideoFrame,
};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Scan image files for barcodes
pub fn scan_images(
    images: &[PathBuf],
    config_path: Option<&Path>,
    max_dimension: Option<u32>,
    json: bool,
) -> AppResult<()> {
    let mut config = ScanConfig::load_or_default(config_path)?;
    if max_dimension.is_some() {
        config.max_dimension = max_dimension;
    }

    // rqrr handles QR codes, rxing everything else
    let decoder = ChainedDecoder::new()
        .with(QrDetector::new())
        .with(BarcodeDecoder::new().skip_qr_codes());

    let (listener, mut events) = ChannelListener::new();
    let mut worker = FrameScanWorker::spawn(config, decoder, listener)?;

    let mut submitted = 0usize;
    for path in images {
        match load_frame(path) {
            Ok(frame) => {
                worker.submit(frame);
                submitted += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable image");
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    // Drains the queue; the listener is dropped with the worker thread,
    // which closes the channel
    worker.shutdown()?;

    let mut decoded = 0usize;
    let mut failed = 0usize;
    while let Some(event) = events.blocking_recv() {
        match &event {
            ScanEvent::Decoded { .. } => decoded += 1,
            ScanEvent::Error { .. } => failed += 1,
        }
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!(error = %e, "Failed to serialize event"),
            }
        } else {
            match event {
                ScanEvent::Decoded { symbol_type, text } => println!("{}: {}", symbol_type, text),
                ScanEvent::Error { message } => println!("error: {}", message),
            }
        }
    }

    if !json {
        println!();
        println!(
            "Scanned {} of {} images: {} decoded, {} failed",
            submitted,
            images.len(),
            decoded,
            failed
        );
    }

    Ok(())
}

/// Load an image file as an `Argb32` frame
fn load_frame(path: &Path) -> AppResult<VideoFrame> {
    let rgba = image::open(path)?.to_rgba8();
    Ok(VideoFrame::from_rgba(rgba.width(), rgba.height(), rgba.as_raw()))
}
