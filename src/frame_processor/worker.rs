// SPDX-License-Identifier: GPL-3.0-only
//! Background scan worker
//!
//! Producers push frames into a FIFO guarded by one mutex; a single worker
//! thread pops them, converts them to luminance, runs the decoder, and
//! reports to the listener. The running flag lives under the same mutex as
//! the queue, so a stop request can never slip between the worker's
//! emptiness check and its wait.

use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult, WorkerError, panic_message};
use crate::frame_processor::listener::ScanListener;
use crate::frame_processor::tasks::SymbolDecoder;
use crate::frame_processor::types::DecodedResult;
use crate::media::conversions::downscale_factor;
use crate::media::{LumaImage, TaggedBuffer, VideoFrame, convert};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

/// Lifecycle of a worker: `Created → Running → Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Accepting frames, no thread yet
    Created,
    /// Thread started, stop not requested
    Running,
    /// Stop requested; terminal
    Stopped,
}

struct QueueState {
    frames: VecDeque<VideoFrame>,
    running: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    wake: Condvar,
    queue_warn_len: usize,
    name: String,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Nothing panics while holding the lock, but never let a poisoned
        // queue take the producer down with it
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn submit(&self, frame: VideoFrame) {
        let pending = {
            let mut state = self.lock();
            state.frames.push_back(frame);
            self.wake.notify_one();
            state.frames.len()
        };

        trace!(name = %self.name, pending, "Frame queued");
        if pending == self.queue_warn_len {
            warn!(
                name = %self.name,
                pending,
                "Scan queue is growing, decoder is slower than the frame source"
            );
        }
    }

    fn stop(&self) {
        let mut state = self.lock();
        if state.running {
            state.running = false;
            debug!(name = %self.name, pending = state.frames.len(), "Stop requested");
        }
        self.wake.notify_all();
    }

    /// Block until a frame is available or the worker is stopped and drained
    fn next_frame(&self) -> Option<VideoFrame> {
        let mut state = self.lock();
        loop {
            if let Some(frame) = state.frames.pop_front() {
                return Some(frame);
            }
            if !state.running {
                return None;
            }
            state = self
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Cloneable producer side of a worker
///
/// Hand one of these to every thread that feeds frames.
#[derive(Clone)]
pub struct ScanHandle {
    shared: Arc<Shared>,
}

impl ScanHandle {
    /// Queue a frame for scanning; never waits for processing
    pub fn submit(&self, frame: VideoFrame) {
        self.shared.submit(frame);
    }

    /// Ask the worker to exit once the queue is drained
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Frames waiting to be scanned
    pub fn pending(&self) -> usize {
        self.shared.lock().frames.len()
    }

    /// Whether stop has been requested
    pub fn is_stopped(&self) -> bool {
        !self.shared.lock().running
    }
}

/// Per-frame pipeline owned by the worker thread
///
/// Holds the decoder, the listener, and the recycled luminance buffer.
pub struct FrameProcessor {
    decoder: Box<dyn SymbolDecoder>,
    listener: Box<dyn ScanListener>,
    luma: LumaImage,
    max_dimension: Option<u32>,
    frames_processed: u64,
}

impl FrameProcessor {
    pub fn new(
        config: &ScanConfig,
        decoder: impl SymbolDecoder + 'static,
        listener: impl ScanListener + 'static,
    ) -> Self {
        Self {
            decoder: Box::new(decoder),
            listener: Box::new(listener),
            luma: LumaImage::new(),
            max_dimension: config.max_dimension,
            frames_processed: 0,
        }
    }

    /// Frames handled so far, failed ones included
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Scan one frame and report the outcome
    ///
    /// Format errors, decoder errors and decoder panics all end up as a single
    /// `notify_error`; nothing escapes to the caller.
    pub fn process(&mut self, frame: VideoFrame) {
        self.frames_processed += 1;
        let latency_ms = frame.captured_at.elapsed().as_millis();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let buffer = convert(&frame)?;
            self.decode(&buffer)
        }))
        .unwrap_or_else(|payload| Err(ScanError::Conversion(panic_message(payload.as_ref()))));

        match outcome {
            Ok(results) => {
                trace!(
                    decoded = results.len(),
                    latency_ms,
                    "Frame scanned"
                );
            }
            Err(e) => {
                warn!(error = %e, "Frame scan failed");
                self.listener.notify_error(&e.to_string());
            }
        }
    }

    /// Decode a tagged buffer, emitting each new symbol as it is accepted
    pub fn decode(&mut self, buffer: &TaggedBuffer<'_>) -> ScanResult<Vec<DecodedResult>> {
        let factor = downscale_factor(buffer.width, buffer.height, self.max_dimension);
        self.luma.fill_from_bgr4(buffer, factor)?;

        let symbols = self.decoder.scan(&self.luma)?;

        let mut results = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if symbol.is_repeat() {
                trace!(count = symbol.count, "Skipping repeated symbol");
                continue;
            }
            debug!(symbol_type = %symbol.symbol_type, text = %symbol.data, "Decoded symbol");
            self.listener.decoded(symbol.symbol_type, &symbol.data);
            results.push(DecodedResult::from(symbol));
        }
        Ok(results)
    }
}

/// Worker loop: wait, pop, process, until stopped and drained
fn run(shared: Arc<Shared>, mut processor: FrameProcessor) {
    debug!(name = %shared.name, "Scan worker thread started");

    while let Some(frame) = shared.next_frame() {
        processor.process(frame);
    }

    info!(
        name = %shared.name,
        frames = processor.frames_processed(),
        "Scan worker thread exiting"
    );
}

/// A frame scan worker and its thread
///
/// # Example
///
/// ```ignore
/// let (listener, mut events) = ChannelListener::new();
/// let mut worker = FrameScanWorker::spawn(ScanConfig::default(), QrDetector::new(), listener)?;
///
/// worker.submit(frame);
/// worker.shutdown()?;
///
/// while let Ok(event) = events.try_recv() {
///     println!("{:?}", event);
/// }
/// ```
pub struct FrameScanWorker {
    shared: Arc<Shared>,
    /// Moved into the thread by `start`
    processor: Option<FrameProcessor>,
    thread_handle: Option<JoinHandle<()>>,
    name: String,
}

impl FrameScanWorker {
    /// Create a worker without starting its thread
    ///
    /// Frames submitted before `start` are kept and scanned once it runs.
    pub fn new(
        config: ScanConfig,
        decoder: impl SymbolDecoder + 'static,
        listener: impl ScanListener + 'static,
    ) -> Self {
        let processor = FrameProcessor::new(&config, decoder, listener);
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                frames: VecDeque::new(),
                running: true,
            }),
            wake: Condvar::new(),
            queue_warn_len: config.queue_warn_len,
            name: config.thread_name.clone(),
        });

        Self {
            shared,
            processor: Some(processor),
            thread_handle: None,
            name: config.thread_name,
        }
    }

    /// Create a worker and start its thread
    pub fn spawn(
        config: ScanConfig,
        decoder: impl SymbolDecoder + 'static,
        listener: impl ScanListener + 'static,
    ) -> Result<Self, WorkerError> {
        let mut worker = Self::new(config, decoder, listener);
        worker.start()?;
        Ok(worker)
    }

    /// Start the worker thread
    ///
    /// On a worker already stopped, the thread only drains the frames queued
    /// so far and exits; the state stays `Stopped`.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        let processor = self.processor.take().ok_or(WorkerError::AlreadyStarted)?;
        let shared = Arc::clone(&self.shared);

        info!(name = %self.name, "Starting scan worker");

        let handle = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run(shared, processor))
            .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Queue a frame for scanning; never waits for processing
    pub fn submit(&self, frame: VideoFrame) {
        self.shared.submit(frame);
    }

    /// Ask the worker to exit once the queue is drained (non-blocking)
    ///
    /// Idempotent. The frame being processed is not interrupted.
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Producer handle for other threads
    pub fn handle(&self) -> ScanHandle {
        ScanHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Frames waiting to be scanned
    pub fn pending(&self) -> usize {
        self.shared.lock().frames.len()
    }

    /// Current lifecycle state; once `Stopped`, always `Stopped`
    pub fn state(&self) -> WorkerState {
        if !self.shared.lock().running {
            WorkerState::Stopped
        } else if self.processor.is_some() {
            WorkerState::Created
        } else {
            WorkerState::Running
        }
    }

    /// Check if the worker thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Wait for the thread to finish without sending stop signal
    pub fn join(&mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for scan worker thread to finish");
            if let Err(payload) = handle.join() {
                let msg = panic_message(payload.as_ref());
                warn!(name = %self.name, error = %msg, "Scan worker thread panicked");
                return Err(WorkerError::Panicked(msg));
            }
            debug!(name = %self.name, "Scan worker thread finished");
        }
        Ok(())
    }

    /// Stop the worker and wait for the queue to drain
    pub fn shutdown(&mut self) -> Result<(), WorkerError> {
        self.stop();
        self.join()
    }
}

impl Drop for FrameScanWorker {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "FrameScanWorker dropped, stopping worker");
            if let Err(e) = self.shutdown() {
                warn!(name = %self.name, error = %e, "Scan worker did not shut down cleanly");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_processor::types::{FrameRegion, ScanEvent, Symbol, SymbolType};
    use crate::media::PixelFormat;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Reports the top-left luminance as the payload
    struct FirstPixelDecoder;

    impl SymbolDecoder for FirstPixelDecoder {
        fn scan(&mut self, image: &LumaImage) -> ScanResult<Vec<Symbol>> {
            Ok(vec![Symbol::new(
                SymbolType::QrCode,
                image.get(0, 0).to_string(),
                FrameRegion::default(),
            )])
        }
    }

    fn gray_frame(value: u8) -> VideoFrame {
        VideoFrame::new(2, 2, 8, PixelFormat::Rgb32, vec![value; 16])
    }

    fn collecting_listener() -> (impl ScanListener, Arc<Mutex<Vec<ScanEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        (move |event: ScanEvent| sink.lock().unwrap().push(event), events)
    }

    #[test]
    fn test_state_transitions() {
        let (listener, _) = collecting_listener();
        let mut worker = FrameScanWorker::new(ScanConfig::default(), FirstPixelDecoder, listener);
        assert_eq!(worker.state(), WorkerState::Created);
        assert!(!worker.is_running());

        worker.start().unwrap();
        assert_eq!(worker.state(), WorkerState::Running);

        worker.shutdown().unwrap();
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert!(!worker.is_running());
    }

    #[test]
    fn test_start_twice() {
        let (listener, _) = collecting_listener();
        let mut worker =
            FrameScanWorker::spawn(ScanConfig::default(), FirstPixelDecoder, listener).unwrap();
        assert_eq!(worker.start(), Err(WorkerError::AlreadyStarted));
    }

    #[test]
    fn test_is_running_until_stopped() {
        let (listener, _) = collecting_listener();
        let worker =
            FrameScanWorker::spawn(ScanConfig::default(), FirstPixelDecoder, listener).unwrap();

        thread::sleep(Duration::from_millis(20));
        assert!(worker.is_running());

        // Drop will stop it
        drop(worker);
    }

    #[test]
    fn test_frames_queued_before_start_are_scanned() {
        let (listener, events) = collecting_listener();
        let mut worker = FrameScanWorker::new(ScanConfig::default(), FirstPixelDecoder, listener);
        worker.submit(gray_frame(1));
        worker.submit(gray_frame(2));
        assert_eq!(worker.pending(), 2);

        worker.start().unwrap();
        worker.shutdown().unwrap();

        assert_eq!(events.lock().unwrap().len(), 2);
        assert_eq!(worker.pending(), 0);
    }

    #[test]
    fn test_processor_catches_decoder_panic() {
        struct Exploding;
        impl SymbolDecoder for Exploding {
            fn scan(&mut self, _: &LumaImage) -> ScanResult<Vec<Symbol>> {
                panic!("decoder blew up");
            }
        }

        let (listener, events) = collecting_listener();
        let mut processor = FrameProcessor::new(&ScanConfig::default(), Exploding, listener);
        processor.process(gray_frame(0));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            ScanEvent::Error { message } => assert!(message.contains("decoder blew up")),
            other => panic!("Expected error event, got {:?}", other),
        }
        assert_eq!(processor.frames_processed(), 1);
    }

    #[test]
    fn test_decode_recycles_luma_buffer() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);

        struct SizeCheck(Arc<AtomicU32>);
        impl SymbolDecoder for SizeCheck {
            fn scan(&mut self, image: &LumaImage) -> ScanResult<Vec<Symbol>> {
                assert_eq!(
                    image.as_bytes().len(),
                    (image.width() * image.height()) as usize
                );
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            }
        }

        let (listener, _) = collecting_listener();
        let mut processor = FrameProcessor::new(&ScanConfig::default(), SizeCheck(seen), listener);
        processor.process(VideoFrame::new(4, 4, 16, PixelFormat::Argb32, vec![0u8; 64]));
        processor.process(gray_frame(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!((processor.luma.width(), processor.luma.height()), (2, 2));
    }

    #[test]
    fn test_decode_applies_max_dimension() {
        struct Dimensions(Arc<Mutex<(u32, u32)>>);
        impl SymbolDecoder for Dimensions {
            fn scan(&mut self, image: &LumaImage) -> ScanResult<Vec<Symbol>> {
                *self.0.lock().unwrap() = (image.width(), image.height());
                Ok(Vec::new())
            }
        }

        let dims = Arc::new(Mutex::new((0, 0)));
        let config = ScanConfig {
            max_dimension: Some(4),
            ..ScanConfig::default()
        };
        let (listener, _) = collecting_listener();
        let mut processor = FrameProcessor::new(&config, Dimensions(Arc::clone(&dims)), listener);
        processor.process(VideoFrame::new(8, 8, 32, PixelFormat::Rgb32, vec![0u8; 256]));
        assert_eq!(*dims.lock().unwrap(), (4, 4));
    }
}
