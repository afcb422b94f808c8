// SPDX-License-Identifier: GPL-3.0-only

//! Receivers of scan events
//!
//! Listeners are called on the worker thread. Anything slow belongs on the
//! other side of a channel; [`ChannelListener`] does that for async consumers.

use crate::frame_processor::types::{ScanEvent, SymbolType};
use tokio::sync::mpsc;
use tracing::trace;

/// Receives the outcome of each scanned frame
pub trait ScanListener: Send {
    /// One symbol was decoded
    fn decoded(&mut self, symbol_type: SymbolType, text: &str);

    /// A frame was abandoned
    fn notify_error(&mut self, message: &str);
}

impl<F> ScanListener for F
where
    F: FnMut(ScanEvent) + Send,
{
    fn decoded(&mut self, symbol_type: SymbolType, text: &str) {
        self(ScanEvent::Decoded {
            symbol_type,
            text: text.to_string(),
        });
    }

    fn notify_error(&mut self, message: &str) {
        self(ScanEvent::Error {
            message: message.to_string(),
        });
    }
}

/// Forwards events over an unbounded tokio channel
///
/// The receiver can be awaited from async code or drained with
/// `blocking_recv` from a plain thread.
pub struct ChannelListener {
    sender: mpsc::UnboundedSender<ScanEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScanEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ScanEvent) {
        // A dropped receiver just means nobody is interested any more
        if self.sender.send(event).is_err() {
            trace!("Scan event receiver dropped");
        }
    }
}

impl ScanListener for ChannelListener {
    fn decoded(&mut self, symbol_type: SymbolType, text: &str) {
        self.send(ScanEvent::Decoded {
            symbol_type,
            text: text.to_string(),
        });
    }

    fn notify_error(&mut self, message: &str) {
        self.send(ScanEvent::Error {
            message: message.to_string(),
        });
    }
}
