//! Capture-window handoff between the audio callback and the UI thread
//!
//! A mutex-guarded double-buffer swap plus an atomic frame counter. The
//! capture side overwrites the previous window if it was never consumed
//! (drop-oldest, no queueing); the counter still advances by exactly one
//! per completed window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// One completed pair of capture buffers
///
/// Invariant: `reference` and `input` always have equal length.
#[derive(Debug, Clone, Default)]
pub struct CaptureWindow {
    /// Samples from the reference channel
    pub reference: Vec<f64>,

    /// Samples from the input channel
    pub input: Vec<f64>,
}

impl CaptureWindow {
    /// Create an empty window with capacity for `window_len` sample pairs
    pub fn with_capacity(window_len: usize) -> Self {
        Self {
            reference: Vec::with_capacity(window_len),
            input: Vec::with_capacity(window_len),
        }
    }

    /// Number of sample pairs captured so far
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    /// Check whether no pairs have been captured
    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// Remove all pairs, keeping the allocations
    pub fn clear(&mut self) {
        self.reference.clear();
        self.input.clear();
    }
}

struct Shared {
    latest: Mutex<CaptureWindow>,
    frames: AtomicU64,
}

/// Single-producer/single-consumer window handoff
pub struct FrameExchange {
    shared: Arc<Shared>,
}

impl FrameExchange {
    /// Create a new exchange
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                latest: Mutex::new(CaptureWindow::default()),
                frames: AtomicU64::new(0),
            }),
        }
    }

    /// Split into publisher and receiver ends
    pub fn split(self) -> (WindowPublisher, WindowReceiver) {
        (
            WindowPublisher {
                shared: Arc::clone(&self.shared),
            },
            WindowReceiver {
                shared: self.shared,
            },
        )
    }
}

impl Default for FrameExchange {
    fn default() -> Self {
        Self::new()
    }
}

/// Publishing end, owned by the capture side
pub struct WindowPublisher {
    shared: Arc<Shared>,
}

impl WindowPublisher {
    /// Publish a completed window, replacing any unconsumed one
    ///
    /// The window contents are swapped with the shared slot, so the caller
    /// keeps an allocation to refill. The lock is held only for the swap.
    ///
    /// # Returns
    /// The new frame count
    pub fn publish(&self, window: &mut CaptureWindow) -> u64 {
        {
            let mut slot = self.shared.latest.lock().expect("exchange lock poisoned");
            std::mem::swap(&mut *slot, window);
        }
        self.shared.frames.fetch_add(1, Ordering::Release) + 1
    }
}

/// Receiving end, polled from the UI thread
pub struct WindowReceiver {
    shared: Arc<Shared>,
}

impl WindowReceiver {
    /// Read the monotone frame counter
    pub fn frame_count(&self) -> u64 {
        self.shared.frames.load(Ordering::Acquire)
    }

    /// Copy the latest window out
    ///
    /// Reuses the allocations of `out`. Returns the frame count observed
    /// before the copy, so the caller can record which frame it consumed.
    pub fn copy_latest(&self, out: &mut CaptureWindow) -> u64 {
        let count = self.frame_count();
        let slot = self.shared.latest.lock().expect("exchange lock poisoned");
        out.reference.clone_from(&slot.reference);
        out.input.clone_from(&slot.input);
        count
    }
}

/// Accumulates deinterleaved sample pairs into analysis windows
///
/// Fed one (reference, input) pair at a time from the capture callback;
/// publishes through the exchange whenever a window completes.
pub struct WindowAssembler {
    pending: CaptureWindow,
    window_len: usize,
    publisher: WindowPublisher,
}

impl WindowAssembler {
    /// Create an assembler producing windows of `window_len` pairs
    pub fn new(window_len: usize, publisher: WindowPublisher) -> Self {
        Self {
            pending: CaptureWindow::with_capacity(window_len),
            window_len,
            publisher,
        }
    }

    /// Append one sample pair, publishing when the window is complete
    pub fn push_pair(&mut self, reference: f64, input: f64) {
        self.pending.reference.push(reference);
        self.pending.input.push(input);

        if self.pending.len() >= self.window_len {
            self.publisher.publish(&mut self.pending);
            self.pending.clear();
            self.pending.reference.reserve(self.window_len);
            self.pending.input.reserve(self.window_len);
        }
    }

    /// Window length in sample pairs
    pub fn window_len(&self) -> usize {
        self.window_len
    }
}
