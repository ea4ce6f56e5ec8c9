//! Session manager: polls capture windows and maintains live and saved
//! measurement state
//!
//! Runs on the UI timeline. Each update polls the frame counter once and,
//! when a new window has completed, runs the estimator synchronously. If
//! several windows completed between polls only the most recent one is
//! analyzed; the others were already overwritten in the exchange.

use super::palette::{Palette, Rgba};
use super::state::MeasurementState;
use crate::audio::exchange::{CaptureWindow, WindowReceiver};
use crate::dsp::estimator::{EstimatorConfig, SpectralEstimator, ANALYSIS_LENGTHS};
use crate::dsp::windows::WindowKind;

/// Owns the analysis side of a capture session
pub struct SessionManager {
    receiver: WindowReceiver,
    estimator: SpectralEstimator,
    live: MeasurementState,
    saved: Vec<MeasurementState>,
    palette: Palette,
    last_frame: u64,
    smoothing: bool,
    snapshot_counter: usize,
    scratch: CaptureWindow,
}

impl SessionManager {
    /// Create a session polling the given receiver
    pub fn new(receiver: WindowReceiver, config: EstimatorConfig) -> Self {
        let mut live = MeasurementState::new("Live", Rgba::WHITE);
        live.active = true;

        Self {
            receiver,
            estimator: SpectralEstimator::new(config),
            live,
            saved: Vec::new(),
            palette: Palette::default(),
            last_frame: 0,
            smoothing: false,
            snapshot_counter: 0,
            scratch: CaptureWindow::default(),
        }
    }

    /// Poll for a completed capture window and analyze it
    ///
    /// Returns true when the live state was refreshed. Never blocks.
    pub fn update(&mut self) -> bool {
        let frames = self.receiver.frame_count();
        if frames <= self.last_frame {
            return false;
        }
        self.last_frame = frames;

        self.receiver.copy_latest(&mut self.scratch);

        // A window published before a window-length change may still be in
        // the exchange; it no longer matches the estimator and is dropped
        if self.scratch.len() != self.estimator.config().window_len {
            tracing::debug!(
                got = self.scratch.len(),
                expected = self.estimator.config().window_len,
                "dropping stale capture window"
            );
            return false;
        }

        self.estimator
            .process(&self.scratch.reference, &self.scratch.input);
        self.live.update_from(&self.estimator);
        true
    }

    /// Save an immutable copy of the live measurement
    ///
    /// # Returns
    /// Index of the new snapshot in [`saved`](Self::saved)
    pub fn capture_snapshot(&mut self) -> usize {
        self.snapshot_counter += 1;

        let mut snapshot = self.live.clone();
        snapshot.name = format!("Snapshot {}", self.snapshot_counter);
        snapshot.color = self.palette.next_color();
        snapshot.active = false;

        self.saved.push(snapshot);
        self.saved.len() - 1
    }

    /// Delete a snapshot; out-of-range indices are ignored
    pub fn delete_snapshot(&mut self, index: usize) {
        if index < self.saved.len() {
            self.saved.remove(index);
        }
    }

    /// Rename a snapshot; out-of-range indices are ignored
    pub fn rename_snapshot(&mut self, index: usize, name: impl Into<String>) {
        if let Some(snapshot) = self.saved.get_mut(index) {
            snapshot.name = name.into();
        }
    }

    /// Get the live measurement
    pub fn live(&self) -> &MeasurementState {
        &self.live
    }

    /// Mutable live measurement, for display toggles
    pub fn live_mut(&mut self) -> &mut MeasurementState {
        &mut self.live
    }

    /// Get the saved snapshots
    pub fn saved(&self) -> &[MeasurementState] {
        &self.saved
    }

    /// Mutable snapshots, for display toggles and renaming
    pub fn saved_mut(&mut self) -> &mut [MeasurementState] {
        &mut self.saved
    }

    /// Enable or disable display smoothing
    pub fn set_smoothing(&mut self, smoothing: bool) {
        self.smoothing = smoothing;
    }

    /// Whether display smoothing is enabled
    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    /// Clear all running averages (the "Reset Avg" action)
    pub fn reset_averages(&mut self) {
        self.estimator.reset_averages();
    }

    /// Select the window function for subsequent windows
    ///
    /// Does not touch accumulated averages.
    pub fn set_window_kind(&mut self, kind: WindowKind) {
        let mut config = self.estimator.config().clone();
        config.window_kind = kind;
        self.estimator.update_config(config);
    }

    /// Set the averaging depth (0 = unbounded)
    ///
    /// Does not touch accumulated averages.
    pub fn set_average_depth(&mut self, depth: usize) {
        let mut config = self.estimator.config().clone();
        config.average_depth = depth;
        self.estimator.update_config(config);
    }

    /// Change the analysis window length
    ///
    /// Only values from [`ANALYSIS_LENGTHS`] are accepted; the change
    /// discards the running averages since the bin count changes. The
    /// capture side has to be restarted with a matching assembler.
    ///
    /// # Returns
    /// true if the length was legal and applied
    pub fn set_window_len(&mut self, window_len: usize) -> bool {
        if !ANALYSIS_LENGTHS.contains(&window_len) {
            return false;
        }

        let mut config = self.estimator.config().clone();
        config.window_len = window_len;
        self.estimator.update_config(config);
        true
    }

    /// Get the estimator configuration
    pub fn config(&self) -> &EstimatorConfig {
        self.estimator.config()
    }

    /// Number of windows folded into the averages since the last reset
    pub fn windows_averaged(&self) -> u64 {
        self.estimator.windows_averaged()
    }

    /// Frequency axis in Hz, spanning [0, sample_rate/2]
    pub fn frequency_axis_hz(&self) -> Vec<f64> {
        self.estimator.frequency_axis_hz()
    }
}
