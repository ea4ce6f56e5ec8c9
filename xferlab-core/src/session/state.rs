//! Measurement state: the live analysis result and saved snapshots

use super::palette::Rgba;
use crate::dsp::averaging::smooth_bins;
use crate::dsp::estimator::{magnitude, SpectralEstimator};
use num_complex::Complex;

/// Bin width of the display-smoothing moving average
const SMOOTHING_BINS: usize = 7;

/// One measurement: spectra, transfer function, impulse response and
/// display attributes
///
/// The live measurement is refreshed once per capture window; a snapshot is
/// a clone that never changes again except for its display attributes
/// (name, visibility, active flag).
#[derive(Debug, Clone)]
pub struct MeasurementState {
    /// Display name, user-editable
    pub name: String,

    /// Trace color
    pub color: Rgba,

    /// Whether the trace is drawn
    pub visible: bool,

    /// Whether the trace is highlighted
    pub active: bool,

    /// Sample rate the measurement was taken at, in Hz
    pub sample_rate: f64,

    /// Analysis window length in samples
    pub window_len: usize,

    /// Instantaneous reference spectrum
    pub fft_reference: Vec<Complex<f64>>,

    /// Instantaneous input spectrum
    pub fft_input: Vec<Complex<f64>>,

    /// Averaged reference spectrum
    pub avg_fft_reference: Vec<Complex<f64>>,

    /// Averaged input spectrum
    pub avg_fft_input: Vec<Complex<f64>>,

    /// Instantaneous transfer function
    pub h: Vec<Complex<f64>>,

    /// Averaged transfer function
    pub avg_h: Vec<Complex<f64>>,

    /// Impulse response, from the averaged transfer function
    pub impulse: Vec<f64>,
}

impl MeasurementState {
    /// Create an empty measurement
    pub fn new(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
            visible: true,
            active: false,
            sample_rate: 0.0,
            window_len: 0,
            fft_reference: Vec::new(),
            fft_input: Vec::new(),
            avg_fft_reference: Vec::new(),
            avg_fft_input: Vec::new(),
            h: Vec::new(),
            avg_h: Vec::new(),
            impulse: Vec::new(),
        }
    }

    /// Refresh from the estimator's latest window
    ///
    /// Reuses the existing allocations.
    pub fn update_from(&mut self, estimator: &SpectralEstimator) {
        self.sample_rate = estimator.config().sample_rate;
        self.window_len = estimator.config().window_len;

        self.fft_reference.clear();
        self.fft_reference.extend_from_slice(estimator.fft_reference());
        self.fft_input.clear();
        self.fft_input.extend_from_slice(estimator.fft_input());
        self.avg_fft_reference.clear();
        self.avg_fft_reference.extend_from_slice(estimator.avg_reference());
        self.avg_fft_input.clear();
        self.avg_fft_input.extend_from_slice(estimator.avg_input());
        self.h.clear();
        self.h.extend_from_slice(estimator.h());
        self.avg_h.clear();
        self.avg_h.extend_from_slice(estimator.avg_h());
        self.impulse.clear();
        self.impulse.extend_from_slice(estimator.impulse());
    }

    /// Instantaneous transfer-function magnitude
    pub fn h_magnitude(&self) -> Vec<f64> {
        magnitude(&self.h)
    }

    /// Averaged transfer-function magnitude
    pub fn avg_h_magnitude(&self) -> Vec<f64> {
        magnitude(&self.avg_h)
    }

    /// Instantaneous reference-spectrum magnitude
    pub fn reference_magnitude(&self) -> Vec<f64> {
        magnitude(&self.fft_reference)
    }

    /// Instantaneous input-spectrum magnitude
    pub fn input_magnitude(&self) -> Vec<f64> {
        magnitude(&self.fft_input)
    }

    /// Averaged reference-spectrum magnitude
    pub fn avg_reference_magnitude(&self) -> Vec<f64> {
        magnitude(&self.avg_fft_reference)
    }

    /// Averaged input-spectrum magnitude
    pub fn avg_input_magnitude(&self) -> Vec<f64> {
        magnitude(&self.avg_fft_input)
    }

    /// Magnitude trace for display: the averaged transfer function,
    /// optionally smoothed across bins
    pub fn display_magnitude(&self, smoothing: bool) -> Vec<f64> {
        let mag = self.avg_h_magnitude();
        if smoothing {
            smooth_bins(&mag, SMOOTHING_BINS)
        } else {
            mag
        }
    }

    /// Frequency axis in Hz, spanning [0, sample_rate/2]
    pub fn frequency_axis_hz(&self) -> Vec<f64> {
        let len = self.window_len.max(1) as f64;
        (0..self.h.len())
            .map(|bin| bin as f64 * self.sample_rate / len)
            .collect()
    }
}
