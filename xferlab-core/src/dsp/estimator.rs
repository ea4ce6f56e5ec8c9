//! Transfer-function estimator
//!
//! Turns each completed pair of capture windows (reference, input) into
//! magnitude spectra, a transfer-function estimate H = R/I and its
//! time-domain impulse response, with per-bin running averages

use super::averaging::RunningMean;
use super::fft::FftEngine;
use super::windows::{apply_window, WindowKind};
use num_complex::Complex;

/// Legal analysis window lengths, as offered by the analysis-length menu
pub const ANALYSIS_LENGTHS: [usize; 8] = [512, 1024, 2048, 4096, 8192, 16384, 32768, 65536];

/// Upper bound on the averaging depth
pub const MAX_AVERAGE_DEPTH: usize = 64;

/// A denominator bin below this magnitude yields H = 0 for that bin
/// instead of a non-finite quotient
const DENOMINATOR_EPSILON: f64 = 1e-12;

/// Estimator configuration
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    /// Analysis window length in samples, one of [`ANALYSIS_LENGTHS`]
    pub window_len: usize,

    /// Window function applied before the FFT
    pub window_kind: WindowKind,

    /// Sample rate in Hz
    pub sample_rate: f64,

    /// Averaging depth; 0 averages over the whole session,
    /// clamped to [`MAX_AVERAGE_DEPTH`]
    pub average_depth: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            window_len: 4096,
            window_kind: WindowKind::Hamming,
            sample_rate: 48000.0,
            average_depth: 0,
        }
    }
}

impl EstimatorConfig {
    /// Display label for an analysis length, e.g. "4096 (85.3 ms)"
    pub fn window_len_label(&self) -> String {
        let ms = self.window_len as f64 * 1000.0 / self.sample_rate;
        format!("{} ({:.1} ms)", self.window_len, ms)
    }
}

/// Elementwise complex modulus
pub fn magnitude(spectrum: &[Complex<f64>]) -> Vec<f64> {
    spectrum.iter().map(|c| c.norm()).collect()
}

/// Live transfer-function estimator
///
/// Invoked synchronously, at most once per completed capture window. Holds
/// the instantaneous spectra of the latest window plus the running averages
/// accumulated since the last reset.
pub struct SpectralEstimator {
    config: EstimatorConfig,
    fft: FftEngine,

    /// Instantaneous reference spectrum of the latest window
    fft_reference: Vec<Complex<f64>>,

    /// Instantaneous input spectrum of the latest window
    fft_input: Vec<Complex<f64>>,

    /// Instantaneous transfer function of the latest window
    h: Vec<Complex<f64>>,

    /// Impulse response, inverse transform of the averaged transfer function
    impulse: Vec<f64>,

    avg_reference: RunningMean,
    avg_input: RunningMean,
    avg_h: RunningMean,

    /// Scratch copies that receive the window taper
    windowed_reference: Vec<f64>,
    windowed_input: Vec<f64>,
}

impl SpectralEstimator {
    /// Create an estimator for the given configuration
    ///
    /// The averaging depth is clamped to [`MAX_AVERAGE_DEPTH`].
    pub fn new(mut config: EstimatorConfig) -> Self {
        config.average_depth = config.average_depth.min(MAX_AVERAGE_DEPTH);

        let fft = FftEngine::new(config.window_len);
        let bins = fft.num_bins();

        Self {
            fft,
            fft_reference: vec![Complex::new(0.0, 0.0); bins],
            fft_input: vec![Complex::new(0.0, 0.0); bins],
            h: vec![Complex::new(0.0, 0.0); bins],
            impulse: vec![0.0; config.window_len],
            avg_reference: RunningMean::new(bins, config.average_depth),
            avg_input: RunningMean::new(bins, config.average_depth),
            avg_h: RunningMean::new(bins, config.average_depth),
            windowed_reference: vec![0.0; config.window_len],
            windowed_input: vec![0.0; config.window_len],
            config,
        }
    }

    /// Process one completed capture window
    ///
    /// Both buffers must have exactly the configured window length; a
    /// mismatch is a caller bug and panics.
    pub fn process(&mut self, reference: &[f64], input: &[f64]) {
        assert_eq!(
            reference.len(),
            input.len(),
            "reference and input windows must have equal length"
        );
        assert_eq!(
            reference.len(),
            self.config.window_len,
            "capture window length must match the configured analysis length"
        );

        self.windowed_reference.copy_from_slice(reference);
        self.windowed_input.copy_from_slice(input);
        apply_window(&mut self.windowed_reference, self.config.window_kind);
        apply_window(&mut self.windowed_input, self.config.window_kind);

        self.fft_reference = self.fft.forward(&self.windowed_reference);
        self.fft_input = self.fft.forward(&self.windowed_input);

        self.avg_reference.push(&self.fft_reference);
        self.avg_input.push(&self.fft_input);

        // H from the instantaneous spectra of this window; only the
        // averaged H feeds the impulse response below
        for (i, h) in self.h.iter_mut().enumerate() {
            let denominator = self.fft_input[i];
            *h = if denominator.norm_sqr() < DENOMINATOR_EPSILON * DENOMINATOR_EPSILON {
                Complex::new(0.0, 0.0)
            } else {
                self.fft_reference[i] / denominator
            };
        }
        self.avg_h.push(&self.h);

        self.impulse = self.fft.inverse(self.avg_h.mean());
    }

    /// Clear all running averages and their counters
    pub fn reset_averages(&mut self) {
        self.avg_reference.reset();
        self.avg_input.reset();
        self.avg_h.reset();
    }

    /// Apply a new configuration
    ///
    /// A change of the analysis length re-plans the FFT and discards the
    /// running averages (their bin count changes). Window kind and
    /// averaging depth apply from the next window without touching history.
    pub fn update_config(&mut self, mut config: EstimatorConfig) {
        config.average_depth = config.average_depth.min(MAX_AVERAGE_DEPTH);

        if config.window_len != self.config.window_len {
            self.fft = FftEngine::new(config.window_len);
            let bins = self.fft.num_bins();

            self.fft_reference = vec![Complex::new(0.0, 0.0); bins];
            self.fft_input = vec![Complex::new(0.0, 0.0); bins];
            self.h = vec![Complex::new(0.0, 0.0); bins];
            self.impulse = vec![0.0; config.window_len];
            self.avg_reference = RunningMean::new(bins, config.average_depth);
            self.avg_input = RunningMean::new(bins, config.average_depth);
            self.avg_h = RunningMean::new(bins, config.average_depth);
            self.windowed_reference = vec![0.0; config.window_len];
            self.windowed_input = vec![0.0; config.window_len];
        } else {
            self.avg_reference.set_depth(config.average_depth);
            self.avg_input.set_depth(config.average_depth);
            self.avg_h.set_depth(config.average_depth);
        }

        self.config = config;
    }

    /// Get the current configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Instantaneous reference spectrum of the latest window
    pub fn fft_reference(&self) -> &[Complex<f64>] {
        &self.fft_reference
    }

    /// Instantaneous input spectrum of the latest window
    pub fn fft_input(&self) -> &[Complex<f64>] {
        &self.fft_input
    }

    /// Averaged reference spectrum
    pub fn avg_reference(&self) -> &[Complex<f64>] {
        self.avg_reference.mean()
    }

    /// Averaged input spectrum
    pub fn avg_input(&self) -> &[Complex<f64>] {
        self.avg_input.mean()
    }

    /// Instantaneous transfer function of the latest window
    pub fn h(&self) -> &[Complex<f64>] {
        &self.h
    }

    /// Averaged transfer function
    pub fn avg_h(&self) -> &[Complex<f64>] {
        self.avg_h.mean()
    }

    /// Impulse-response estimate
    pub fn impulse(&self) -> &[f64] {
        &self.impulse
    }

    /// Number of windows folded into the averages since the last reset
    pub fn windows_averaged(&self) -> u64 {
        self.avg_h.count()
    }

    /// Number of frequency bins per spectrum
    pub fn num_bins(&self) -> usize {
        self.fft.num_bins()
    }

    /// Frequency axis in Hz, spanning [0, sample_rate/2]
    pub fn frequency_axis_hz(&self) -> Vec<f64> {
        self.fft.frequency_axis_hz(self.config.sample_rate)
    }
}
