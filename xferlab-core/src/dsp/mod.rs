//! Spectral estimation: windowing, FFT, averaging, transfer function

pub mod averaging;
pub mod estimator;
pub mod fft;
pub mod windows;

pub use averaging::{smooth_bins, RunningMean};
pub use estimator::{magnitude, EstimatorConfig, SpectralEstimator};
pub use fft::FftEngine;
pub use windows::{apply_window, WindowKind};
