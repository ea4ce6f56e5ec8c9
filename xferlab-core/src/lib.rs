//! xferlab - Live Transfer-Function Analyzer Core
//!
//! Captures a two-channel audio stream (reference + input), estimates the
//! frequency-domain transfer function between the channels and maintains
//! live and saved magnitude data for a rendering front end.

pub mod audio;
pub mod dsp;
pub mod session;

pub use audio::{CaptureConfig, CaptureStream, FrameExchange, FunctionGenerator, SignalKind};
pub use dsp::{EstimatorConfig, SpectralEstimator, WindowKind};
pub use session::{MeasurementState, SessionManager};
