//! Audio capture, playback and the capture-window handoff

pub mod capture;
pub mod exchange;
pub mod generator;
pub mod playback;

pub use capture::{AudioError, CaptureConfig, CaptureStream};
pub use exchange::{CaptureWindow, FrameExchange, WindowAssembler};
pub use generator::{FunctionGenerator, SignalKind};
pub use playback::PlaybackStream;
