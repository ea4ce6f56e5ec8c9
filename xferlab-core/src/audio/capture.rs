//! Two-channel audio capture using cpal
//!
//! Opens a multichannel input stream, deinterleaves the configured
//! reference and input channels and feeds them to the window assembler

use super::exchange::WindowAssembler;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio device found")]
    NoDevice,

    #[error("Failed to get device name: {0}")]
    DeviceName(String),

    #[error("Failed to get default config: {0}")]
    DefaultConfig(String),

    #[error("Device has {available} channels, capture needs channels {reference} and {input}")]
    ChannelOutOfRange {
        available: u16,
        reference: usize,
        input: usize,
    },

    #[error("Failed to build stream: {0}")]
    BuildStream(String),

    #[error("Failed to start stream: {0}")]
    PlayStream(String),
}

/// Audio device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Channel routing for the capture stream
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Interleaved channel index carrying the reference signal
    pub reference_channel: usize,

    /// Interleaved channel index carrying the device-under-test signal
    pub input_channel: usize,

    /// Swap the two channel roles without repatching cables
    pub swap_channels: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            reference_channel: 0,
            input_channel: 1,
            swap_channels: false,
        }
    }
}

impl CaptureConfig {
    /// Channel indices in (reference, input) order with the swap applied
    pub fn resolved_channels(&self) -> (usize, usize) {
        if self.swap_channels {
            (self.input_channel, self.reference_channel)
        } else {
            (self.reference_channel, self.input_channel)
        }
    }
}

/// Capture stream feeding the window assembler
pub struct CaptureStream {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl CaptureStream {
    /// Open the default input device
    pub fn from_default_device(
        assembler: WindowAssembler,
        config: CaptureConfig,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, assembler, config)
    }

    /// Open a specific input device
    pub fn from_device(
        device: Device,
        mut assembler: WindowAssembler,
        config: CaptureConfig,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let device_config = device
            .default_input_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let sample_rate = device_config.sample_rate().0;
        let channels = device_config.channels();

        let (reference_channel, input_channel) = config.resolved_channels();
        if reference_channel.max(input_channel) >= channels as usize {
            return Err(AudioError::ChannelOutOfRange {
                available: channels,
                reference: reference_channel,
                input: input_channel,
            });
        }

        let device_info = AudioDeviceInfo {
            name: name.clone(),
            sample_rate,
            channels,
        };

        tracing::info!(
            device = %name,
            sample_rate,
            channels,
            reference_channel,
            input_channel,
            window_len = assembler.window_len(),
            "capture stream opened"
        );

        let stream_config: StreamConfig = device_config.into();
        let frame_channels = channels as usize;

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    for frame in data.chunks_exact(frame_channels) {
                        assembler.push_pair(
                            frame[reference_channel] as f64,
                            frame[input_channel] as f64,
                        );
                    }
                },
                move |err| {
                    tracing::error!("capture stream error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
        })
    }

    /// Start capturing
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause capturing
    pub fn pause(&self) -> Result<(), AudioError> {
        self.stream
            .pause()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Get device information
    pub fn device_info(&self) -> &AudioDeviceInfo {
        &self.device_info
    }
}

/// List input devices with at least two channels
pub fn list_input_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .input_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_input_config() {
                if config.channels() < 2 {
                    continue;
                }
                devices.push(AudioDeviceInfo {
                    name,
                    sample_rate: config.sample_rate().0,
                    channels: config.channels(),
                });
            }
        }
    }

    Ok(devices)
}
