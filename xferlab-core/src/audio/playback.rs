//! Audio playback of the measurement signal using cpal
//!
//! Pulls mono samples from the shared function generator and duplicates
//! them across the output channels

use super::capture::{AudioDeviceInfo, AudioError};
use super::generator::FunctionGenerator;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

/// Playback stream driven by a function generator
pub struct PlaybackStream {
    stream: Stream,
    device_info: AudioDeviceInfo,
}

impl PlaybackStream {
    /// Open the default output device
    pub fn from_default_device(
        generator: Arc<Mutex<FunctionGenerator>>,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        Self::from_device(device, generator)
    }

    /// Open a specific output device
    pub fn from_device(
        device: Device,
        generator: Arc<Mutex<FunctionGenerator>>,
    ) -> Result<Self, AudioError> {
        let name = device
            .name()
            .map_err(|e| AudioError::DeviceName(e.to_string()))?;

        let device_config = device
            .default_output_config()
            .map_err(|e| AudioError::DefaultConfig(e.to_string()))?;

        let sample_rate = device_config.sample_rate().0;
        let channels = device_config.channels();

        let device_info = AudioDeviceInfo {
            name: name.clone(),
            sample_rate,
            channels,
        };

        // Keep the generator's phase accumulators on the device rate
        if let Ok(mut g) = generator.lock() {
            g.set_sample_rate(sample_rate as f64);
        }

        tracing::info!(
            device = %name,
            sample_rate,
            channels,
            "playback stream opened"
        );

        let stream_config: StreamConfig = device_config.into();
        let frame_channels = channels as usize;

        let generator = Arc::clone(&generator);
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if let Ok(mut g) = generator.lock() {
                        for frame in data.chunks_exact_mut(frame_channels) {
                            let s = g.next_sample() as f32;
                            frame.fill(s);
                        }
                    } else {
                        data.fill(0.0);
                    }
                },
                move |err| {
                    tracing::error!("playback stream error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::BuildStream(e.to_string()))?;

        Ok(Self {
            stream,
            device_info,
        })
    }

    /// Start playback
    pub fn start(&self) -> Result<(), AudioError> {
        self.stream
            .play()
            .map_err(|e| AudioError::PlayStream(e.to_string()))
    }

    /// Pause playback
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

/// List output devices with at least two channels
pub fn list_output_devices() -> Result<Vec<AudioDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    let device_iter = host
        .output_devices()
        .map_err(|e| AudioError::DeviceName(e.to_string()))?;

    for device in device_iter {
        if let Ok(name) = device.name() {
            if let Ok(config) = device.default_output_config() {
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
