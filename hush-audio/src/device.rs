//! Output device lifecycle
//!
//! The controller only talks to the [`AudioBackend`] and [`OutputDevice`]
//! traits. [`CpalBackend`] is the real implementation on top of the default
//! cpal host.

use crate::error::AudioError;
use crate::renderer::{NoiseRenderer, SharedParams};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::HeapProd;
use std::sync::Arc;

/// Running state of the output device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Running,
    Suspended,
    Closed,
}

impl DeviceStatus {
    pub fn label(self) -> &'static str {
        match self {
            DeviceStatus::Running => "running",
            DeviceStatus::Suspended => "suspended",
            DeviceStatus::Closed => "closed",
        }
    }
}

/// An opened audio output with one processing node slot
pub trait OutputDevice {
    fn status(&self) -> DeviceStatus;

    /// Start (or restart) the hardware stream
    fn resume(&mut self) -> Result<(), AudioError>;

    /// Attach the noise node to the output
    fn connect_node(&mut self);

    /// Detach the noise node; the output renders silence
    fn disconnect_node(&mut self);

    /// Release the device. Further resumes fail.
    fn close(&mut self);
}

/// Creates output devices on demand
pub trait AudioBackend {
    type Device: OutputDevice;

    fn open(&mut self, shared: Arc<SharedParams>) -> Result<Self::Device, AudioError>;
}

/// Default host output via cpal
pub struct CpalBackend {
    /// Requested hardware buffer size in frames (None = host default)
    buffer_frames: Option<u32>,
    /// Level meter tap handed to the first stream
    tap: Option<HeapProd<f32>>,
}

impl CpalBackend {
    pub fn new(buffer_frames: Option<u32>) -> Self {
        Self {
            buffer_frames,
            tap: None,
        }
    }

    pub fn with_tap(mut self, tap: HeapProd<f32>) -> Self {
        self.tap = Some(tap);
        self
    }

    fn buffer_size(&self, supported: &cpal::SupportedBufferSize) -> cpal::BufferSize {
        match (self.buffer_frames, supported) {
            (Some(frames), cpal::SupportedBufferSize::Range { min, max }) => {
                cpal::BufferSize::Fixed(frames.clamp(*min, *max))
            }
            _ => cpal::BufferSize::Default,
        }
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AudioBackend for CpalBackend {
    type Device = CpalDevice;

    fn open(&mut self, shared: Arc<SharedParams>) -> Result<CpalDevice, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device.default_output_config()?;

        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?}",
                supported.sample_format()
            )));
        }

        let channels = supported.channels() as usize;
        let mut config: cpal::StreamConfig = supported.config();
        config.buffer_size = self.buffer_size(supported.buffer_size());

        let mut renderer = NoiseRenderer::new(shared.clone());
        if let Some(tap) = self.tap.take() {
            renderer = renderer.with_tap(tap);
        }

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                renderer.render(data, channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        // Some hosts start streams on creation; hold it until the first resume
        if let Err(e) = stream.pause() {
            tracing::debug!("Stream could not be paused after creation: {}", e);
        }

        tracing::info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels,
            buffer = ?config.buffer_size,
            "Audio output created"
        );

        Ok(CpalDevice {
            stream: Some(stream),
            shared,
            status: DeviceStatus::Suspended,
        })
    }
}

/// A live cpal output stream
pub struct CpalDevice {
    stream: Option<cpal::Stream>,
    shared: Arc<SharedParams>,
    status: DeviceStatus,
}

impl OutputDevice for CpalDevice {
    fn status(&self) -> DeviceStatus {
        self.status
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        let stream = self.stream.as_ref().ok_or(AudioError::Closed)?;
        stream.play()?;
        self.status = DeviceStatus::Running;
        Ok(())
    }

    fn connect_node(&mut self) {
        self.shared.set_connected(true);
    }

    fn disconnect_node(&mut self) {
        self.shared.set_connected(false);
    }

    fn close(&mut self) {
        self.shared.set_connected(false);
        // Dropping the stream stops the callback
        self.stream = None;
        self.status = DeviceStatus::Closed;
    }
}
