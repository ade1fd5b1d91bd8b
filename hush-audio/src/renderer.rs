//! Processing node that runs inside the device callback

use crate::color::NoiseColor;
use crate::gain::GainStage;
use crate::noise::{NoiseEngine, RandomSource};
use rand::rngs::SmallRng;
use ringbuf::traits::Producer;
use ringbuf::HeapProd;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

/// Frames rendered per engine pass
pub const RENDER_BLOCK: usize = 4096;

/// Parameters written by the control thread and read by the audio callback
///
/// Single-word fields with relaxed ordering. A change is picked up at the
/// next callback.
#[derive(Debug)]
pub struct SharedParams {
    color: AtomicU8,
    volume: AtomicU32,
    connected: AtomicBool,
}

impl SharedParams {
    pub fn new(color: NoiseColor, volume: f32) -> Self {
        Self {
            color: AtomicU8::new(color.to_u8()),
            volume: AtomicU32::new(volume.clamp(0.0, 1.0).to_bits()),
            connected: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn color(&self) -> NoiseColor {
        NoiseColor::from_u8(self.color.load(Ordering::Relaxed))
    }

    pub fn set_color(&self, color: NoiseColor) {
        self.color.store(color.to_u8(), Ordering::Relaxed);
    }

    #[inline]
    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume.store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(NoiseColor::None, GainStage::DEFAULT_GAIN)
    }
}

/// Owns the noise engine on the audio thread
///
/// All buffers are allocated up front; `render` never allocates.
pub struct NoiseRenderer<R: RandomSource = SmallRng> {
    engine: NoiseEngine<R>,
    gain: GainStage,
    shared: Arc<SharedParams>,
    scratch: Vec<f64>,
    /// Mono output tap for the level meter
    tap: Option<HeapProd<f32>>,
}

impl NoiseRenderer<SmallRng> {
    pub fn new(shared: Arc<SharedParams>) -> Self {
        Self::with_engine(NoiseEngine::new(), shared)
    }
}

impl<R: RandomSource> NoiseRenderer<R> {
    pub fn with_engine(engine: NoiseEngine<R>, shared: Arc<SharedParams>) -> Self {
        let gain = GainStage::new(shared.volume());
        Self {
            engine,
            gain,
            shared,
            scratch: vec![0.0; RENDER_BLOCK],
            tap: None,
        }
    }

    /// Attach a ring buffer producer that receives every rendered sample
    pub fn with_tap(mut self, tap: HeapProd<f32>) -> Self {
        self.tap = Some(tap);
        self
    }

    pub fn engine(&self) -> &NoiseEngine<R> {
        &self.engine
    }

    /// Fill an interleaved output buffer
    ///
    /// The same mono sample is written to every channel of a frame. While the
    /// node is disconnected the engine is not invoked at all.
    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        if !self.shared.is_connected() {
            data.fill(0.0);
            return;
        }

        let color = self.shared.color();
        self.gain.set_gain(self.shared.volume());
        let channels = channels.max(1);

        for block in data.chunks_mut(RENDER_BLOCK * channels) {
            let frames = block.len().div_ceil(channels);
            let mono = &mut self.scratch[..frames];
            self.engine.fill(color, mono);

            for (frame, &sample) in block.chunks_mut(channels).zip(mono.iter()) {
                let out = self.gain.apply(sample as f32);
                frame.fill(out);
                if let Some(tap) = self.tap.as_mut() {
                    // Meter drops samples when the UI falls behind
                    let _ = tap.try_push(out);
                }
            }
        }
    }
}
