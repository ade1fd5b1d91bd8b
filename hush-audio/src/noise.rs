//! Colored noise synthesis
//!
//! Produces one mono sample at a time for the selected color:
//! - White: uniform random samples
//! - Pink: Paul Kellet's refined filter (-3dB/octave)
//! - Brown: leaky integrator of white noise (-6dB/octave)
//! - Purple: first difference of white noise (+6dB/octave)
//!
//! Gain constants are tuned by ear to keep the colors at similar loudness.

use crate::color::NoiseColor;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform random deviates in [0, 1)
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for SmallRng {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Filter registers for the stateful colors
///
/// Only the registers of the color being rendered advance. Nothing is reset
/// on a color change.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterState {
    // Pink: six smoothing accumulators and a one-sample delayed white tap
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub b3: f64,
    pub b4: f64,
    pub b5: f64,
    pub b6: f64,
    // Brown: integrator output
    pub last_out: f64,
    // Purple: previous white sample
    pub last_in: f64,
}

/// Per-sample noise generator
pub struct NoiseEngine<R: RandomSource = SmallRng> {
    state: FilterState,
    rng: R,
}

impl NoiseEngine<SmallRng> {
    /// Create an engine seeded from system entropy
    pub fn new() -> Self {
        Self::with_source(SmallRng::from_entropy())
    }

    /// Create an engine with a reproducible random stream
    pub fn seeded(seed: u64) -> Self {
        Self::with_source(SmallRng::seed_from_u64(seed))
    }
}

impl Default for NoiseEngine<SmallRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandomSource> NoiseEngine<R> {
    pub fn with_source(rng: R) -> Self {
        Self {
            state: FilterState::default(),
            rng,
        }
    }

    /// Current filter registers
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// White noise sample in [-1, 1)
    #[inline]
    fn white(&mut self) -> f64 {
        self.rng.next_unit() * 2.0 - 1.0
    }

    #[inline]
    fn pink(&mut self) -> f64 {
        let white = self.white();
        let s = &mut self.state;

        s.b0 = 0.99886 * s.b0 + white * 0.0555179;
        s.b1 = 0.99332 * s.b1 + white * 0.0750759;
        s.b2 = 0.96900 * s.b2 + white * 0.1538520;
        s.b3 = 0.86650 * s.b3 + white * 0.3104856;
        s.b4 = 0.55000 * s.b4 + white * 0.5329522;
        s.b5 = -0.7616 * s.b5 - white * 0.0168980;

        let pink = (s.b0 + s.b1 + s.b2 + s.b3 + s.b4 + s.b5 + s.b6 + white * 0.5362) * 0.11;

        // Delay tap is read by the next call, so it must be written after the sum
        s.b6 = white * 0.115926;

        pink
    }

    #[inline]
    fn brown(&mut self) -> f64 {
        let white = self.white();
        self.state.last_out = (self.state.last_out + 0.02 * white) / 1.02;
        self.state.last_out * 3.5
    }

    #[inline]
    fn purple(&mut self) -> f64 {
        let white = self.white();
        let out = (white - self.state.last_in) * 0.7;
        self.state.last_in = white;
        out
    }

    /// Generate the next sample for `color`, clamped to [-1, 1]
    ///
    /// `NoiseColor::None` returns 0.0 without touching any state.
    #[inline]
    pub fn next_sample(&mut self, color: NoiseColor) -> f64 {
        let noise = match color {
            NoiseColor::White => self.white(),
            NoiseColor::Pink => self.pink(),
            NoiseColor::Brown => self.brown(),
            NoiseColor::Purple => self.purple(),
            NoiseColor::None => return 0.0,
        };

        noise.clamp(-1.0, 1.0)
    }

    /// Fill a mono buffer with consecutive samples
    #[inline]
    pub fn fill(&mut self, color: NoiseColor, out: &mut [f64]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(color);
        }
    }
}
