//! Output gain stage with click-free smoothing

/// Single persistent gain applied after synthesis
pub struct GainStage {
    /// Target gain (0.0-1.0)
    target: f32,
    /// Smoothed gain (interpolates toward target to prevent clicks)
    current: f32,
}

impl GainStage {
    /// Default output gain
    pub const DEFAULT_GAIN: f32 = 0.5;
    /// Smoothing coefficient (~5ms at 48kHz)
    const SMOOTH_COEFF: f32 = 0.995;

    pub fn new(gain: f32) -> Self {
        let gain = gain.clamp(0.0, 1.0);
        Self {
            target: gain,
            current: gain,
        }
    }

    /// Set target gain (clamped to 0.0-1.0)
    pub fn set_gain(&mut self, gain: f32) {
        self.target = gain.clamp(0.0, 1.0);
    }

    pub fn gain(&self) -> f32 {
        self.target
    }

    /// Apply gain to one sample, advancing the smoother
    #[inline]
    pub fn apply(&mut self, sample: f32) -> f32 {
        self.current = self.current * Self::SMOOTH_COEFF + self.target * (1.0 - Self::SMOOTH_COEFF);
        sample * self.current
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GAIN)
    }
}
