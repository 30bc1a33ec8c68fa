#[derive(Clone, Debug, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: u32,
    pub max_polyphony: usize,
    pub master_volume: f32,
    pub enable_reverb_and_chorus: bool,
}

impl SynthConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100, // Standard audio sample rate
            max_polyphony: 64,
            master_volume: 0.8,
            enable_reverb_and_chorus: true,
        }
    }
}
