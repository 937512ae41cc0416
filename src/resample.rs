//! Incremental sample-rate conversion to the canonical 16kHz mono format.
//!
//! Wraps a rubato FFT resampler behind a carry buffer so that callers can
//! feed arbitrary-length sample runs while the resampler itself always sees
//! fixed-size blocks. Sample continuity is preserved across calls.

use crate::constants::{RESAMPLER_BLOCK_SIZE, TARGET_SAMPLE_RATE};
use rubato::{FftFixedIn, ResampleError, Resampler, ResamplerConstructionError};

pub struct StreamResampler {
    inner: FftFixedIn<f64>,
    input_rate: u32,
    /// Input samples (normalized) waiting for a full block.
    carry: Vec<f64>,
}

impl StreamResampler {
    /// Create a mono resampler from `input_rate` to 16kHz.
    pub fn new(input_rate: u32) -> Result<Self, ResamplerConstructionError> {
        let inner = FftFixedIn::<f64>::new(
            input_rate as usize,
            TARGET_SAMPLE_RATE as usize,
            RESAMPLER_BLOCK_SIZE,
            2, // sub-chunks
            1, // mono
        )?;

        Ok(Self {
            inner,
            input_rate,
            carry: Vec::new(),
        })
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Number of input samples held back waiting for a full block.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Feed `samples` and return whatever resampled output is available.
    ///
    /// May return an empty vector when not enough input has accumulated yet.
    pub fn process(&mut self, samples: &[i16]) -> Result<Vec<i16>, ResampleError> {
        self.carry
            .extend(samples.iter().map(|&s| s as f64 / 32768.0));

        let mut output = Vec::new();

        while self.carry.len() >= RESAMPLER_BLOCK_SIZE {
            let block: Vec<f64> = self.carry.drain(..RESAMPLER_BLOCK_SIZE).collect();
            let resampled = self.inner.process(&[block], None)?;

            for &sample in &resampled[0] {
                let s = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                output.push(s);
            }
        }

        Ok(output)
    }
}
