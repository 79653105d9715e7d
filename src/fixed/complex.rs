use super::core::{TwiddleTable, radix_2_dit_stages};
use super::types::Sample;
use crate::common::{FftError, FftProcess, precompute_bitrev};
use alloc::vec;
use alloc::vec::Vec;

/// Sequential fixed-point FFT holding the precomputed tables (Twiddle factors
/// and Bit Reverse).
///
/// Computes exactly what the pipelined core computes, one butterfly at a time,
/// and serves as its bit-accurate reference.
pub struct ReferenceFft {
    twiddles: TwiddleTable,
    bitrev: Vec<usize>,
}

impl ReferenceFft {
    /// Initializes the tables with generated twiddle factors.
    pub fn new(n: usize) -> Result<Self, FftError> {
        Self::with_twiddles(TwiddleTable::generate(n)?)
    }

    /// Initializes with an externally provided twiddle table.
    pub fn with_twiddles(twiddles: TwiddleTable) -> Result<Self, FftError> {
        let n = twiddles.fft_len();
        let mut bitrev = vec![0; n];
        precompute_bitrev(&mut bitrev, n);
        Ok(Self { twiddles, bitrev })
    }

    pub fn len(&self) -> usize {
        self.bitrev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bitrev.is_empty()
    }

    /// Executes the FFT in place: natural-order input, natural-order output.
    pub fn transform(&self, buffer: &mut [Sample]) -> Result<(), FftError> {
        if buffer.len() != self.len() {
            return Err(FftError::SizeMismatch);
        }

        // 1. Bit-reverse permutation
        for i in 1..buffer.len() - 1 {
            let j = self.bitrev[i];
            if i < j {
                buffer.swap(i, j);
            }
        }

        // 2. Butterfly stages
        radix_2_dit_stages(buffer, &self.twiddles);
        Ok(())
    }
}

impl FftProcess<Sample> for ReferenceFft {
    fn process(&mut self, buffer: &mut [Sample]) -> Result<(), FftError> {
        self.transform(buffer)
    }
}

#[cfg(test)]
#[path = "complex_tests.rs"]
mod tests;
