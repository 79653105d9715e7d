// src/fixed/core.rs

use super::types::{Sample, Twiddle};
use crate::common::{FftError, sin_cos, validate_size};
use alloc::vec::Vec;
use core::f64::consts::PI;

/// Fractional bits of the working format (Q1.15).
pub const WORKING_FRAC: u32 = 15;

/// Read-only table of the N/2 rotation factors of a radix-2 FFT.
///
/// Entry `k` holds W_N^k = exp(-2*pi*i*k/N) in Q1.15 with one guard bit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwiddleTable {
    entries: Vec<Twiddle<WORKING_FRAC>>,
    n: usize,
}

impl TwiddleTable {
    /// Computes the rotation factors for an FFT of size N.
    pub fn generate(n: usize) -> Result<Self, FftError> {
        validate_size(n)?;
        let entries = (0..n / 2)
            .map(|k| {
                let angle = -2.0 * PI * (k as f64) / (n as f64);
                let (sin, cos) = sin_cos(angle);
                Twiddle::from_f64(cos, sin)
            })
            .collect();
        Ok(Self { entries, n })
    }

    /// Wraps externally provided factors, e.g. loaded from a ROM file.
    pub fn from_entries(n: usize, entries: Vec<Twiddle<WORKING_FRAC>>) -> Result<Self, FftError> {
        validate_size(n)?;
        if entries.len() != n / 2 {
            return Err(FftError::TableSizeMismatch);
        }
        Ok(Self { entries, n })
    }

    /// Decodes packed ROM words (see [`Twiddle::from_table_word`]).
    pub fn from_words(n: usize, words: &[u32]) -> Result<Self, FftError> {
        let entries = words
            .iter()
            .enumerate()
            .map(|(k, &word)| Twiddle::from_table_word(k, word))
            .collect();
        Self::from_entries(n, entries)
    }

    pub fn to_words(&self) -> Vec<u32> {
        self.entries.iter().map(|w| w.to_word()).collect()
    }

    /// FFT size this table was built for.
    pub fn fft_len(&self) -> usize {
        self.n
    }

    /// Number of stored entries (N/2).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Twiddle<WORKING_FRAC> {
        self.entries[index]
    }

    pub fn entries(&self) -> &[Twiddle<WORKING_FRAC>] {
        &self.entries
    }
}

/// Radix-2 Decimation-in-Time FFT over Q1.15 samples, one butterfly at a time.
///
/// This is the sequential, bit-accurate model of the pipelined core: same
/// primitives (raw product, truncation by arithmetic shift, wrapping add/sub),
/// same stage order and the same scaled twiddle index
/// `position * N / group_size`. `buffer` must already be in bit-reversed order;
/// the result comes out in natural order.
pub(crate) fn radix_2_dit_stages(buffer: &mut [Sample], twiddles: &TwiddleTable) {
    let n = buffer.len();
    let mut stride = 1;

    while stride < n {
        let group_size = stride << 1;
        let twiddle_step = n / group_size;

        for base in (0..n).step_by(group_size) {
            for position in 0..stride {
                let w = twiddles.get(position * twiddle_step);

                let index = base + position;
                let a = buffer[index];
                let b = buffer[index + stride];

                let t = b.mul_raw(w).truncate::<WORKING_FRAC>();

                buffer[index] = a + t;
                buffer[index + stride] = a - t;
            }
        }
        stride <<= 1;
    }
}

#[cfg(test)]
#[path = "core_tests.rs"]
mod tests;
