// src/common.rs

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FftError {
    NotPowerOfTwo,
    SizeTooSmall,
    SizeMismatch,
    TableSizeMismatch,
    NotIdle,
    CycleLimit,
}

use core::fmt;

impl fmt::Display for FftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FftError::NotPowerOfTwo => write!(f, "Size must be a power of 2"),
            FftError::SizeTooSmall => write!(f, "Size must be at least 2"),
            FftError::SizeMismatch => write!(f, "Data buffer size does not match FFT size"),
            FftError::TableSizeMismatch => write!(f, "Twiddle table must hold N/2 entries"),
            FftError::NotIdle => write!(f, "Core must be idle to load or start a transform"),
            FftError::CycleLimit => write!(f, "Transform did not complete within the cycle limit"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}

/// Anything that can transform a buffer of samples in place.
pub trait FftProcess<T> {
    fn process(&mut self, buffer: &mut [T]) -> Result<(), FftError>;
}

/// Checks that `n` is a usable radix-2 length.
pub fn validate_size(n: usize) -> Result<(), FftError> {
    if !n.is_power_of_two() {
        return Err(FftError::NotPowerOfTwo);
    }
    if n < 2 {
        return Err(FftError::SizeTooSmall);
    }
    Ok(())
}

/// Fills `bitrev[i]` with `i` reversed over log2(n) bits.
pub fn precompute_bitrev(bitrev: &mut [usize], n: usize) {
    let shift = usize::BITS - n.trailing_zeros();
    for (i, slot) in bitrev.iter_mut().enumerate().take(n) {
        // n = 1 would shift by the full width.
        *slot = i.reverse_bits().checked_shr(shift).unwrap_or(0);
    }
}

pub(crate) fn sin_cos(angle: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    return (angle.sin(), angle.cos());

    #[cfg(not(feature = "std"))]
    return (libm::sin(angle), libm::cos(angle));
}

pub(crate) fn round(value: f64) -> f64 {
    #[cfg(feature = "std")]
    return value.round();

    #[cfg(not(feature = "std"))]
    return libm::round(value);
}
