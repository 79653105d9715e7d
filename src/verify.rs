//! Comparison of a computed spectrum against a reference one.

use crate::common::FftError;
use crate::fixed::Sample;
use num_complex::Complex64;

/// Converts a Q1.15 sample to its real value.
#[inline]
pub fn to_complex(sample: Sample) -> Complex64 {
    Complex64::new(sample.re.to_f64(), sample.im.to_f64())
}

/// Absolute error statistics over all bins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ErrorStats {
    pub max: f64,
    pub mean: f64,
    pub rms: f64,
    /// Bin with the largest error.
    pub worst_bin: usize,
}

impl ErrorStats {
    pub fn within(&self, tolerance: f64) -> bool {
        self.max <= tolerance
    }
}

/// Compares `actual` against `reference` bin by bin.
pub fn compare<A, R>(actual: A, reference: R) -> Result<ErrorStats, FftError>
where
    A: ExactSizeIterator<Item = Complex64>,
    R: ExactSizeIterator<Item = Complex64>,
{
    if actual.len() != reference.len() {
        return Err(FftError::SizeMismatch);
    }
    let len = actual.len();
    if len == 0 {
        return Ok(ErrorStats::default());
    }

    let mut stats = ErrorStats::default();
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for (bin, (a, r)) in actual.zip(reference).enumerate() {
        let err = (a - r).norm();
        if err > stats.max {
            stats.max = err;
            stats.worst_bin = bin;
        }
        sum += err;
        sum_sq += err * err;
    }
    stats.mean = sum / len as f64;
    stats.rms = libm::sqrt(sum_sq / len as f64);
    Ok(stats)
}

/// [`compare`] for two fixed-point spectra.
pub fn compare_samples(actual: &[Sample], reference: &[Sample]) -> Result<ErrorStats, FftError> {
    compare(
        actual.iter().copied().map(to_complex),
        reference.iter().copied().map(to_complex),
    )
}
