use super::fixed::Fixed;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ComplexFixed<const FRAC: u32> {
    pub re: Fixed<FRAC>,
    pub im: Fixed<FRAC>,
}

/// Complex sample in the working Q1.15 format.
pub type Sample = ComplexFixed<15>;

impl<const FRAC: u32> ComplexFixed<FRAC> {
    pub const ZERO: Self = Self {
        re: Fixed::ZERO,
        im: Fixed::ZERO,
    };

    pub const fn new(re: Fixed<FRAC>, im: Fixed<FRAC>) -> Self {
        Self { re, im }
    }

    pub fn from_f64(re: f64, im: f64) -> Self {
        Self::new(Fixed::from_f64(re), Fixed::from_f64(im))
    }

    /// Packs into a 32-bit word: real in the upper half, imaginary in the lower.
    #[inline]
    pub const fn to_word(self) -> u32 {
        ((self.re.to_bits() as u16 as u32) << 16) | (self.im.to_bits() as u16 as u32)
    }

    /// Inverse of [`to_word`](Self::to_word).
    #[inline]
    pub const fn from_word(word: u32) -> Self {
        Self::new(
            Fixed::from_bits((word >> 16) as u16 as i16),
            Fixed::from_bits(word as u16 as i16),
        )
    }

    /// Raw (untruncated) product `self * w`, held in double width.
    #[inline]
    pub fn mul_raw(self, w: Twiddle<FRAC>) -> WideComplex {
        let ar = self.re.to_bits() as i64;
        let ai = self.im.to_bits() as i64;
        let br = w.re as i64;
        let bi = w.im as i64;
        WideComplex {
            re: ar * br - ai * bi,
            im: ar * bi + ai * br,
        }
    }
}

use core::ops::{Add, AddAssign, Sub, SubAssign};

impl<const FRAC: u32> Add for ComplexFixed<FRAC> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        ComplexFixed {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl<const FRAC: u32> AddAssign for ComplexFixed<FRAC> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl<const FRAC: u32> Sub for ComplexFixed<FRAC> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        ComplexFixed {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl<const FRAC: u32> SubAssign for ComplexFixed<FRAC> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.re -= rhs.re;
        self.im -= rhs.im;
    }
}

/// Double-width product of a sample and a twiddle factor, before truncation.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct WideComplex {
    pub re: i64,
    pub im: i64,
}

impl WideComplex {
    /// Arithmetic right shift by FRAC (round toward negative infinity),
    /// then wrap to the 16-bit working width.
    #[inline]
    pub fn truncate<const FRAC: u32>(self) -> ComplexFixed<FRAC> {
        ComplexFixed::new(
            Fixed::from_bits((self.re >> FRAC) as i16),
            Fixed::from_bits((self.im >> FRAC) as i16),
        )
    }
}

/// Rotation factor in Q1.FRAC with one guard bit, so that +1.0 (= 2^FRAC)
/// is exact. Components stay within [-2^FRAC, 2^FRAC].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Twiddle<const FRAC: u32> {
    pub re: i32,
    pub im: i32,
}

impl<const FRAC: u32> Twiddle<FRAC> {
    pub const ONE: Self = Self {
        re: 1 << FRAC,
        im: 0,
    };

    pub const fn new(re: i32, im: i32) -> Self {
        Self { re, im }
    }

    /// Converts with round-to-nearest and no saturation.
    pub fn from_f64(re: f64, im: f64) -> Self {
        let scale = (1u64 << FRAC) as f64;
        Self {
            re: crate::common::round(re * scale) as i32,
            im: crate::common::round(im * scale) as i32,
        }
    }

    /// Packs into a 32-bit word. +1.0 wraps to `0x8000` in its half.
    #[inline]
    pub const fn to_word(self) -> u32 {
        ((self.re as u16 as u32) << 16) | (self.im as u16 as u32)
    }

    /// Unpacks a word with plain 16-bit sign extension of both halves.
    #[inline]
    pub const fn from_word(word: u32) -> Self {
        Self {
            re: (word >> 16) as u16 as i16 as i32,
            im: word as u16 as i16 as i32,
        }
    }

    /// Unpacks the word stored at `index` of a twiddle table.
    ///
    /// Only entry 0 has a real part of +1.0, and no entry has a real part of
    /// -1.0, so a real half of `0x8000` at index 0 decodes as +1.0.
    pub const fn from_table_word(index: usize, word: u32) -> Self {
        let w = Self::from_word(word);
        if index == 0 && (word >> 16) as u16 == 0x8000 {
            Self { re: 1 << FRAC, im: w.im }
        } else {
            w
        }
    }

    pub fn to_f64(self) -> (f64, f64) {
        let scale = (1u64 << FRAC) as f64;
        (self.re as f64 / scale, self.im as f64 / scale)
    }
}
