mod fixed;
mod fixed_complex;

pub use fixed::{Fixed, Q15};
pub use fixed_complex::{ComplexFixed, Sample, Twiddle, WideComplex};
