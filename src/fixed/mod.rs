pub mod types;
pub mod core;
pub mod complex;

pub use complex::ReferenceFft;
pub use self::core::{TwiddleTable, WORKING_FRAC};
pub use types::{ComplexFixed, Fixed, Q15, Sample, Twiddle, WideComplex};
