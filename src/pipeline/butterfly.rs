//! Butterfly unit: a 4-stage pipeline computing A' = A + B*W, B' = A - B*W.
//!
//! Stage 1 registers the operands, stage 2 the raw product B*W next to a
//! delayed A, stage 3 the truncated product next to A, stage 4 the sum and
//! difference. Every register carries a valid bit. On a clock edge with
//! `advance` low nothing moves; on an edge with `advance` high and no input,
//! stage 1 takes a bubble (valid cleared, data held).

use crate::fixed::{Sample, Twiddle, WORKING_FRAC, WideComplex};

/// Edges between an operand set entering stage 1 and its results becoming
/// visible on the outputs. Sizes the write-back queue and the FLUSH drain.
pub const BFU_LATENCY: usize = 4;

/// Operands of one butterfly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BfuInput {
    pub a: Sample,
    pub b: Sample,
    pub w: Twiddle<WORKING_FRAC>,
}

/// Results of one butterfly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BfuOutput {
    /// A + B*W
    pub sum: Sample,
    /// A - B*W
    pub diff: Sample,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Product {
    a: Sample,
    t_raw: WideComplex,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Rotated {
    a: Sample,
    t: Sample,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Reg<T> {
    data: T,
    valid: bool,
}

impl<T: Copy> Reg<T> {
    #[inline]
    fn next(data: T, valid: bool) -> Self {
        Self { data, valid }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bfu {
    s1: Reg<BfuInput>,
    s2: Reg<Product>,
    s3: Reg<Rotated>,
    s4: Reg<BfuOutput>,
}

impl Bfu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage-4 results, if they belong to a real butterfly.
    #[inline]
    pub fn output(&self) -> Option<BfuOutput> {
        self.s4.valid.then_some(self.s4.data)
    }

    /// Stage-4 registers regardless of the valid bit.
    #[inline]
    pub fn output_regs(&self) -> BfuOutput {
        self.s4.data
    }

    /// Number of stages currently holding a real butterfly.
    pub fn occupancy(&self) -> usize {
        [self.s1.valid, self.s2.valid, self.s3.valid, self.s4.valid]
            .iter()
            .filter(|v| **v)
            .count()
    }

    /// One clock edge. Every stage computes from the values the previous
    /// stage held before the edge.
    pub fn clock(&mut self, advance: bool, input: Option<BfuInput>) {
        if !advance {
            return;
        }

        let r3 = self.s3.data;
        let s4 = Reg::next(
            BfuOutput {
                sum: r3.a + r3.t,
                diff: r3.a - r3.t,
            },
            self.s3.valid,
        );

        let p2 = self.s2.data;
        let s3 = Reg::next(
            Rotated {
                a: p2.a,
                t: p2.t_raw.truncate::<WORKING_FRAC>(),
            },
            self.s2.valid,
        );

        let o1 = self.s1.data;
        let s2 = Reg::next(
            Product {
                a: o1.a,
                t_raw: o1.b.mul_raw(o1.w),
            },
            self.s1.valid,
        );

        let s1 = match input {
            Some(operands) => Reg::next(operands, true),
            None => Reg::next(self.s1.data, false),
        };

        self.s1 = s1;
        self.s2 = s2;
        self.s3 = s3;
        self.s4 = s4;
    }

    /// Clears every register.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
