//! Address generator and control state machine.
//!
//! INIT waits for start. RUN issues one butterfly per cycle, position first,
//! then group. After the last butterfly of a stage FLUSH waits out the
//! configured drain; then either the next stage begins with the bank roles
//! swapped, or DONE is reached. DONE holds until start is released.

use super::config::PipelineConfig;
use super::memory::BankId;
use tracing::{debug, trace};

/// Shape of one stage of an N-point radix-2 DIT transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageGeometry {
    pub stage: u32,
    /// Distance between the two inputs of a butterfly: 2^stage.
    pub stride: usize,
    pub group_size: usize,
    pub group_count: usize,
    /// N / group_size
    pub twiddle_step: usize,
}

impl StageGeometry {
    pub fn new(n: usize, stage: u32) -> Self {
        let stride = 1 << stage;
        let group_size = stride << 1;
        Self {
            stage,
            stride,
            group_size,
            group_count: n / group_size,
            twiddle_step: n / group_size,
        }
    }

    /// Read addresses of butterfly `(group, position)`.
    #[inline]
    pub fn addresses(&self, group: usize, position: usize) -> (usize, usize) {
        let addr_a = group * self.group_size + position;
        (addr_a, addr_a + self.stride)
    }

    /// Index into the N/2-entry twiddle table: W_N^(position * N / group_size).
    #[inline]
    pub fn twiddle_index(&self, position: usize) -> usize {
        position * self.twiddle_step
    }

    pub fn butterflies(&self) -> usize {
        self.group_count * self.stride
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AguState {
    #[default]
    Init,
    Run,
    Flush,
    Done,
}

/// Registers of the state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AguRegs {
    pub state: AguState,
    pub stage: u32,
    pub group: usize,
    pub position: usize,
    pub flush_count: usize,
    /// Bank read by the current stage.
    pub source: BankId,
}

/// One butterfly handed to the memory and the BFU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Issue {
    pub stage: u32,
    pub addr_a: usize,
    pub addr_b: usize,
    pub twiddle_index: usize,
    pub bank: BankId,
}

/// Moore outputs for one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AguOutput {
    pub busy: bool,
    pub done: bool,
    pub issue: Option<Issue>,
}

impl AguOutput {
    #[inline]
    pub fn input_valid(&self) -> bool {
        self.issue.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Agu {
    n: usize,
    stages: u32,
    flush_cycles: usize,
    regs: AguRegs,
}

impl Agu {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            n: config.n(),
            stages: config.stages(),
            flush_cycles: config.flush_cycles(),
            regs: AguRegs::default(),
        }
    }

    pub fn regs(&self) -> &AguRegs {
        &self.regs
    }

    pub fn state(&self) -> AguState {
        self.regs.state
    }

    pub fn geometry(&self) -> StageGeometry {
        StageGeometry::new(self.n, self.regs.stage)
    }

    /// Transition function: outputs of the current cycle and the registers
    /// after the next edge. Does not modify `self`.
    pub fn step(&self, start: bool) -> (AguRegs, AguOutput) {
        let r = self.regs;
        let mut next = r;
        let mut out = AguOutput {
            busy: matches!(r.state, AguState::Run | AguState::Flush),
            done: r.state == AguState::Done,
            issue: None,
        };

        match r.state {
            AguState::Init => {
                if start {
                    next = AguRegs {
                        state: AguState::Run,
                        ..AguRegs::default()
                    };
                    debug!(n = self.n, stages = self.stages, "transform started");
                }
            }
            AguState::Run => {
                let geo = self.geometry();
                let (addr_a, addr_b) = geo.addresses(r.group, r.position);
                out.issue = Some(Issue {
                    stage: r.stage,
                    addr_a,
                    addr_b,
                    twiddle_index: geo.twiddle_index(r.position),
                    bank: r.source,
                });

                if r.position + 1 < geo.stride {
                    next.position += 1;
                } else if r.group + 1 < geo.group_count {
                    next.position = 0;
                    next.group += 1;
                } else if self.flush_cycles > 0 {
                    next.state = AguState::Flush;
                    next.flush_count = self.flush_cycles;
                } else {
                    self.end_of_stage(&mut next);
                }
            }
            AguState::Flush => {
                next.flush_count = r.flush_count.saturating_sub(1);
                trace!(stage = r.stage, remaining = next.flush_count, "flush");
                if next.flush_count == 0 {
                    self.end_of_stage(&mut next);
                }
            }
            AguState::Done => {
                if !start {
                    next.state = AguState::Init;
                }
            }
        }

        (next, out)
    }

    fn end_of_stage(&self, next: &mut AguRegs) {
        if next.stage + 1 < self.stages {
            next.stage += 1;
            next.group = 0;
            next.position = 0;
            next.source = next.source.other();
            next.state = AguState::Run;
            debug!(stage = next.stage, source = ?next.source, "next stage");
        } else {
            next.state = AguState::Done;
            debug!(stage = next.stage, "last stage finished");
        }
    }

    pub fn commit(&mut self, next: AguRegs) {
        self.regs = next;
    }

    /// `step` followed by `commit`.
    pub fn clock(&mut self, start: bool) -> AguOutput {
        let (next, out) = self.step(start);
        self.commit(next);
        out
    }

    pub fn reset(&mut self) {
        self.regs = AguRegs::default();
    }
}

#[cfg(test)]
#[path = "agu_tests.rs"]
mod tests;
