//! Static configuration of the pipelined core.

use super::butterfly::BFU_LATENCY;
use super::memory::PortPriority;
use crate::common::{FftError, validate_size};

/// Transform size and timing knobs of an [`FftCore`](super::FftCore).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    n: usize,
    flush_cycles: usize,
    priority: PortPriority,
}

impl PipelineConfig {
    /// Validates N and picks the safe defaults: a drain of exactly the BFU
    /// latency between stages, and write-back before read-issue on the ports.
    pub fn new(n: usize) -> Result<Self, FftError> {
        validate_size(n)?;
        Ok(Self {
            n,
            flush_cycles: BFU_LATENCY,
            priority: PortPriority::default(),
        })
    }

    /// Overrides the FLUSH length. Anything below [`BFU_LATENCY`] lets a stage
    /// read words its predecessor has not written yet; 0 removes FLUSH.
    pub fn with_flush_cycles(mut self, flush_cycles: usize) -> Self {
        self.flush_cycles = flush_cycles;
        self
    }

    pub fn with_port_priority(mut self, priority: PortPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// log2(N)
    pub fn stages(&self) -> u32 {
        self.n.trailing_zeros()
    }

    pub fn twiddle_len(&self) -> usize {
        self.n / 2
    }

    pub fn flush_cycles(&self) -> usize {
        self.flush_cycles
    }

    pub fn port_priority(&self) -> PortPriority {
        self.priority
    }

    /// Clock edges from the start edge until DONE is visible.
    pub fn transform_cycles(&self) -> u64 {
        1 + self.stages() as u64 * (self.n / 2 + self.flush_cycles) as u64
    }
}
