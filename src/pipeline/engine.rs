//! Clocked top level: address generator, dual-bank memory, twiddle ROM,
//! butterfly unit and write-back queue advancing in lock-step.
//!
//! Each [`FftCore::tick`] is one clock edge in two phases. First every
//! combinational value is derived from the registers as they stood before the
//! edge: the AGU outputs and next state, the BFU's stage-4 results and the
//! write-back queue head that says where they go. Then every register
//! commits. The source bank's read-data registers, loaded at the issue edge
//! together with the twiddle ROM output, are the BFU's stage-1 operands.

use super::agu::{Agu, AguOutput, AguState};
use super::butterfly::{BFU_LATENCY, Bfu, BfuInput, BfuOutput};
use super::config::PipelineConfig;
use super::delay::{InFlight, WriteBackQueue};
use super::memory::{BankId, DualBank, Dropped, Port, PortRequest, PortSlot};
use crate::common::{FftError, FftProcess, precompute_bitrev};
use crate::fixed::{Sample, TwiddleTable};
use alloc::vec;
use alloc::vec::Vec;
use core::num::NonZero;
use tracing::{info, trace, warn};

/// Control inputs sampled at a clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlInputs {
    /// Synchronous reset; wins over everything else.
    pub reset: bool,
    pub start: bool,
}

impl ControlInputs {
    pub fn start(start: bool) -> Self {
        Self { reset: false, start }
    }

    pub fn reset() -> Self {
        Self {
            reset: true,
            start: false,
        }
    }
}

/// Status outputs during the cycle that just ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreStatus {
    /// State after the edge.
    pub state: AguState,
    pub busy: bool,
    pub done: bool,
}

/// Counters accumulated since the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub cycles: u64,
    pub butterflies: u64,
    pub words_written: u64,
    pub reads_dropped: u64,
    pub writes_dropped: u64,
}

pub struct FftCore {
    config: PipelineConfig,
    agu: Agu,
    memory: DualBank,
    twiddles: TwiddleTable,
    bfu: Bfu,
    queue: WriteBackQueue,
    bitrev: Vec<usize>,
    stats: RunStats,
}

impl FftCore {
    /// Builds a core with generated twiddle factors.
    pub fn new(config: PipelineConfig) -> Result<Self, FftError> {
        Self::with_twiddles(config, TwiddleTable::generate(config.n())?)
    }

    /// Builds a core around an externally provided twiddle ROM.
    pub fn with_twiddles(config: PipelineConfig, twiddles: TwiddleTable) -> Result<Self, FftError> {
        let n = config.n();
        if twiddles.fft_len() != n || twiddles.len() != config.twiddle_len() {
            return Err(FftError::TableSizeMismatch);
        }

        let mut bitrev = vec![0; n];
        precompute_bitrev(&mut bitrev, n);

        Ok(Self {
            config,
            agu: Agu::new(&config),
            memory: DualBank::new(n),
            twiddles,
            bfu: Bfu::new(),
            queue: WriteBackQueue::new(const { NonZero::new(BFU_LATENCY).unwrap() }),
            bitrev,
            stats: RunStats::default(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> AguState {
        self.agu.state()
    }

    pub fn is_idle(&self) -> bool {
        self.agu.state() == AguState::Init
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn memory(&self) -> &DualBank {
        &self.memory
    }

    /// Butterflies issued but not yet written back.
    pub fn in_flight(&self) -> usize {
        self.queue.in_flight()
    }

    /// Bank holding the result once DONE is reached; the bank opposite the
    /// last stage's read source.
    pub fn output_bank(&self) -> BankId {
        self.agu.regs().source.other()
    }

    /// Writes natural-order samples into bank A at bit-reversed addresses.
    pub fn load_input(&mut self, samples: &[Sample]) -> Result<(), FftError> {
        self.check_loadable(samples.len())?;
        let reordered: Vec<Sample> = self.bitrev.iter().map(|&j| samples[j]).collect();
        self.memory.bank_mut(BankId::A).load(&reordered);
        Ok(())
    }

    /// Writes words as they are, e.g. an initialization file already in
    /// bit-reversed order.
    pub fn load_bank(&mut self, bank: BankId, words: &[Sample]) -> Result<(), FftError> {
        self.check_loadable(words.len())?;
        self.memory.bank_mut(bank).load(words);
        Ok(())
    }

    fn check_loadable(&self, len: usize) -> Result<(), FftError> {
        if len != self.config.n() {
            return Err(FftError::SizeMismatch);
        }
        if !self.is_idle() {
            return Err(FftError::NotIdle);
        }
        Ok(())
    }

    /// Natural-order spectrum, valid once DONE has been reached.
    pub fn output(&self) -> &[Sample] {
        self.memory.bank(self.output_bank()).words()
    }

    /// Synchronous reset of every register. Bank contents are RAM and stay.
    pub fn reset(&mut self) {
        self.agu.reset();
        self.memory.reset();
        self.bfu.reset();
        self.queue.reset();
        self.stats = RunStats::default();
    }

    /// One clock edge.
    pub fn tick(&mut self, inputs: ControlInputs) -> CoreStatus {
        if inputs.reset {
            self.reset();
            return CoreStatus::default();
        }

        // Phase 1: combinational values from the current registers.
        let (agu_next, agu_out) = self.agu.step(inputs.start);
        let advance = agu_out.busy;
        let write_back = if advance { self.queue.oldest() } else { None };
        let results = self.bfu.output();
        debug_assert_eq!(
            write_back.is_some(),
            advance && results.is_some(),
            "write-back queue out of step with the BFU"
        );

        let requests = self.port_requests(&agu_out, write_back, results);

        // Phase 2: commit.
        self.memory.clock(&requests);

        let operands = agu_out.issue.map(|issue| {
            let bank = self.memory.bank(issue.bank);
            BfuInput {
                a: bank.read_data(Port::A),
                b: bank.read_data(Port::B),
                w: self.twiddles.get(issue.twiddle_index),
            }
        });
        self.bfu.clock(advance, operands);
        self.queue.clock(
            advance,
            agu_out.issue.map(|issue| InFlight {
                addr_a: issue.addr_a,
                addr_b: issue.addr_b,
                source: issue.bank,
            }),
        );
        self.agu.commit(agu_next);

        self.stats.cycles += 1;
        if agu_out.issue.is_some() {
            self.stats.butterflies += 1;
        }
        if agu_next.state == AguState::Done && !agu_out.done {
            info!(cycles = self.stats.cycles, bank = ?self.output_bank(), "transform done");
        }

        CoreStatus {
            state: self.agu.state(),
            busy: agu_out.busy,
            done: agu_out.done,
        }
    }

    /// Routes the read-issue and the write-back onto the four ports.
    fn port_requests(
        &mut self,
        agu_out: &AguOutput,
        write_back: Option<InFlight>,
        results: Option<BfuOutput>,
    ) -> [[PortRequest; 2]; 2] {
        let mut slots = [[PortSlot::default(); 2]; 2];

        if let (Some(entry), Some(out)) = (write_back, results) {
            let dst = entry.destination().index();
            slots[dst][Port::A.index()].write = Some((entry.addr_a, out.sum));
            slots[dst][Port::B.index()].write = Some((entry.addr_b, out.diff));
        }
        if let Some(issue) = agu_out.issue {
            let src = issue.bank.index();
            slots[src][Port::A.index()].read = Some(issue.addr_a);
            slots[src][Port::B.index()].read = Some(issue.addr_b);
        }

        let priority = self.config.port_priority();
        let mut requests = [[PortRequest::default(); 2]; 2];
        for (bank, bank_slots) in slots.iter().enumerate() {
            for (port, slot) in bank_slots.iter().enumerate() {
                let (request, dropped) = slot.arbitrate(priority);
                match dropped {
                    Some(Dropped::Read) => {
                        warn!(cycle = self.stats.cycles, bank, port, "port contention, read dropped");
                        self.stats.reads_dropped += 1;
                    }
                    Some(Dropped::Write) => {
                        warn!(cycle = self.stats.cycles, bank, port, "port contention, write dropped");
                        self.stats.writes_dropped += 1;
                    }
                    None => {}
                }
                if request.enable && request.write_enable {
                    trace!(bank, port, addr = request.addr, "write-back");
                    self.stats.words_written += 1;
                }
                requests[bank][port] = request;
            }
        }
        requests
    }

    /// Pulses start and clocks until DONE, then releases start.
    ///
    /// `max_cycles` bounds the wait; the expected count is
    /// [`PipelineConfig::transform_cycles`].
    pub fn run(&mut self, max_cycles: u64) -> Result<RunStats, FftError> {
        if !self.is_idle() {
            return Err(FftError::NotIdle);
        }
        let before = self.stats;

        let mut cycles = 0;
        while !self.tick(ControlInputs::start(true)).done {
            cycles += 1;
            if cycles > max_cycles {
                return Err(FftError::CycleLimit);
            }
        }
        self.tick(ControlInputs::start(false));

        let after = self.stats;
        Ok(RunStats {
            cycles,
            butterflies: after.butterflies - before.butterflies,
            words_written: after.words_written - before.words_written,
            reads_dropped: after.reads_dropped - before.reads_dropped,
            writes_dropped: after.writes_dropped - before.writes_dropped,
        })
    }
}

impl FftProcess<Sample> for FftCore {
    /// Loads `buffer`, runs the transform and copies the spectrum back.
    fn process(&mut self, buffer: &mut [Sample]) -> Result<(), FftError> {
        self.load_input(buffer)?;
        self.run(2 * self.config.transform_cycles())?;
        buffer.copy_from_slice(self.output());
        Ok(())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
