//! Dual-bank, dual-port sample memory.
//!
//! Two arenas of N words each. One is the read source of the current stage,
//! the other its write destination; the roles swap once per stage. Each bank
//! has two ports, each doing one read or one write per clock edge. Reads are
//! synchronous: the word lands in the port's read-data register at the edge
//! and is visible during the next cycle. A read and a write of the same word
//! at the same edge return the old word.

use crate::fixed::Sample;
use alloc::vec;
use alloc::vec::Vec;
use tracing::warn;

/// One of the two ping-pong arenas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BankId {
    #[default]
    A,
    B,
}

impl BankId {
    #[inline]
    pub fn other(self) -> Self {
        match self {
            BankId::A => BankId::B,
            BankId::B => BankId::A,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            BankId::A => 0,
            BankId::B => 1,
        }
    }
}

/// One of the two ports of a bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    A,
    B,
}

impl Port {
    pub const ALL: [Port; 2] = [Port::A, Port::B];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
        }
    }
}

/// Signals presented to one port for one clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortRequest {
    pub enable: bool,
    pub write_enable: bool,
    pub addr: usize,
    pub wdata: Sample,
}

impl PortRequest {
    pub fn read(addr: usize) -> Self {
        Self {
            enable: true,
            write_enable: false,
            addr,
            wdata: Sample::ZERO,
        }
    }

    pub fn write(addr: usize, wdata: Sample) -> Self {
        Self {
            enable: true,
            write_enable: true,
            addr,
            wdata,
        }
    }
}

/// Which role wins a port both want in the same cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PortPriority {
    /// The write-back lands; the read-issue is dropped and the port's
    /// read-data register keeps its previous word.
    #[default]
    WriteBack,
    /// The read-issue is served; the write-back is lost.
    ReadIssue,
}

/// The loser of a port contention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dropped {
    Read,
    Write,
}

/// Both roles that may claim a port in one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortSlot {
    /// Read-issue address from the address generator.
    pub read: Option<usize>,
    /// Write-back address and word from the head of the write-back queue.
    pub write: Option<(usize, Sample)>,
}

impl PortSlot {
    /// Resolves the slot to the request actually presented to the port.
    pub fn arbitrate(self, priority: PortPriority) -> (PortRequest, Option<Dropped>) {
        match (self.read, self.write) {
            (None, None) => (PortRequest::default(), None),
            (Some(addr), None) => (PortRequest::read(addr), None),
            (None, Some((addr, data))) => (PortRequest::write(addr, data), None),
            (Some(raddr), Some((waddr, data))) => match priority {
                PortPriority::WriteBack => (PortRequest::write(waddr, data), Some(Dropped::Read)),
                PortPriority::ReadIssue => (PortRequest::read(raddr), Some(Dropped::Write)),
            },
        }
    }
}

/// N complex words behind two ports.
#[derive(Clone, Debug)]
pub struct Bank {
    words: Vec<Sample>,
    read_data: [Sample; 2],
}

impl Bank {
    pub fn new(n: usize) -> Self {
        Self {
            words: vec![Sample::ZERO; n],
            read_data: [Sample::ZERO; 2],
        }
    }

    /// Applies one clock edge. All reads see the contents from before the
    /// edge; writes commit afterwards, port A first.
    pub fn clock(&mut self, requests: &[PortRequest; 2]) {
        let mut latched = self.read_data;
        for port in Port::ALL {
            let req = &requests[port.index()];
            if req.enable && !req.write_enable {
                latched[port.index()] = self.words[req.addr];
            }
        }

        if requests.iter().all(|r| r.enable && r.write_enable) && requests[0].addr == requests[1].addr {
            warn!(addr = requests[0].addr, "both ports write the same word");
        }
        for req in requests {
            if req.enable && req.write_enable {
                self.words[req.addr] = req.wdata;
            }
        }

        self.read_data = latched;
    }

    /// Contents of the read-data register of `port`.
    #[inline]
    pub fn read_data(&self, port: Port) -> Sample {
        self.read_data[port.index()]
    }

    /// Clears the port registers. Stored words are RAM and survive reset.
    pub fn reset(&mut self) {
        self.read_data = [Sample::ZERO; 2];
    }

    pub fn words(&self) -> &[Sample] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Backdoor load, as a memory initialization file would do.
    pub fn load(&mut self, words: &[Sample]) {
        self.words.copy_from_slice(words);
    }
}

/// The two ping-pong arenas.
#[derive(Clone, Debug)]
pub struct DualBank {
    banks: [Bank; 2],
}

impl DualBank {
    pub fn new(n: usize) -> Self {
        Self {
            banks: [Bank::new(n), Bank::new(n)],
        }
    }

    pub fn bank(&self, id: BankId) -> &Bank {
        &self.banks[id.index()]
    }

    pub fn bank_mut(&mut self, id: BankId) -> &mut Bank {
        &mut self.banks[id.index()]
    }

    /// One clock edge on all four ports, indexed `[bank][port]`.
    pub fn clock(&mut self, requests: &[[PortRequest; 2]; 2]) {
        for (bank, reqs) in self.banks.iter_mut().zip(requests) {
            bank.clock(reqs);
        }
    }

    pub fn reset(&mut self) {
        for bank in &mut self.banks {
            bank.reset();
        }
    }
}
