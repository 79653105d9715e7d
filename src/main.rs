use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use pingpong_fft::memfile;
use pingpong_fft::pipeline::{BFU_LATENCY, BankId};
use pingpong_fft::verify::{self, to_complex};
use pingpong_fft::{FftCore, PipelineConfig, PortPriority, TwiddleTable};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Priority {
    /// Write-back wins, the colliding read is dropped
    WriteBack,
    /// Read-issue wins, the colliding write is dropped
    ReadIssue,
}

impl From<Priority> for PortPriority {
    fn from(p: Priority) -> Self {
        match p {
            Priority::WriteBack => PortPriority::WriteBack,
            Priority::ReadIssue => PortPriority::ReadIssue,
        }
    }
}

/// Cycle-level simulation of a ping-pong radix-2 FFT core.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Input samples, one packed Q1.15 word per line
    #[clap(long)]
    input: PathBuf,
    /// Where to write the spectrum
    #[clap(long)]
    output: PathBuf,
    /// Transform size
    #[clap(long, short = 'n', default_value_t = 1024)]
    size: usize,
    /// Twiddle ROM file with N/2 entries; generated when omitted
    #[clap(long)]
    twiddles: Option<PathBuf>,
    /// Idle cycles between stages
    #[clap(long, default_value_t = BFU_LATENCY)]
    flush_cycles: usize,
    /// Port arbitration when a read-issue meets a write-back
    #[clap(long, value_enum, default_value_t = Priority::WriteBack)]
    priority: Priority,
    /// Input file is already in bit-reversed order
    #[clap(long)]
    pre_reversed: bool,
    /// Expected spectrum to compare against
    #[clap(long)]
    reference: Option<PathBuf>,
    /// Largest acceptable absolute error per bin
    #[clap(long, default_value_t = 1e-6)]
    tolerance: f64,
    /// Watchdog for the run; defaults to twice the expected cycle count
    #[clap(long)]
    max_cycles: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    run(&Args::parse())
}

fn run(args: &Args) -> Result<()> {
    let config = PipelineConfig::new(args.size)
        .context("invalid transform size")?
        .with_flush_cycles(args.flush_cycles)
        .with_port_priority(args.priority.into());
    if config.flush_cycles() < BFU_LATENCY {
        warn!(
            flush_cycles = config.flush_cycles(),
            latency = BFU_LATENCY,
            "flush shorter than the butterfly latency; results will be corrupted"
        );
    }

    let twiddles = match &args.twiddles {
        Some(path) => memfile::read_twiddles(path, args.size)
            .with_context(|| format!("failed to load twiddles from {}", path.display()))?,
        None => TwiddleTable::generate(args.size)?,
    };
    let mut core = FftCore::with_twiddles(config, twiddles)?;

    let samples = memfile::read_samples(&args.input, args.size)
        .with_context(|| format!("failed to load input from {}", args.input.display()))?;
    if args.pre_reversed {
        core.load_bank(BankId::A, &samples)?;
    } else {
        core.load_input(&samples)?;
    }

    let max_cycles = args.max_cycles.unwrap_or(2 * config.transform_cycles());
    let stats = core.run(max_cycles).context("transform did not finish")?;
    info!(
        cycles = stats.cycles,
        butterflies = stats.butterflies,
        words_written = stats.words_written,
        reads_dropped = stats.reads_dropped,
        writes_dropped = stats.writes_dropped,
        bank = ?core.output_bank(),
        "run finished"
    );

    memfile::write_samples(&args.output, core.output())
        .with_context(|| format!("failed to write output to {}", args.output.display()))?;

    if let Some(path) = &args.reference {
        let expected = memfile::read_samples(path, args.size)
            .with_context(|| format!("failed to load reference from {}", path.display()))?;
        let output = core.output();
        let err = verify::compare_samples(output, &expected)?;
        info!(max = err.max, mean = err.mean, rms = err.rms, "comparison against reference");
        if !err.within(args.tolerance) {
            for (bin, (got, want)) in output.iter().zip(&expected).enumerate().take(8) {
                debug!(bin, got = %to_complex(*got), want = %to_complex(*want), "spectrum");
            }
            bail!(
                "mismatch: max error {:e} at bin {} exceeds tolerance {:e}",
                err.max,
                err.worst_bin,
                args.tolerance
            );
        }
    }
    Ok(())
}
