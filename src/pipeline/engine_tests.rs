use super::*;
use super::super::memory::PortPriority;
use crate::fixed::{Fixed, ReferenceFft};
use crate::verify::{compare, to_complex};
use num_complex::Complex64;

fn make_core(n: usize, flush_cycles: usize, priority: PortPriority) -> FftCore {
    let config = PipelineConfig::new(n)
        .unwrap()
        .with_flush_cycles(flush_cycles)
        .with_port_priority(priority);
    FftCore::new(config).unwrap()
}

fn default_core(n: usize) -> FftCore {
    FftCore::new(PipelineConfig::new(n).unwrap()).unwrap()
}

/// Deterministic samples with both components in `[-limit, limit]`.
fn noise(n: usize, limit: i16, seed: u32) -> Vec<Sample> {
    let mut state = seed;
    let span = 2 * limit as i32 + 1;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((state >> 8) as i32 % span - limit as i32) as i16
    };
    (0..n)
        .map(|_| {
            let re = next();
            let im = next();
            Sample::new(Fixed::from_bits(re), Fixed::from_bits(im))
        })
        .collect()
}

fn sequential(input: &[Sample]) -> Vec<Sample> {
    let mut buffer = input.to_vec();
    ReferenceFft::new(input.len()).unwrap().transform(&mut buffer).unwrap();
    buffer
}

fn transform(core: &mut FftCore, input: &[Sample]) -> (Vec<Sample>, RunStats) {
    core.load_input(input).unwrap();
    let stats = core.run(10 * core.config().transform_cycles()).unwrap();
    (core.output().to_vec(), stats)
}

fn naive_dft(input: &[Sample]) -> Vec<Complex64> {
    let n = input.len();
    (0..n)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(m, &x)| {
                    let angle = -2.0 * std::f64::consts::PI * (k * m % n) as f64 / n as f64;
                    to_complex(x) * Complex64::new(angle.cos(), angle.sin())
                })
                .sum()
        })
        .collect()
}

#[test]
fn test_impulse_gives_flat_spectrum() {
    let n = 1024;
    let mut input = vec![Sample::ZERO; n];
    // 1.0 saturates to 0x7FFF.
    input[0] = Sample::from_f64(1.0, 0.0);
    assert_eq!(input[0].to_word(), 0x7FFF_0000);

    let mut core = default_core(n);
    let (output, stats) = transform(&mut core, &input);

    for (bin, value) in output.iter().enumerate() {
        assert_eq!(*value, input[0], "bin {}", bin);
    }
    assert_eq!(stats.cycles, 1 + 10 * (512 + 4));
    assert_eq!(stats.butterflies, 10 * 512);
    assert_eq!(stats.words_written, 10 * 1024);
    assert_eq!(stats.reads_dropped, 0);
    assert_eq!(stats.writes_dropped, 0);
}

#[test]
fn test_real_tone_peaks_at_conjugate_bins() {
    let n = 64;
    let k = 5;
    let amplitude = 1.0 / n as f64;
    let input: Vec<Sample> = (0..n)
        .map(|m| {
            let phase = 2.0 * std::f64::consts::PI * (k * m) as f64 / n as f64;
            Sample::from_f64(amplitude * phase.sin(), 0.0)
        })
        .collect();

    let mut core = default_core(n);
    let (output, _) = transform(&mut core, &input);

    // sin -> -j*a*N/2 at k, +j*a*N/2 at N-k
    let peak = to_complex(output[k]);
    let mirror = to_complex(output[n - k]);
    assert!((peak - Complex64::new(0.0, -0.5)).norm() < 0.01, "bin {}: {}", k, peak);
    assert!((mirror - Complex64::new(0.0, 0.5)).norm() < 0.01, "bin {}: {}", n - k, mirror);

    for (bin, value) in output.iter().enumerate() {
        if bin != k && bin != n - k {
            assert!(to_complex(*value).norm() < 0.01, "leakage in bin {}", bin);
        }
    }
}

#[test]
fn test_matches_sequential_model_bit_exact() {
    let mut n = 2;
    while n <= 512 {
        let input = noise(n, 20_000, n as u32);
        let mut core = default_core(n);
        let (output, stats) = transform(&mut core, &input);

        assert_eq!(output, sequential(&input), "N={}", n);
        assert_eq!(stats.cycles, core.config().transform_cycles());
        assert_eq!(core.in_flight(), 0);
        n <<= 1;
    }
}

#[test]
fn test_matches_float_dft_within_quantization() {
    let n = 128;
    // |component| <= 0.45 / N keeps every stage clear of overflow.
    let limit = (0.45 / n as f64 * 32768.0) as i16;
    let input = noise(n, limit, 7);

    let mut core = default_core(n);
    let (output, _) = transform(&mut core, &input);

    let expected = naive_dft(&input);
    let stats = compare(output.iter().copied().map(to_complex), expected.into_iter()).unwrap();
    assert!(stats.within(0.01), "{:?}", stats);
    assert!(stats.rms < 0.005, "{:?}", stats);
}

#[test]
fn test_flush_at_bfu_latency_is_enough() {
    for flush in [BFU_LATENCY, BFU_LATENCY + 1, BFU_LATENCY + 3] {
        for n in [4, 16, 64] {
            let input = noise(n, 16_000, 3);
            let mut core = make_core(n, flush, PortPriority::WriteBack);
            let (output, stats) = transform(&mut core, &input);

            assert_eq!(output, sequential(&input), "N={} flush={}", n, flush);
            assert_eq!(stats.reads_dropped + stats.writes_dropped, 0);
            assert_eq!(stats.words_written, 2 * stats.butterflies);
            assert_eq!(core.in_flight(), 0);
        }
    }
}

#[test]
fn test_short_flush_drops_reads_at_stage_boundaries() {
    for n in [4usize, 16, 64] {
        let stages = n.trailing_zeros() as u64;
        let input = noise(n, 16_000, 11);
        let mut core = make_core(n, BFU_LATENCY - 1, PortPriority::WriteBack);
        let (output, stats) = transform(&mut core, &input);

        assert_ne!(output, sequential(&input), "N={}", n);
        // The first issue of every later stage meets the last write-back of
        // the stage before it, on both ports.
        assert_eq!(stats.reads_dropped, 2 * (stages - 1), "N={}", n);
        assert_eq!(stats.writes_dropped, 0);
        // DONE arrives with the final butterfly still in flight.
        assert_eq!(core.in_flight(), 1);
        assert_eq!(stats.words_written, 2 * stats.butterflies - 2);
    }
}

#[test]
fn test_short_flush_with_read_priority_drops_writes() {
    for n in [4usize, 16, 64] {
        let stages = n.trailing_zeros() as u64;
        let input = noise(n, 16_000, 13);
        let mut core = make_core(n, BFU_LATENCY - 1, PortPriority::ReadIssue);
        let (output, stats) = transform(&mut core, &input);

        assert_ne!(output, sequential(&input), "N={}", n);
        assert_eq!(stats.writes_dropped, 2 * (stages - 1), "N={}", n);
        assert_eq!(stats.reads_dropped, 0);
    }
}

#[test]
fn test_flush_free_variant_is_faster_and_wrong() {
    let n = 16;
    let input = noise(n, 16_000, 5);
    let mut core = make_core(n, 0, PortPriority::WriteBack);
    let (output, stats) = transform(&mut core, &input);

    assert_eq!(stats.cycles, 1 + 4 * 8);
    assert!(stats.reads_dropped > 0);
    assert_ne!(output, sequential(&input));
}

#[test]
fn test_status_over_one_transform() {
    let n = 16;
    let mut core = default_core(n);
    core.load_input(&noise(n, 1000, 1)).unwrap();

    let mut statuses = Vec::new();
    loop {
        let status = core.tick(ControlInputs::start(true));
        statuses.push(status);
        assert!(core.in_flight() <= BFU_LATENCY);
        if status.done {
            break;
        }
    }

    let config = *core.config();
    assert_eq!(statuses.len() as u64 - 1, config.transform_cycles());
    assert!(!statuses[0].busy);
    let busy = statuses.iter().filter(|s| s.busy).count();
    assert_eq!(busy, 4 * (n / 2 + BFU_LATENCY));
    assert!(statuses[..statuses.len() - 1].iter().all(|s| !s.done));

    // DONE holds while start stays high.
    for _ in 0..3 {
        let status = core.tick(ControlInputs::start(true));
        assert!(status.done && !status.busy);
        assert_eq!(core.state(), AguState::Done);
    }
    let status = core.tick(ControlInputs::start(false));
    assert!(status.done);
    assert!(core.is_idle());
}

#[test]
fn test_in_flight_fills_to_latency() {
    let mut core = default_core(16);
    core.tick(ControlInputs::start(true));
    for issued in 1..=3 {
        core.tick(ControlInputs::start(true));
        assert_eq!(core.in_flight(), issued);
    }
    for _ in 0..4 {
        core.tick(ControlInputs::start(true));
        assert_eq!(core.in_flight(), BFU_LATENCY);
    }
}

#[test]
fn test_start_is_ignored_while_busy() {
    let n = 32;
    let input = noise(n, 12_000, 17);
    let mut steady = default_core(n);
    let mut toggled = default_core(n);
    steady.load_input(&input).unwrap();
    toggled.load_input(&input).unwrap();

    let mut cycle = 0;
    loop {
        let a = steady.tick(ControlInputs::start(true));
        let b = toggled.tick(ControlInputs::start(cycle == 0 || cycle % 5 == 2));
        assert_eq!((a.busy, a.done), (b.busy, b.done), "cycle {}", cycle);
        if a.done {
            break;
        }
        cycle += 1;
    }
    assert_eq!(steady.output(), toggled.output());
    assert_eq!(toggled.output(), sequential(&input).as_slice());
}

#[test]
fn test_reset_mid_run() {
    let n = 16;
    let input = noise(n, 12_000, 19);
    let mut core = default_core(n);
    core.load_input(&input).unwrap();
    for _ in 0..6 {
        core.tick(ControlInputs::start(true));
    }
    assert_eq!(core.state(), AguState::Run);
    assert!(core.in_flight() > 0);

    let status = core.tick(ControlInputs::reset());
    assert_eq!(status, CoreStatus::default());
    assert!(core.is_idle());
    assert_eq!(core.in_flight(), 0);
    assert_eq!(core.stats(), RunStats::default());
    assert_eq!(core.memory().bank(BankId::A).read_data(Port::A), Sample::ZERO);

    let (output, stats) = transform(&mut core, &input);
    assert_eq!(output, sequential(&input));
    assert_eq!(stats.cycles, core.config().transform_cycles());
}

#[test]
fn test_load_is_rejected_while_busy() {
    let n = 8;
    let mut core = default_core(n);
    assert_eq!(core.load_input(&[Sample::ZERO; 4]), Err(FftError::SizeMismatch));
    assert_eq!(core.load_bank(BankId::B, &[Sample::ZERO; 16]), Err(FftError::SizeMismatch));

    core.tick(ControlInputs::start(true));
    assert_eq!(core.load_input(&[Sample::ZERO; 8]), Err(FftError::NotIdle));
    assert_eq!(core.run(100), Err(FftError::NotIdle));
}

#[test]
fn test_cycle_limit() {
    let mut core = default_core(64);
    assert_eq!(core.run(10), Err(FftError::CycleLimit));
}

#[test]
fn test_output_bank_follows_stage_parity() {
    for (n, bank) in [(2, BankId::B), (4, BankId::A), (8, BankId::B), (256, BankId::A)] {
        let mut core = default_core(n);
        transform(&mut core, &noise(n, 100, 23));
        assert_eq!(core.output_bank(), bank, "N={}", n);
    }
}

#[test]
fn test_pre_reversed_bank_load_matches_natural_load() {
    let n = 32;
    let input = noise(n, 12_000, 29);
    let mut bitrev = vec![0; n];
    precompute_bitrev(&mut bitrev, n);
    let reversed: Vec<Sample> = bitrev.iter().map(|&j| input[j]).collect();

    let mut natural = default_core(n);
    let (expected, _) = transform(&mut natural, &input);

    let mut raw = default_core(n);
    raw.load_bank(BankId::A, &reversed).unwrap();
    raw.run(10_000).unwrap();
    assert_eq!(raw.output(), expected.as_slice());
}

#[test]
fn test_loaded_twiddle_rom() {
    let n = 64;
    let words = TwiddleTable::generate(n).unwrap().to_words();
    let table = TwiddleTable::from_words(n, &words).unwrap();
    let config = PipelineConfig::new(n).unwrap();

    let input = noise(n, 8_000, 31);
    let mut rom = FftCore::with_twiddles(config, table).unwrap();
    let (output, _) = transform(&mut rom, &input);
    assert_eq!(output, sequential(&input));

    let wrong = TwiddleTable::generate(32).unwrap();
    assert!(matches!(
        FftCore::with_twiddles(config, wrong),
        Err(FftError::TableSizeMismatch)
    ));
}

#[test]
fn test_two_point_butterfly() {
    let mut core = default_core(2);
    let input = [Sample::from_f64(0.25, 0.0), Sample::from_f64(0.0625, 0.0)];
    let (output, stats) = transform(&mut core, &input);

    assert_eq!(output[0], Sample::from_f64(0.3125, 0.0));
    assert_eq!(output[1], Sample::from_f64(0.1875, 0.0));
    assert_eq!(stats.cycles, 1 + 1 + BFU_LATENCY as u64);
}

#[test]
fn test_fft_process_implementations_agree() {
    let n = 64;
    let input = noise(n, 9_000, 37);
    let mut engines: Vec<Box<dyn FftProcess<Sample>>> = vec![
        Box::new(ReferenceFft::new(n).unwrap()),
        Box::new(default_core(n)),
    ];

    let mut results = Vec::new();
    for engine in engines.iter_mut() {
        let mut buffer = input.clone();
        engine.process(&mut buffer).unwrap();
        results.push(buffer);
    }
    assert_eq!(results[0], results[1]);

    // A second pass through the same core starts over from bank A.
    let mut buffer = input.clone();
    engines[1].process(&mut buffer).unwrap();
    assert_eq!(buffer, results[0]);
}
