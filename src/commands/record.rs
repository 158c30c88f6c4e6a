//! Record command implementation.
//!
//! The record command:
//! 1. Allocates the sample store
//! 2. Samples a built-in CPU-bound workload
//! 3. Resolves the sampled frames into a symbol table
//! 4. Writes the snapshot (and optionally prints reports)

use super::models::RecordArgs;
use crate::aggregator::{flat, tree, FlatOptions, TreeOptions};
use crate::output::{render_flat, render_tree, write_snapshot, SnapshotFile};
use crate::parser::backtrace::decode;
use crate::parser::schema::{Capture, FrameId, ResolvedFrame};
use crate::profiler::Profiler;
use crate::sampler::{CaptureWriter, ManualWriter, SignalWriter};
use crate::symbols::{BacktraceResolver, SymbolResolver, SymbolTable};
use crate::utils::config::{DEFAULT_SKIP, MAX_RECORD_DURATION_MS};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Reject argument combinations that cannot produce a profile
///
/// **Public** - called by main.rs before `execute_record`
pub fn validate_record_args(args: &RecordArgs) -> Result<()> {
    if args.capacity == 0 {
        bail!("Capacity must be greater than zero");
    }
    if args.interval.is_zero() {
        bail!("Sampling interval must be greater than zero");
    }
    if args.duration.is_zero() {
        bail!("Duration must be greater than zero");
    }
    if args.duration > Duration::from_millis(MAX_RECORD_DURATION_MS) {
        bail!(
            "Duration {} ms exceeds the maximum of {} ms",
            args.duration.as_millis(),
            MAX_RECORD_DURATION_MS
        );
    }
    Ok(())
}

/// Execute the record command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Store allocation or timer failures
/// * File write errors
pub fn execute_record(args: RecordArgs) -> Result<()> {
    let start_time = Instant::now();

    info!(
        "Recording {} ms ({}), interval {:?}",
        args.duration.as_millis(),
        if args.synthetic { "synthetic" } else { "signal" },
        args.interval
    );

    if args.synthetic {
        info!("Step 1/4: Allocating sample store...");
        let mut profiler = Profiler::with_config(
            ManualWriter::new(),
            synthetic_symbols(),
            args.capacity,
            args.interval,
            DEFAULT_SKIP,
        )
        .context("Failed to initialise profiler")?;

        info!("Step 2/4: Replaying synthetic stacks...");
        profiler.start()?;
        let samples = synthetic_sample_count(args.duration, args.interval);
        for index in 0..samples {
            // the store reports overflow once; stop() logs it
            let _ = profiler.writer_mut().sample(&synthetic_capture(index));
        }
        profiler.stop();

        finish(&profiler, &args)?;
    } else {
        info!("Step 1/4: Allocating sample store...");
        let mut profiler = Profiler::with_config(
            SignalWriter::new(args.time_mode),
            BacktraceResolver::new(),
            args.capacity,
            args.interval,
            DEFAULT_SKIP,
        )
        .context("Failed to initialise profiler")?;

        info!("Step 2/4: Sampling workload...");
        profiler
            .start()
            .context("Failed to start sampling (try --synthetic on this host)")?;
        let checksum = run_workload(args.duration);
        profiler.stop();
        debug!("Workload checksum: {:x}", checksum);

        finish(&profiler, &args)?;
    }

    let elapsed = start_time.elapsed();
    info!("Record completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

// Steps 3 and 4, shared by both writers
fn finish<W, R>(profiler: &Profiler<W, R>, args: &RecordArgs) -> Result<()>
where
    W: CaptureWriter,
    R: SymbolResolver,
{
    info!("Step 3/4: Resolving symbols...");
    let snapshot = profiler.snapshot()?;
    let captures = decode(&snapshot.entries, snapshot.skip);
    let symbols = SymbolTable::capture_from(
        profiler.resolver(),
        captures.iter().flat_map(|c| c.frames().iter().copied()),
    );
    debug!(
        "{} captures, {} resolved frames",
        captures.len(),
        symbols.len()
    );

    info!("Step 4/4: Writing snapshot...");
    let file = SnapshotFile::new(snapshot, symbols);
    write_snapshot(&file, &args.output).context("Failed to write snapshot")?;
    info!("✓ Snapshot written to: {}", args.output.display());

    if args.print_flat {
        let report = flat(&captures, &file.symbols, FlatOptions::default());
        println!("{}", render_flat(&report, args.width));
    }
    if args.print_tree {
        let call_tree = tree(&captures, &file.symbols, TreeOptions::default());
        println!("{}", render_tree(&call_tree, args.width));
    }

    Ok(())
}

fn synthetic_sample_count(duration: Duration, interval: Duration) -> u64 {
    let samples = duration.as_nanos() / interval.as_nanos().max(1);
    u64::try_from(samples).unwrap_or(u64::MAX)
}

const MAIN: usize = 0x1000;
const RUN_WORKLOAD: usize = 0x1010;
const HASH_BLOCK: usize = 0x1020;
const SORT_CHUNK: usize = 0x1030;
const FIBONACCI: usize = 0x1040;
const MEMCPY: usize = 0x1050;

fn synthetic_symbols() -> SymbolTable {
    let entries = [
        (MAIN, ResolvedFrame::source("main", "src/main.rs", 12)),
        (RUN_WORKLOAD, ResolvedFrame::source("run_workload", "src/workload.rs", 22)),
        (HASH_BLOCK, ResolvedFrame::source("hash_block", "src/workload.rs", 48)),
        (SORT_CHUNK, ResolvedFrame::source("sort_chunk", "src/workload.rs", 71)),
        (FIBONACCI, ResolvedFrame::source("fibonacci", "src/workload.rs", 90)),
        (MEMCPY, ResolvedFrame::native("memcpy", "libc.so.6", 0x40)),
    ];

    let mut table = SymbolTable::new();
    for (addr, info) in entries {
        if let Some(frame) = FrameId::new(addr) {
            table.insert(frame, info);
        }
    }
    table
}

/// Deterministic stack for the `index`-th synthetic sample, outermost first
fn synthetic_capture(index: u64) -> Capture {
    let mut frames = vec![MAIN, RUN_WORKLOAD];
    match index % 6 {
        0..=2 => frames.extend([HASH_BLOCK, MEMCPY]),
        3 => frames.push(SORT_CHUNK),
        4 => {
            let depth = (index / 6) % 4 + 1;
            frames.extend(std::iter::repeat(FIBONACCI).take(depth as usize));
        }
        _ => {}
    }
    Capture::from_outermost(frames.into_iter().filter_map(FrameId::new).collect())
}

/// Spin through the workload until `duration` has elapsed
fn run_workload(duration: Duration) -> u64 {
    let deadline = Instant::now() + duration;
    let mut checksum = 0u64;
    let mut round = 0u64;
    while Instant::now() < deadline {
        checksum ^= hash_block(round);
        checksum = checksum.wrapping_add(sort_chunk(round));
        checksum = checksum.wrapping_add(fibonacci(18 + (round % 4)));
        round += 1;
    }
    debug!("Workload ran {} rounds", round);
    checksum
}

#[inline(never)]
fn hash_block(seed: u64) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64 ^ seed;
    for byte in 0..4096u64 {
        hash ^= black_box(byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

#[inline(never)]
fn sort_chunk(seed: u64) -> u64 {
    let mut values: Vec<u64> = (0..2048u64)
        .map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ seed)
        .collect();
    values.sort_unstable();
    black_box(values[values.len() / 2])
}

#[inline(never)]
fn fibonacci(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    black_box(fibonacci(n - 1)).wrapping_add(fibonacci(n - 2))
}
