use crate::output::{read_snapshot, SnapshotFile};
use crate::parser::schema::Capture;
use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::Path;

/// Read a snapshot and decode its buffer
///
/// **Public** - shared by every reporting command
pub fn load_captures(input: &Path) -> Result<(SnapshotFile, Vec<Capture>)> {
    let snapshot = read_snapshot(input)
        .with_context(|| format!("Failed to read snapshot {}", input.display()))?;

    let decoded = snapshot.decode();
    if snapshot.snapshot.overflowed {
        warn!(
            "Snapshot was recorded with a full buffer ({} entries); later samples are missing",
            snapshot.snapshot.capacity
        );
    }
    debug!(
        "Loaded {} captures ({} non-empty) from {} entries",
        decoded.captures.len(),
        decoded.non_empty(),
        decoded.total_entries
    );

    Ok((snapshot, decoded.captures))
}

/// Validate a snapshot JSON file and print what it holds
pub fn validate_snapshot_file(input: &Path) -> Result<()> {
    println!("Validating snapshot: {}", input.display());

    let snapshot = read_snapshot(input)?;
    let decoded = snapshot.decode();
    let frames: usize = decoded.captures.iter().map(Capture::len).sum();

    println!("✓ Valid snapshot JSON");
    println!("  Version: {}", snapshot.version);
    println!("  Captured at: {}", snapshot.captured_at);
    println!(
        "  Entries: {} / {}",
        snapshot.snapshot.entries.len(),
        snapshot.snapshot.capacity
    );
    println!("  Interval: {:?}", snapshot.snapshot.interval());
    println!(
        "  Captures: {} ({} non-empty)",
        decoded.captures.len(),
        decoded.non_empty()
    );
    println!("  Frames: {}", frames);
    println!("  Symbols: {}", snapshot.symbols.len());
    if decoded.dropped_trailing_frames > 0 {
        println!("  Dropped trailing frames: {}", decoded.dropped_trailing_frames);
    }
    if snapshot.snapshot.overflowed {
        println!("  Buffer overflowed: yes");
    }

    Ok(())
}
