//! Reporting commands: flat, tree, flamegraph and export.
//!
//! All of them read a snapshot written by `record` and resolve frames
//! through the symbol table stored alongside it.

use super::models::ReportArgs;
use super::utils::load_captures;
use crate::aggregator::{build_collapsed_stacks, flat, tree, FlatOptions, TreeOptions};
use crate::flamegraph::{generate_flamegraph, FlamegraphConfig};
use crate::output::{render_flat, render_tree, write_report, write_svg, ReportFile};
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

fn flat_options(args: &ReportArgs) -> FlatOptions {
    FlatOptions {
        include_native: args.include_native,
        combine: args.combine,
    }
}

fn tree_options(args: &ReportArgs) -> TreeOptions {
    TreeOptions {
        include_native: args.include_native,
        merge_by_symbol: args.merge_by_symbol,
    }
}

/// Print the flat report of a snapshot
///
/// **Public** - called from main.rs
pub fn execute_flat(args: &ReportArgs) -> Result<()> {
    let (snapshot, captures) = load_captures(&args.input)?;
    let report = flat(&captures, &snapshot.symbols, flat_options(args));
    debug!("Flat report: {} rows", report.rows.len());

    print!("{}", render_flat(&report, args.width));
    println!("Total captures: {}", report.total_captures);
    Ok(())
}

/// Print the call tree of a snapshot
///
/// **Public** - called from main.rs
pub fn execute_tree(args: &ReportArgs) -> Result<()> {
    let (snapshot, captures) = load_captures(&args.input)?;
    let call_tree = tree(&captures, &snapshot.symbols, tree_options(args));
    debug!(
        "Call tree: {} nodes, depth {}",
        call_tree.len(),
        call_tree.max_depth()
    );

    print!("{}", render_tree(&call_tree, args.width));
    println!("Total captures: {}", call_tree.total_count());
    Ok(())
}

/// Render a snapshot as an SVG flamegraph
///
/// **Public** - called from main.rs
pub fn execute_flamegraph(args: &ReportArgs, output: &Path, title: Option<&str>) -> Result<()> {
    info!("Step 1/3: Reading snapshot...");
    let (snapshot, captures) = load_captures(&args.input)?;

    info!("Step 2/3: Building collapsed stacks...");
    let stacks = build_collapsed_stacks(&captures, &snapshot.symbols, args.include_native);
    let mut config = FlamegraphConfig::new();
    if let Some(title) = title {
        config = config.with_title(title);
    }
    let svg = generate_flamegraph(&stacks, &config).context("Failed to generate flamegraph")?;

    info!("Step 3/3: Writing SVG...");
    write_svg(&svg, output).context("Failed to write flamegraph SVG")?;
    info!("✓ Flamegraph written to: {}", output.display());
    Ok(())
}

/// Write flat and tree reports of a snapshot as JSON
///
/// **Public** - called from main.rs
pub fn execute_export(args: &ReportArgs, output: &Path) -> Result<()> {
    let (snapshot, captures) = load_captures(&args.input)?;

    let report = ReportFile::new(
        flat(&captures, &snapshot.symbols, flat_options(args)),
        tree(&captures, &snapshot.symbols, tree_options(args)),
    );
    write_report(&report, output).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", output.display());
    Ok(())
}
