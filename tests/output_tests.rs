use pretty_assertions::assert_eq;
use snapprof::aggregator::{build_collapsed_stacks, flat, tree, FlatOptions, TreeOptions};
use snapprof::flamegraph::{generate_flamegraph, FlamegraphConfig};
use snapprof::output::{
    read_snapshot, render_flat, render_tree, write_report, write_snapshot, write_svg,
    ReportFile, SnapshotFile,
};
use snapprof::parser::{decode, Capture, FrameId, ResolvedFrame};
use snapprof::sampler::Snapshot;
use snapprof::symbols::SymbolTable;

fn id(raw: usize) -> FrameId {
    FrameId::new(raw).unwrap()
}

fn symbols() -> SymbolTable {
    SymbolTable::new()
        .with(id(5), ResolvedFrame::source("helper", "lib.rs", 20))
        .with(id(7), ResolvedFrame::source("main", "main.rs", 3))
        .with(id(9), ResolvedFrame::source("work", "lib.rs", 40))
        .with(id(12), ResolvedFrame::native("memcpy", "libc.so.6", 0x1f))
}

fn worked_example() -> Vec<Capture> {
    decode(&[5, 7, 0, 11, 12, 7, 9, 0, 11, 12], 2)
}

#[test]
fn test_render_flat_worked_example() {
    let report = flat(&worked_example(), &symbols(), FlatOptions::default());
    let expected = "\
Count | File    | Function | Line/offset
    1 | lib.rs  | helper   | 20
    1 | lib.rs  | work     | 40
    2 | main.rs | main     | 3
";
    assert_eq!(render_flat(&report, 100), expected);
}

#[test]
fn test_render_flat_native_offset_in_hex() {
    let captures = vec![Capture::from_outermost(vec![id(7), id(12)])];
    let options = FlatOptions {
        include_native: true,
        ..Default::default()
    };
    let report = flat(&captures, &symbols(), options);
    let rendered = render_flat(&report, 100);
    assert!(rendered.lines().any(|l| l.ends_with("| memcpy   | 0x1f")));
}

#[test]
fn test_render_flat_truncates_from_the_left() {
    let table = SymbolTable::new().with(
        id(1),
        ResolvedFrame::source(
            "snapprof::aggregator::tree::build_level",
            "/home/user/projects/snapprof/src/aggregator/tree.rs",
            120,
        ),
    );
    let captures = vec![Capture::from_outermost(vec![id(1)])];
    let report = flat(&captures, &table, FlatOptions::default());

    let rendered = render_flat(&report, 60);
    for line in rendered.lines() {
        assert!(line.chars().count() <= 60, "line too wide: {}", line);
    }
    let row = rendered.lines().nth(1).unwrap();
    assert!(row.contains("…"));
    assert!(row.contains("tree.rs"));
    assert!(row.contains("build_level"));
}

#[test]
fn test_render_tree_worked_example() {
    let call_tree = tree(&worked_example(), &symbols(), TreeOptions::default());
    let expected = "\
1 lib.rs; work; line: 40
  1 main.rs; main; line: 3
1 main.rs; main; line: 3
  1 lib.rs; helper; line: 20
";
    assert_eq!(render_tree(&call_tree, 100), expected);
}

#[test]
fn test_render_tree_native_offset() {
    let captures = vec![Capture::from_outermost(vec![id(7), id(12)])];
    let options = TreeOptions {
        include_native: true,
        ..Default::default()
    };
    let call_tree = tree(&captures, &symbols(), options);
    let rendered = render_tree(&call_tree, 100);
    assert_eq!(rendered.lines().nth(1), Some("  1 libc.so.6; memcpy; offset: 1f"));
}

#[test]
fn test_render_tree_deficit_marker() {
    let captures = vec![Capture::from_outermost(vec![id(9); 8])];
    let call_tree = tree(&captures, &symbols(), TreeOptions::default());

    // width 20: at most 10 columns of indent, i.e. 5 levels
    let rendered = render_tree(&call_tree, 20);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 8);
    assert!(lines[4].starts_with("        1 "));
    assert!(lines[5].starts_with("          1 "));
    assert!(lines[6].starts_with("          +1 1 "));
    assert!(lines[7].starts_with("          +2 1 "));
}

#[test]
fn test_snapshot_file_reports_match_after_reload() {
    let snapshot = Snapshot {
        entries: vec![5, 7, 0, 11, 12, 7, 9, 0, 11, 12, 12, 9],
        skip: 2,
        capacity: 12,
        interval_nanos: 1_000_000,
        overflowed: true,
    };
    let file = SnapshotFile::new(snapshot, symbols());
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("snapshot.json");

    write_snapshot(&file, &path).unwrap();
    let loaded = read_snapshot(&path).unwrap();

    let before = file.decode();
    let after = loaded.decode();
    assert_eq!(after, before);
    assert_eq!(after.dropped_trailing_frames, 2);

    assert_eq!(
        flat(&after.captures, &loaded.symbols, FlatOptions::default()),
        flat(&before.captures, &file.symbols, FlatOptions::default())
    );
    assert_eq!(
        tree(&after.captures, &loaded.symbols, TreeOptions::default()),
        tree(&before.captures, &file.symbols, TreeOptions::default())
    );
}

#[test]
fn test_write_report_json() {
    let captures = worked_example();
    let report = ReportFile::new(
        flat(&captures, &symbols(), FlatOptions::default()),
        tree(&captures, &symbols(), TreeOptions::default()),
    );
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out/report.json");

    write_report(&report, &path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["flat"]["rows"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["flat"]["total_captures"], 2);
    assert_eq!(json["tree"]["roots"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_flamegraph_from_captures() {
    let stacks = build_collapsed_stacks(&worked_example(), &symbols(), false);
    assert_eq!(stacks.len(), 2);

    let config = FlamegraphConfig::new().with_title("worked example");
    let svg = generate_flamegraph(&stacks, &config).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("helper"));
    assert!(svg.contains("work"));

    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("flamegraph.svg");
    write_svg(&svg, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), svg);
}
