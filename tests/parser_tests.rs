use snapprof::parser::{decode, decode_with_stats, encode, Capture, FrameId};

fn capture(frames: &[usize]) -> Capture {
    Capture::from_outermost(frames.iter().map(|&f| FrameId::new(f).unwrap()).collect())
}

fn frames(captures: &[Capture]) -> Vec<Vec<usize>> {
    captures
        .iter()
        .map(|c| c.frames().iter().map(|f| f.get()).collect())
        .collect()
}

#[test]
fn test_decode_worked_example() {
    let raw = [5, 7, 0, 11, 12, 7, 9, 0, 11, 12];
    assert_eq!(frames(&decode(&raw, 2)), vec![vec![7, 5], vec![9, 7]]);
}

#[test]
fn test_bookkeeping_zeros_are_not_sentinels() {
    // bookkeeping words equal to 0 must be skipped, not read as sentinels
    let raw = [5, 7, 0, 0, 0, 9, 0, 0, 0];
    assert_eq!(frames(&decode(&raw, 2)), vec![vec![7, 5], vec![9]]);
}

#[test]
fn test_trailing_run_dropped() {
    let raw = [5, 7, 0, 1, 2, 8, 9];
    let decoded = decode_with_stats(&raw, 2);
    assert_eq!(frames(&decoded.captures), vec![vec![7, 5]]);
    assert_eq!(decoded.dropped_trailing_frames, 2);
    assert_eq!(decoded.total_entries, 7);
}

#[test]
fn test_empty_buffer() {
    assert!(decode(&[], 2).is_empty());
}

#[test]
fn test_consecutive_sentinels_yield_empty_capture() {
    let raw = [0, 1, 2, 0, 3, 4];
    let decoded = decode_with_stats(&raw, 2);
    assert_eq!(decoded.captures.len(), 2);
    assert_eq!(decoded.non_empty(), 0);
}

#[test]
fn test_truncated_bookkeeping_is_tolerated() {
    // the buffer ends inside the bookkeeping of the last capture
    let raw = [5, 0, 1];
    assert_eq!(frames(&decode(&raw, 2)), vec![vec![5]]);
}

#[test]
fn test_encode_then_decode_with_various_skips() {
    let captures = vec![capture(&[1, 2, 3]), capture(&[4]), capture(&[2, 2])];
    for skip in [0, 1, 2, 5] {
        let raw = encode(&captures, skip, |index| index);
        assert_eq!(decode(&raw, skip), captures, "skip = {}", skip);
    }
}

#[test]
fn test_decode_is_restartable() {
    let raw = encode(&[capture(&[3, 1]), capture(&[2])], 2, |_| 0);
    assert_eq!(decode(&raw, 2), decode(&raw, 2));
}
