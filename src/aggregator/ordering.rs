//! The one ordering function shared by flat rows and every tree level.
//!
//! Canonical key of a resolved frame: `(file, function, line)`, strings
//! compared lexicographically and the line numerically. Unresolved frames
//! sort after everything resolved. Equal keys fall back to the frame id so
//! output never depends on arrival order.

use crate::parser::schema::{FrameId, FrameInfo, ResolvedFrame};
use std::cmp::Ordering;

/// Compare two resolved frames by canonical key.
pub fn compare_resolved(a: &ResolvedFrame, b: &ResolvedFrame) -> Ordering {
    a.file
        .cmp(&b.file)
        .then_with(|| a.function.cmp(&b.function))
        .then(a.line.cmp(&b.line))
}

/// Compare frame metadata by canonical key; `Unresolved` sorts last.
pub fn compare_info(a: &FrameInfo, b: &FrameInfo) -> Ordering {
    match (a, b) {
        (FrameInfo::Resolved(a), FrameInfo::Resolved(b)) => compare_resolved(a, b),
        (FrameInfo::Resolved(_), FrameInfo::Unresolved) => Ordering::Less,
        (FrameInfo::Unresolved, FrameInfo::Resolved(_)) => Ordering::Greater,
        (FrameInfo::Unresolved, FrameInfo::Unresolved) => Ordering::Equal,
    }
}

/// Canonical key first, frame id as the final tie-break.
pub fn compare_frames(a: (&ResolvedFrame, FrameId), b: (&ResolvedFrame, FrameId)) -> Ordering {
    compare_resolved(a.0, b.0).then(a.1.cmp(&b.1))
}

/// Full canonical key equality
pub fn same_key(a: &ResolvedFrame, b: &ResolvedFrame) -> bool {
    compare_resolved(a, b) == Ordering::Equal
}

/// Single pass over sorted `items`: every item `same` as the one kept before
/// it is folded into that item with `absorb` and dropped.
pub fn merge_adjacent<T, S, A>(items: Vec<T>, same: S, mut absorb: A) -> Vec<T>
where
    S: Fn(&T, &T) -> bool,
    A: FnMut(&mut T, T),
{
    let mut merged: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match merged.last_mut() {
            Some(last) if same(last, &item) => absorb(last, item),
            _ => merged.push(item),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_then_function_then_line() {
        let a = ResolvedFrame::source("zeta", "a.rs", 50);
        let b = ResolvedFrame::source("alpha", "b.rs", 1);
        let c = ResolvedFrame::source("beta", "b.rs", 1);
        let d = ResolvedFrame::source("beta", "b.rs", 9);
        assert_eq!(compare_resolved(&a, &b), Ordering::Less);
        assert_eq!(compare_resolved(&b, &c), Ordering::Less);
        assert_eq!(compare_resolved(&c, &d), Ordering::Less);
    }

    #[test]
    fn test_line_is_numeric() {
        let nine = ResolvedFrame::source("f", "a.rs", 9);
        let ten = ResolvedFrame::source("f", "a.rs", 10);
        assert_eq!(compare_resolved(&nine, &ten), Ordering::Less);
    }

    #[test]
    fn test_unresolved_sorts_last() {
        let mut infos = vec![
            FrameInfo::Unresolved,
            ResolvedFrame::source("f", "z.rs", 1).into(),
            FrameInfo::Unresolved,
            ResolvedFrame::source("f", "a.rs", 1).into(),
        ];
        infos.sort_by(compare_info);
        assert_eq!(infos[0].as_resolved().map(|f| f.file.as_str()), Some("a.rs"));
        assert_eq!(infos[1].as_resolved().map(|f| f.file.as_str()), Some("z.rs"));
        assert!(!infos[2].is_resolved());
        assert!(!infos[3].is_resolved());
    }

    #[test]
    fn test_merge_adjacent_sums_runs() {
        let items = vec![("a", 1), ("a", 2), ("b", 5), ("a", 1)];
        let merged = merge_adjacent(items, |x, y| x.0 == y.0, |kept, dup| kept.1 += dup.1);
        assert_eq!(merged, vec![("a", 3), ("b", 5), ("a", 1)]);
    }
}
