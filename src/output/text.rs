//! Plain-text rendering of flat and tree reports.
//!
//! Pure formatting: rows and nodes are printed in the order the aggregators
//! produced them. Long file and function names are cut from the left, since
//! the tail of a path or a qualified name is the informative part.

use crate::aggregator::{CallTree, FlatReport};
use crate::parser::schema::ResolvedFrame;
use crate::utils::config::{ELLIPSIS, INDENT_WIDTH};
use std::fmt::Write as _;

const MIN_NAME_WIDTH: usize = 4;
const COLUMN_SEPARATOR: &str = " | ";

/// Keep at most `max` characters of `text`, replacing the cut-off head with
/// an ellipsis.
pub fn ltruncate(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let keep = max - 1;
    let tail: String = text.chars().skip(len - keep).collect();
    format!("{}{}", ELLIPSIS, tail)
}

// Split `budget` between file and function; file gets at most 40% when both
// do not fit.
fn split_name_budget(file_need: usize, function_need: usize, budget: usize) -> (usize, usize) {
    if file_need + function_need <= budget {
        return (file_need, function_need);
    }
    let file_width = file_need.min((budget * 2 / 5).max(MIN_NAME_WIDTH));
    let function_width = function_need.min(budget.saturating_sub(file_width).max(MIN_NAME_WIDTH));
    (file_width, function_width)
}

fn flat_location(info: &ResolvedFrame) -> String {
    if info.is_native {
        format!("0x{:x}", info.line)
    } else {
        info.line.to_string()
    }
}

/// Render the flat report as an aligned table.
///
/// **Public** - main entry point for flat text output
///
/// ```text
/// Count | File    | Function | Line/offset
///     2 | main.rs | main     | 3
/// ```
pub fn render_flat(report: &FlatReport, width: usize) -> String {
    const HEADERS: [&str; 4] = ["Count", "File", "Function", "Line/offset"];

    let locations: Vec<String> = report.rows.iter().map(|r| flat_location(&r.info)).collect();

    let count_width = report
        .rows
        .iter()
        .map(|r| r.count.to_string().len())
        .chain(std::iter::once(HEADERS[0].len()))
        .max()
        .unwrap_or(0);
    let location_width = locations
        .iter()
        .map(|l| l.len())
        .chain(std::iter::once(HEADERS[3].len()))
        .max()
        .unwrap_or(0);
    let file_need = report
        .rows
        .iter()
        .map(|r| r.info.file.chars().count())
        .chain(std::iter::once(HEADERS[1].len()))
        .max()
        .unwrap_or(0);
    let function_need = report
        .rows
        .iter()
        .map(|r| r.info.function.chars().count())
        .chain(std::iter::once(HEADERS[2].len()))
        .max()
        .unwrap_or(0);

    let fixed = count_width + location_width + 3 * COLUMN_SEPARATOR.len();
    let (file_width, function_width) =
        split_name_budget(file_need, function_need, width.saturating_sub(fixed));

    let mut out = String::new();
    let mut line = |count: &str, file: &str, function: &str, location: &str| {
        let _ = writeln!(
            out,
            "{:>cw$}{sep}{:<fw$}{sep}{:<nw$}{sep}{}",
            count,
            ltruncate(file, file_width),
            ltruncate(function, function_width),
            location,
            cw = count_width,
            fw = file_width,
            nw = function_width,
            sep = COLUMN_SEPARATOR,
        );
    };

    line(HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3]);
    for (row, location) in report.rows.iter().zip(&locations) {
        line(&row.count.to_string(), &row.info.file, &row.info.function, location);
    }
    out
}

/// Render the call tree, one line per node in pre-order.
///
/// **Public** - main entry point for tree text output
///
/// Each level indents by two spaces. Indentation never takes more than half
/// of `width`; deeper lines keep the maximum indent and show `+N` where `N`
/// is the number of levels not drawn.
pub fn render_tree(tree: &CallTree, width: usize) -> String {
    let levels_fit = (width / 2) / INDENT_WIDTH;
    let mut out = String::new();

    for (depth, id) in tree.preorder() {
        let node = tree.node(id);

        let mut head = " ".repeat(depth.min(levels_fit) * INDENT_WIDTH);
        if depth > levels_fit {
            let _ = write!(head, "+{} ", depth - levels_fit);
        }
        let _ = write!(head, "{} ", node.count);

        let location = node.info.location_label();
        let fixed = head.chars().count() + location.len() + 4;
        let (file_width, function_width) = split_name_budget(
            node.info.file.chars().count(),
            node.info.function.chars().count(),
            width.saturating_sub(fixed),
        );

        let _ = writeln!(
            out,
            "{}{}; {}; {}",
            head,
            ltruncate(&node.info.file, file_width),
            ltruncate(&node.info.function, function_width),
            location
        );
    }
    out
}
