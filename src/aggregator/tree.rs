//! Call tree: captures grouped by shared prefix, one depth at a time.
//!
//! Level 0 partitions all captures by their outermost frame. Inside each
//! group, captures that go deeper are partitioned again by their next frame,
//! and so on. Grouping sorts the members of one level and splits runs of
//! equal keys, so whole stacks are never hashed and sibling order is the
//! canonical order by construction.
//!
//! Construction uses an explicit work list; depth is bounded by the longest
//! capture and never touches the host call stack.

use super::catalog::FrameCatalog;
use crate::parser::schema::{Capture, FrameId, ResolvedFrame};
use crate::symbols::SymbolResolver;
use log::debug;
use serde::{Deserialize, Serialize};

/// Options for [`tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    /// Keep frames the resolver marks as native
    pub include_native: bool,

    /// Group distinct frame ids that resolve to the same
    /// `(file, function, line)`. When false, frame ids group alone.
    pub merge_by_symbol: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            include_native: false,
            merge_by_symbol: true,
        }
    }
}

/// Index of a node in [`CallTree::nodes`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Representative frame (the lowest id in the group)
    pub frame: FrameId,
    pub info: ResolvedFrame,

    /// Captures passing through this node
    pub count: u64,

    /// Captures ending exactly at this node
    pub terminal: u64,

    /// Children in canonical order
    pub children: Vec<NodeId>,
}

/// Forest of call-tree nodes stored in an arena
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTree {
    nodes: Vec<TreeNode>,
    roots: Vec<NodeId>,
}

impl CallTree {
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        self.node(id).children.iter().map(move |&c| self.node(c))
    }

    /// Sum of root counts, i.e. the captures represented by the tree
    pub fn total_count(&self) -> u64 {
        self.roots.iter().map(|&r| self.node(r).count).sum()
    }

    /// Deepest level present (roots are depth 0)
    pub fn max_depth(&self) -> usize {
        self.preorder().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Pre-order walk yielding `(depth, node)` in display order.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: self.roots.iter().rev().map(|&r| (0, r)).collect(),
        }
    }
}

/// Iterator returned by [`CallTree::preorder`]
pub struct Preorder<'a> {
    tree: &'a CallTree,
    stack: Vec<(usize, NodeId)>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        self.stack.extend(
            self.tree
                .node(id)
                .children
                .iter()
                .rev()
                .map(|&child| (depth + 1, child)),
        );
        Some((depth, id))
    }
}

// One level still to be grouped
struct Pending {
    parent: Option<NodeId>,
    depth: usize,
    members: Vec<usize>,
}

/// Build the call tree of `captures`.
///
/// **Public** - main entry point for the tree report
///
/// Unresolved frames (and native frames unless `include_native`) are removed
/// from each capture first; callees of a removed frame attach to its nearest
/// kept caller. Captures left empty are not counted.
pub fn tree<R>(captures: &[Capture], resolver: &R, options: TreeOptions) -> CallTree
where
    R: SymbolResolver + ?Sized,
{
    let catalog = FrameCatalog::build(captures, resolver, options.include_native);
    let stacks: Vec<Vec<FrameId>> = captures
        .iter()
        .map(|capture| catalog.filter(capture))
        .filter(|stack| !stack.is_empty())
        .collect();

    let same_group = |a: FrameId, b: FrameId| {
        if options.merge_by_symbol {
            catalog.same_symbol(a, b)
        } else {
            a == b
        }
    };

    let mut nodes: Vec<TreeNode> = Vec::new();
    let mut roots: Vec<NodeId> = Vec::new();
    let mut work = vec![Pending {
        parent: None,
        depth: 0,
        members: (0..stacks.len()).collect(),
    }];

    while let Some(Pending {
        parent,
        depth,
        mut members,
    }) = work.pop()
    {
        members.sort_by(|&a, &b| catalog.compare(stacks[a][depth], stacks[b][depth]));

        let mut level: Vec<NodeId> = Vec::new();
        let mut start = 0;
        while start < members.len() {
            let head = stacks[members[start]][depth];
            let end = members[start..]
                .iter()
                .position(|&m| !same_group(head, stacks[m][depth]))
                .map_or(members.len(), |offset| start + offset);
            let group = &members[start..end];

            let Some(info) = catalog.get(head) else {
                start = end;
                continue;
            };

            let terminal = group.iter().filter(|&&m| stacks[m].len() == depth + 1).count();
            let deeper: Vec<usize> = group
                .iter()
                .copied()
                .filter(|&m| stacks[m].len() > depth + 1)
                .collect();

            let id = NodeId(nodes.len());
            nodes.push(TreeNode {
                frame: head,
                info: info.clone(),
                count: group.len() as u64,
                terminal: terminal as u64,
                children: Vec::new(),
            });
            level.push(id);

            if !deeper.is_empty() {
                work.push(Pending {
                    parent: Some(id),
                    depth: depth + 1,
                    members: deeper,
                });
            }
            start = end;
        }

        match parent {
            Some(parent) => nodes[parent.0].children = level,
            None => roots = level,
        }
    }

    debug!(
        "Call tree: {} nodes, {} roots from {} captures",
        nodes.len(),
        roots.len(),
        stacks.len()
    );

    CallTree { nodes, roots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SymbolTable;

    fn id(raw: usize) -> FrameId {
        FrameId::new(raw).unwrap()
    }

    fn capture(frames: &[usize]) -> Capture {
        Capture::from_outermost(frames.iter().map(|&f| id(f)).collect())
    }

    fn symbols() -> SymbolTable {
        SymbolTable::new()
            .with(id(5), ResolvedFrame::source("helper", "lib.rs", 20))
            .with(id(7), ResolvedFrame::source("main", "main.rs", 3))
            .with(id(9), ResolvedFrame::source("work", "lib.rs", 40))
            .with(id(11), ResolvedFrame::source("work", "lib.rs", 40))
            .with(id(12), ResolvedFrame::native("memcpy", "libc.so.6", 8))
    }

    // (depth, frame, count, terminal) in pre-order
    fn shape(tree: &CallTree) -> Vec<(usize, usize, u64, u64)> {
        tree.preorder()
            .map(|(depth, node)| {
                let node = tree.node(node);
                (depth, node.frame.get(), node.count, node.terminal)
            })
            .collect()
    }

    #[test]
    fn test_reference_tree() {
        let captures = vec![capture(&[7, 5]), capture(&[9, 7])];
        let tree = tree(&captures, &symbols(), TreeOptions::default());
        // roots sorted: lib.rs:work (9) before main.rs:main (7)
        assert_eq!(shape(&tree), vec![(0, 9, 1, 0), (1, 7, 1, 1), (0, 7, 1, 0), (1, 5, 1, 1)]);
    }

    #[test]
    fn test_shared_prefix_and_terminal_counts() {
        let captures = vec![
            capture(&[7]),
            capture(&[7, 9]),
            capture(&[7, 9, 5]),
            capture(&[7, 5]),
        ];
        let tree = tree(&captures, &symbols(), TreeOptions::default());
        assert_eq!(
            shape(&tree),
            vec![(0, 7, 4, 1), (1, 5, 1, 1), (1, 9, 2, 1), (2, 5, 1, 1)]
        );
        assert_eq!(tree.total_count(), 4);
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn test_merge_by_symbol() {
        let captures = vec![capture(&[7, 9]), capture(&[7, 11])];
        let merged = tree(&captures, &symbols(), TreeOptions::default());
        assert_eq!(shape(&merged), vec![(0, 7, 2, 0), (1, 9, 2, 2)]);

        let options = TreeOptions {
            merge_by_symbol: false,
            ..Default::default()
        };
        let split = tree(&captures, &symbols(), options);
        assert_eq!(shape(&split), vec![(0, 7, 2, 0), (1, 9, 1, 1), (1, 11, 1, 1)]);
    }

    #[test]
    fn test_filtered_frames_reattach_children() {
        let captures = vec![capture(&[7, 404, 12, 9]), capture(&[404])];
        let tree = tree(&captures, &symbols(), TreeOptions::default());
        assert_eq!(shape(&tree), vec![(0, 7, 1, 0), (1, 9, 1, 1)]);

        let options = TreeOptions {
            include_native: true,
            ..Default::default()
        };
        let with_native = super::tree(&captures, &symbols(), options);
        assert_eq!(
            shape(&with_native),
            vec![(0, 7, 1, 0), (1, 12, 1, 0), (2, 9, 1, 1)]
        );
    }

    #[test]
    fn test_deep_recursion_is_iterative() {
        let frames = vec![9usize; 50_000];
        let tree = tree(&[capture(&frames)], &symbols(), TreeOptions::default());
        assert_eq!(tree.len(), 50_000);
        assert_eq!(tree.max_depth(), 49_999);
        assert_eq!(tree.preorder().count(), 50_000);
    }

    #[test]
    fn test_conservation() {
        let captures = vec![
            capture(&[7, 9, 5]),
            capture(&[7, 9]),
            capture(&[9, 9, 9]),
            capture(&[5]),
            capture(&[7, 11, 5]),
        ];
        let tree = tree(&captures, &symbols(), TreeOptions::default());
        assert_eq!(tree.total_count(), 5);
        for node in tree.nodes() {
            let children: u64 = node.children.iter().map(|&c| tree.node(c).count).sum();
            assert_eq!(node.count, node.terminal + children);
        }
    }
}
