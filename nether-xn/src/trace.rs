//! Byte-range tracing overlay
//!
//! A containment tree of labeled `[start, end)` ranges recorded while a
//! container is read. Used by audit tooling to show how every byte of a
//! file was consumed and to spot ranges nobody read. The tree is built on
//! demand from the recorded ranges; it is never persisted.

use crate::error::XnError;
use crate::Result;

/// A raw labeled range as recorded by the read cursor
#[derive(Debug, Clone)]
pub struct TraceRange {
    pub label: String,
    pub start: u32,
    pub end: u32,
}

/// One node of the containment tree
#[derive(Debug, Clone)]
pub struct TraceNode {
    pub label: String,
    pub start: u32,
    pub end: u32,
    pub depth: u32,
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    fn new(label: &str, start: u32, end: u32) -> Self {
        Self {
            label: label.to_string(),
            start,
            end,
            depth: 0,
            children: Vec::new(),
        }
    }

    fn contains(&self, start: u32, end: u32) -> bool {
        start >= self.start && end <= self.end
    }

    fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end && end > self.start
    }
}

/// Containment tree rooted at a node spanning the whole buffer
#[derive(Debug, Clone)]
pub struct TraceTree {
    root: TraceNode,
}

impl TraceTree {
    pub fn new(label: &str, start: u32, end: u32) -> Self {
        Self {
            root: TraceNode::new(label, start, end),
        }
    }

    pub fn root(&self) -> &TraceNode {
        &self.root
    }

    /// Insert a labeled range. The range must be fully nested inside or
    /// fully disjoint from every existing node; a partial overlap means the
    /// producing code mis-measured something and is surfaced as an error.
    pub fn place(&mut self, label: &str, start: u32, end: u32) -> Result<()> {
        Self::place_in(&mut self.root, label, start, end)
    }

    fn place_in(node: &mut TraceNode, label: &str, start: u32, end: u32) -> Result<()> {
        for index in 0..node.children.len() {
            if node.children[index].contains(start, end) {
                return Self::place_in(&mut node.children[index], label, start, end);
            }
            let child = &node.children[index];
            if child.overlaps(start, end) {
                return Err(XnError::TraceOverlap {
                    label: label.to_string(),
                    start,
                    end,
                    other_label: child.label.clone(),
                    other_start: child.start,
                    other_end: child.end,
                });
            }
        }
        node.children.push(TraceNode::new(label, start, end));
        Ok(())
    }

    /// Order children by start offset, the larger range first on ties, so
    /// a container always precedes its contents in iteration order
    pub fn sort(&mut self) {
        fn sort_node(node: &mut TraceNode) {
            node.children.sort_by(|a, b| {
                a.start
                    .cmp(&b.start)
                    .then((b.end - b.start).cmp(&(a.end - a.start)))
            });
            for child in &mut node.children {
                sort_node(child);
            }
        }
        sort_node(&mut self.root);
    }

    /// Nesting depth: each node one deeper than its parent, root at zero
    pub fn assign_depths(&mut self) {
        fn assign(node: &mut TraceNode, depth: u32) {
            node.depth = depth;
            for child in &mut node.children {
                assign(child, depth + 1);
            }
        }
        assign(&mut self.root, 0);
    }

    /// Pre-order traversal of every node, root included
    pub fn flatten(&self) -> Vec<&TraceNode> {
        fn walk<'a>(node: &'a TraceNode, out: &mut Vec<&'a TraceNode>) {
            out.push(node);
            for child in &node.children {
                walk(child, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting() {
        let mut tree = TraceTree::new("file", 0, 1000);
        tree.place("section", 0, 100).unwrap();
        tree.place("table", 10, 20).unwrap();
        tree.place("names", 30, 40).unwrap();

        assert_eq!(tree.root().children.len(), 1);
        let section = &tree.root().children[0];
        assert_eq!(section.label, "section");
        assert_eq!(section.children.len(), 2);
    }

    #[test]
    fn test_partial_overlap_is_a_violation() {
        let mut tree = TraceTree::new("file", 0, 1000);
        tree.place("section", 0, 100).unwrap();
        tree.place("table", 10, 20).unwrap();
        tree.place("names", 30, 40).unwrap();

        assert!(matches!(
            tree.place("straddler", 5, 50),
            Err(XnError::TraceOverlap { .. })
        ));
    }

    #[test]
    fn test_enclosing_a_sibling_is_a_violation() {
        let mut tree = TraceTree::new("file", 0, 1000);
        tree.place("a", 10, 20).unwrap();
        // Neither nested inside "a" nor disjoint from it. Callers must
        // insert containers before contents.
        assert!(matches!(
            tree.place("outer", 0, 100),
            Err(XnError::TraceOverlap { .. })
        ));
    }

    #[test]
    fn test_sort_and_depth() {
        let mut tree = TraceTree::new("file", 0, 1000);
        tree.place("late", 200, 300).unwrap();
        tree.place("early", 0, 100).unwrap();
        tree.place("inner", 20, 30).unwrap();
        tree.sort();
        tree.assign_depths();

        let flat = tree.flatten();
        let labels: Vec<&str> = flat.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["file", "early", "inner", "late"]);
        let depths: Vec<u32> = flat.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_tie_prefers_larger_range() {
        let mut tree = TraceTree::new("file", 0, 1000);
        tree.place("small", 0, 10).unwrap();
        tree.place("peer", 10, 50).unwrap();
        tree.sort();
        let starts: Vec<(u32, u32)> = tree
            .root()
            .children
            .iter()
            .map(|n| (n.start, n.end))
            .collect();
        assert_eq!(starts, vec![(0, 10), (10, 50)]);
    }
}
