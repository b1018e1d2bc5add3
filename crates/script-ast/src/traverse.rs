//! Depth-first traversal driven by visitor keys.

use crate::{Ast, NodeId, VisitorKeys};

/// One step of a traversal: a node and the node it was reached from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    pub node: NodeId,
    pub parent: Option<NodeId>,
}

/// Pre-order iterator over the nodes reachable from a root.
///
/// A node reachable through several properties is yielded once per edge,
/// but its children are only expanded the first time it is seen.
pub struct Preorder<'a> {
    ast: &'a Ast,
    keys: &'a VisitorKeys,
    stack: Vec<Visit>,
    expanded: Vec<bool>,
}

impl<'a> Preorder<'a> {
    /// Starts a traversal at `root`.
    pub fn new(ast: &'a Ast, keys: &'a VisitorKeys, root: NodeId) -> Self {
        Self {
            ast,
            keys,
            stack: vec![Visit {
                node: root,
                parent: None,
            }],
            expanded: vec![false; ast.len()],
        }
    }

    fn push_children(&mut self, id: NodeId) {
        let (ast, keys) = (self.ast, self.keys);
        let node = ast.node(id);
        let start = self.stack.len();
        let edges = |children: &'a [NodeId]| {
            children.iter().map(move |&child| Visit {
                node: child,
                parent: Some(id),
            })
        };
        match keys.get(&node.kind) {
            Some(props) => {
                for prop in props {
                    self.stack.extend(edges(node.children(prop)));
                }
            }
            None => {
                for prop in node.child_keys() {
                    self.stack.extend(edges(node.children(prop)));
                }
            }
        }
        // Children were pushed in source order; the stack pops from the back.
        self.stack[start..].reverse();
    }
}

impl Iterator for Preorder<'_> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        let visit = self.stack.pop()?;
        let seen = &mut self.expanded[visit.node.index()];
        if !*seen {
            *seen = true;
            self.push_children(visit.node);
        }
        Some(visit)
    }
}

/// Walks the whole tree from its root.
pub fn traverse_nodes<'a>(ast: &'a Ast, keys: &'a VisitorKeys) -> Preorder<'a> {
    Preorder::new(ast, keys, ast.root())
}
