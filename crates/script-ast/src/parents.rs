//! Parent-link normalization.

use crate::{traverse_nodes, Ast, VisitorKeys};

/// Points every reachable node at its syntactic parent.
///
/// Does nothing if any direct child of the root already has a parent link,
/// since the producing parser then linked the tree itself.
pub fn set_parents(ast: &mut Ast, keys: &VisitorKeys) {
    let root = ast.node(ast.root());
    let already_linked = root
        .child_keys()
        .flat_map(|key| root.children(key))
        .any(|&child| ast.node(child).parent.is_some());
    if already_linked {
        return;
    }

    let links: Vec<_> = traverse_nodes(ast, keys).collect();
    for visit in links {
        ast.node_mut(visit.node).parent = visit.parent;
    }
}
