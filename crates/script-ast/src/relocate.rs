//! Rewrites the locations of a parse result into original-document coordinates.
//!
//! A parse result comes back from the script parser in the coordinates of the
//! text it was given. [`fix_locations`] moves everything by a fixed offset;
//! [`remap_locations`] accepts any range transform, which is how map-driven
//! restoration of a synthesized script plugs in. Both rewrite every distinct
//! range/loc record exactly once, no matter how many nodes share it.

use crate::{Ast, LocId, LocationStore, NodeId, RangeId, ScriptParseResult, VisitorKeys};
use source_map::{ByteOffset, LocationConverter, Span};
use text_size::TextSize;

/// Shifts every location of `result` by `offset` and converts it with `converter`.
///
/// An `offset` of zero is a no-op.
pub fn fix_locations<C>(result: &mut ScriptParseResult, offset: ByteOffset, converter: &C)
where
    C: LocationConverter + ?Sized,
{
    if offset == TextSize::from(0) {
        return;
    }
    remap_locations(result, |range| range.shifted(offset), converter);
}

/// Transforms every location of `result` with `remap`, then converts it.
///
/// `remap` is applied once per distinct range record. Nodes without a range
/// are left untouched.
pub fn remap_locations<F, C>(result: &mut ScriptParseResult, remap: F, converter: &C)
where
    F: FnMut(Span) -> Span,
    C: LocationConverter + ?Sized,
{
    let ScriptParseResult {
        ast,
        tokens,
        comments,
        visitor_keys,
    } = result;

    let mut fixer = LocationFixer::new(ast, remap, converter);
    fixer.fix_tree(ast, visitor_keys);
    for token in tokens.iter_mut() {
        fixer.fix_record(&mut ast.locations, token.range, token.loc);
        token.start = None;
        token.end = None;
    }
    for comment in comments.iter_mut() {
        fixer.fix_record(&mut ast.locations, comment.range, comment.loc);
        comment.start = None;
        comment.end = None;
    }

    tracing::debug!(
        nodes = fixer.fixed_nodes,
        tokens = tokens.len(),
        comments = comments.len(),
        "restored locations"
    );
}

struct LocationFixer<'c, F, C: ?Sized> {
    remap: F,
    converter: &'c C,
    visited_nodes: Vec<bool>,
    visited_ranges: Vec<bool>,
    visited_locs: Vec<bool>,
    fixed_nodes: usize,
}

impl<'c, F, C> LocationFixer<'c, F, C>
where
    F: FnMut(Span) -> Span,
    C: LocationConverter + ?Sized,
{
    fn new(ast: &Ast, remap: F, converter: &'c C) -> Self {
        Self {
            remap,
            converter,
            visited_nodes: vec![false; ast.len()],
            visited_ranges: vec![false; ast.locations.range_count()],
            visited_locs: vec![false; ast.locations.loc_count()],
            fixed_nodes: 0,
        }
    }

    fn fix_tree(&mut self, ast: &mut Ast, keys: &VisitorKeys) {
        let order: Vec<NodeId> = crate::traverse_nodes(ast, keys).map(|v| v.node).collect();

        for id in order {
            if std::mem::replace(&mut self.visited_nodes[id.index()], true) {
                continue;
            }

            let node = &ast.nodes[id.index()];
            let Some(range) = node.range else {
                if cfg!(debug_assertions) {
                    tracing::warn!(
                        kind = %node.kind,
                        "node has no range; its location is left untouched"
                    );
                }
                continue;
            };

            let loc = match node.loc {
                Some(loc) => loc,
                None => {
                    // A range without a loc still gets both halves written.
                    let loc = ast.locations.alloc_loc(Default::default());
                    self.visited_locs.push(false);
                    loc
                }
            };

            let node = &mut ast.nodes[id.index()];
            node.loc = Some(loc);
            node.start = None;
            node.end = None;
            self.fix_record(&mut ast.locations, range, loc);
            self.fixed_nodes += 1;
        }
    }

    /// Rewrites one range/loc pair, skipping halves that were already done.
    fn fix_record(&mut self, locations: &mut LocationStore, range: RangeId, loc: LocId) {
        if self.visited_ranges[range.index()] {
            // The range is already in target coordinates; only an unshared
            // loc still needs converting.
            if !self.visited_locs[loc.index()] {
                let pair = self.converter.convert(locations.range(range));
                locations.set_loc(loc, pair.loc);
                self.visited_locs[loc.index()] = true;
            }
            return;
        }

        let target = (self.remap)(locations.range(range));
        let pair = self.converter.convert(target);
        locations.set_range(range, pair.range);
        self.visited_ranges[range.index()] = true;
        if !self.visited_locs[loc.index()] {
            locations.set_loc(loc, pair.loc);
            self.visited_locs[loc.index()] = true;
        }
    }
}
