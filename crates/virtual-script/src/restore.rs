//! Restores a parse of a synthesized script to original-document coordinates.

use script_ast::{
    remap_locations, set_parents, NodeId, ParseError, ScriptError, ScriptParseResult,
};
use source_map::{LocationConverter, RestoreMap, Span};
use std::fmt;

/// Fixes up one synthetic top-level statement. Returns `true` once it has
/// handled the statement it was registered for.
pub type StatementRestorer = Box<dyn FnMut(NodeId, &mut ScriptParseResult) -> bool>;

/// The restore map of a synthesized script plus its statement restorers.
///
/// A context can be kept and reused to restore later parses of the same
/// synthesized text; every restorer is offered to every pass.
pub struct RestoreContext {
    map: RestoreMap,
    restorers: Vec<StatementRestorer>,
    /// Restorers that did not fire during the last pass.
    unfired: usize,
}

impl RestoreContext {
    pub fn new(map: RestoreMap) -> Self {
        Self::with_restorers(map, Vec::new())
    }

    pub(crate) fn with_restorers(map: RestoreMap, restorers: Vec<StatementRestorer>) -> Self {
        let unfired = restorers.len();
        Self {
            map,
            restorers,
            unfired,
        }
    }

    #[inline]
    pub fn map(&self) -> &RestoreMap {
        &self.map
    }

    /// Number of statement restorers that did not fire during the last
    /// [`RestoreContext::restore`] (all of them before the first one).
    pub fn pending_restorers(&self) -> usize {
        self.unfired
    }

    /// Registers a statement restorer. See
    /// [`VirtualSourceBuilder::add_restore_statement_process`](crate::VirtualSourceBuilder::add_restore_statement_process).
    pub fn add_restore_statement_process<F>(&mut self, process: F)
    where
        F: FnMut(NodeId, &mut ScriptParseResult) -> bool + 'static,
    {
        self.restorers.push(Box::new(process));
        self.unfired += 1;
    }

    /// Rewrites `result`, parsed from the synthesized text, into the
    /// coordinates of the original document.
    ///
    /// Tokens and comments that lie wholly inside injected text are dropped.
    /// Must run at most once per parse result.
    pub fn restore<C>(&mut self, result: &mut ScriptParseResult, converter: &C)
    where
        C: LocationConverter + ?Sized,
    {
        let map = &self.map;
        let token_count = result.tokens.len();
        let comment_count = result.comments.len();
        let locations = &result.ast.locations;
        result
            .tokens
            .retain(|token| !map.is_virtual_span(locations.range(token.range)));
        result
            .comments
            .retain(|comment| !map.is_virtual_span(locations.range(comment.range)));
        tracing::trace!(
            tokens = token_count - result.tokens.len(),
            comments = comment_count - result.comments.len(),
            "dropped virtual tokens"
        );

        remap_locations(result, |range| map.remap_span(range), converter);
        self.restore_statements(result);
        set_parents(&mut result.ast, &result.visitor_keys);
    }

    /// Translates an error raised on the synthesized text into the original
    /// document.
    pub fn restore_error<C>(&self, error: &ScriptError, converter: &C) -> ParseError
    where
        C: LocationConverter + ?Sized,
    {
        let index = self.map.remap_span(Span::empty(error.offset)).start;
        error.at_document_index(index, converter)
    }

    fn restore_statements(&mut self, result: &mut ScriptParseResult) {
        if self.restorers.is_empty() {
            return;
        }
        let mut fired = vec![false; self.restorers.len()];
        let mut unfired = fired.len();
        let root = result.ast.root();
        let body = result.ast.node(root).children("body").to_vec();
        for statement in body {
            if unfired == 0 {
                break;
            }
            for (restorer, fired) in self.restorers.iter_mut().zip(fired.iter_mut()) {
                if !*fired && restorer(statement, &mut *result) {
                    *fired = true;
                    unfired -= 1;
                    break;
                }
            }
        }
        self.unfired = unfired;
        if unfired > 0 {
            tracing::debug!(pending = unfired, "statement restorers never fired");
        }
    }
}

impl fmt::Debug for RestoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestoreContext")
            .field("map", &self.map)
            .field("restorers", &self.restorers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use script_ast::{Ast, Comment, CommentKind, Node, Token, TokenKind, VisitorKeys};
    use source_map::{DocumentLocations, Position, SourceLocation};
    use std::cell::Cell;
    use std::rc::Rc;
    use text_size::TextSize;

    /// Synthesized `let $_tmp1;x` for the document `<div>{x}</div>`.
    fn tmp_map() -> RestoreMap {
        let mut map = RestoreMap::new();
        map.push_virtual(Span::new(0u32, 11u32));
        map.push_copy(TextSize::from(6), Span::new(11u32, 12u32));
        map
    }

    fn tmp_parse() -> (ScriptParseResult, NodeId, NodeId) {
        let script = DocumentLocations::new("let $_tmp1;x");
        let mut ast = Ast::new("Program");
        let decl = ast.alloc_at(
            Node::new("VariableDeclaration"),
            script.convert(Span::new(0u32, 11u32)),
        );
        let stmt = ast.alloc_at(
            Node::new("ExpressionStatement"),
            script.convert(Span::new(11u32, 12u32)),
        );
        let ident = ast.alloc_at(
            Node::new("Identifier").with_name("x"),
            script.convert(Span::new(11u32, 12u32)),
        );
        let root = ast.root();
        ast.push_child(root, "body", decl);
        ast.push_child(root, "body", stmt);
        ast.push_child(stmt, "expression", ident);

        let mut tokens = Vec::new();
        let spans = [("let", 0u32, 3u32), ("$_tmp1", 4, 10), (";", 10, 11), ("x", 11, 12)];
        for (value, start, end) in spans {
            let pair = script.convert(Span::new(start, end));
            let (range, loc) = ast.locations.alloc_pair(pair);
            tokens.push(Token {
                kind: TokenKind::classify(value),
                value: value.into(),
                range,
                loc,
                start: Some(start.into()),
                end: Some(end.into()),
            });
        }
        let (range, loc) = ast.locations.alloc_pair(script.convert(Span::new(4u32, 10u32)));
        let comments = vec![Comment {
            kind: CommentKind::Block,
            value: "synthetic".into(),
            range,
            loc,
            start: None,
            end: None,
        }];
        let result = ScriptParseResult {
            ast,
            tokens,
            comments,
            visitor_keys: VisitorKeys::estree(),
        };
        (result, decl, ident)
    }

    #[test]
    fn test_virtual_tokens_are_dropped() {
        let (mut result, _, ident) = tmp_parse();
        let doc = DocumentLocations::new("<div>{x}</div>");
        RestoreContext::new(tmp_map()).restore(&mut result, &doc);

        let values: Vec<_> = result.tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["x"]);
        assert!(result.comments.is_empty());
        assert_eq!(result.ast.range_of(ident), Some(Span::new(6u32, 7u32)));
        assert_eq!(
            result.ast.loc_of(ident),
            Some(SourceLocation::new(Position::new(1, 6), Position::new(1, 7)))
        );
    }

    #[test]
    fn test_virtual_node_collapses_to_fragment_start() {
        let (mut result, decl, _) = tmp_parse();
        let doc = DocumentLocations::new("<div>{x}</div>");
        RestoreContext::new(tmp_map()).restore(&mut result, &doc);
        // The fragment starts before the first point, so the first point's
        // shift applies and saturates at zero.
        assert_eq!(result.ast.range_of(decl), Some(Span::new(0u32, 0u32)));
    }

    #[test]
    fn test_restorer_fires_once_and_removes_statement() {
        let (mut result, decl, ident) = tmp_parse();
        let doc = DocumentLocations::new("<div>{x}</div>");
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let mut ctx = RestoreContext::new(tmp_map());
        ctx.add_restore_statement_process(move |statement, result| {
            counter.set(counter.get() + 1);
            if result.ast.node(statement).kind != "VariableDeclaration" {
                return false;
            }
            let root = result.ast.root();
            result.ast.remove_child(root, "body", statement)
        });
        ctx.restore(&mut result, &doc);

        assert_eq!(calls.get(), 1);
        assert_eq!(ctx.pending_restorers(), 0);
        let root = result.ast.root();
        assert!(!result.ast.node(root).children("body").contains(&decl));
        assert_eq!(result.ast.node(decl).parent, None);
        let stmt = result.ast.node(ident).parent;
        assert_eq!(stmt.and_then(|s| result.ast.node(s).parent), Some(root));
    }

    #[test]
    fn test_context_restores_later_parses() {
        let doc = DocumentLocations::new("<div>{x}</div>");
        let mut ctx = RestoreContext::new(tmp_map());
        ctx.add_restore_statement_process(|statement, result| {
            if result.ast.node(statement).kind != "VariableDeclaration" {
                return false;
            }
            let root = result.ast.root();
            result.ast.remove_child(root, "body", statement)
        });

        for _ in 0..2 {
            let (mut result, decl, _) = tmp_parse();
            ctx.restore(&mut result, &doc);
            let root = result.ast.root();
            assert_eq!(result.ast.node(root).children("body").len(), 1);
            assert!(!result.ast.node(root).children("body").contains(&decl));
            assert_eq!(ctx.pending_restorers(), 0);
        }
    }

    #[test]
    fn test_unmatched_restorer_stays_pending() {
        let (mut result, _, _) = tmp_parse();
        let doc = DocumentLocations::new("<div>{x}</div>");
        let mut ctx = RestoreContext::new(tmp_map());
        ctx.add_restore_statement_process(|_, _| false);
        ctx.restore(&mut result, &doc);
        assert_eq!(ctx.pending_restorers(), 1);
    }

    #[test]
    fn test_error_is_reported_in_document() {
        let doc = DocumentLocations::new("<div>{x}</div>");
        let ctx = RestoreContext::new(tmp_map());
        let error = ScriptError::syntax("Unexpected token", 12u32);
        let restored = ctx.restore_error(&error, &doc);
        assert_eq!(restored.index, TextSize::from(7));
        assert_eq!((restored.line, restored.column), (1, 7));
        assert_eq!(restored.message, "Unexpected token");
    }
}
