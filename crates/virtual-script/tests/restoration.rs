//! End-to-end restoration through the swc-backed parser.

use pretty_assertions::assert_eq;
use script_ast::{
    traverse_nodes, NodeId, ParseContext, ParserOptions, Preorder, ScriptParseResult,
};
use source_map::{DocumentLocations, Position, SourceLocation, Span};
use text_size::TextSize;
use virtual_script::{parse_fragment, parse_virtual_script, VirtualScript, VirtualSourceBuilder};

const DOCUMENT: &str = "<script>let a = 1;</script>\n<div>{a}</div>";

/// Synthesizes `let a = 1;\nlet $_expr1 = (a);\n` from [`DOCUMENT`].
fn synthesize(builder: &mut VirtualSourceBuilder<'_>) -> String {
    builder.skip_until_original_offset(8u32);
    builder.append_original(18u32);
    let id = builder.generate_unique_id("expr");
    builder.append_virtual_script(&format!("\nlet {id} = ("));
    builder.skip_until_original_offset(34u32);
    builder.append_original(35u32);
    builder.append_virtual_script(");\n");
    id
}

fn identifiers(result: &ScriptParseResult) -> Vec<(String, Span)> {
    traverse_nodes(&result.ast, &result.visitor_keys)
        .map(|visit| visit.node)
        .filter(|&id| result.ast.node(id).kind == "Identifier")
        .map(|id| {
            let node = result.ast.node(id);
            (
                node.name.as_deref().unwrap_or_default().to_string(),
                result.ast.range_of(id).unwrap_or_default(),
            )
        })
        .collect()
}

fn declares(result: &ScriptParseResult, statement: NodeId, name: &str) -> bool {
    Preorder::new(&result.ast, &result.visitor_keys, statement).any(|visit| {
        let node = result.ast.node(visit.node);
        node.kind == "Identifier" && node.name.as_deref() == Some(name)
    })
}

#[test]
fn test_synthesized_text() {
    let mut builder = VirtualSourceBuilder::new(DOCUMENT);
    let id = synthesize(&mut builder);
    assert_eq!(id, "$_expr1");
    insta::assert_snapshot!(builder.script().trim_end(), @r"
    let a = 1;
    let $_expr1 = (a);
    ");
}

#[test]
fn test_identifiers_restore_to_document() {
    let mut builder = VirtualSourceBuilder::new(DOCUMENT);
    synthesize(&mut builder);
    let ctx = ParseContext::new(ParserOptions::default());
    let result = parse_virtual_script(&ctx, builder.finish(), DOCUMENT).unwrap();

    assert_eq!(
        identifiers(&result),
        vec![
            ("a".to_string(), Span::new(12u32, 13u32)),
            ("$_expr1".to_string(), Span::new(18u32, 18u32)),
            ("a".to_string(), Span::new(34u32, 35u32)),
        ]
    );
    let template_a = traverse_nodes(&result.ast, &result.visitor_keys)
        .map(|visit| visit.node)
        .filter(|&id| result.ast.node(id).name.as_deref() == Some("a"))
        .last()
        .unwrap();
    assert_eq!(
        result.ast.loc_of(template_a),
        Some(SourceLocation::new(Position::new(2, 6), Position::new(2, 7)))
    );
    assert!(result.ast.node(template_a).parent.is_some());
    assert_eq!(result.ast.node(template_a).start, None);
}

#[test]
fn test_injected_tokens_are_dropped() {
    let mut builder = VirtualSourceBuilder::new(DOCUMENT);
    synthesize(&mut builder);
    let ctx = ParseContext::new(ParserOptions::default());
    let result = parse_virtual_script(&ctx, builder.finish(), DOCUMENT).unwrap();

    let tokens: Vec<_> = result
        .tokens
        .iter()
        .map(|token| {
            let range = result.ast.locations.range(token.range);
            (token.value.to_string(), &DOCUMENT[range.to_range()])
        })
        .collect();
    assert_eq!(
        tokens,
        vec![
            ("let".to_string(), "let"),
            ("a".to_string(), "a"),
            ("=".to_string(), "="),
            ("1".to_string(), "1"),
            (";".to_string(), ";"),
            ("a".to_string(), "a"),
        ]
    );
}

#[test]
fn test_statement_restorer_removes_injected_declaration() {
    let mut builder = VirtualSourceBuilder::new(DOCUMENT);
    let id = synthesize(&mut builder);
    builder.add_restore_statement_process(move |statement, result| {
        if !declares(result, statement, &id) {
            return false;
        }
        let root = result.ast.root();
        result.ast.remove_child(root, "body", statement)
    });

    let ctx = ParseContext::new(ParserOptions::default());
    let result = parse_virtual_script(&ctx, builder.finish(), DOCUMENT).unwrap();

    let root = result.ast.root();
    let body = result.ast.node(root).children("body");
    assert_eq!(body.len(), 1);
    assert_eq!(result.ast.node(body[0]).kind, "VariableDeclaration");
    assert_eq!(result.ast.range_of(body[0]), Some(Span::new(8u32, 18u32)));
    assert_eq!(result.ast.node(body[0]).parent, Some(root));
}

#[test]
fn test_kept_context_restores_each_parse() {
    let mut builder = VirtualSourceBuilder::new(DOCUMENT);
    let id = synthesize(&mut builder);
    builder.add_restore_statement_process(move |statement, result| {
        if !declares(result, statement, &id) {
            return false;
        }
        let root = result.ast.root();
        result.ast.remove_child(root, "body", statement)
    });
    let VirtualScript { text, mut context } = builder.finish();
    let ctx = ParseContext::new(ParserOptions::default());
    let locations = DocumentLocations::new(DOCUMENT);

    for _ in 0..2 {
        let mut result = ctx.parse(&text).unwrap();
        context.restore(&mut result, &locations);
        let root = result.ast.root();
        assert_eq!(result.ast.node(root).children("body").len(), 1);
        assert_eq!(context.pending_restorers(), 0);
    }
}

#[test]
fn test_program_spans_copied_text() {
    let mut builder = VirtualSourceBuilder::new(DOCUMENT);
    synthesize(&mut builder);
    let ctx = ParseContext::new(ParserOptions::default());
    let result = parse_virtual_script(&ctx, builder.finish(), DOCUMENT).unwrap();
    let root = result.ast.root();
    assert_eq!(result.ast.range_of(root), Some(Span::new(8u32, 35u32)));
}

#[test]
fn test_virtual_script_error_is_reported_in_document() {
    let document = "<script>let x = ;</script>";
    let mut builder = VirtualSourceBuilder::new(document);
    builder.skip_until_original_offset(8u32);
    builder.append_original(17u32);
    let ctx = ParseContext::new(ParserOptions::default());

    let error = parse_virtual_script(&ctx, builder.finish(), document).unwrap_err();
    assert_eq!(error.index, TextSize::from(16));
    assert_eq!((error.line, error.column), (1, 16));
}

#[test]
fn test_fragment_restores_at_offset() {
    let document = "<div>{x}</div>";
    let ctx = ParseContext::new(ParserOptions::default());
    let result = parse_fragment(&ctx, "x", 6u32.into(), document).unwrap();

    assert_eq!(identifiers(&result), vec![("x".to_string(), Span::new(6u32, 7u32))]);
    let token = &result.tokens[0];
    assert_eq!(result.ast.locations.range(token.range), Span::new(6u32, 7u32));
    assert_eq!(
        result.ast.locations.loc(token.loc),
        SourceLocation::new(Position::new(1, 6), Position::new(1, 7))
    );
}

#[test]
fn test_fragment_error_lands_inside_fragment() {
    let document = "<div>{x +}</div>";
    let ctx = ParseContext::new(ParserOptions::default());
    let error = parse_fragment(&ctx, "x +", 6u32.into(), document).unwrap_err();
    assert!((6..=9).contains(&u32::from(error.index)), "{error:?}");
    assert_eq!(error.line, 1);
}

#[test]
fn test_parser_is_resolved_lazily() {
    let ctx = ParseContext::new(ParserOptions::typescript());
    assert!(!ctx.is_parser_resolved());
    parse_fragment(&ctx, "let n: number = 1;", 0u32.into(), "let n: number = 1;").unwrap();
    assert!(ctx.is_parser_resolved());
}
