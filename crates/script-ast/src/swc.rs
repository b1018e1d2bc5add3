//! Script parser backed by `swc_ecma_parser`.
//!
//! The swc AST is folded into the generic arena tree: statements,
//! declarations, expressions, patterns, identifiers and literals become
//! nodes with ESTree type tags. Wrapper nodes that ESTree has no type for
//! (parentheses, binding-identifier wrappers, `Stmt::Decl`) are elided.
//! Children of `Program` are stored under `body`, all other children under
//! `children`, and the returned visitor keys say so.

use crate::{
    Ast, Comment, CommentKind, Node, NodeId, ParserOptions, ScriptError, ScriptLang,
    ScriptParseResult, ScriptParser, SourceType, Token, TokenKind, VisitorKeys,
};
use smol_str::SmolStr;
use source_map::{DocumentLocations, LocationConverter, Span};
use std::sync::Arc;
use swc_common::comments::{CommentKind as SwcCommentKind, SingleThreadedComments};
use swc_common::{BytePos, FileName, SourceMap, Span as SwcSpan, Spanned};
use swc_ecma_ast::{
    BinaryOp, Decl, Expr, Ident, IdentName, Lit, ModuleDecl, Pat, Stmt, VarDeclarator,
};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

const BODY_KEY: &str = "body";
const CHILDREN_KEY: &str = "children";

/// Parses script text with swc.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwcScriptParser;

impl SwcScriptParser {
    pub fn new() -> Self {
        Self
    }
}

fn syntax_for(options: &ParserOptions) -> Syntax {
    match options.lang {
        ScriptLang::TypeScript => Syntax::Typescript(TsSyntax {
            tsx: false,
            ..Default::default()
        }),
        ScriptLang::JavaScript => Syntax::Es(EsSyntax {
            jsx: false,
            ..Default::default()
        }),
    }
}

fn to_script_error(error: &swc_ecma_parser::error::Error, file_start: BytePos) -> ScriptError {
    let offset = error.span().lo.0.saturating_sub(file_start.0);
    ScriptError::syntax(error.kind().msg().to_string(), offset)
}

impl ScriptParser for SwcScriptParser {
    fn parse(&self, text: &str, options: &ParserOptions) -> Result<ScriptParseResult, ScriptError> {
        let cm: Arc<SourceMap> = Default::default();
        let fm = cm.new_source_file(
            FileName::Custom("virtual-script".into()).into(),
            text.to_string(),
        );
        let file_start = fm.start_pos;
        let syntax = syntax_for(options);
        let comments = SingleThreadedComments::default();

        let mut builder = TreeBuilder::new(text, file_start);
        let mut parser = Parser::new(syntax, StringInput::from(&*fm), Some(&comments));
        match options.source_type {
            SourceType::Module => {
                let module = parser
                    .parse_module()
                    .map_err(|e| to_script_error(&e, file_start))?;
                if let Some(error) = parser.take_errors().first() {
                    return Err(to_script_error(error, file_start));
                }
                module.visit_with(&mut builder);
            }
            SourceType::Script => {
                let script = parser
                    .parse_script()
                    .map_err(|e| to_script_error(&e, file_start))?;
                if let Some(error) = parser.take_errors().first() {
                    return Err(to_script_error(error, file_start));
                }
                script.visit_with(&mut builder);
            }
        }

        let lexer = Lexer::new(syntax, Default::default(), StringInput::from(&*fm), None);
        for token in lexer {
            builder.push_token(token.span);
        }
        builder.push_comments(&comments);

        Ok(builder.finish())
    }
}

struct TreeBuilder<'t> {
    text: &'t str,
    file_start: BytePos,
    locations: DocumentLocations<'t>,
    ast: Ast,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    keys: VisitorKeys,
    stack: Vec<NodeId>,
}

impl<'t> TreeBuilder<'t> {
    fn new(text: &'t str, file_start: BytePos) -> Self {
        let locations = DocumentLocations::new(text);
        let mut ast = Ast::new("Program");
        let root = ast.root();
        let whole = Span::new(0u32, text.len() as u32);
        let (range, loc) = ast.locations.alloc_pair(locations.convert(whole));
        let program = ast.node_mut(root);
        program.range = Some(range);
        program.loc = Some(loc);

        let mut keys = VisitorKeys::new();
        keys.insert("Program", [BODY_KEY]);

        Self {
            text,
            file_start,
            locations,
            ast,
            tokens: Vec::new(),
            comments: Vec::new(),
            keys,
            stack: vec![root],
        }
    }

    fn rebase(&self, span: SwcSpan) -> Span {
        Span::new(
            span.lo.0.saturating_sub(self.file_start.0),
            span.hi.0.saturating_sub(self.file_start.0),
        )
    }

    fn slice(&self, span: Span) -> &'t str {
        let (start, end) = span.to_u32_pair();
        self.text.get(start as usize..end as usize).unwrap_or("")
    }

    fn with_node<F>(&mut self, kind: &'static str, span: SwcSpan, name: Option<SmolStr>, f: F)
    where
        F: FnOnce(&mut Self),
    {
        let span = self.rebase(span);
        let mut node = Node::new(kind);
        node.name = name;
        node.start = Some(span.start);
        node.end = Some(span.end);
        let id = self.ast.alloc_at(node, self.locations.convert(span));

        let root = self.ast.root();
        let parent = self.stack.last().copied().unwrap_or(root);
        let key = if parent == root { BODY_KEY } else { CHILDREN_KEY };
        self.ast.push_child(parent, key, id);
        if !self.keys.contains(kind) {
            self.keys.insert(kind, [CHILDREN_KEY]);
        }

        self.stack.push(id);
        f(self);
        self.stack.pop();
    }

    fn push_token(&mut self, span: SwcSpan) {
        let span = self.rebase(span);
        let value = self.slice(span);
        let (range, loc) = self.ast.locations.alloc_pair(self.locations.convert(span));
        self.tokens.push(Token {
            kind: TokenKind::classify(value),
            value: SmolStr::new(value),
            range,
            loc,
            start: Some(span.start),
            end: Some(span.end),
        });
    }

    fn push_comments(&mut self, comments: &SingleThreadedComments) {
        let (leading, trailing) = comments.borrow_all();
        let mut all: Vec<_> = leading
            .values()
            .chain(trailing.values())
            .flatten()
            .map(|c| (c.span, c.kind, SmolStr::new(&*c.text)))
            .collect();
        all.sort_by_key(|(span, _, _)| span.lo);
        all.dedup_by_key(|(span, _, _)| span.lo);

        for (span, kind, text) in all {
            let span = self.rebase(span);
            let (range, loc) = self.ast.locations.alloc_pair(self.locations.convert(span));
            self.comments.push(Comment {
                kind: match kind {
                    SwcCommentKind::Line => CommentKind::Line,
                    SwcCommentKind::Block => CommentKind::Block,
                },
                value: text,
                range,
                loc,
                start: Some(span.start),
                end: Some(span.end),
            });
        }
    }

    fn finish(self) -> ScriptParseResult {
        ScriptParseResult {
            ast: self.ast,
            tokens: self.tokens,
            comments: self.comments,
            visitor_keys: self.keys,
        }
    }
}

fn stmt_kind(stmt: &Stmt) -> Option<&'static str> {
    Some(match stmt {
        Stmt::Decl(_) => return None,
        Stmt::Block(_) => "BlockStatement",
        Stmt::Empty(_) => "EmptyStatement",
        Stmt::Debugger(_) => "DebuggerStatement",
        Stmt::With(_) => "WithStatement",
        Stmt::Return(_) => "ReturnStatement",
        Stmt::Labeled(_) => "LabeledStatement",
        Stmt::Break(_) => "BreakStatement",
        Stmt::Continue(_) => "ContinueStatement",
        Stmt::If(_) => "IfStatement",
        Stmt::Switch(_) => "SwitchStatement",
        Stmt::Throw(_) => "ThrowStatement",
        Stmt::Try(_) => "TryStatement",
        Stmt::While(_) => "WhileStatement",
        Stmt::DoWhile(_) => "DoWhileStatement",
        Stmt::For(_) => "ForStatement",
        Stmt::ForIn(_) => "ForInStatement",
        Stmt::ForOf(_) => "ForOfStatement",
        Stmt::Expr(_) => "ExpressionStatement",
        #[allow(unreachable_patterns)]
        _ => "Statement",
    })
}

fn decl_kind(decl: &Decl) -> &'static str {
    match decl {
        Decl::Class(_) => "ClassDeclaration",
        Decl::Fn(_) => "FunctionDeclaration",
        Decl::Var(_) => "VariableDeclaration",
        Decl::TsInterface(_) => "TSInterfaceDeclaration",
        Decl::TsTypeAlias(_) => "TSTypeAliasDeclaration",
        Decl::TsEnum(_) => "TSEnumDeclaration",
        Decl::TsModule(_) => "TSModuleDeclaration",
        #[allow(unreachable_patterns)]
        _ => "Declaration",
    }
}

fn expr_kind(expr: &Expr) -> Option<&'static str> {
    Some(match expr {
        Expr::Ident(_) | Expr::Lit(_) | Expr::Paren(_) => return None,
        Expr::This(_) => "ThisExpression",
        Expr::Array(_) => "ArrayExpression",
        Expr::Object(_) => "ObjectExpression",
        Expr::Fn(_) => "FunctionExpression",
        Expr::Unary(_) => "UnaryExpression",
        Expr::Update(_) => "UpdateExpression",
        Expr::Bin(bin)
            if matches!(
                bin.op,
                BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
            ) =>
        {
            "LogicalExpression"
        }
        Expr::Bin(_) => "BinaryExpression",
        Expr::Assign(_) => "AssignmentExpression",
        Expr::Member(_) | Expr::SuperProp(_) => "MemberExpression",
        Expr::Cond(_) => "ConditionalExpression",
        Expr::Call(_) => "CallExpression",
        Expr::New(_) => "NewExpression",
        Expr::Seq(_) => "SequenceExpression",
        Expr::Tpl(_) => "TemplateLiteral",
        Expr::TaggedTpl(_) => "TaggedTemplateExpression",
        Expr::Arrow(_) => "ArrowFunctionExpression",
        Expr::Class(_) => "ClassExpression",
        Expr::Yield(_) => "YieldExpression",
        Expr::MetaProp(_) => "MetaProperty",
        Expr::Await(_) => "AwaitExpression",
        Expr::OptChain(_) => "ChainExpression",
        Expr::TsAs(_) => "TSAsExpression",
        Expr::TsNonNull(_) => "TSNonNullExpression",
        Expr::TsSatisfies(_) => "TSSatisfiesExpression",
        _ => "Expression",
    })
}

fn pat_kind(pat: &Pat) -> Option<&'static str> {
    match pat {
        Pat::Array(_) => Some("ArrayPattern"),
        Pat::Object(_) => Some("ObjectPattern"),
        Pat::Rest(_) => Some("RestElement"),
        Pat::Assign(_) => Some("AssignmentPattern"),
        _ => None,
    }
}

fn module_decl_kind(decl: &ModuleDecl) -> &'static str {
    match decl {
        ModuleDecl::Import(_) => "ImportDeclaration",
        ModuleDecl::ExportDecl(_) | ModuleDecl::ExportNamed(_) => "ExportNamedDeclaration",
        ModuleDecl::ExportDefaultDecl(_) | ModuleDecl::ExportDefaultExpr(_) => {
            "ExportDefaultDeclaration"
        }
        ModuleDecl::ExportAll(_) => "ExportAllDeclaration",
        _ => "ModuleDeclaration",
    }
}

impl Visit for TreeBuilder<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt_kind(stmt) {
            Some(kind) => self.with_node(kind, stmt.span(), None, |b| {
                stmt.visit_children_with(b)
            }),
            None => stmt.visit_children_with(self),
        }
    }

    fn visit_decl(&mut self, decl: &Decl) {
        self.with_node(decl_kind(decl), decl.span(), None, |b| {
            decl.visit_children_with(b)
        });
    }

    fn visit_var_declarator(&mut self, declarator: &VarDeclarator) {
        self.with_node("VariableDeclarator", declarator.span, None, |b| {
            declarator.visit_children_with(b)
        });
    }

    fn visit_module_decl(&mut self, decl: &ModuleDecl) {
        self.with_node(module_decl_kind(decl), decl.span(), None, |b| {
            decl.visit_children_with(b)
        });
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match expr_kind(expr) {
            Some(kind) => self.with_node(kind, expr.span(), None, |b| {
                expr.visit_children_with(b)
            }),
            None => expr.visit_children_with(self),
        }
    }

    fn visit_pat(&mut self, pat: &Pat) {
        match pat_kind(pat) {
            Some(kind) => self.with_node(kind, pat.span(), None, |b| pat.visit_children_with(b)),
            None => pat.visit_children_with(self),
        }
    }

    fn visit_ident(&mut self, ident: &Ident) {
        self.with_node("Identifier", ident.span, Some(SmolStr::new(&ident.sym)), |_| {});
    }

    // Property names (`a.b`, `{ b: 1 }`) are `IdentName` in swc, not `Ident`.
    fn visit_ident_name(&mut self, ident: &IdentName) {
        self.with_node("Identifier", ident.span, Some(SmolStr::new(&ident.sym)), |_| {});
    }

    fn visit_lit(&mut self, lit: &Lit) {
        let raw = SmolStr::new(self.slice(self.rebase(lit.span())));
        self.with_node("Literal", lit.span(), Some(raw), |_| {});
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names_of_kind(result: &ScriptParseResult, kind: &str) -> Vec<(SmolStr, Span)> {
        crate::traverse_nodes(&result.ast, &result.visitor_keys)
            .map(|v| v.node)
            .filter(|&id| result.ast.node(id).kind == kind)
            .map(|id| {
                let node = result.ast.node(id);
                (
                    node.name.clone().unwrap_or_default(),
                    result.ast.range_of(id).unwrap_or_default(),
                )
            })
            .collect()
    }

    #[test]
    fn test_identifiers_are_zero_based() {
        let result = SwcScriptParser::new()
            .parse("let count = 1;\ncount;", &ParserOptions::default())
            .unwrap();
        assert_eq!(
            names_of_kind(&result, "Identifier"),
            vec![
                (SmolStr::new("count"), Span::new(4u32, 9u32)),
                (SmolStr::new("count"), Span::new(15u32, 20u32)),
            ]
        );
    }

    #[test]
    fn test_statement_structure() {
        let result = SwcScriptParser::new()
            .parse("let x = 1;", &ParserOptions::default())
            .unwrap();
        let ast = &result.ast;
        let body = ast.node(ast.root()).children(BODY_KEY);
        assert_eq!(body.len(), 1);
        assert_eq!(ast.node(body[0]).kind, "VariableDeclaration");
        let declarator = ast.node(body[0]).children(CHILDREN_KEY)[0];
        assert_eq!(ast.node(declarator).kind, "VariableDeclarator");
        assert_eq!(names_of_kind(&result, "Literal")[0].0, "1");
    }

    #[test]
    fn test_tokens_and_comments() {
        let result = SwcScriptParser::new()
            .parse("// note\nfoo(1);", &ParserOptions::default())
            .unwrap();
        let values: Vec<_> = result.tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["foo", "(", "1", ")", ";"]);
        assert_eq!(result.tokens[0].kind, TokenKind::Identifier);

        assert_eq!(result.comments.len(), 1);
        assert_eq!(result.comments[0].kind, CommentKind::Line);
        assert_eq!(result.comments[0].value, " note");
        assert_eq!(
            result.ast.locations.range(result.comments[0].range),
            Span::new(0u32, 7u32)
        );
    }

    #[test]
    fn test_syntax_error_offset() {
        let error = SwcScriptParser::new()
            .parse("let x = ;", &ParserOptions::default())
            .unwrap_err();
        assert_eq!(u32::from(error.offset), 8);
    }

    #[test]
    fn test_typescript_annotations() {
        let result = SwcScriptParser::new()
            .parse("let n: number = 1;", &ParserOptions::typescript())
            .unwrap();
        assert_eq!(names_of_kind(&result, "Identifier")[0].0, "n");
    }

    #[test]
    fn test_member_property_is_an_identifier() {
        let result = SwcScriptParser::new()
            .parse("a.b;", &ParserOptions::default())
            .unwrap();
        assert_eq!(
            names_of_kind(&result, "Identifier"),
            vec![
                (SmolStr::new("a"), Span::new(0u32, 1u32)),
                (SmolStr::new("b"), Span::new(2u32, 3u32)),
            ]
        );
        let member = crate::traverse_nodes(&result.ast, &result.visitor_keys)
            .find(|v| result.ast.node(v.node).kind == "MemberExpression")
            .unwrap();
        assert_eq!(result.ast.node(member.node).children(CHILDREN_KEY).len(), 2);
    }
}
