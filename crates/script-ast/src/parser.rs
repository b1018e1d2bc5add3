//! The script-parser collaborator and its memoized resolution.

use crate::{Ast, Comment, ScriptError, Token, VisitorKeys};
use once_cell::unsync::OnceCell;
use std::fmt;
use std::rc::Rc;

/// The script dialect to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScriptLang {
    #[default]
    JavaScript,
    TypeScript,
}

/// Whether the script is parsed as an ES module or a classic script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SourceType {
    #[default]
    Module,
    Script,
}

/// Options passed to the script parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ParserOptions {
    /// The script dialect.
    pub lang: ScriptLang,
    /// Module or classic script.
    pub source_type: SourceType,
}

impl ParserOptions {
    /// Options for TypeScript modules.
    pub fn typescript() -> Self {
        Self {
            lang: ScriptLang::TypeScript,
            ..Self::default()
        }
    }
}

/// What a script parser hands back: the tree, the flat token and comment
/// lists, and the visitor keys for walking the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptParseResult {
    pub ast: Ast,
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    pub visitor_keys: VisitorKeys,
}

/// A parser for plain script text.
pub trait ScriptParser {
    /// Parses `text`, reporting errors in `text`'s own coordinates.
    fn parse(&self, text: &str, options: &ParserOptions) -> Result<ScriptParseResult, ScriptError>;
}

impl<F> ScriptParser for F
where
    F: Fn(&str, &ParserOptions) -> Result<ScriptParseResult, ScriptError>,
{
    fn parse(&self, text: &str, options: &ParserOptions) -> Result<ScriptParseResult, ScriptError> {
        self(text, options)
    }
}

/// Lazily resolved parser handle.
///
/// Resolution runs once on first use; [`ParserCache::reset`] forgets the
/// resolved parser so tests can start from a clean slate.
#[derive(Default)]
pub struct ParserCache {
    cell: OnceCell<Rc<dyn ScriptParser>>,
}

impl ParserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached parser, resolving it with `resolve` on first access.
    pub fn get_or_resolve<R>(&self, resolve: R) -> Rc<dyn ScriptParser>
    where
        R: FnOnce() -> Rc<dyn ScriptParser>,
    {
        Rc::clone(self.cell.get_or_init(resolve))
    }

    /// Returns true once a parser has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Drops the resolved parser.
    pub fn reset(&mut self) {
        self.cell.take();
    }
}

impl fmt::Debug for ParserCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserCache")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

type Resolver = Box<dyn Fn() -> Rc<dyn ScriptParser>>;

/// Per-pipeline parse state: options plus the memoized parser.
pub struct ParseContext {
    options: ParserOptions,
    cache: ParserCache,
    resolver: Resolver,
}

impl ParseContext {
    /// Creates a context that resolves to the swc-backed parser.
    pub fn new(options: ParserOptions) -> Self {
        Self::with_resolver(options, || Rc::new(crate::SwcScriptParser::new()))
    }

    /// Creates a context that resolves its parser with `resolver`.
    pub fn with_resolver<R>(options: ParserOptions, resolver: R) -> Self
    where
        R: Fn() -> Rc<dyn ScriptParser> + 'static,
    {
        Self {
            options,
            cache: ParserCache::new(),
            resolver: Box::new(resolver),
        }
    }

    /// Creates a context around an already constructed parser.
    pub fn with_parser<P>(options: ParserOptions, parser: P) -> Self
    where
        P: ScriptParser + 'static,
    {
        let parser: Rc<dyn ScriptParser> = Rc::new(parser);
        Self::with_resolver(options, move || Rc::clone(&parser))
    }

    #[inline]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Returns the parser, resolving it on first use.
    pub fn parser(&self) -> Rc<dyn ScriptParser> {
        self.cache.get_or_resolve(|| (self.resolver)())
    }

    /// Parses `text` with the context's parser and options.
    pub fn parse(&self, text: &str) -> Result<ScriptParseResult, ScriptError> {
        self.parser().parse(text, &self.options)
    }

    /// Forgets the resolved parser; the next parse resolves it again.
    pub fn reset_parser(&mut self) {
        self.cache.reset();
    }

    /// Returns true once the parser has been resolved.
    pub fn is_parser_resolved(&self) -> bool {
        self.cache.is_resolved()
    }
}

impl fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseContext")
            .field("options", &self.options)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn empty_program(_: &str, _: &ParserOptions) -> Result<ScriptParseResult, ScriptError> {
        Ok(ScriptParseResult {
            ast: Ast::new("Program"),
            tokens: Vec::new(),
            comments: Vec::new(),
            visitor_keys: VisitorKeys::estree(),
        })
    }

    #[test]
    fn test_parser_resolves_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let ctx = ParseContext::with_resolver(ParserOptions::default(), move || {
            counter.set(counter.get() + 1);
            Rc::new(empty_program) as Rc<dyn ScriptParser>
        });

        assert!(!ctx.is_parser_resolved());
        ctx.parse("a").unwrap();
        ctx.parse("b").unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_reset_forces_resolution() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut ctx = ParseContext::with_resolver(ParserOptions::default(), move || {
            counter.set(counter.get() + 1);
            Rc::new(empty_program) as Rc<dyn ScriptParser>
        });

        ctx.parse("a").unwrap();
        ctx.reset_parser();
        assert!(!ctx.is_parser_resolved());
        ctx.parse("a").unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_from_json() {
        let options: ParserOptions = serde_json::from_str(r#"{"lang":"typescript"}"#).unwrap();
        assert_eq!(options, ParserOptions::typescript());
        let options: ParserOptions = serde_json::from_str(r#"{"sourceType":"script"}"#).unwrap();
        assert_eq!(options.lang, ScriptLang::JavaScript);
        assert_eq!(options.source_type, SourceType::Script);
    }
}
