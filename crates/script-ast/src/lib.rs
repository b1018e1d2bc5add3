//! ESTree-style parse results and the passes that restore their locations.
//!
//! This crate provides:
//! - An arena tree whose range/loc records can be shared between nodes
//! - Visitor-key driven traversal
//! - Location restoration by a fixed offset or an arbitrary range transform
//! - Parent-link normalization
//! - The script-parser collaborator trait, with an swc-backed implementation
//!
//! # Example
//!
//! ```
//! use script_ast::{fix_locations, ParseContext, ParserOptions};
//! use source_map::DocumentLocations;
//!
//! let document = "<div>{count + 1}</div>";
//! let ctx = ParseContext::new(ParserOptions::default());
//! let mut result = ctx.parse("count + 1").unwrap();
//!
//! fix_locations(&mut result, 6u32.into(), &DocumentLocations::new(document));
//! ```

mod ast;
mod error;
mod parents;
mod parser;
mod relocate;
mod swc;
mod traverse;
mod visitor_keys;

pub use ast::{
    Ast, Comment, CommentKind, LocId, LocationStore, Node, NodeId, RangeId, Token, TokenKind,
};
pub use error::{ParseError, ScriptError, ScriptErrorKind};
pub use parents::set_parents;
pub use parser::{
    ParseContext, ParserCache, ParserOptions, ScriptLang, ScriptParseResult, ScriptParser,
    SourceType,
};
pub use relocate::{fix_locations, remap_locations};
pub use swc::SwcScriptParser;
pub use traverse::{traverse_nodes, Preorder, Visit};
pub use visitor_keys::VisitorKeys;
