//! Arena-backed ESTree-style tree produced by script parsers.
//!
//! Ranges and line/column locations live in a [`LocationStore`] and are
//! referenced by id. Two nodes may point at the same [`RangeId`] or
//! [`LocId`]; that is how a parser expresses a shared location record, and
//! it is what restoration has to guard against rewriting twice.

use indexmap::IndexMap;
use smol_str::SmolStr;
use source_map::{ByteOffset, CoordinatePair, Span, SourceLocation};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Returns the arena index of this id.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Index of a node in an [`Ast`].
    NodeId
);
arena_id!(
    /// Index of a range record in a [`LocationStore`].
    RangeId
);
arena_id!(
    /// Index of a line/column record in a [`LocationStore`].
    LocId
);

/// Storage for range and line/column records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationStore {
    ranges: Vec<Span>,
    locs: Vec<SourceLocation>,
}

impl LocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_range(&mut self, range: Span) -> RangeId {
        self.ranges.push(range);
        RangeId(self.ranges.len() as u32 - 1)
    }

    pub fn alloc_loc(&mut self, loc: SourceLocation) -> LocId {
        self.locs.push(loc);
        LocId(self.locs.len() as u32 - 1)
    }

    /// Allocates both halves of a coordinate pair.
    pub fn alloc_pair(&mut self, pair: CoordinatePair) -> (RangeId, LocId) {
        (self.alloc_range(pair.range), self.alloc_loc(pair.loc))
    }

    #[inline]
    pub fn range(&self, id: RangeId) -> Span {
        self.ranges[id.index()]
    }

    #[inline]
    pub fn loc(&self, id: LocId) -> SourceLocation {
        self.locs[id.index()]
    }

    #[inline]
    pub fn set_range(&mut self, id: RangeId, range: Span) {
        self.ranges[id.index()] = range;
    }

    #[inline]
    pub fn set_loc(&mut self, id: LocId, loc: SourceLocation) {
        self.locs[id.index()] = loc;
    }

    #[inline]
    pub fn range_count(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn loc_count(&self) -> usize {
        self.locs.len()
    }
}

/// A tree node.
///
/// Nodes are shape-agnostic: `kind` is the ESTree type tag and child nodes
/// are grouped under named properties. [`crate::VisitorKeys`] decides which
/// properties are walked and in what order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// The ESTree type tag, e.g. `Identifier`.
    pub kind: SmolStr,
    /// Identifier name or literal source text, when the node has one.
    pub name: Option<SmolStr>,
    /// Canonical byte range.
    pub range: Option<RangeId>,
    /// Canonical line/column location.
    pub loc: Option<LocId>,
    /// Transient start shortcut some parsers emit next to `range`.
    pub start: Option<ByteOffset>,
    /// Transient end shortcut some parsers emit next to `range`.
    pub end: Option<ByteOffset>,
    /// Syntactic parent, filled in by [`crate::set_parents`].
    pub parent: Option<NodeId>,
    children: IndexMap<SmolStr, Vec<NodeId>>,
}

impl Node {
    /// Creates a node with no location and no children.
    pub fn new(kind: impl Into<SmolStr>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            range: None,
            loc: None,
            start: None,
            end: None,
            parent: None,
            children: IndexMap::new(),
        }
    }

    /// Sets the node's name.
    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches existing range/loc records.
    pub fn with_location(mut self, range: RangeId, loc: LocId) -> Self {
        self.range = Some(range);
        self.loc = Some(loc);
        self
    }

    /// Returns the children stored under `key`.
    pub fn children(&self, key: &str) -> &[NodeId] {
        self.children.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the child property names in insertion order.
    pub fn child_keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.children.keys()
    }

    /// Returns true if the node has any child under any key.
    pub fn has_children(&self) -> bool {
        self.children.values().any(|c| !c.is_empty())
    }
}

/// A parsed tree rooted at a `Program` node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ast {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    /// Range and location records referenced by nodes, tokens and comments.
    pub locations: LocationStore,
}

impl Ast {
    /// Creates a tree containing only a root node of the given kind.
    pub fn new(root_kind: impl Into<SmolStr>) -> Self {
        Self {
            nodes: vec![Node::new(root_kind)],
            root: NodeId(0),
            locations: LocationStore::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Iterates over all nodes in the arena, reachable or not.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Adds a detached node to the arena.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() as u32 - 1)
    }

    /// Adds a node located at `pair`, with fresh range/loc records.
    pub fn alloc_at(&mut self, node: Node, pair: CoordinatePair) -> NodeId {
        let (range, loc) = self.locations.alloc_pair(pair);
        self.alloc(node.with_location(range, loc))
    }

    /// Appends `child` to `parent`'s `key` property.
    ///
    /// Parent links are not touched; see [`crate::set_parents`].
    pub fn push_child(&mut self, parent: NodeId, key: &str, child: NodeId) {
        self.nodes[parent.index()]
            .children
            .entry(SmolStr::new(key))
            .or_default()
            .push(child);
    }

    /// Replaces `parent`'s `key` property.
    pub fn set_children(&mut self, parent: NodeId, key: &str, children: Vec<NodeId>) {
        self.nodes[parent.index()]
            .children
            .insert(SmolStr::new(key), children);
    }

    /// Removes `child` from `parent`'s `key` property, returning whether it was present.
    pub fn remove_child(&mut self, parent: NodeId, key: &str, child: NodeId) -> bool {
        let Some(children) = self.nodes[parent.index()].children.get_mut(key) else {
            return false;
        };
        let before = children.len();
        children.retain(|&c| c != child);
        children.len() != before
    }

    /// Returns the node's current byte range.
    pub fn range_of(&self, id: NodeId) -> Option<Span> {
        self.node(id).range.map(|r| self.locations.range(r))
    }

    /// Returns the node's current line/column location.
    pub fn loc_of(&self, id: NodeId) -> Option<SourceLocation> {
        self.node(id).loc.map(|l| self.locations.loc(l))
    }

    /// Writes a coordinate pair into the node's records, allocating any
    /// that are missing, and drops the transient `start`/`end` fields.
    pub fn apply_location(&mut self, id: NodeId, pair: CoordinatePair) {
        let node = &mut self.nodes[id.index()];
        match node.range {
            Some(range) => self.locations.set_range(range, pair.range),
            None => node.range = Some(self.locations.alloc_range(pair.range)),
        }
        match node.loc {
            Some(loc) => self.locations.set_loc(loc, pair.loc),
            None => node.loc = Some(self.locations.alloc_loc(pair.loc)),
        }
        node.start = None;
        node.end = None;
    }
}

/// The lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    Identifier,
    Keyword,
    Boolean,
    Null,
    Punctuator,
    Numeric,
    String,
    Template,
    RegularExpression,
    PrivateIdentifier,
}

const KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "export", "extends", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "return", "super", "switch", "this",
    "throw", "try", "typeof", "var", "void", "while", "with", "yield",
];

impl TokenKind {
    /// Classifies a token from its source text.
    pub fn classify(text: &str) -> Self {
        let Some(first) = text.chars().next() else {
            return TokenKind::Punctuator;
        };
        match first {
            '"' | '\'' => TokenKind::String,
            '`' => TokenKind::Template,
            '}' if text.len() > 1 && text.ends_with('`') => TokenKind::Template,
            '#' if text.len() > 1 => TokenKind::PrivateIdentifier,
            '/' if text.len() > 2 => TokenKind::RegularExpression,
            '.' if text.len() > 1 && text.as_bytes()[1].is_ascii_digit() => TokenKind::Numeric,
            c if c.is_ascii_digit() => TokenKind::Numeric,
            c if c == '_' || c == '$' || c.is_alphabetic() => match text {
                "true" | "false" => TokenKind::Boolean,
                "null" => TokenKind::Null,
                _ if KEYWORDS.contains(&text) => TokenKind::Keyword,
                _ => TokenKind::Identifier,
            },
            _ => TokenKind::Punctuator,
        }
    }
}

/// A lexical token of the parsed script.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub value: SmolStr,
    pub range: RangeId,
    pub loc: LocId,
    pub start: Option<ByteOffset>,
    pub end: Option<ByteOffset>,
}

/// Whether a comment is `// line` or `/* block */`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommentKind {
    Line,
    Block,
}

/// A comment of the parsed script.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    pub kind: CommentKind,
    /// Comment text without delimiters.
    pub value: SmolStr,
    pub range: RangeId,
    pub loc: LocId,
    pub start: Option<ByteOffset>,
    pub end: Option<ByteOffset>,
}
