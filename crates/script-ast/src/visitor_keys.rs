//! Visitor-key metadata: which child properties of each node kind to walk.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Child property names for common ESTree node kinds.
const ESTREE_KEYS: &[(&str, &[&str])] = &[
    ("ArrayExpression", &["elements"]),
    ("ArrayPattern", &["elements"]),
    ("ArrowFunctionExpression", &["params", "body"]),
    ("AssignmentExpression", &["left", "right"]),
    ("AssignmentPattern", &["left", "right"]),
    ("AwaitExpression", &["argument"]),
    ("BinaryExpression", &["left", "right"]),
    ("BlockStatement", &["body"]),
    ("BreakStatement", &["label"]),
    ("CallExpression", &["callee", "arguments"]),
    ("CatchClause", &["param", "body"]),
    ("ChainExpression", &["expression"]),
    ("ClassBody", &["body"]),
    ("ClassDeclaration", &["id", "superClass", "body"]),
    ("ClassExpression", &["id", "superClass", "body"]),
    ("ConditionalExpression", &["test", "consequent", "alternate"]),
    ("ContinueStatement", &["label"]),
    ("DebuggerStatement", &[]),
    ("DoWhileStatement", &["body", "test"]),
    ("EmptyStatement", &[]),
    ("ExportAllDeclaration", &["exported", "source"]),
    ("ExportDefaultDeclaration", &["declaration"]),
    ("ExportNamedDeclaration", &["declaration", "specifiers", "source"]),
    ("ExportSpecifier", &["local", "exported"]),
    ("ExpressionStatement", &["expression"]),
    ("ForInStatement", &["left", "right", "body"]),
    ("ForOfStatement", &["left", "right", "body"]),
    ("ForStatement", &["init", "test", "update", "body"]),
    ("FunctionDeclaration", &["id", "params", "body"]),
    ("FunctionExpression", &["id", "params", "body"]),
    ("Identifier", &[]),
    ("IfStatement", &["test", "consequent", "alternate"]),
    ("ImportDeclaration", &["specifiers", "source"]),
    ("ImportDefaultSpecifier", &["local"]),
    ("ImportExpression", &["source"]),
    ("ImportNamespaceSpecifier", &["local"]),
    ("ImportSpecifier", &["imported", "local"]),
    ("LabeledStatement", &["label", "body"]),
    ("Literal", &[]),
    ("LogicalExpression", &["left", "right"]),
    ("MemberExpression", &["object", "property"]),
    ("MetaProperty", &["meta", "property"]),
    ("MethodDefinition", &["key", "value"]),
    ("NewExpression", &["callee", "arguments"]),
    ("ObjectExpression", &["properties"]),
    ("ObjectPattern", &["properties"]),
    ("PrivateIdentifier", &[]),
    ("Program", &["body"]),
    ("Property", &["key", "value"]),
    ("PropertyDefinition", &["key", "value"]),
    ("RestElement", &["argument"]),
    ("ReturnStatement", &["argument"]),
    ("SequenceExpression", &["expressions"]),
    ("SpreadElement", &["argument"]),
    ("Super", &[]),
    ("SwitchCase", &["test", "consequent"]),
    ("SwitchStatement", &["discriminant", "cases"]),
    ("TaggedTemplateExpression", &["tag", "quasi"]),
    ("TemplateElement", &[]),
    ("TemplateLiteral", &["quasis", "expressions"]),
    ("ThisExpression", &[]),
    ("ThrowStatement", &["argument"]),
    ("TryStatement", &["block", "handler", "finalizer"]),
    ("UnaryExpression", &["argument"]),
    ("UpdateExpression", &["argument"]),
    ("VariableDeclaration", &["declarations"]),
    ("VariableDeclarator", &["id", "init"]),
    ("WhileStatement", &["test", "body"]),
    ("WithStatement", &["object", "body"]),
    ("YieldExpression", &["argument"]),
];

/// Maps a node kind to the ordered list of child properties to traverse.
///
/// Kinds without an entry fall back to the node's own child properties in
/// insertion order, so trees from parsers with extra node kinds are still
/// fully walked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorKeys {
    keys: FxHashMap<SmolStr, Vec<SmolStr>>,
}

impl VisitorKeys {
    /// Creates an empty key table; every kind uses the fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a key table with the standard ESTree node kinds.
    pub fn estree() -> Self {
        let mut keys = Self::new();
        for (kind, props) in ESTREE_KEYS {
            keys.insert(*kind, props.iter().copied());
        }
        keys
    }

    /// Sets the child properties for `kind`, replacing any previous entry.
    pub fn insert<I, S>(&mut self, kind: impl Into<SmolStr>, props: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.keys
            .insert(kind.into(), props.into_iter().map(Into::into).collect());
    }

    /// Adds every entry of `other`, overriding entries for the same kind.
    pub fn extend(&mut self, other: &VisitorKeys) {
        for (kind, props) in &other.keys {
            self.keys.insert(kind.clone(), props.clone());
        }
    }

    /// Returns the registered child properties for `kind`.
    pub fn get(&self, kind: &str) -> Option<&[SmolStr]> {
        self.keys.get(kind).map(Vec::as_slice)
    }

    /// Returns true if `kind` has an entry.
    pub fn contains(&self, kind: &str) -> bool {
        self.keys.contains_key(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estree_defaults() {
        let keys = VisitorKeys::estree();
        assert_eq!(
            keys.get("VariableDeclarator"),
            Some(&[SmolStr::new("id"), SmolStr::new("init")][..])
        );
        assert_eq!(keys.get("Identifier"), Some(&[] as &[SmolStr]));
        assert_eq!(keys.get("MarkupElement"), None);
    }

    #[test]
    fn test_extend_overrides() {
        let mut keys = VisitorKeys::estree();
        let mut extra = VisitorKeys::new();
        extra.insert("Program", ["body", "templateBody"]);
        keys.extend(&extra);
        assert_eq!(keys.get("Program").map(<[_]>::len), Some(2));
    }
}
