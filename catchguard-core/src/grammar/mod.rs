//! Grammar front ends
//!
//! One tree-sitter adapter per supported surface syntax. `GrammarAdapter` is
//! the only language-specific seam in the engine: the classifier and every
//! shared helper query parse trees exclusively through it, so adding a grammar
//! means adding one adapter implementation and nothing else.
//!
//! Every operation is total: a `None` input, or a node whose concrete kind is
//! not what the operation expects, yields `None` / an empty sequence / `false`
//! rather than an error.

mod csharp;
mod java;
mod types;

pub use csharp::CSharpGrammar;
pub use java::JavaGrammar;
pub use types::*;

use tree_sitter::{Node, Parser, Tree};

use crate::semantics::{SemanticModel, SymbolId};

/// The adapter for a language. Adapters are stateless; one static instance
/// serves every traversal.
pub fn adapter(language: Language) -> &'static dyn GrammarAdapter {
    match language {
        Language::CSharp => &CSharpGrammar,
        Language::Java => &JavaGrammar,
    }
}

/// Parse one source unit with the grammar for `language`.
///
/// Returns `None` when the grammar cannot be loaded or the parse is aborted;
/// parse errors inside the tree do not fail the parse.
pub fn parse(language: Language, source: &str) -> Option<Tree> {
    let ts_language = match language {
        Language::CSharp => tree_sitter_c_sharp::LANGUAGE,
        Language::Java => tree_sitter_java::LANGUAGE,
    };
    let mut parser = Parser::new();
    parser.set_language(&ts_language.into()).ok()?;
    parser.parse(source, None)
}

/// Uniform query interface over one concrete grammar's parse trees.
///
/// Implementations supply the node-kind vocabulary and the operations whose
/// shape genuinely differs between grammars; the traversal-based operations
/// are provided on top of that vocabulary and behave identically everywhere.
pub trait GrammarAdapter: Sync {
    fn language(&self) -> Language;

    // Node-kind vocabulary of the grammar.
    fn invocation_kind(&self) -> &'static str;
    fn member_access_kind(&self) -> &'static str;
    fn method_declaration_kinds(&self) -> &'static [&'static str];
    fn type_declaration_kinds(&self) -> &'static [&'static str];

    /// For an invocation, the invoked member name if the callee is a member
    /// access, otherwise the full callee expression; for an object creation,
    /// the type being constructed.
    fn call_target<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>>;

    /// Left side of an assignment-like node (assignment expression, variable
    /// declarator with initializer, named member initializer).
    fn assignment_left<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>>;

    /// Right side of an assignment-like node.
    fn assignment_right<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>>;

    /// Operand (receiver side) of a member access.
    fn member_access_operand<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>>;

    /// Name side of a member access.
    fn member_access_name<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>>;

    /// Callee expression of an invocation.
    fn invocation_callee<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>>;

    /// Argument expressions of a call, restricted to the shapes selected by
    /// `kinds`. Non-matching shapes yield an empty sequence.
    fn call_argument_expressions<'t>(&self, node: Option<Node<'t>>, kinds: CallKinds) -> Vec<Node<'t>>;

    /// Named member initializers of an object creation's initializer block.
    /// Collection-style initializers and every other shape yield an empty
    /// sequence.
    fn object_initializer_expressions<'t>(&self, node: Option<Node<'t>>) -> Vec<Node<'t>>;

    /// Default-value expression of the parameter at `index`, if the
    /// declaration exposes a parameter list and that parameter declares one.
    /// An out-of-range index is absent, not an error.
    fn optional_parameter_default<'t>(&self, declaration: Option<Node<'t>>, index: usize) -> Option<Node<'t>>;

    /// Declared exception type of a catch clause; `None` for a bare catch-all.
    fn catch_declared_type<'t>(&self, clause: Option<Node<'t>>) -> Option<Node<'t>>;

    /// True iff the node is a call shape (invocation or object creation).
    fn is_method_invocation(&self, node: Option<Node>) -> bool {
        match node {
            Some(n) => n.kind() == self.invocation_kind() || n.kind() == self.object_creation_kind(),
            None => false,
        }
    }

    fn object_creation_kind(&self) -> &'static str {
        "object_creation_expression"
    }

    fn assignment_kind(&self) -> &'static str {
        "assignment_expression"
    }

    /// True iff any invocation within the node's subtree (self included) has
    /// a name satisfying `predicate`, looking through member-access chains.
    fn contains_method_call(&self, node: Option<Node>, source: &str, predicate: &dyn Fn(&str) -> bool) -> bool {
        let Some(node) = node else {
            return false;
        };
        descendants_of_kind(Some(node), self.invocation_kind()).any(|call| {
            descendants_of_kind(Some(call), "identifier").any(|name| predicate(node_text(name, source)))
        })
    }

    /// Every assignment expression in the subtree, self included, pre-order.
    fn descendant_assignments<'t>(&self, node: Option<Node<'t>>) -> Box<dyn Iterator<Item = Node<'t>> + 't> {
        descendants_of_kind(node, self.assignment_kind())
    }

    /// Every member access in the subtree, self included, pre-order.
    fn descendant_member_accesses<'t>(&self, node: Option<Node<'t>>) -> Box<dyn Iterator<Item = Node<'t>> + 't> {
        descendants_of_kind(node, self.member_access_kind())
    }

    /// Every catch clause in the subtree, self included, pre-order. Clauses
    /// of nested try statements are included.
    fn descendant_catch_clauses<'t>(&self, node: Option<Node<'t>>) -> Box<dyn Iterator<Item = Node<'t>> + 't> {
        descendants_of_kind(node, "catch_clause")
    }

    /// Every method-like declaration (method, constructor, accessor) in the
    /// subtree, self included, pre-order.
    fn method_like_declarations<'t>(&self, node: Option<Node<'t>>) -> Box<dyn Iterator<Item = Node<'t>> + 't> {
        let kinds = self.method_declaration_kinds();
        match node {
            Some(n) => Box::new(preorder(n).filter(move |n| kinds.contains(&n.kind()))),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Declared symbol of the nearest enclosing method-like declaration.
    fn caller_method_symbol(&self, node: Option<Node>, model: &SemanticModel) -> Option<SymbolId> {
        let node = node?;
        let kinds = self.method_declaration_kinds();
        let declaration = ancestors_and_self(node).find(|n| kinds.contains(&n.kind()))?;
        model.declared_symbol(declaration)
    }

    /// Declared symbol of the nearest enclosing type-like declaration.
    fn enclosing_type_symbol(&self, node: Option<Node>, model: &SemanticModel) -> Option<SymbolId> {
        let node = node?;
        let kinds = self.type_declaration_kinds();
        let declaration = ancestors_and_self(node).find(|n| kinds.contains(&n.kind()))?;
        model.declared_symbol(declaration)
    }

    /// Declared symbol of a class declaration node; `None` for any other kind.
    fn class_declaration_type_symbol(&self, node: Option<Node>, model: &SemanticModel) -> Option<SymbolId> {
        let node = node?;
        if node.kind() != "class_declaration" {
            return None;
        }
        model.declared_symbol(node)
    }

    /// True iff the node is an object creation lexically inside a field
    /// declaration.
    fn is_object_creation_under_field_declaration(&self, node: Option<Node>) -> bool {
        match node {
            Some(n) => {
                n.kind() == self.object_creation_kind()
                    && ancestors_and_self(n).any(|a| a.kind() == "field_declaration")
            }
            None => false,
        }
    }

    /// The variable declarator a field-level object creation initializes.
    fn field_declarator_of_object_creation<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        if !self.is_object_creation_under_field_declaration(node) {
            return None;
        }
        ancestors_and_self(node?).find(|a| a.kind() == "variable_declarator")
    }
}

/// Node text, empty on invalid UTF-8 slices.
pub(crate) fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// First named child with the given kind.
pub(crate) fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .find(|c| c.kind() == kind)
}

/// The node and its ancestors, innermost first.
pub(crate) fn ancestors_and_self<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> + 't {
    let mut current = Some(node);
    std::iter::from_fn(move || {
        let n = current?;
        current = n.parent();
        Some(n)
    })
}

/// Deterministic pre-order walk over named nodes, self included.
pub fn preorder(node: Node) -> Preorder {
    Preorder { stack: vec![node] }
}

/// Lazy pre-order iterator backing the descendant queries.
pub struct Preorder<'t> {
    stack: Vec<Node<'t>>,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        let node = self.stack.pop()?;
        for i in (0..node.named_child_count()).rev() {
            if let Some(child) = node.named_child(i) {
                self.stack.push(child);
            }
        }
        Some(node)
    }
}

fn descendants_of_kind<'t>(node: Option<Node<'t>>, kind: &'static str) -> Box<dyn Iterator<Item = Node<'t>> + 't> {
    match node {
        Some(n) => Box::new(preorder(n).filter(move |n| n.kind() == kind)),
        None => Box::new(std::iter::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_languages() {
        let cs = parse(Language::CSharp, "class A { void M() { } }");
        assert!(cs.is_some());

        let java = parse(Language::Java, "class A { void m() { } }");
        assert!(java.is_some());
    }

    #[test]
    fn test_preorder_is_deterministic_and_self_inclusive() {
        let tree = parse(Language::CSharp, "class A { void M() { int x = 1; } }").unwrap();
        let root = tree.root_node();

        let first: Vec<String> = preorder(root).map(|n| n.kind().to_string()).collect();
        let second: Vec<String> = preorder(root).map(|n| n.kind().to_string()).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "compilation_unit");
        assert!(first.iter().any(|k| k == "method_declaration"));
    }

    #[test]
    fn test_symbol_resolving_queries() {
        use crate::semantics::{SemanticModel, SymbolTable, TypeKind};

        let source = "class Outer { void M() { Go(); } }";
        let tree = parse(Language::CSharp, source).unwrap();
        let root = tree.root_node();
        let adapter = adapter(Language::CSharp);

        let class_node = preorder(root).find(|n| n.kind() == "class_declaration").unwrap();
        let method_node = adapter.method_like_declarations(Some(root)).next().unwrap();
        let call_node = preorder(root).find(|n| n.kind() == "invocation_expression").unwrap();

        let mut table = SymbolTable::new();
        let outer = table.add_type("Outer", TypeKind::Class);
        let method = table.add_method(outer, "M");

        let mut model = SemanticModel::new();
        model.bind_declaration(class_node, outer);
        model.bind_declaration(method_node, method);

        assert_eq!(adapter.caller_method_symbol(Some(call_node), &model), Some(method));
        assert_eq!(adapter.enclosing_type_symbol(Some(call_node), &model), Some(outer));
        assert_eq!(adapter.class_declaration_type_symbol(Some(class_node), &model), Some(outer));
        assert_eq!(adapter.class_declaration_type_symbol(Some(method_node), &model), None);
        assert_eq!(adapter.caller_method_symbol(None, &model), None);
        assert_eq!(adapter.enclosing_type_symbol(None, &model), None);

        let callee = adapter.invocation_callee(Some(call_node)).unwrap();
        assert_eq!(node_text(callee, source), "Go");
        assert!(adapter.invocation_callee(Some(class_node)).is_none());
    }

    #[test]
    fn test_null_inputs_are_total() {
        let adapter = adapter(Language::CSharp);
        assert!(adapter.call_target(None).is_none());
        assert!(adapter.assignment_left(None).is_none());
        assert!(adapter.assignment_right(None).is_none());
        assert!(adapter.catch_declared_type(None).is_none());
        assert!(!adapter.is_method_invocation(None));
        assert!(!adapter.contains_method_call(None, "", &|_| true));
        assert_eq!(adapter.descendant_catch_clauses(None).count(), 0);
        assert_eq!(adapter.call_argument_expressions(None, CallKinds::ANY).len(), 0);
        assert!(adapter.optional_parameter_default(None, 0).is_none());
        assert!(!adapter.is_object_creation_under_field_declaration(None));
        assert!(adapter.field_declarator_of_object_creation(None).is_none());
    }
}
