//! Java grammar adapter
//!
//! Kind vocabulary and shape-specific queries for tree-sitter-java trees.
//! Java has no object initializer blocks and no optional-parameter defaults;
//! the corresponding queries are uniformly empty/absent. Every catch clause
//! declares a type; a multi-catch union resolves through its union node.

use tree_sitter::Node;

use super::{child_of_kind, GrammarAdapter, CallKinds, Language};

/// Java adapter
pub struct JavaGrammar;

impl GrammarAdapter for JavaGrammar {
    fn language(&self) -> Language {
        Language::Java
    }

    fn invocation_kind(&self) -> &'static str {
        "method_invocation"
    }

    fn member_access_kind(&self) -> &'static str {
        "field_access"
    }

    fn method_declaration_kinds(&self) -> &'static [&'static str] {
        &["method_declaration", "constructor_declaration"]
    }

    fn type_declaration_kinds(&self) -> &'static [&'static str] {
        &[
            "class_declaration",
            "interface_declaration",
            "enum_declaration",
            "record_declaration",
            "annotation_type_declaration",
        ]
    }

    fn call_target<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        match node.kind() {
            // The selector is the invoked member name; for a receiverless
            // call it is also the whole callee as written.
            "method_invocation" => node.child_by_field_name("name"),
            "object_creation_expression" => node.child_by_field_name("type"),
            _ => None,
        }
    }

    fn assignment_left<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        match node.kind() {
            "assignment_expression" => node.child_by_field_name("left"),
            "variable_declarator" => node.child_by_field_name("name"),
            _ => None,
        }
    }

    fn assignment_right<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        match node.kind() {
            "assignment_expression" => node.child_by_field_name("right"),
            "variable_declarator" => node.child_by_field_name("value"),
            _ => None,
        }
    }

    fn member_access_operand<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        if node.kind() != "field_access" {
            return None;
        }
        node.child_by_field_name("object")
    }

    fn member_access_name<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        if node.kind() != "field_access" {
            return None;
        }
        node.child_by_field_name("field")
    }

    fn invocation_callee<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        if node.kind() != "method_invocation" {
            return None;
        }
        node.child_by_field_name("name")
    }

    fn call_argument_expressions<'t>(&self, node: Option<Node<'t>>, kinds: CallKinds) -> Vec<Node<'t>> {
        let Some(node) = node else {
            return Vec::new();
        };
        let list = match node.kind() {
            "method_invocation" if kinds.invocation => node.child_by_field_name("arguments"),
            "object_creation_expression" if kinds.object_creation => node.child_by_field_name("arguments"),
            _ => None,
        };
        let Some(list) = list else {
            return Vec::new();
        };
        (0..list.named_child_count())
            .filter_map(|i| list.named_child(i))
            .collect()
    }

    fn object_initializer_expressions<'t>(&self, _node: Option<Node<'t>>) -> Vec<Node<'t>> {
        // The grammar has no object initializer blocks.
        Vec::new()
    }

    fn optional_parameter_default<'t>(&self, _declaration: Option<Node<'t>>, _index: usize) -> Option<Node<'t>> {
        // The grammar has no optional-parameter defaults.
        None
    }

    fn catch_declared_type<'t>(&self, clause: Option<Node<'t>>) -> Option<Node<'t>> {
        let clause = clause?;
        if clause.kind() != "catch_clause" {
            return None;
        }
        let parameter = child_of_kind(clause, "catch_formal_parameter")?;
        let catch_type = child_of_kind(parameter, "catch_type")?;
        if catch_type.named_child_count() == 1 {
            catch_type.named_child(0)
        } else {
            Some(catch_type)
        }
    }
}
