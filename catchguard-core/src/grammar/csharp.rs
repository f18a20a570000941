//! C# grammar adapter
//!
//! Kind vocabulary and shape-specific queries for tree-sitter-c-sharp trees.
//! C# contributes the richest assignment-like surface: assignment
//! expressions, variable declarators with initializers, and named member
//! initializers inside object-creation initializer blocks.

use tree_sitter::Node;

use super::{child_of_kind, GrammarAdapter, CallKinds, Language};

/// C# adapter
pub struct CSharpGrammar;

impl CSharpGrammar {
    /// Initializer expression of a variable declarator, skipping the
    /// declarator name and any fixed-size buffer brackets.
    fn declarator_value<'t>(node: Node<'t>) -> Option<Node<'t>> {
        let count = node.named_child_count();
        if count < 2 {
            return None;
        }
        let last = node.named_child(count - 1)?;
        match last.kind() {
            "bracketed_argument_list" => None,
            "equals_value_clause" => Self::last_named_child(last),
            _ => Some(last),
        }
    }

    fn last_named_child(node: Node) -> Option<Node> {
        let count = node.named_child_count();
        if count == 0 {
            return None;
        }
        node.named_child(count - 1)
    }

    /// Expression carried by an argument node.
    fn argument_expression<'t>(argument: Node<'t>) -> Option<Node<'t>> {
        let count = argument.named_child_count();
        if count == 0 {
            return None;
        }
        argument.named_child(count - 1)
    }
}

impl GrammarAdapter for CSharpGrammar {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn invocation_kind(&self) -> &'static str {
        "invocation_expression"
    }

    fn member_access_kind(&self) -> &'static str {
        "member_access_expression"
    }

    fn method_declaration_kinds(&self) -> &'static [&'static str] {
        &[
            "method_declaration",
            "constructor_declaration",
            "accessor_declaration",
            "local_function_statement",
        ]
    }

    fn type_declaration_kinds(&self) -> &'static [&'static str] {
        &[
            "class_declaration",
            "struct_declaration",
            "interface_declaration",
            "record_declaration",
            "enum_declaration",
        ]
    }

    fn call_target<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        match node.kind() {
            "invocation_expression" => {
                let callee = node.child_by_field_name("function")?;
                self.member_access_name(Some(callee)).or(Some(callee))
            }
            "object_creation_expression" => node.child_by_field_name("type"),
            _ => None,
        }
    }

    fn assignment_left<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        match node.kind() {
            "assignment_expression" => node.child_by_field_name("left"),
            "variable_declarator" => node.named_child(0),
            _ => None,
        }
    }

    fn assignment_right<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        match node.kind() {
            "assignment_expression" => node.child_by_field_name("right"),
            "variable_declarator" => Self::declarator_value(node),
            _ => None,
        }
    }

    fn member_access_operand<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        if node.kind() != "member_access_expression" {
            return None;
        }
        node.child_by_field_name("expression")
    }

    fn member_access_name<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        if node.kind() != "member_access_expression" {
            return None;
        }
        node.child_by_field_name("name")
    }

    fn invocation_callee<'t>(&self, node: Option<Node<'t>>) -> Option<Node<'t>> {
        let node = node?;
        if node.kind() != "invocation_expression" {
            return None;
        }
        node.child_by_field_name("function")
    }

    fn call_argument_expressions<'t>(&self, node: Option<Node<'t>>, kinds: CallKinds) -> Vec<Node<'t>> {
        let Some(node) = node else {
            return Vec::new();
        };
        let list = match node.kind() {
            "invocation_expression" if kinds.invocation => node.child_by_field_name("arguments"),
            "object_creation_expression" if kinds.object_creation => node.child_by_field_name("arguments"),
            _ => None,
        };
        let Some(list) = list else {
            return Vec::new();
        };
        (0..list.named_child_count())
            .filter_map(|i| list.named_child(i))
            .filter(|c| c.kind() == "argument")
            .filter_map(Self::argument_expression)
            .collect()
    }

    fn object_initializer_expressions<'t>(&self, node: Option<Node<'t>>) -> Vec<Node<'t>> {
        let Some(node) = node else {
            return Vec::new();
        };
        if node.kind() != "object_creation_expression" {
            return Vec::new();
        }
        let initializer = node
            .child_by_field_name("initializer")
            .or_else(|| child_of_kind(node, "initializer_expression"));
        let Some(initializer) = initializer else {
            return Vec::new();
        };
        // Named member initializers parse as assignments; collection-style
        // entries do not and are excluded.
        (0..initializer.named_child_count())
            .filter_map(|i| initializer.named_child(i))
            .filter(|c| c.kind() == "assignment_expression")
            .collect()
    }

    fn optional_parameter_default<'t>(&self, declaration: Option<Node<'t>>, index: usize) -> Option<Node<'t>> {
        let declaration = declaration?;
        let params = declaration.child_by_field_name("parameters")?;
        if params.kind() != "parameter_list" {
            return None;
        }
        let param = (0..params.named_child_count())
            .filter_map(|i| params.named_child(i))
            .filter(|c| c.kind() == "parameter")
            .nth(index)?;
        let name = param.child_by_field_name("name")?;
        let last = Self::last_named_child(param)?;
        if last.id() == name.id() {
            return None;
        }
        if last.kind() == "equals_value_clause" {
            return Self::last_named_child(last);
        }
        Some(last)
    }

    fn catch_declared_type<'t>(&self, clause: Option<Node<'t>>) -> Option<Node<'t>> {
        let clause = clause?;
        if clause.kind() != "catch_clause" {
            return None;
        }
        let declaration = child_of_kind(clause, "catch_declaration")?;
        declaration
            .child_by_field_name("type")
            .or_else(|| declaration.named_child(0))
    }
}
