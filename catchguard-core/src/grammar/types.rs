//! Grammar-level types: supported languages, source spans, call-shape filters

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

/// Supported surface syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Java,
}

impl Language {
    /// Detect the language from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "cs" => Some(Language::CSharp),
            "java" => Some(Language::Java),
            _ => None,
        }
    }
}

/// Position in source (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Source range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position {
                line: start_line,
                column: start_column,
            },
            end: Position {
                line: end_line,
                column: end_column,
            },
        }
    }
}

/// Range covered by a tree-sitter node
pub fn node_range(node: &Node) -> Range {
    Range {
        start: Position {
            line: node.start_position().row as u32,
            column: node.start_position().column as u32,
        },
        end: Position {
            line: node.end_position().row as u32,
            column: node.end_position().column as u32,
        },
    }
}

/// Which call shapes an argument query should look inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallKinds {
    pub invocation: bool,
    pub object_creation: bool,
}

impl CallKinds {
    pub const INVOCATION: CallKinds = CallKinds {
        invocation: true,
        object_creation: false,
    };
    pub const OBJECT_CREATION: CallKinds = CallKinds {
        invocation: false,
        object_creation: true,
    };
    pub const ANY: CallKinds = CallKinds {
        invocation: true,
        object_creation: true,
    };
}
