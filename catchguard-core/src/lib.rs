//! catchguard-core: catch-generality analysis engine
//!
//! This crate provides the core of catchguard:
//! - Grammar: tree-sitter front ends behind one adapter trait (C#, Java)
//! - Semantics: host-bound symbol model with identity-based comparisons
//! - Values: canonical constant widening and enum value extraction
//! - Visibility: assembly-visibility reachability
//! - Rules: the corrupted-state catch rule and its rayon-parallel driver
//!
//! The host front end supplies parsed-tree symbol bindings; the engine never
//! resolves names itself and never mutates shared state during analysis.

pub mod grammar;
pub mod rules;
pub mod semantics;

// Re-exports for convenience
pub use grammar::{
    adapter, node_range, parse, CSharpGrammar, CallKinds, GrammarAdapter, JavaGrammar, Language,
    Position, Range,
};
pub use rules::{
    CatchAnalysisResult, CorruptedStateAnalyzer, CorruptedStateTypes, Diagnostic, RuleDescriptor,
    Severity, SourceUnit, WellKnownNames, CATCH_ALL_DISPLAY, CORRUPTED_STATE_CATCH,
};
pub use semantics::{
    enum_member_values, framework_version, is_visible_outside_assembly, parse_framework_name,
    try_convert_to_u64, Accessibility, AttributeUse, Compilation, ConstValue, FrameworkVersion,
    SemanticModel, Symbol, SymbolId, SymbolKind, SymbolTable, TypeKind, UnderlyingType, ValuesError,
    TARGET_FRAMEWORK_ATTRIBUTE,
};
