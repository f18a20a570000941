//! Corrupted-state catch rule
//!
//! Methods that opt into running with corrupted process state (via a marker
//! attribute) must not swallow faults wholesale: a catch clause with no
//! declared type, or declaring one of the root exception types, defeats the
//! opt-in. The declared type alone decides the classification; what the
//! handler body does (rethrow included) does not.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Tree};

use crate::grammar::{self, node_range, GrammarAdapter, Language};
use crate::semantics::{Compilation, SemanticModel, SymbolId, SymbolKind};

use super::types::{CatchAnalysisResult, Diagnostic, RuleDescriptor, Severity, SourceUnit};

/// The rule's fixed contract
pub const CORRUPTED_STATE_CATCH: RuleDescriptor = RuleDescriptor {
    id: "CSE001",
    title: "Do not catch corrupted-state exceptions too broadly",
    category: "Security",
    default_severity: Severity::Warning,
    enabled_by_default: true,
    message_template: "Do not catch {0} in a method tolerant of corrupted-state faults",
    description: "A method opted into corrupted-state fault handling catches a type broad enough \
                  to swallow access violations and similar faults. Catch the specific exception \
                  types the method can actually recover from.",
};

/// Message argument standing in for a catch clause with no declared type
pub const CATCH_ALL_DISPLAY: &str = "catch-all";

/// Fully qualified names of the marker attribute and the exception-hierarchy
/// roots, per platform. Host-overridable (deserializable from config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellKnownNames {
    pub marker_attribute: String,
    pub root_object: String,
    pub root_exception: String,
    pub runtime_exception_base: String,
}

impl WellKnownNames {
    pub fn dotnet() -> Self {
        Self {
            marker_attribute: "System.Runtime.ExceptionServices.HandleProcessCorruptedStateExceptionsAttribute"
                .to_string(),
            root_object: "System.Object".to_string(),
            root_exception: "System.Exception".to_string(),
            runtime_exception_base: "System.SystemException".to_string(),
        }
    }

    /// The JVM has no platform-defined corrupted-state marker; hosts override
    /// `marker_attribute` with the annotation their codebase uses.
    pub fn jvm() -> Self {
        Self {
            marker_attribute: "catchguard.HandleProcessCorruptedStateExceptions".to_string(),
            root_object: "java.lang.Object".to_string(),
            root_exception: "java.lang.Throwable".to_string(),
            runtime_exception_base: "java.lang.RuntimeException".to_string(),
        }
    }

    pub fn for_language(language: Language) -> Self {
        match language {
            Language::CSharp => Self::dotnet(),
            Language::Java => Self::jvm(),
        }
    }
}

/// Well-known type symbols of one compilation, resolved once and shared
/// read-only by every check against that compilation.
#[derive(Debug, Clone, Copy)]
pub struct CorruptedStateTypes {
    pub marker_attribute: Option<SymbolId>,
    pub root_object: Option<SymbolId>,
    pub root_exception: Option<SymbolId>,
    pub runtime_exception_base: Option<SymbolId>,
}

impl CorruptedStateTypes {
    pub fn resolve(compilation: &Compilation, names: &WellKnownNames) -> Self {
        Self {
            marker_attribute: compilation.type_by_metadata_name(&names.marker_attribute),
            root_object: compilation.type_by_metadata_name(&names.root_object),
            root_exception: compilation.type_by_metadata_name(&names.root_exception),
            runtime_exception_base: compilation.type_by_metadata_name(&names.runtime_exception_base),
        }
    }

    /// The rule is inert for the whole compilation when the marker attribute
    /// does not resolve.
    pub fn is_active(&self) -> bool {
        self.marker_attribute.is_some()
    }

    /// A catch type is too general iff it is absent (bare catch-all) or
    /// identical to one of the hierarchy roots. Identity is by resolved
    /// symbol; a same-named type from another namespace never matches.
    pub fn is_too_general(&self, catch_type: Option<SymbolId>) -> bool {
        match catch_type {
            None => true,
            Some(ty) => {
                Some(ty) == self.root_object
                    || Some(ty) == self.root_exception
                    || Some(ty) == self.runtime_exception_base
            }
        }
    }
}

/// Corrupted-state catch analyzer
pub struct CorruptedStateAnalyzer;

impl CorruptedStateAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Check one declaration-shaped node.
    ///
    /// Nodes that do not declare a method-like symbol, or whose symbol does
    /// not carry the marker attribute, yield no diagnostics. Otherwise every
    /// catch clause in the declaration's subtree (nested try statements
    /// included) is classified independently.
    pub fn check_declaration(
        &self,
        node: Node,
        file: &str,
        adapter: &dyn GrammarAdapter,
        model: &SemanticModel,
        compilation: &Compilation,
        types: &CorruptedStateTypes,
    ) -> Vec<Diagnostic> {
        let Some(marker) = types.marker_attribute else {
            return Vec::new();
        };
        let Some(method_id) = model.declared_symbol(node) else {
            return Vec::new();
        };
        let method = compilation.symbols.get(method_id);
        if method.kind != SymbolKind::Method {
            return Vec::new();
        }
        if !method.attributes.iter().any(|a| *a == marker) {
            return Vec::new();
        }

        let mut diagnostics = Vec::new();
        for clause in adapter.descendant_catch_clauses(Some(node)) {
            let declared = adapter.catch_declared_type(Some(clause));
            let catch_type = declared.and_then(|n| model.resolved_type(n));
            if !types.is_too_general(catch_type) {
                continue;
            }
            let display = match catch_type {
                Some(ty) => compilation.symbols.get(ty).name.clone(),
                None => CATCH_ALL_DISPLAY.to_string(),
            };
            diagnostics.push(Diagnostic {
                rule_id: CORRUPTED_STATE_CATCH.id.to_string(),
                severity: CORRUPTED_STATE_CATCH.default_severity,
                file: file.to_string(),
                range: node_range(&clause),
                message: CORRUPTED_STATE_CATCH.format_message(&display),
                offending_type: display,
            });
        }
        diagnostics
    }

    /// Run the rule over every method-like declaration of every source unit.
    ///
    /// `bind` is the host binder: it receives each unit with its freshly
    /// parsed tree and returns the unit's semantic model. Files run in
    /// parallel; the cancellation flag is observed between declarations, and
    /// an aborted declaration contributes no diagnostics.
    pub fn analyze_compilation<F>(
        &self,
        compilation: &Compilation,
        types: &CorruptedStateTypes,
        units: &[SourceUnit],
        bind: F,
        cancel: &AtomicBool,
    ) -> CatchAnalysisResult
    where
        F: Fn(&SourceUnit, &Tree) -> SemanticModel + Sync,
    {
        let start = Instant::now();

        if !types.is_active() {
            return CatchAnalysisResult {
                diagnostics: Vec::new(),
                files_analyzed: 0,
                declarations_checked: 0,
                duration_ms: start.elapsed().as_millis() as u64,
            };
        }

        let per_file: Vec<(Vec<Diagnostic>, usize)> = units
            .par_iter()
            .filter_map(|unit| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                let tree = grammar::parse(unit.language, &unit.source)?;
                let adapter = grammar::adapter(unit.language);
                let model = bind(unit, &tree);

                let mut diagnostics = Vec::new();
                let mut checked = 0;
                for declaration in adapter.method_like_declarations(Some(tree.root_node())) {
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    checked += 1;
                    diagnostics.extend(self.check_declaration(
                        declaration,
                        &unit.path,
                        adapter,
                        &model,
                        compilation,
                        types,
                    ));
                }
                Some((diagnostics, checked))
            })
            .collect();

        let mut diagnostics = Vec::new();
        let mut declarations_checked = 0;
        let files_analyzed = per_file.len();
        for (file_diagnostics, checked) in per_file {
            diagnostics.extend(file_diagnostics);
            declarations_checked += checked;
        }

        CatchAnalysisResult {
            diagnostics,
            files_analyzed,
            declarations_checked,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}

impl Default for CorruptedStateAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
