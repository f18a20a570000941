//! End-to-end rule runs over the fixture sources
//!
//! The tests play the host front end: they build the compilation's symbol
//! table by hand and bind declaration and catch-type nodes onto the parsed
//! trees, then drive the analyzer through its public entry points.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;

use catchguard_core::{
    adapter, node_range, parse, CatchAnalysisResult, Compilation, CorruptedStateAnalyzer,
    CorruptedStateTypes, Diagnostic, Language, Range, SemanticModel, SourceUnit, SymbolId,
    SymbolTable, TypeKind, WellKnownNames, CATCH_ALL_DISPLAY,
};
use tree_sitter::{Node, Tree};

const CSHARP_FIXTURE: &str = include_str!("../../test-fixtures/corrupted_state/broad_catches.cs");
const JAVA_FIXTURE: &str = include_str!("../../test-fixtures/corrupted_state/broad_catches.java");

// ============================================================================
// HELPERS
// ============================================================================

fn text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn ancestor_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == kind {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Harness-side name for a method-like declaration node. Accessors are named
/// `Property.get` / `Property.set`.
fn declaration_name(node: Node, source: &str) -> Option<String> {
    match node.kind() {
        "method_declaration" | "constructor_declaration" | "local_function_statement" => {
            Some(text(node.child_by_field_name("name")?, source).to_string())
        }
        "accessor_declaration" => {
            let property = ancestor_of_kind(node, "property_declaration")?;
            let property_name = text(property.child_by_field_name("name")?, source);
            let keyword = (0..node.child_count())
                .filter_map(|i| node.child(i))
                .find(|c| matches!(c.kind(), "get" | "set" | "init" | "add" | "remove"))?;
            Some(format!("{}.{}", property_name, keyword.kind()))
        }
        _ => None,
    }
}

/// Bind declarations and catch types by the name tables, the way a front-end
/// binder would.
fn bind_model(
    tree: &Tree,
    source: &str,
    language: Language,
    methods: &HashMap<String, SymbolId>,
    catch_types: &HashMap<String, SymbolId>,
) -> SemanticModel {
    let adapter = adapter(language);
    let mut model = SemanticModel::new();
    for declaration in adapter.method_like_declarations(Some(tree.root_node())) {
        if let Some(name) = declaration_name(declaration, source) {
            if let Some(&symbol) = methods.get(name.as_str()) {
                model.bind_declaration(declaration, symbol);
            }
        }
    }
    for clause in adapter.descendant_catch_clauses(Some(tree.root_node())) {
        if let Some(type_node) = adapter.catch_declared_type(Some(clause)) {
            if let Some(&symbol) = catch_types.get(text(type_node, source)) {
                model.bind_type(type_node, symbol);
            }
        }
    }
    model
}

fn dotnet_fixture_world() -> (Compilation, HashMap<String, SymbolId>, HashMap<String, SymbolId>) {
    let mut table = SymbolTable::new();
    let marker = table.add_type(
        "System.Runtime.ExceptionServices.HandleProcessCorruptedStateExceptionsAttribute",
        TypeKind::Class,
    );
    let object = table.add_type("System.Object", TypeKind::Class);
    let exception = table.add_type("System.Exception", TypeKind::Class);
    table.get_mut(exception).base_type = Some(object);
    let system_exception = table.add_type("System.SystemException", TypeKind::Class);
    table.get_mut(system_exception).base_type = Some(exception);
    let io_exception = table.add_type("System.IO.IOException", TypeKind::Class);
    table.get_mut(io_exception).base_type = Some(system_exception);
    let janitor = table.add_type("Fixtures.FileJanitor", TypeKind::Class);

    let mut methods = HashMap::new();
    for (name, gated) in [
        ("CatchEverything", true),
        ("CatchBare", true),
        ("CatchSystemException", true),
        ("CatchNarrow", true),
        ("UngatedCatchEverything", false),
        ("RethrowStillFlags", true),
        ("NarrowThenNested", true),
        ("Probe", false),
    ] {
        let id = table.add_method(janitor, name);
        if gated {
            table.get_mut(id).attributes.push(marker);
        }
        methods.insert(name.to_string(), id);
    }
    let getter = table.add_method(janitor, "get_Janitor");
    table.get_mut(getter).attributes.push(marker);
    methods.insert("Janitor.get".to_string(), getter);
    let setter = table.add_method(janitor, "set_Janitor");
    methods.insert("Janitor.set".to_string(), setter);

    let mut catch_types = HashMap::new();
    catch_types.insert("Exception".to_string(), exception);
    catch_types.insert("SystemException".to_string(), system_exception);
    catch_types.insert("IOException".to_string(), io_exception);

    (Compilation::new(table), methods, catch_types)
}

fn jvm_fixture_world() -> (Compilation, HashMap<String, SymbolId>, HashMap<String, SymbolId>) {
    let mut table = SymbolTable::new();
    let marker = table.add_type("catchguard.HandleProcessCorruptedStateExceptions", TypeKind::Class);
    let object = table.add_type("java.lang.Object", TypeKind::Class);
    let throwable = table.add_type("java.lang.Throwable", TypeKind::Class);
    table.get_mut(throwable).base_type = Some(object);
    let exception = table.add_type("java.lang.Exception", TypeKind::Class);
    table.get_mut(exception).base_type = Some(throwable);
    let runtime = table.add_type("java.lang.RuntimeException", TypeKind::Class);
    table.get_mut(runtime).base_type = Some(exception);
    let illegal_state = table.add_type("java.lang.IllegalStateException", TypeKind::Class);
    table.get_mut(illegal_state).base_type = Some(runtime);
    let sweeper = table.add_type("fixtures.RegionSweeper", TypeKind::Class);

    let mut methods = HashMap::new();
    for (name, gated) in [
        ("catchThrowable", true),
        ("catchRuntime", true),
        ("catchNarrow", true),
        ("ungatedCatchThrowable", false),
        ("nestedNarrowThenBroad", true),
        ("probe", false),
    ] {
        let id = table.add_method(sweeper, name);
        if gated {
            table.get_mut(id).attributes.push(marker);
        }
        methods.insert(name.to_string(), id);
    }

    let mut catch_types = HashMap::new();
    catch_types.insert("Throwable".to_string(), throwable);
    catch_types.insert("RuntimeException".to_string(), runtime);
    catch_types.insert("IllegalStateException".to_string(), illegal_state);

    (Compilation::new(table), methods, catch_types)
}

fn run_fixture(
    source: &'static str,
    path: &str,
    language: Language,
    world: (Compilation, HashMap<String, SymbolId>, HashMap<String, SymbolId>),
) -> CatchAnalysisResult {
    let (compilation, methods, catch_types) = world;
    let names = WellKnownNames::for_language(language);
    let types = CorruptedStateTypes::resolve(&compilation, &names);
    let units = vec![SourceUnit {
        path: path.to_string(),
        language,
        source: source.to_string(),
    }];
    let cancel = AtomicBool::new(false);
    CorruptedStateAnalyzer::new().analyze_compilation(
        &compilation,
        &types,
        &units,
        |unit, tree| bind_model(tree, &unit.source, unit.language, &methods, &catch_types),
        &cancel,
    )
}

fn declaration_range(source: &str, language: Language, name: &str) -> Range {
    let tree = parse(language, source).unwrap();
    let declaration = adapter(language)
        .method_like_declarations(Some(tree.root_node()))
        .find(|n| declaration_name(*n, source).as_deref() == Some(name))
        .unwrap();
    node_range(&declaration)
}

fn within<'d>(diagnostics: &'d [Diagnostic], range: Range) -> Vec<&'d Diagnostic> {
    diagnostics
        .iter()
        .filter(|d| d.range.start.line >= range.start.line && d.range.start.line <= range.end.line)
        .collect()
}

fn count_of(diagnostics: &[Diagnostic], offending: &str) -> usize {
    diagnostics.iter().filter(|d| d.offending_type == offending).count()
}

// ============================================================================
// C# FIXTURE
// ============================================================================

#[test]
fn test_csharp_fixture_flags_expected_clauses() {
    let result = run_fixture(CSHARP_FIXTURE, "broad_catches.cs", Language::CSharp, dotnet_fixture_world());

    assert_eq!(result.files_analyzed, 1);
    assert_eq!(result.declarations_checked, 10);
    assert_eq!(result.diagnostics.len(), 6);
    assert_eq!(count_of(&result.diagnostics, "Exception"), 3);
    assert_eq!(count_of(&result.diagnostics, CATCH_ALL_DISPLAY), 2);
    assert_eq!(count_of(&result.diagnostics, "SystemException"), 1);
    assert_eq!(count_of(&result.diagnostics, "IOException"), 0);

    for diagnostic in &result.diagnostics {
        assert_eq!(diagnostic.rule_id, "CSE001");
        assert_eq!(diagnostic.file, "broad_catches.cs");
        assert!(diagnostic.message.contains(&diagnostic.offending_type));
    }
}

#[test]
fn test_ungated_and_narrow_methods_yield_nothing() {
    let result = run_fixture(CSHARP_FIXTURE, "broad_catches.cs", Language::CSharp, dotnet_fixture_world());

    let ungated = declaration_range(CSHARP_FIXTURE, Language::CSharp, "UngatedCatchEverything");
    assert!(within(&result.diagnostics, ungated).is_empty());

    let narrow = declaration_range(CSHARP_FIXTURE, Language::CSharp, "CatchNarrow");
    assert!(within(&result.diagnostics, narrow).is_empty());
}

#[test]
fn test_rethrow_does_not_suppress_the_diagnostic() {
    let result = run_fixture(CSHARP_FIXTURE, "broad_catches.cs", Language::CSharp, dotnet_fixture_world());

    let rethrow = declaration_range(CSHARP_FIXTURE, Language::CSharp, "RethrowStillFlags");
    let found = within(&result.diagnostics, rethrow);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].offending_type, "Exception");
}

#[test]
fn test_nested_narrow_then_broad_flags_only_the_catch_all() {
    let result = run_fixture(CSHARP_FIXTURE, "broad_catches.cs", Language::CSharp, dotnet_fixture_world());

    let nested = declaration_range(CSHARP_FIXTURE, Language::CSharp, "NarrowThenNested");
    let found = within(&result.diagnostics, nested);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].offending_type, CATCH_ALL_DISPLAY);
}

#[test]
fn test_accessor_gating_walks_only_the_gated_accessor() {
    let result = run_fixture(CSHARP_FIXTURE, "broad_catches.cs", Language::CSharp, dotnet_fixture_world());

    let getter = declaration_range(CSHARP_FIXTURE, Language::CSharp, "Janitor.get");
    let found = within(&result.diagnostics, getter);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].offending_type, "Exception");

    let setter = declaration_range(CSHARP_FIXTURE, Language::CSharp, "Janitor.set");
    assert!(within(&result.diagnostics, setter).is_empty());
}

// ============================================================================
// JAVA FIXTURE
// ============================================================================

#[test]
fn test_java_fixture_flags_expected_clauses() {
    let result = run_fixture(JAVA_FIXTURE, "broad_catches.java", Language::Java, jvm_fixture_world());

    assert_eq!(result.files_analyzed, 1);
    assert_eq!(result.declarations_checked, 6);
    assert_eq!(result.diagnostics.len(), 3);
    assert_eq!(count_of(&result.diagnostics, "Throwable"), 2);
    assert_eq!(count_of(&result.diagnostics, "RuntimeException"), 1);
    assert_eq!(count_of(&result.diagnostics, "IllegalStateException"), 0);
}

#[test]
fn test_java_nested_flags_only_the_broad_outer_clause() {
    let result = run_fixture(JAVA_FIXTURE, "broad_catches.java", Language::Java, jvm_fixture_world());

    let nested = declaration_range(JAVA_FIXTURE, Language::Java, "nestedNarrowThenBroad");
    let found = within(&result.diagnostics, nested);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].offending_type, "Throwable");
}

// ============================================================================
// GATING AND LIFECYCLE
// ============================================================================

#[test]
fn test_unresolved_marker_makes_the_rule_inert() {
    // A compilation that never references the marker attribute.
    let mut table = SymbolTable::new();
    table.add_type("System.Object", TypeKind::Class);
    table.add_type("System.Exception", TypeKind::Class);
    let compilation = Compilation::new(table);

    let types = CorruptedStateTypes::resolve(&compilation, &WellKnownNames::dotnet());
    assert!(!types.is_active());

    let methods = HashMap::new();
    let catch_types = HashMap::new();
    let units = vec![SourceUnit {
        path: "broad_catches.cs".to_string(),
        language: Language::CSharp,
        source: CSHARP_FIXTURE.to_string(),
    }];
    let cancel = AtomicBool::new(false);
    let result = CorruptedStateAnalyzer::new().analyze_compilation(
        &compilation,
        &types,
        &units,
        |unit, tree| bind_model(tree, &unit.source, unit.language, &methods, &catch_types),
        &cancel,
    );

    assert!(result.diagnostics.is_empty());
    assert_eq!(result.files_analyzed, 0);
    assert_eq!(result.declarations_checked, 0);
}

#[test]
fn test_cancellation_emits_no_diagnostics() {
    let (compilation, methods, catch_types) = dotnet_fixture_world();
    let types = CorruptedStateTypes::resolve(&compilation, &WellKnownNames::dotnet());
    let units = vec![SourceUnit {
        path: "broad_catches.cs".to_string(),
        language: Language::CSharp,
        source: CSHARP_FIXTURE.to_string(),
    }];
    let cancel = AtomicBool::new(true);
    let result = CorruptedStateAnalyzer::new().analyze_compilation(
        &compilation,
        &types,
        &units,
        |unit, tree| bind_model(tree, &unit.source, unit.language, &methods, &catch_types),
        &cancel,
    );

    assert!(result.diagnostics.is_empty());
    assert_eq!(result.files_analyzed, 0);
}

#[test]
fn test_same_named_type_from_another_namespace_is_not_flagged() {
    let source = r#"
        namespace App {
            class Worker {
                [HandleProcessCorruptedStateExceptions]
                public void Run() {
                    try { Step(); } catch (Exception e) { }
                }
                void Step() { }
            }
        }"#;

    let mut table = SymbolTable::new();
    let marker = table.add_type(
        "System.Runtime.ExceptionServices.HandleProcessCorruptedStateExceptionsAttribute",
        TypeKind::Class,
    );
    table.add_type("System.Object", TypeKind::Class);
    table.add_type("System.Exception", TypeKind::Class);
    table.add_type("System.SystemException", TypeKind::Class);
    let impostor = table.add_type("Evil.Exception", TypeKind::Class);
    let worker = table.add_type("App.Worker", TypeKind::Class);
    let run = table.add_method(worker, "Run");
    table.get_mut(run).attributes.push(marker);
    let compilation = Compilation::new(table);
    let types = CorruptedStateTypes::resolve(&compilation, &WellKnownNames::dotnet());

    let methods = HashMap::from([("Run".to_string(), run)]);
    // The binder resolves the `Exception` reference to Evil.Exception.
    let catch_types = HashMap::from([("Exception".to_string(), impostor)]);

    let tree = parse(Language::CSharp, source).unwrap();
    let model = bind_model(&tree, source, Language::CSharp, &methods, &catch_types);
    let run_node = adapter(Language::CSharp)
        .method_like_declarations(Some(tree.root_node()))
        .find(|n| declaration_name(*n, source).as_deref() == Some("Run"))
        .unwrap();

    let diagnostics = CorruptedStateAnalyzer::new().check_declaration(
        run_node,
        "worker.cs",
        adapter(Language::CSharp),
        &model,
        &compilation,
        &types,
    );
    assert!(diagnostics.is_empty());
}

#[test]
fn test_non_declaration_and_non_method_nodes_are_noops() {
    let source = "class A { void M() { try { } catch { } } }";
    let tree = parse(Language::CSharp, source).unwrap();
    let root = tree.root_node();

    let mut table = SymbolTable::new();
    table.add_type(
        "System.Runtime.ExceptionServices.HandleProcessCorruptedStateExceptionsAttribute",
        TypeKind::Class,
    );
    let class_type = table.add_type("A", TypeKind::Class);
    let compilation = Compilation::new(table);
    let types = CorruptedStateTypes::resolve(&compilation, &WellKnownNames::dotnet());
    let analyzer = CorruptedStateAnalyzer::new();

    // Unbound node: not a declaration as far as the model is concerned.
    let model = SemanticModel::new();
    assert!(analyzer
        .check_declaration(root, "a.cs", adapter(Language::CSharp), &model, &compilation, &types)
        .is_empty());

    // Node bound to a type symbol: declaration, but not method-like.
    let method = adapter(Language::CSharp)
        .method_like_declarations(Some(root))
        .next()
        .unwrap();
    let mut model = SemanticModel::new();
    model.bind_declaration(method, class_type);
    assert!(analyzer
        .check_declaration(method, "a.cs", adapter(Language::CSharp), &model, &compilation, &types)
        .is_empty());
}
