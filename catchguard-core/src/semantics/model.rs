//! Symbol table, per-file node bindings, and compilation-level queries
//!
//! The host front end populates these once per compilation/file; analysis
//! reads them without mutation, so sharing across rayon workers is free.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tree_sitter::Node;

use super::types::*;

/// Arena of resolved symbols with a qualified-name index
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_qualified_name: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: SymbolKind, name: &str, qualified_name: &str, containing_type: Option<SymbolId>) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            kind,
            name: name.to_string(),
            metadata_name: name.to_string(),
            qualified_name: qualified_name.to_string(),
            accessibility: Accessibility::Public,
            containing_type,
            is_sealed: false,
            is_synthesized: false,
            type_kind: None,
            base_type: None,
            interfaces: Vec::new(),
            enum_underlying: None,
            attributes: SmallVec::new(),
            members: Vec::new(),
            constant_value: None,
            value_type: None,
        });
        self.by_qualified_name
            .entry(qualified_name.to_string())
            .or_insert(id);
        if let Some(container) = containing_type {
            self.symbols[container.0 as usize].members.push(id);
        }
        id
    }

    /// Add a named type under its fully qualified name. The display name is
    /// the final dotted segment.
    pub fn add_type(&mut self, qualified_name: &str, type_kind: TypeKind) -> SymbolId {
        let name = qualified_name.rsplit('.').next().unwrap_or(qualified_name);
        let id = self.insert(SymbolKind::NamedType, name, qualified_name, None);
        let symbol = &mut self.symbols[id.0 as usize];
        symbol.type_kind = Some(type_kind);
        if type_kind == TypeKind::Enum {
            symbol.enum_underlying = Some(UnderlyingType::Int32);
        }
        id
    }

    /// Add a nested type; the container chain is what visibility walks.
    pub fn add_nested_type(&mut self, containing: SymbolId, name: &str, type_kind: TypeKind) -> SymbolId {
        let qualified = format!("{}.{}", self.symbols[containing.0 as usize].qualified_name, name);
        let id = self.insert(SymbolKind::NamedType, name, &qualified, Some(containing));
        let symbol = &mut self.symbols[id.0 as usize];
        symbol.type_kind = Some(type_kind);
        if type_kind == TypeKind::Enum {
            symbol.enum_underlying = Some(UnderlyingType::Int32);
        }
        id
    }

    pub fn add_method(&mut self, containing: SymbolId, name: &str) -> SymbolId {
        self.add_member(SymbolKind::Method, containing, name)
    }

    pub fn add_field(&mut self, containing: SymbolId, name: &str) -> SymbolId {
        self.add_member(SymbolKind::Field, containing, name)
    }

    pub fn add_property(&mut self, containing: SymbolId, name: &str) -> SymbolId {
        self.add_member(SymbolKind::Property, containing, name)
    }

    pub fn add_local(&mut self, name: &str) -> SymbolId {
        self.insert(SymbolKind::Local, name, name, None)
    }

    pub fn add_parameter(&mut self, name: &str) -> SymbolId {
        self.insert(SymbolKind::Parameter, name, name, None)
    }

    fn add_member(&mut self, kind: SymbolKind, containing: SymbolId, name: &str) -> SymbolId {
        let qualified = format!("{}.{}", self.symbols[containing.0 as usize].qualified_name, name);
        self.insert(kind, name, &qualified, Some(containing))
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    /// Look up a symbol by fully qualified name
    pub fn lookup(&self, qualified_name: &str) -> Option<SymbolId> {
        self.by_qualified_name.get(qualified_name).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// True iff `ty` derives from `base`: the base-type chain (self included)
    /// reaches it, or, unless `base_types_only`, some type on the chain
    /// implements it.
    pub fn is_derived_from(&self, ty: Option<SymbolId>, base: Option<SymbolId>, base_types_only: bool) -> bool {
        let (Some(ty), Some(base)) = (ty, base) else {
            return false;
        };
        let mut current = Some(ty);
        while let Some(id) = current {
            if id == base {
                return true;
            }
            let symbol = self.get(id);
            if !base_types_only && symbol.interfaces.contains(&base) {
                return true;
            }
            current = symbol.base_type;
        }
        false
    }

    /// True iff `member` is declared directly on `ty` under `name`
    pub fn match_member(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        match member {
            Some(id) => {
                let symbol = self.get(id);
                symbol.containing_type == Some(ty) && symbol.metadata_name == name
            }
            None => false,
        }
    }

    pub fn match_method(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        self.member_is_kind(member, SymbolKind::Method) && self.match_member(member, ty, name)
    }

    pub fn match_property(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        self.member_is_kind(member, SymbolKind::Property) && self.match_member(member, ty, name)
    }

    pub fn match_field(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        self.member_is_kind(member, SymbolKind::Field) && self.match_member(member, ty, name)
    }

    /// True iff `member` is named `name` and its containing type derives
    /// from `ty`
    pub fn match_member_derived(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        match member {
            Some(id) => {
                let symbol = self.get(id);
                self.is_derived_from(symbol.containing_type, Some(ty), false) && symbol.metadata_name == name
            }
            None => false,
        }
    }

    pub fn match_method_derived(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        self.member_is_kind(member, SymbolKind::Method) && self.match_member_derived(member, ty, name)
    }

    pub fn match_property_derived(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        self.member_is_kind(member, SymbolKind::Property) && self.match_member_derived(member, ty, name)
    }

    pub fn match_field_derived(&self, member: Option<SymbolId>, ty: SymbolId, name: &str) -> bool {
        self.member_is_kind(member, SymbolKind::Field) && self.match_member_derived(member, ty, name)
    }

    /// Type of a field/local/parameter/property symbol; `None` for any other
    /// kind
    pub fn variable_symbol_type(&self, symbol: Option<SymbolId>) -> Option<SymbolId> {
        let symbol = self.get(symbol?);
        match symbol.kind {
            SymbolKind::Field | SymbolKind::Local | SymbolKind::Parameter | SymbolKind::Property => symbol.value_type,
            _ => None,
        }
    }

    fn member_is_kind(&self, member: Option<SymbolId>, kind: SymbolKind) -> bool {
        member.map_or(false, |id| self.get(id).kind == kind)
    }
}

/// Per-file bindings from parse-tree nodes to resolved symbols
///
/// Keys are tree-sitter node identities, so a model is only meaningful for
/// the exact tree the host bound it against.
#[derive(Debug, Default)]
pub struct SemanticModel {
    declarations: FxHashMap<usize, SymbolId>,
    type_refs: FxHashMap<usize, SymbolId>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a declaration node to the symbol it declares
    pub fn bind_declaration(&mut self, node: Node, symbol: SymbolId) {
        self.declarations.insert(node.id(), symbol);
    }

    /// Bind a type-reference node to the type it resolves to
    pub fn bind_type(&mut self, node: Node, symbol: SymbolId) {
        self.type_refs.insert(node.id(), symbol);
    }

    /// Symbol declared by the node, if the node is a bound declaration
    pub fn declared_symbol(&self, node: Node) -> Option<SymbolId> {
        self.declarations.get(&node.id()).copied()
    }

    /// Type a reference node resolves to, if bound
    pub fn resolved_type(&self, node: Node) -> Option<SymbolId> {
        self.type_refs.get(&node.id()).copied()
    }
}

/// One compilation: the symbol table plus assembly-level attribute uses
#[derive(Debug, Default)]
pub struct Compilation {
    pub symbols: SymbolTable,
    pub assembly_attributes: Vec<AttributeUse>,
}

impl Compilation {
    pub fn new(symbols: SymbolTable) -> Self {
        Self {
            symbols,
            assembly_attributes: Vec::new(),
        }
    }

    /// Resolve a named type by fully qualified metadata name
    pub fn type_by_metadata_name(&self, qualified_name: &str) -> Option<SymbolId> {
        self.symbols
            .lookup(qualified_name)
            .filter(|id| self.symbols.get(*id).kind == SymbolKind::NamedType)
    }
}
