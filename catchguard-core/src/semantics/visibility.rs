//! Assembly-visibility reachability
//!
//! A symbol is visible outside its assembly only if every level of its
//! lexical containment chain is. Protected access on a member of a sealed
//! type is treated as invisible: external code can never subclass the
//! container to reach it.

use super::model::SymbolTable;
use super::types::{Accessibility, SymbolId};

/// True iff the symbol is observable from outside its defining assembly.
pub fn is_visible_outside_assembly(table: &SymbolTable, symbol: Option<SymbolId>) -> bool {
    let Some(symbol) = symbol else {
        return false;
    };
    let mut current = Some(symbol);
    while let Some(id) = current {
        if is_invisible_at_symbol_level(table, id) {
            return false;
        }
        current = table.get(id).containing_type;
    }
    true
}

fn is_invisible_at_symbol_level(table: &SymbolTable, symbol: SymbolId) -> bool {
    is_private_or_internal(table, symbol) || is_protected_in_sealed(table, symbol)
}

fn is_private_or_internal(table: &SymbolTable, symbol: SymbolId) -> bool {
    matches!(
        table.get(symbol).accessibility,
        Accessibility::Private
            | Accessibility::Internal
            | Accessibility::ProtectedAndInternal
            | Accessibility::NotApplicable
    )
}

fn is_protected_in_sealed(table: &SymbolTable, symbol: SymbolId) -> bool {
    let Some(containing) = table.get(symbol).containing_type else {
        return false;
    };
    if !table.get(containing).is_sealed {
        return false;
    }
    matches!(
        table.get(symbol).accessibility,
        Accessibility::Protected | Accessibility::ProtectedOrInternal
    )
}
