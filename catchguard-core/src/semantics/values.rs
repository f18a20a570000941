//! Canonical constant widening and enum value extraction
//!
//! Constants of any fixed-width integral representation widen to u64 so that
//! bit-pattern comparisons across widths are well-defined. Negative signed
//! values sign-extend (two's complement), they are not clamped.

use thiserror::Error;

use super::model::SymbolTable;
use super::types::{ConstValue, SymbolId, SymbolKind, TypeKind, UnderlyingType};

/// Why enum values could not be determined
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValuesError {
    #[error("type `{0}` is not an enum")]
    NotAnEnum(String),
    #[error("enum member `{0}` has no compile-time constant value")]
    NonConstantMember(String),
}

/// Widen a constant of the given representation to a canonical u64.
///
/// `None` when the value does not carry the claimed representation or is not
/// integral.
pub fn try_convert_to_u64(value: &ConstValue, underlying: UnderlyingType) -> Option<u64> {
    match (underlying, value) {
        (UnderlyingType::Int8, ConstValue::Int8(v)) => Some(*v as u64),
        (UnderlyingType::Int16, ConstValue::Int16(v)) => Some(*v as u64),
        (UnderlyingType::Int32, ConstValue::Int32(v)) => Some(*v as u64),
        (UnderlyingType::Int64, ConstValue::Int64(v)) => Some(*v as u64),
        (UnderlyingType::UInt8, ConstValue::UInt8(v)) => Some(*v as u64),
        (UnderlyingType::UInt16, ConstValue::UInt16(v)) => Some(*v as u64),
        (UnderlyingType::UInt32, ConstValue::UInt32(v)) => Some(*v as u64),
        (UnderlyingType::UInt64, ConstValue::UInt64(v)) => Some(*v),
        (UnderlyingType::Char, ConstValue::Char(c)) => Some(*c as u64),
        _ => None,
    }
}

/// Canonical u64 value of every non-synthesized member of an enum type,
/// declaration order.
pub fn enum_member_values(table: &SymbolTable, enum_type: SymbolId) -> Result<Vec<u64>, ValuesError> {
    let symbol = table.get(enum_type);
    if symbol.type_kind != Some(TypeKind::Enum) {
        return Err(ValuesError::NotAnEnum(symbol.name.clone()));
    }
    let underlying = symbol.enum_underlying.unwrap_or(UnderlyingType::Int32);

    let mut values = Vec::new();
    for member_id in &symbol.members {
        let member = table.get(*member_id);
        if member.kind != SymbolKind::Field || member.is_synthesized {
            continue;
        }
        let constant = member
            .constant_value
            .as_ref()
            .ok_or_else(|| ValuesError::NonConstantMember(member.name.clone()))?;
        let value = try_convert_to_u64(constant, underlying)
            .ok_or_else(|| ValuesError::NonConstantMember(member.name.clone()))?;
        values.push(value);
    }
    Ok(values)
}
