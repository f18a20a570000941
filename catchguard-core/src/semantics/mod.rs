//! Semantics module - symbol model and shared symbol queries
//!
//! The host front end binds resolved symbols onto parse trees; everything in
//! this module reads those bindings without mutating them. Symbol identity is
//! the binding-time `SymbolId`, never a name comparison.

mod framework;
mod model;
mod types;
mod values;
mod visibility;

pub use framework::{framework_version, parse_framework_name, FrameworkVersion, TARGET_FRAMEWORK_ATTRIBUTE};
pub use model::{Compilation, SemanticModel, SymbolTable};
pub use types::*;
pub use values::{enum_member_values, try_convert_to_u64, ValuesError};
pub use visibility::is_visible_outside_assembly;
