//! Rules module - diagnostic model and the corrupted-state catch rule

mod corrupted_state;
mod types;

pub use corrupted_state::{
    CorruptedStateAnalyzer, CorruptedStateTypes, WellKnownNames, CATCH_ALL_DISPLAY, CORRUPTED_STATE_CATCH,
};
pub use types::*;
