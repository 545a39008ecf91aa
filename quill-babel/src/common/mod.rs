//! Shared conversion machinery used by every format.

pub mod flat_to_nested;
pub mod nested_to_flat;
pub mod normalize;
