//! Intermediate Representation (IR) for rich documents.
//!
//! `nodes` is the typed tree every component works on, `wire` the JSON shapes
//! exchanged with the editor, and `events` the flat stream used between the
//! tree and the markup text.

pub mod events;
pub mod nodes;
pub mod wire;
