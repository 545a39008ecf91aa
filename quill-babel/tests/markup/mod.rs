//! Markup dialect tests
//!
//! Tests for tree ↔ markup conversion through the public entry points.

mod commonmark;
mod disclosure;
mod laws;
mod marks;
