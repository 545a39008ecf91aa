//! Editor JSON tests
//!
//! Tests for the two disclosure shapes and the normalizer between them.

mod shapes;
