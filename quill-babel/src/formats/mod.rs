//! Format implementations
//!
//! This module contains all format implementations that convert between the
//! document tree and a text representation.

pub mod icons;
pub mod json;
pub mod markup;
pub mod treeviz;

pub use json::JsonFormat;
pub use markup::{MarkupFormat, MarkupOptions, MentionDirectory};
pub use treeviz::TreevizFormat;
