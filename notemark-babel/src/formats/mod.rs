//! Format implementations
//!
//! This module contains the formats a [`crate::model::Note`] converts to and from:
//! Markdown (storage), JSON (the model itself) and treeviz (a debugging view).

pub mod icons;
pub mod json;
pub mod markdown;
pub mod treeviz;

pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
pub use treeviz::TreevizFormat;
