//! Markdown format tests
//!
//! Tests for Markdown import into the line model, export back to Markdown, and the
//! round trip between them.

mod export;
mod import;
mod roundtrip;
