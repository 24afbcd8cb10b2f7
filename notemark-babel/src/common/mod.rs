//! Text-level helpers shared by the Markdown importer and exporter.

pub mod escape;
pub mod frontmatter;
pub mod table;
