//! Output formatter implementations

pub mod json_lines;
pub mod text;

pub use json_lines::JsonLinesFormatter;
pub use text::TextFormatter;
