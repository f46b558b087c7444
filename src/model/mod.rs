//! Document model shared by the recognizer and both renderers.
//!
//! A [`Document`] is assembled once by [`DocumentBuilder`] and is read-only
//! afterwards: renderers only ever receive `&Document`.

mod builder;
mod document;
mod page;
mod stats;
mod table;

pub use builder::DocumentBuilder;
pub use document::{Document, Metadata, UNKNOWN_AUTHOR};
pub use page::{Block, Page};
pub use stats::ConversionStats;
pub use table::Table;
