//! PDF rendering of a selection: an overview page and a labelled detail page.

mod document;
mod layout;
mod text;

pub use document::MapRenderer;
