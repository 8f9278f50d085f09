pub mod catalog;
pub mod diagnostic;

pub use catalog::{Catalog, CatalogStats, ContentItem, ContentKind, Episode, RawEntry};
pub use diagnostic::{Diagnostic, DiagnosticKind};
