//! Playlist ingestion and content classification.
//!
//! Turns M3U playlist text from one or more sources into a typed catalog of
//! live channels, movies and series:
//!
//! ```text
//! tokenizer -> m3u_parser -> classifier -> aggregator   (per source)
//!                                                merger (all sources)
//! ```
//!
//! Parsing is synchronous and never fails on malformed input; anything that
//! is skipped is reported as a [`models::Diagnostic`].
//!
//! ```rust
//! use ativeplay_catalog::{merge_sources, Config, PlaylistSource};
//!
//! let source = PlaylistSource::new(
//!     "main",
//!     "#EXTM3U\n#EXTINF:-1 group-title=\"Series\",Show Name S01E02\nhttp://x/ep.ts\n",
//! );
//! let merged = merge_sources(&[source], &Config::default());
//! assert_eq!(merged.catalog.items[0].title, "Show Name");
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::SourceError;
pub use models::{Catalog, CatalogStats, ContentItem, ContentKind, Diagnostic, DiagnosticKind, Episode};
pub use services::merger::{
    merge_parsed, merge_sources, merge_sources_concurrent, parse_playlist, parse_source,
    CatalogState, MergedCatalog, PlaylistSource, SourceParse,
};
