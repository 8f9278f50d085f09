//! Catalog merger
//!
//! Runs the per-source pipeline (tokenize, pair directives, classify,
//! aggregate) on every source and concatenates the results in submission
//! order. A source that fails is skipped with a diagnostic; the others are
//! still merged. Series are not unified across sources: the same show coming
//! from two sources yields two series items.

use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::Config;
use crate::error::SourceError;
use crate::models::{Catalog, Diagnostic, DiagnosticKind};
use crate::services::aggregator::SeriesAggregator;
use crate::services::classifier::{Classified, ContentClassifier};
use crate::services::m3u_parser::parse_entries;
use crate::services::tokenizer::tokenize;

/// One block of playlist text to ingest
#[derive(Debug, Clone)]
pub struct PlaylistSource {
    pub label: String,
    pub content: Vec<u8>,
}

impl PlaylistSource {
    pub fn new(label: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// Outcome of parsing one source
#[derive(Debug, Clone)]
pub struct SourceParse {
    pub label: String,
    pub result: Result<Catalog, SourceError>,
    /// Local diagnostics, already tagged with the source label
    pub diagnostics: Vec<Diagnostic>,
}

/// Whether the merged catalog can be offered for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogState {
    Ready,
    Empty,
}

/// Merged catalog together with everything that was skipped on the way
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCatalog {
    pub catalog: Catalog,
    pub diagnostics: Vec<Diagnostic>,
    pub sources_merged: usize,
    pub sources_skipped: usize,
}

impl MergedCatalog {
    pub fn state(&self) -> CatalogState {
        if self.catalog.is_empty() {
            CatalogState::Empty
        } else {
            CatalogState::Ready
        }
    }

    /// Record a source that contributed nothing to the catalog
    pub fn skip_source(&mut self, label: &str, error: SourceError) {
        tracing::warn!(source = %label, error = %error, "Skipping playlist source");
        self.sources_skipped += 1;
        self.diagnostics.push(
            Diagnostic::for_source(DiagnosticKind::SourceSkipped {
                reason: error.to_string(),
            })
            .in_source(label),
        );
    }
}

/// Parse playlist text into a per-source catalog.
/// Pure: the same text and config always give the same catalog.
pub fn parse_playlist(text: &str, config: &Config, diagnostics: &mut Vec<Diagnostic>) -> Catalog {
    let tokens = tokenize(text, config, diagnostics);
    let parsed = parse_entries(&tokens, config, diagnostics);

    let classifier = ContentClassifier::new(config);
    let mut aggregator = SeriesAggregator::new();
    let mut groups = BTreeSet::new();

    for (index, entry) in parsed.entries.into_iter().enumerate() {
        if let Some(classified) = classifier.classify(entry, index, diagnostics) {
            let group = match &classified {
                Classified::Standalone(item) => &item.group,
                Classified::Episode(episode) => &episode.group,
            };
            groups.insert(group.clone());
            aggregator.push(classified);
        }
    }

    Catalog::new(aggregator.finish(), groups)
}

/// Decode and parse one source; never panics on malformed input
pub fn parse_source(source: &PlaylistSource, config: &Config) -> SourceParse {
    let mut diagnostics = Vec::new();

    let result = match std::str::from_utf8(&source.content) {
        Ok(text) => {
            let catalog = parse_playlist(text, config, &mut diagnostics);
            if catalog.is_empty() {
                Err(SourceError::NoEntries)
            } else {
                Ok(catalog)
            }
        }
        Err(e) => Err(SourceError::InvalidEncoding {
            offset: e.valid_up_to(),
        }),
    };

    let diagnostics = diagnostics
        .into_iter()
        .map(|d| d.in_source(&source.label))
        .collect();

    SourceParse {
        label: source.label.clone(),
        result,
        diagnostics,
    }
}

/// Concatenate per-source results in the order given
pub fn merge_parsed(parsed: Vec<SourceParse>) -> MergedCatalog {
    let mut items = Vec::new();
    let mut groups = BTreeSet::new();
    let mut merged = MergedCatalog {
        catalog: Catalog::default(),
        diagnostics: Vec::new(),
        sources_merged: 0,
        sources_skipped: 0,
    };

    for source in parsed {
        merged.diagnostics.extend(source.diagnostics);

        match source.result {
            Ok(catalog) => {
                tracing::info!(
                    source = %source.label,
                    items = catalog.items.len(),
                    groups = catalog.groups.len(),
                    "Source parsed"
                );
                merged.sources_merged += 1;
                items.extend(catalog.items);
                groups.extend(catalog.groups);
            }
            Err(e) => merged.skip_source(&source.label, e),
        }
    }

    merged.catalog = Catalog::new(items, groups);

    if merged.state() == CatalogState::Empty {
        tracing::warn!(sources_skipped = merged.sources_skipped, "Merged catalog is empty");
    } else {
        tracing::info!(
            items = merged.catalog.items.len(),
            groups = merged.catalog.groups.len(),
            sources = merged.sources_merged,
            "Catalog merged"
        );
    }

    merged
}

/// Parse and merge sources one after another
pub fn merge_sources(sources: &[PlaylistSource], config: &Config) -> MergedCatalog {
    merge_parsed(sources.iter().map(|s| parse_source(s, config)).collect())
}

/// Parse sources on blocking worker tasks and merge them.
/// Results are collected in submission order, not completion order.
pub async fn merge_sources_concurrent(
    sources: Vec<PlaylistSource>,
    config: Arc<Config>,
) -> MergedCatalog {
    let tasks = sources.into_iter().map(|source| {
        let config = Arc::clone(&config);
        async move {
            let label = source.label.clone();
            match tokio::task::spawn_blocking(move || parse_source(&source, &config)).await {
                Ok(parsed) => parsed,
                Err(e) => SourceParse {
                    label,
                    result: Err(SourceError::Worker(e.to_string())),
                    diagnostics: Vec::new(),
                },
            }
        }
    });

    merge_parsed(join_all(tasks).await)
}
