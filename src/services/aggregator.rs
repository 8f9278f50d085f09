use std::collections::HashMap;

use crate::models::{ContentItem, ContentKind, Episode};
use crate::services::classifier::Classified;
use crate::services::m3u_parser::hash_key;

/// Accumulated series data during aggregation
#[derive(Debug)]
struct SeriesAccumulator {
    id: String,
    title: String,
    group: String,
    logo: Option<String>,
    episodes: Vec<Episode>,
}

impl SeriesAccumulator {
    /// Insert keeping (season, episode) order; equal keys stay in arrival order
    fn insert(&mut self, episode: Episode) {
        let key = (episode.season, episode.episode);
        let at = self
            .episodes
            .partition_point(|e| (e.season, e.episode) <= key);
        self.episodes.insert(at, episode);
    }

    fn into_item(self) -> ContentItem {
        ContentItem {
            id: self.id,
            title: self.title,
            logo: self.logo,
            group: self.group,
            kind: ContentKind::Series {
                episodes: self.episodes,
            },
        }
    }
}

/// Grouping key: normalized series title + group
fn series_key(episode: &Episode) -> (String, String) {
    (episode.series_title.trim().to_lowercase(), episode.group.clone())
}

/// Collapses episodes into series; live channels and movies pass through
#[derive(Debug, Default)]
pub struct SeriesAggregator {
    items: Vec<ContentItem>,
    series: Vec<SeriesAccumulator>,
    index: HashMap<(String, String), usize>,
}

impl SeriesAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, classified: Classified) {
        match classified {
            Classified::Standalone(item) => self.items.push(item),
            Classified::Episode(episode) => self.push_episode(episode),
        }
    }

    fn push_episode(&mut self, episode: Episode) {
        let key = series_key(&episode);

        if let Some(&slot) = self.index.get(&key) {
            self.series[slot].insert(episode);
            return;
        }

        // First episode defines the series' title, logo and group
        let id = format!("series_{}", hash_key(&format!("{}_{}", key.1, key.0)));
        self.index.insert(key, self.series.len());
        self.series.push(SeriesAccumulator {
            id,
            title: episode.series_title.trim().to_string(),
            group: episode.group.clone(),
            logo: episode.logo.clone(),
            episodes: vec![episode],
        });
    }

    /// Standalone items followed by series, stably sorted by kind then title
    pub fn finish(self) -> Vec<ContentItem> {
        let series_count = self.series.len();
        let episode_count: usize = self.series.iter().map(|s| s.episodes.len()).sum();
        tracing::debug!(
            series = series_count,
            episodes = episode_count,
            "Series grouped"
        );

        let mut items = self.items;
        items.extend(self.series.into_iter().map(SeriesAccumulator::into_item));
        items.sort_by(|a, b| {
            a.kind
                .rank()
                .cmp(&b.kind.rank())
                .then_with(|| a.title.cmp(&b.title))
        });
        items
    }
}
