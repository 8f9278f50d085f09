use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Single playlist entry as read from a directive + URL pair, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    /// Explicit name attribute (`tvg-name`)
    pub name: Option<String>,
    pub logo: Option<String>,
    pub group: String,
    pub url: String,
    /// 1-based line of the directive
    pub line: usize,
}

/// Variant-specific payload of a content item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentKind {
    LiveChannel {
        url: String,
    },
    Movie {
        url: String,
        description: String,
    },
    Series {
        episodes: Vec<Episode>,
    },
}

impl ContentKind {
    /// Sort rank: live channels, then movies, then series
    pub fn rank(&self) -> u8 {
        match self {
            ContentKind::LiveChannel { .. } => 0,
            ContentKind::Movie { .. } => 1,
            ContentKind::Series { .. } => 2,
        }
    }
}

/// Classified catalog unit (live channel, movie or series)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub group: String,
    #[serde(flatten)]
    pub kind: ContentKind,
}

impl ContentItem {
    /// Playable URL; series are containers and have none
    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            ContentKind::LiveChannel { url } | ContentKind::Movie { url, .. } => Some(url),
            ContentKind::Series { .. } => None,
        }
    }

    pub fn episodes(&self) -> &[Episode] {
        match &self.kind {
            ContentKind::Series { episodes } => episodes,
            ContentKind::LiveChannel { .. } | ContentKind::Movie { .. } => &[],
        }
    }
}

/// Episode owned by exactly one series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub series_title: String,
    pub season: u32,
    pub episode: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub group: String,
    pub url: String,
}

/// Catalog statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_items: usize,
    pub live_count: usize,
    pub movie_count: usize,
    pub series_count: usize,
    pub episode_count: usize,
    pub group_count: usize,
}

/// Ordered content list plus the sorted set of group labels it was built from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub items: Vec<ContentItem>,
    pub groups: Vec<String>,
}

impl Catalog {
    /// Build a catalog from items and the directive-level groups observed for them
    pub fn new(items: Vec<ContentItem>, groups: BTreeSet<String>) -> Self {
        Self {
            items,
            groups: groups.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            total_items: self.items.len(),
            group_count: self.groups.len(),
            ..Default::default()
        };

        for item in &self.items {
            match &item.kind {
                ContentKind::LiveChannel { .. } => stats.live_count += 1,
                ContentKind::Movie { .. } => stats.movie_count += 1,
                ContentKind::Series { episodes } => {
                    stats.series_count += 1;
                    stats.episode_count += episodes.len();
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(title: &str, group: &str) -> ContentItem {
        ContentItem {
            id: format!("live_{}", title),
            title: title.to_string(),
            logo: None,
            group: group.to_string(),
            kind: ContentKind::LiveChannel {
                url: format!("http://x/{}.ts", title),
            },
        }
    }

    #[test]
    fn test_stats_counts_each_kind() {
        let episode = Episode {
            series_title: "Show".to_string(),
            season: 1,
            episode: 1,
            description: "Pilot".to_string(),
            logo: None,
            group: "Series".to_string(),
            url: "http://x/1.ts".to_string(),
        };
        let series = ContentItem {
            id: "series_1".to_string(),
            title: "Show".to_string(),
            logo: None,
            group: "Series".to_string(),
            kind: ContentKind::Series {
                episodes: vec![episode.clone(), Episode { episode: 2, ..episode }],
            },
        };
        let catalog = Catalog::new(
            vec![live("A", "News"), series],
            ["News".to_string(), "Series".to_string()].into_iter().collect(),
        );

        let stats = catalog.stats();
        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.live_count, 1);
        assert_eq!(stats.movie_count, 0);
        assert_eq!(stats.series_count, 1);
        assert_eq!(stats.episode_count, 2);
        assert_eq!(stats.group_count, 2);
    }

    #[test]
    fn test_series_has_no_url() {
        let series = ContentItem {
            id: "s".to_string(),
            title: "Show".to_string(),
            logo: None,
            group: "Series".to_string(),
            kind: ContentKind::Series { episodes: vec![] },
        };
        assert_eq!(series.url(), None);
        assert_eq!(live("A", "News").url(), Some("http://x/A.ts"));
        assert!(live("A", "News").episodes().is_empty());
    }

    #[test]
    fn test_item_serializes_kind_tag() {
        let json = serde_json::to_value(live("A", "News")).unwrap();
        assert_eq!(json["kind"], "liveChannel");
        assert_eq!(json["url"], "http://x/A.ts");
        assert!(json.get("logo").is_none());
    }
}
