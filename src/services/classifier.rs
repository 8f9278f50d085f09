use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{Config, MOVIE_KEYWORDS, SERIES_KEYWORDS};
use crate::models::{ContentItem, ContentKind, Diagnostic, DiagnosticKind, Episode, RawEntry};
use crate::services::m3u_parser::{generate_item_id, normalize_text, truncate_chars};

/// Characters stripped around derived series titles and episode descriptions
const SEPARATORS: &[char] = &['-', '_', '.', ':', '|', ',', '–', '—'];

lazy_static! {
    // ============ SEASON/EPISODE PATTERNS ============
    /// Letter-prefixed notation: S01E02, T01E02, s1.e2, S2024E05, ShowS01E02
    static ref MARKER_SEASON_EPISODE: Regex =
        Regex::new(r"(?i)(?P<token>[ST](?P<season>[0-9]+)[\s._-]?E(?P<episode>[0-9]+))").unwrap();
    /// Bare numeric notation: 1x02, Show.Name.1x02 (season digits not preceded by
    /// another digit, so resolutions like 1920x1080 are left alone)
    static ref NUMERIC_SEASON_EPISODE: Regex =
        Regex::new(r"(?i)(?:^|[^0-9])(?P<token>(?P<season>[0-9]{1,2})x(?P<episode>[0-9]+))").unwrap();
}

/// Season/episode token found in a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
    /// Byte range of the matched token in the title
    pub start: usize,
    pub end: usize,
}

/// Result of classifying one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Live channel or movie, ready for the catalog
    Standalone(ContentItem),
    /// Episode still to be grouped into its series
    Episode(Episode),
}

/// Find the first season/episode token; marker notation wins over numeric.
/// Numbers too large for `u32` don't count as a match.
pub fn detect_season_episode(title: &str) -> Option<SeasonEpisode> {
    [&*MARKER_SEASON_EPISODE, &*NUMERIC_SEASON_EPISODE]
        .iter()
        .find_map(|pattern| {
            pattern.captures_iter(title).find_map(|caps| {
                let token = caps.name("token")?;
                Some(SeasonEpisode {
                    season: caps.name("season")?.as_str().parse().ok()?,
                    episode: caps.name("episode")?.as_str().parse().ok()?,
                    start: token.start(),
                    end: token.end(),
                })
            })
        })
}

fn trim_separators(text: &str) -> String {
    let collapsed = normalize_text(text);
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .to_string()
}

/// Content classifier for playlist entries, driven by configured group keywords
pub struct ContentClassifier<'a> {
    config: &'a Config,
}

impl<'a> ContentClassifier<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Classify an entry as live channel, movie or series episode.
    /// `index` is the entry's position in its source and feeds the item id.
    pub fn classify(
        &self,
        entry: RawEntry,
        index: usize,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Classified> {
        let is_series_group = self.config.group_matches(SERIES_KEYWORDS, &entry.group);

        // 1. Series: needs both a series group and a season/episode token
        if is_series_group {
            if let Some(marker) = detect_season_episode(&entry.title) {
                return self.episode(entry, &marker, diagnostics);
            }
        }

        let title = Self::select_title(&entry);
        if title.is_empty() {
            diagnostics.push(Diagnostic::at_line(entry.line, DiagnosticKind::EmptyTitle));
            return None;
        }

        // 2. Movies
        if self.config.group_matches(MOVIE_KEYWORDS, &entry.group) {
            let description = truncate_chars(&entry.title, self.config.max_description_length);
            return Some(Classified::Standalone(ContentItem {
                id: generate_item_id("movie", &entry.url, index),
                title,
                logo: entry.logo,
                group: entry.group,
                kind: ContentKind::Movie {
                    url: entry.url,
                    description,
                },
            }));
        }

        // 3. Everything else is live
        Some(Classified::Standalone(ContentItem {
            id: generate_item_id("live", &entry.url, index),
            title,
            logo: entry.logo,
            group: entry.group,
            kind: ContentKind::LiveChannel { url: entry.url },
        }))
    }

    /// Name attribute when present, raw title otherwise
    fn select_title(entry: &RawEntry) -> String {
        entry
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&entry.title)
            .trim()
            .to_string()
    }

    fn episode(
        &self,
        entry: RawEntry,
        marker: &SeasonEpisode,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Classified> {
        let series_title = Self::series_title(&entry, marker);
        if series_title.is_empty() {
            tracing::warn!(line = entry.line, title = %entry.title, "Episode without series title");
            diagnostics.push(Diagnostic::at_line(entry.line, DiagnosticKind::EmptyTitle));
            return None;
        }

        let description = truncate_chars(
            &Self::episode_description(&entry.title, &series_title, marker),
            self.config.max_description_length,
        );

        Some(Classified::Episode(Episode {
            series_title,
            season: marker.season,
            episode: marker.episode,
            description,
            logo: entry.logo,
            group: entry.group,
            url: entry.url,
        }))
    }

    /// Series title: name attribute when present, else the title up to the token
    pub fn series_title(entry: &RawEntry, marker: &SeasonEpisode) -> String {
        match entry.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => trim_separators(&entry.title[..marker.start]),
        }
    }

    /// Title with the series name and season/episode token removed
    pub fn episode_description(title: &str, series_title: &str, marker: &SeasonEpisode) -> String {
        let without_token = format!("{} {}", &title[..marker.start], &title[marker.end..]);
        let remainder = trim_separators(&without_token.replacen(series_title, "", 1));

        if remainder.is_empty() {
            format!("Season {}, Episode {}", marker.season, marker.episode)
        } else {
            remainder
        }
    }
}
