use serde::Deserialize;
use std::collections::HashMap;
use std::env;

/// Keyword set consulted to recognize series groups
pub const SERIES_KEYWORDS: &str = "series";
/// Keyword set consulted to recognize movie groups
pub const MOVIE_KEYWORDS: &str = "movie";

const DEFAULT_MAX_LINES: usize = 500_000;
const DEFAULT_MAX_LINE_LENGTH: usize = 32 * 1024; // protect against maliciously long lines
const DEFAULT_MAX_TITLE_LENGTH: usize = 512;
const DEFAULT_MAX_DESCRIPTION_LENGTH: usize = 1024;
const DEFAULT_MAX_LOGO_LENGTH: usize = 2048;
const DEFAULT_MAX_URL_LENGTH: usize = 4096;
const DEFAULT_GROUP: &str = "Uncategorized";

/// Engine configuration: parsing limits, field caps and classification keywords
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    // Tokenizer limits
    pub max_lines: usize,
    pub max_line_length: usize,

    // Field caps (characters)
    pub max_title_length: usize,
    pub max_description_length: usize,
    pub max_logo_length: usize,
    pub max_url_length: usize,

    // Classification
    /// Keyword set name -> lowercase substrings matched against group labels
    pub keyword_sets: HashMap<String, Vec<String>>,
    pub default_group: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a variable lookup, falling back to defaults
    /// for missing or unparsable values
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let limit = |key: &str, default: usize| -> usize {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let mut keyword_sets = defaults.keyword_sets;
        if let Some(raw) = lookup("CATALOG_SERIES_KEYWORDS") {
            keyword_sets.insert(SERIES_KEYWORDS.to_string(), split_keywords(&raw));
        }
        if let Some(raw) = lookup("CATALOG_MOVIE_KEYWORDS") {
            keyword_sets.insert(MOVIE_KEYWORDS.to_string(), split_keywords(&raw));
        }

        Self {
            max_lines: limit("CATALOG_MAX_LINES", DEFAULT_MAX_LINES),
            max_line_length: limit("CATALOG_MAX_LINE_LENGTH", DEFAULT_MAX_LINE_LENGTH),

            max_title_length: limit("CATALOG_MAX_TITLE_LENGTH", DEFAULT_MAX_TITLE_LENGTH),
            max_description_length: limit(
                "CATALOG_MAX_DESCRIPTION_LENGTH",
                DEFAULT_MAX_DESCRIPTION_LENGTH,
            ),
            max_logo_length: limit("CATALOG_MAX_LOGO_LENGTH", DEFAULT_MAX_LOGO_LENGTH),
            max_url_length: limit("CATALOG_MAX_URL_LENGTH", DEFAULT_MAX_URL_LENGTH),

            keyword_sets,
            default_group: lookup("CATALOG_DEFAULT_GROUP")
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .unwrap_or(defaults.default_group),
        }
    }

    /// Keywords for a named set (empty when the set is not configured)
    pub fn keywords(&self, set: &str) -> &[String] {
        self.keyword_sets
            .get(set)
            .map(|k| k.as_slice())
            .unwrap_or(&[])
    }

    /// True when the lowercased group label contains any keyword of `set`
    pub fn group_matches(&self, set: &str, group: &str) -> bool {
        let lower_group = group.to_lowercase();
        self.keywords(set)
            .iter()
            .filter(|k| !k.is_empty())
            .any(|k| lower_group.contains(&k.to_lowercase()))
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut keyword_sets = HashMap::new();
        keyword_sets.insert(
            SERIES_KEYWORDS.to_string(),
            vec!["serie".to_string(), "séries".to_string(), "série".to_string()],
        );
        keyword_sets.insert(
            MOVIE_KEYWORDS.to_string(),
            vec![
                "movie".to_string(),
                "filme".to_string(),
                "pelicula".to_string(),
                "película".to_string(),
            ],
        );

        Self {
            max_lines: DEFAULT_MAX_LINES,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
            max_description_length: DEFAULT_MAX_DESCRIPTION_LENGTH,
            max_logo_length: DEFAULT_MAX_LOGO_LENGTH,
            max_url_length: DEFAULT_MAX_URL_LENGTH,
            keyword_sets,
            default_group: DEFAULT_GROUP.to_string(),
        }
    }
}

/// Comma-separated keyword list, lowercased, blanks dropped
fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
