use lazy_static::lazy_static;
use regex::Regex;
use sha1::{Digest, Sha1};
use std::collections::HashMap;

use crate::config::Config;
use crate::models::{Diagnostic, DiagnosticKind, RawEntry};
use crate::services::tokenizer::Token;

const HEADER: &str = "#EXTM3U";
const DIRECTIVE: &str = "#EXTINF:";
const GROUP_DIRECTIVE: &str = "#EXTGRP:";

lazy_static! {
    /// Regex to normalize multiple whitespaces into single space
    static ref MULTI_SPACE_REGEX: Regex = Regex::new(r"\s{2,}").unwrap();
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"(\w+(?:-\w+)*)="([^"]*)""#).unwrap();
}

/// Parsed EXTINF line data
#[derive(Debug, Default)]
struct ExtinfData {
    attributes: HashMap<String, String>,
    title: String,
}

/// Directive waiting for its stream URL
#[derive(Debug)]
struct PendingEntry {
    line: usize,
    extinf: ExtinfData,
    /// Group from a following `#EXTGRP:` line
    fallback_group: Option<String>,
}

/// Accumulator threaded through the line fold
#[derive(Debug, Default)]
struct ScanState {
    pending: Option<PendingEntry>,
    entries: Vec<RawEntry>,
    found_header: bool,
}

/// Entries read from one source
#[derive(Debug, Default)]
pub struct ParsedPlaylist {
    pub entries: Vec<RawEntry>,
    pub found_header: bool,
}

/// Generate SHA1 hash of a key (hex)
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Generate an item ID based on kind, URL and position in the source
pub fn generate_item_id(prefix: &str, url: &str, index: usize) -> String {
    format!("{}_{}_{}", prefix, &hash_key(url)[..16], index)
}

/// Normalize text: trim and collapse multiple spaces into single space
pub fn normalize_text(text: &str) -> String {
    let trimmed = text.trim();
    MULTI_SPACE_REGEX.replace_all(trimmed, " ").to_string()
}

/// Truncate to at most `max` characters, on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Position of the comma separating the attribute header from the title.
/// Commas inside quoted attribute values are skipped; with unbalanced quotes
/// the last comma is used.
fn title_separator(content: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, ch) in content.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(idx),
            _ => {}
        }
    }
    content.rfind(',')
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-id="..." tvg-name="..." tvg-logo="..." group-title="...",Title
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let content = line.strip_prefix(DIRECTIVE)?;

    let separator = title_separator(content)?;
    let header = &content[..separator];
    let title = normalize_text(&content[separator + 1..]);

    let attributes = ATTR_REGEX
        .captures_iter(header)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str().to_lowercase();
            let value = caps.get(2)?.as_str().trim().to_string();
            Some((key, value))
        })
        .collect();

    Some(ExtinfData { attributes, title })
}

/// Attribute value, `None` when absent or blank
fn attribute(extinf: &ExtinfData, key: &str) -> Option<String> {
    extinf
        .attributes
        .get(key)
        .map(|v| normalize_text(v))
        .filter(|v| !v.is_empty())
}

/// Complete a pending entry with its stream URL
fn finalize(
    pending: PendingEntry,
    url: &str,
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<RawEntry> {
    let PendingEntry {
        line,
        extinf,
        fallback_group,
    } = pending;

    let name = attribute(&extinf, "tvg-name")
        .map(|n| truncate_chars(&n, config.max_title_length));
    let title = if extinf.title.is_empty() {
        name.clone().unwrap_or_default()
    } else {
        truncate_chars(&extinf.title, config.max_title_length)
    };

    if title.is_empty() {
        tracing::warn!(line = line, "Dropping playlist entry without title");
        diagnostics.push(Diagnostic::at_line(line, DiagnosticKind::EmptyTitle));
        return None;
    }

    let group = attribute(&extinf, "group-title")
        .or(fallback_group)
        .unwrap_or_else(|| config.default_group.clone());

    Some(RawEntry {
        title,
        name,
        logo: attribute(&extinf, "tvg-logo").map(|l| truncate_chars(&l, config.max_logo_length)),
        group: truncate_chars(&group, config.max_title_length),
        url: truncate_chars(url, config.max_url_length),
        line,
    })
}

/// Record a directive that never received its URL
fn drop_orphan(pending: Option<PendingEntry>, diagnostics: &mut Vec<Diagnostic>) {
    if let Some(orphan) = pending {
        tracing::debug!(line = orphan.line, "Dropping directive without stream URL");
        diagnostics.push(Diagnostic::at_line(orphan.line, DiagnosticKind::OrphanedDirective));
    }
}

fn scan_line(
    mut state: ScanState,
    token: &Token<'_>,
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
) -> ScanState {
    let text = token.text;

    // Check M3U header
    if text.starts_with(HEADER) {
        state.found_header = true;
        return state;
    }

    if text.starts_with(DIRECTIVE) {
        drop_orphan(state.pending.take(), diagnostics);
        match parse_extinf(text) {
            Some(extinf) => {
                state.pending = Some(PendingEntry {
                    line: token.line,
                    extinf,
                    fallback_group: None,
                });
            }
            None => {
                tracing::warn!(line = token.line, "Malformed EXTINF directive");
                diagnostics.push(Diagnostic::at_line(token.line, DiagnosticKind::MalformedDirective));
            }
        }
        return state;
    }

    if let Some(group) = text.strip_prefix(GROUP_DIRECTIVE) {
        if let Some(pending) = state.pending.as_mut() {
            let group = normalize_text(group);
            if !group.is_empty() {
                pending.fallback_group = Some(group);
            }
        }
        return state;
    }

    // Skip other comments
    if text.starts_with('#') {
        return state;
    }

    // Stream URL line
    match state.pending.take() {
        Some(pending) => {
            if let Some(entry) = finalize(pending, text, config, diagnostics) {
                state.entries.push(entry);
            }
        }
        None => tracing::debug!(line = token.line, "Ignoring URL without directive"),
    }

    state
}

/// Pair directives with their stream URLs
pub fn parse_entries(
    tokens: &[Token<'_>],
    config: &Config,
    diagnostics: &mut Vec<Diagnostic>,
) -> ParsedPlaylist {
    let state = tokens.iter().fold(ScanState::default(), |state, token| {
        scan_line(state, token, config, diagnostics)
    });

    drop_orphan(state.pending, diagnostics);

    if !state.found_header && !state.entries.is_empty() {
        tracing::debug!("Playlist has no #EXTM3U header");
        diagnostics.push(Diagnostic::for_source(DiagnosticKind::MissingHeader));
    }

    ParsedPlaylist {
        entries: state.entries,
        found_header: state.found_header,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tokenizer::tokenize;

    fn parse(text: &str, config: &Config) -> (ParsedPlaylist, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let tokens = tokenize(text, config, &mut diags);
        let parsed = parse_entries(&tokens, config, &mut diags);
        (parsed, diags)
    }

    #[test]
    fn test_hash_key() {
        let hash = hash_key("http://example.com/playlist.m3u");
        assert_eq!(hash.len(), 40); // SHA1 produces 40 hex chars
        assert_eq!(hash, hash_key("http://example.com/playlist.m3u"));
    }

    #[test]
    fn test_generate_item_id() {
        let id1 = generate_item_id("live", "http://stream1.com", 0);
        let id2 = generate_item_id("live", "http://stream2.com", 0);
        assert_ne!(id1, id2);
        assert!(id1.starts_with("live_"));
        assert!(id1.ends_with("_0"));
    }

    #[test]
    fn test_parse_extinf() {
        let line = r#"#EXTINF:-1 tvg-id="globo" tvg-name="Globo HD" tvg-logo="http://logo.com/globo.png" group-title="TV",Globo HD"#;
        let extinf = parse_extinf(line).unwrap();

        assert_eq!(extinf.title, "Globo HD");
        assert_eq!(extinf.attributes.get("tvg-id"), Some(&"globo".to_string()));
        assert_eq!(extinf.attributes.get("group-title"), Some(&"TV".to_string()));
    }

    #[test]
    fn test_parse_extinf_minimal() {
        let extinf = parse_extinf("#EXTINF:-1,Canal Teste").unwrap();

        assert_eq!(extinf.title, "Canal Teste");
        assert!(extinf.attributes.is_empty());
    }

    #[test]
    fn test_parse_extinf_comma_inside_attribute() {
        let extinf = parse_extinf(r#"#EXTINF:-1 group-title="Movies, 2020",Title, With Comma"#).unwrap();

        assert_eq!(extinf.title, "Title, With Comma");
        assert_eq!(extinf.attributes.get("group-title"), Some(&"Movies, 2020".to_string()));
    }

    #[test]
    fn test_parse_extinf_without_separator() {
        assert!(parse_extinf(r#"#EXTINF:-1 group-title="News""#).is_none());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Show   Name \t S01E02 "), "Show Name S01E02");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundary() {
        assert_eq!(truncate_chars("Ação Total", 3), "Açã");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_parse_entries_pairs_directive_and_url() {
        let (parsed, diags) = parse(
            "#EXTM3U\n#EXTINF:-1 tvg-logo=\"L\" group-title=\"News\",CNN\n#EXTVLCOPT:http-user-agent=x\nhttp://x/cnn.ts\n",
            &Config::default(),
        );

        assert!(parsed.found_header);
        assert!(diags.is_empty());
        assert_eq!(
            parsed.entries,
            vec![RawEntry {
                title: "CNN".to_string(),
                name: None,
                logo: Some("L".to_string()),
                group: "News".to_string(),
                url: "http://x/cnn.ts".to_string(),
                line: 2,
            }]
        );
    }

    #[test]
    fn test_default_group_when_missing() {
        let (parsed, _) = parse("#EXTM3U\n#EXTINF:-1,Channel\nhttp://x/1\n", &Config::default());
        assert_eq!(parsed.entries[0].group, "Uncategorized");
    }

    #[test]
    fn test_extgrp_fills_missing_group() {
        let (parsed, _) = parse(
            "#EXTM3U\n#EXTINF:-1,One\n#EXTGRP:Sports\nhttp://x/1\n#EXTINF:-1 group-title=\"News\",Two\n#EXTGRP:Sports\nhttp://x/2\n",
            &Config::default(),
        );
        assert_eq!(parsed.entries[0].group, "Sports");
        assert_eq!(parsed.entries[1].group, "News");
    }

    #[test]
    fn test_orphaned_directive_is_replaced() {
        let (parsed, diags) = parse(
            "#EXTM3U\n#EXTINF:-1,Lost\n#EXTINF:-1,Kept\nhttp://x/kept\n",
            &Config::default(),
        );

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].title, "Kept");
        assert_eq!(diags, vec![Diagnostic::at_line(2, DiagnosticKind::OrphanedDirective)]);
    }

    #[test]
    fn test_trailing_directive_yields_nothing() {
        let (parsed, diags) = parse("#EXTM3U\n#EXTINF:-1 group-title=\"News\",Lost", &Config::default());

        assert!(parsed.entries.is_empty());
        assert_eq!(diags, vec![Diagnostic::at_line(2, DiagnosticKind::OrphanedDirective)]);
    }

    #[test]
    fn test_empty_title_falls_back_to_name_or_drops() {
        let (parsed, diags) = parse(
            "#EXTM3U\n#EXTINF:-1 tvg-name=\"Named\",\nhttp://x/1\n#EXTINF:-1,   \nhttp://x/2\n",
            &Config::default(),
        );

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].title, "Named");
        assert_eq!(diags, vec![Diagnostic::at_line(4, DiagnosticKind::EmptyTitle)]);
    }

    #[test]
    fn test_fields_are_truncated_not_rejected() {
        let config = Config {
            max_title_length: 4,
            max_logo_length: 3,
            max_url_length: 10,
            ..Config::default()
        };
        let (parsed, _) = parse(
            "#EXTM3U\n#EXTINF:-1 tvg-logo=\"http://logo\",Long Title\nhttp://x/very/long/url\n",
            &config,
        );

        let entry = &parsed.entries[0];
        assert_eq!(entry.title, "Long");
        assert_eq!(entry.logo.as_deref(), Some("htt"));
        assert_eq!(entry.url, "http://x/v");
    }

    #[test]
    fn test_missing_header_is_reported() {
        let (parsed, diags) = parse("#EXTINF:-1,One\nhttp://x/1\n", &Config::default());

        assert!(!parsed.found_header);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(diags, vec![Diagnostic::for_source(DiagnosticKind::MissingHeader)]);
    }

    #[test]
    fn test_malformed_directive() {
        let (parsed, diags) = parse("#EXTM3U\n#EXTINF:-1 no separator\nhttp://x/1\n", &Config::default());

        assert!(parsed.entries.is_empty());
        assert_eq!(diags, vec![Diagnostic::at_line(2, DiagnosticKind::MalformedDirective)]);
    }
}
