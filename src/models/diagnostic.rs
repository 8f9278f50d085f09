use serde::Serialize;

/// Non-fatal condition recorded while building a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// A single line exceeded the length limit and was discarded
    #[serde(rename_all = "camelCase")]
    LineTooLong { length: usize, limit: usize },
    /// The source had more lines than allowed; only the prefix was processed
    SourceTruncated { limit: usize },
    /// Playlist did not start with `#EXTM3U`
    MissingHeader,
    /// Directive line without a title separator
    MalformedDirective,
    /// Directive never completed by a URL line
    OrphanedDirective,
    /// Entry whose title resolved empty
    EmptyTitle,
    /// Whole source skipped
    SourceSkipped { reason: String },
}

/// Diagnostic with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn at_line(line: usize, kind: DiagnosticKind) -> Self {
        Self {
            source: None,
            line: Some(line),
            kind,
        }
    }

    pub fn for_source(kind: DiagnosticKind) -> Self {
        Self {
            source: None,
            line: None,
            kind,
        }
    }

    /// Attach the label of the source this diagnostic came from
    pub fn in_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{}: ", source)?;
        }
        if let Some(line) = self.line {
            write!(f, "line {}: ", line)?;
        }
        match &self.kind {
            DiagnosticKind::LineTooLong { length, limit } => {
                write!(f, "line of {} bytes exceeds limit of {}", length, limit)
            }
            DiagnosticKind::SourceTruncated { limit } => {
                write!(f, "source truncated to {} lines", limit)
            }
            DiagnosticKind::MissingHeader => write!(f, "missing #EXTM3U header"),
            DiagnosticKind::MalformedDirective => write!(f, "directive has no title separator"),
            DiagnosticKind::OrphanedDirective => write!(f, "directive without stream URL"),
            DiagnosticKind::EmptyTitle => write!(f, "entry has no title"),
            DiagnosticKind::SourceSkipped { reason } => write!(f, "source skipped: {}", reason),
        }
    }
}
