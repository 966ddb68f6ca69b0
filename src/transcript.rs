//! Splitting a toplevel transcript into per-directive segments and
//! classifying each segment's text.

/// The interactive prompt the toplevel prints before reading each
/// directive; the sole segment delimiter. Segmentation breaks if ordinary
/// output ever contains this exact sequence.
pub const PROMPT: &str = "# ";

/// Markers that introduce location context ahead of a diagnostic.
const CONTEXT_MARKERS: [&str; 2] = ["Characters", "File"];

/// The diagnostic phrase the toplevel emits when an incomplete expression
/// swallows the quit directive (`expr #quit` parses as a method call).
const INCOMPLETE_MARKER: &str = "It has no method quit";

/// Splits raw stdout on the interactive prompt, trimming each piece.
///
/// A batch of N directives yields N+1 segments: the startup banner, one
/// segment per directive, and the trailing whitespace after the quit
/// directive (which trims to empty).
pub fn split_segments(stdout: &str) -> Vec<String> {
    stdout.split(PROMPT).map(|s| s.trim().to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Normal,
    ErrorText(String),
    ExceptionText(String),
    Unimplemented(String),
    IncompleteExpression(String),
}

/// Which diagnostic keyword was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Error,
    Exception,
}

impl Keyword {
    fn literal(&self) -> &'static str {
        match self {
            Keyword::Error => "Error:",
            Keyword::Exception => "Exception:",
        }
    }
}

/// Locates the earliest `Error:` or `Exception:` in the segment; ties go to
/// `Error:`.
fn find_keyword(segment: &str) -> Option<(Keyword, usize)> {
    let mut found: Option<(Keyword, usize)> = None;
    for kw in [Keyword::Error, Keyword::Exception] {
        if let Some(pos) = segment.find(kw.literal()) {
            if found.map_or(true, |(_, best)| pos < best) {
                found = Some((kw, pos));
            }
        }
    }
    found
}

/// Extracts the diagnostic message starting from the nearest preceding
/// context marker, or from the keyword itself when none precedes it.
fn diagnostic_text(segment: &str, keyword_pos: usize) -> &str {
    for marker in CONTEXT_MARKERS {
        if let Some(start) = segment[..keyword_pos].rfind(marker) {
            return &segment[start..];
        }
    }
    &segment[keyword_pos..]
}

/// Classifies one segment. Pure: depends only on the segment's text.
///
/// Diagnostics are unstructured free text, so this scans for literal
/// markers rather than parsing the toplevel's grammar.
pub fn classify(segment: &str) -> Classification {
    let (keyword, pos) = match find_keyword(segment) {
        Some(hit) => hit,
        None => return Classification::Normal,
    };
    let diagnostic = diagnostic_text(segment, pos).to_string();
    if diagnostic.contains(INCOMPLETE_MARKER) {
        return Classification::IncompleteExpression(diagnostic);
    }
    // Catches the variety of `failwith "Not implemented"`-style stubs.
    if diagnostic.to_lowercase().contains("implemented") {
        return Classification::Unimplemented(diagnostic);
    }
    match keyword {
        Keyword::Error => Classification::ErrorText(diagnostic),
        Keyword::Exception => Classification::ExceptionText(diagnostic),
    }
}
