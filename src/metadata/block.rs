//! Metadata block location
//!
//! Finds the `/* ==UserStyle== ... ==/UserStyle== */` header, or failing
//! that a leading `/** ... */` comment that carries directives, and splits
//! the source into header text and CSS body.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{COMMENT_CLOSE, COMMENT_OPEN, HEADER_END, HEADER_START};

static DIRECTIVE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*@[A-Za-z]").expect("directive line regex"));

/// How the header was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Delimited by the `==UserStyle==` marker pair
    Canonical,
    /// A generic leading block comment containing directives
    Fallback,
}

/// A located metadata header
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataBlock {
    pub kind: BlockKind,
    /// Directive text between the markers (gutter stripped for fallback blocks)
    pub text: String,
    /// The whole comment as it appears in the source
    pub raw: String,
    /// Byte range of `raw` in the source
    pub start: usize,
    pub end: usize,
    pub warnings: Vec<String>,
}

impl MetadataBlock {
    /// The source with the header comment removed
    pub fn css_body(&self, source: &str) -> String {
        let mut body = String::with_capacity(source.len() - (self.end - self.start));
        body.push_str(&source[..self.start]);
        body.push_str(&source[self.end..]);
        body.trim().to_string()
    }
}

/// Outcome of looking for a header
#[derive(Debug, Clone, PartialEq)]
pub enum BlockLookup {
    Found(MetadataBlock),
    /// A canonical start marker exists but its end could not be located reliably
    Rejected(String),
    Missing,
}

/// Locate the metadata header in `source`
pub fn find_metadata_block(source: &str) -> BlockLookup {
    if let Some(lookup) = find_canonical_block(source) {
        return lookup;
    }
    match find_fallback_block(source) {
        Some(block) => BlockLookup::Found(block),
        None => BlockLookup::Missing,
    }
}

/// Returns `None` when there is no start marker inside a comment at all
fn find_canonical_block(source: &str) -> Option<BlockLookup> {
    let marker_pos = find_marker_in_comment(source)?;
    let comment_start = source[..marker_pos].rfind(COMMENT_OPEN)?;
    let body_start = marker_pos + HEADER_START.len();

    let end_marker = source[body_start..].find(HEADER_END).map(|p| p + body_start);
    let first_close = source[body_start..].find(COMMENT_CLOSE).map(|p| p + body_start);

    let end_marker = match (end_marker, first_close) {
        (None, _) => {
            return Some(BlockLookup::Rejected(format!(
                "Metadata block opened with {} has no {} end marker",
                HEADER_START, HEADER_END
            )));
        }
        (Some(end), Some(close)) if close < end => {
            return Some(BlockLookup::Rejected(format!(
                "Metadata block contains a nested comment terminator before {} (line {})",
                HEADER_END,
                line_of(source, close) - line_of(source, comment_start) + 1
            )));
        }
        (Some(end), _) => end,
    };

    let after_marker = end_marker + HEADER_END.len();
    let comment_end = match source[after_marker..].find(COMMENT_CLOSE) {
        Some(p) => after_marker + p + COMMENT_CLOSE.len(),
        None => {
            return Some(BlockLookup::Rejected(format!(
                "Metadata block comment is not closed after {}",
                HEADER_END
            )));
        }
    };

    let text = source[body_start..end_marker].to_string();
    let mut warnings = Vec::new();
    if text.contains(COMMENT_OPEN) {
        warnings.push("Metadata block contains a nested comment".to_string());
    }

    Some(BlockLookup::Found(MetadataBlock {
        kind: BlockKind::Canonical,
        text,
        raw: source[comment_start..comment_end].to_string(),
        start: comment_start,
        end: comment_end,
        warnings,
    }))
}

/// Position of the first `==UserStyle==` that sits inside an open comment
fn find_marker_in_comment(source: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(offset) = source[search_from..].find(HEADER_START) {
        let pos = search_from + offset;
        let before = &source[..pos];
        if let Some(open) = before.rfind(COMMENT_OPEN) {
            if !before[open + COMMENT_OPEN.len()..].contains(COMMENT_CLOSE) {
                return Some(pos);
            }
        }
        search_from = pos + HEADER_START.len();
    }
    None
}

fn find_fallback_block(source: &str) -> Option<MetadataBlock> {
    let start = source.len() - source.trim_start().len();
    if !source[start..].starts_with(COMMENT_OPEN) {
        return None;
    }
    let inner_start = start + COMMENT_OPEN.len();
    let close = source[inner_start..].find(COMMENT_CLOSE)? + inner_start;
    let end = close + COMMENT_CLOSE.len();

    let inner = source[inner_start..close].trim_start_matches('*');
    let text = strip_gutter(inner);
    if !DIRECTIVE_LINE.is_match(&text) {
        return None;
    }

    Some(MetadataBlock {
        kind: BlockKind::Fallback,
        text,
        raw: source[start..end].to_string(),
        start,
        end,
        warnings: Vec::new(),
    })
}

/// Drop the ` * ` gutter of doc-style comments
fn strip_gutter(inner: &str) -> String {
    inner
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix('*') {
                Some(rest) if !rest.starts_with('/') => rest.strip_prefix(' ').unwrap_or(rest),
                _ => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 1-based line number of a byte offset
fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_block() {
        let source = "/* ==UserStyle==\n@name Demo\n==/UserStyle== */\nbody{color:red}";
        let BlockLookup::Found(block) = find_metadata_block(source) else {
            panic!("expected a block");
        };
        assert_eq!(block.kind, BlockKind::Canonical);
        assert_eq!(block.text, "\n@name Demo\n");
        assert_eq!(block.raw, "/* ==UserStyle==\n@name Demo\n==/UserStyle== */");
        assert_eq!(block.css_body(source), "body{color:red}");
        assert!(block.warnings.is_empty());
    }

    #[test]
    fn test_css_before_block_is_kept() {
        let source = "@charset \"utf-8\";\n/* ==UserStyle==\n@name A\n==/UserStyle== */\na{}";
        let BlockLookup::Found(block) = find_metadata_block(source) else {
            panic!("expected a block");
        };
        assert_eq!(block.css_body(source), "@charset \"utf-8\";\n\na{}");
    }

    #[test]
    fn test_nested_terminator_rejected() {
        let source = "/* ==UserStyle==\n@name A\n*/\n@namespace b\n==/UserStyle== */";
        match find_metadata_block(source) {
            BlockLookup::Rejected(reason) => assert!(reason.contains("nested comment terminator")),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_end_marker_rejected() {
        let source = "/* ==UserStyle==\n@name A\n*/\nbody{}";
        assert!(matches!(find_metadata_block(source), BlockLookup::Rejected(_)));
    }

    #[test]
    fn test_nested_comment_open_warns() {
        let source = "/* ==UserStyle==\n@name A /* note\n==/UserStyle== */";
        let BlockLookup::Found(block) = find_metadata_block(source) else {
            panic!("expected a block");
        };
        assert_eq!(block.warnings.len(), 1);
    }

    #[test]
    fn test_fallback_block_strips_gutter() {
        let source = "/**\n * @name Demo\n * @version 1.0\n */\nbody{}";
        let BlockLookup::Found(block) = find_metadata_block(source) else {
            panic!("expected a block");
        };
        assert_eq!(block.kind, BlockKind::Fallback);
        assert!(block.text.contains("\n@name Demo\n@version 1.0"));
        assert_eq!(block.css_body(source), "body{}");
    }

    #[test]
    fn test_plain_leading_comment_is_not_metadata() {
        let source = "/* reset styles */\nbody{margin:0}";
        assert_eq!(find_metadata_block(source), BlockLookup::Missing);
    }

    #[test]
    fn test_marker_outside_comment_ignored() {
        let source = "body::after{content:\"==UserStyle==\"}";
        assert_eq!(find_metadata_block(source), BlockLookup::Missing);
    }
}
