//! Directive tokenizer
//!
//! Splits header text into `@name value` directives. A value runs until the
//! next line that starts a directive, so wrapped values keep their embedded
//! newlines. Variable directives additionally track heredocs (`<<<EOT ... EOT`)
//! and brace nesting so CSS inside an option block never starts a new
//! directive.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{DIRECTIVE_ADVANCED, DIRECTIVE_VAR, HEREDOC_OPEN, LEGACY_DOCUMENT_DIRECTIVE};

static DIRECTIVE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:@([A-Za-z][\w-]*)|(-moz-document))(?:[ \t]+(.*)|[ \t]*$|(\(.*))")
        .expect("directive start regex")
});

/// One `@name value` entry from the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Name without the `@` prefix
    pub name: String,
    /// Value with outer whitespace trimmed; may contain newlines
    pub value: String,
    /// 1-based line number within the header text
    pub line: usize,
}

impl Directive {
    /// How the directive is written in the source, for messages
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

pub fn display_name(name: &str) -> String {
    if name == LEGACY_DOCUMENT_DIRECTIVE {
        name.to_string()
    } else {
        format!("@{}", name)
    }
}

/// Nesting carried across lines of a variable directive
#[derive(Debug, Default)]
struct Nesting {
    heredoc: Option<String>,
    braces: usize,
}

impl Nesting {
    fn is_open(&self) -> bool {
        self.heredoc.is_some() || self.braces > 0
    }

    fn scan(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if let Some(marker) = &self.heredoc {
                if bytes[i..].starts_with(marker.as_bytes()) {
                    i += marker.len();
                    self.heredoc = None;
                } else {
                    i += 1;
                }
                continue;
            }

            if bytes[i..].starts_with(HEREDOC_OPEN.as_bytes()) {
                let ident_start = i + HEREDOC_OPEN.len();
                let ident_len = bytes[ident_start..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                if ident_len > 0 {
                    self.heredoc = Some(text[ident_start..ident_start + ident_len].to_string());
                    i = ident_start + ident_len;
                    continue;
                }
            }

            match bytes[i] {
                quote @ (b'"' | b'\'') => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != quote {
                        if bytes[i] == b'\\' {
                            i += 1;
                        }
                        i += 1;
                    }
                }
                b'{' => self.braces += 1,
                b'}' => self.braces = self.braces.saturating_sub(1),
                _ => {}
            }
            i += 1;
        }
    }
}

fn tracks_nesting(name: &str) -> bool {
    name == DIRECTIVE_VAR || name == DIRECTIVE_ADVANCED
}

/// Tokenize header text into directives, in source order.
///
/// A variable directive whose heredoc or braces are still open at the end
/// of the text is cut back at the first directive line after it, so a
/// broken option block never swallows the rest of the header.
pub fn tokenize_directives(text: &str) -> Vec<Directive> {
    let lines: Vec<&str> = text.lines().collect();
    let mut directives = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let Some(captures) = DIRECTIVE_START.captures(lines[index]) else {
            index += 1;
            continue;
        };
        let name = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let rest = captures
            .get(3)
            .or_else(|| captures.get(4))
            .map_or("", |m| m.as_str());

        let opening = index;
        let tracks = tracks_nesting(&name);
        let mut nesting = Nesting::default();
        if tracks {
            nesting.scan(rest);
        }
        let mut value_lines = vec![rest];
        index += 1;

        while index < lines.len() {
            let line = lines[index];
            if !(tracks && nesting.is_open()) && DIRECTIVE_START.is_match(line) {
                break;
            }
            if tracks {
                nesting.scan(line);
            }
            value_lines.push(line);
            index += 1;
        }

        if tracks && nesting.is_open() {
            let resume = lines[opening + 1..index]
                .iter()
                .position(|line| DIRECTIVE_START.is_match(line))
                .map(|offset| opening + 1 + offset);
            if let Some(resume) = resume {
                debug!(
                    "Unclosed @{} on line {}; resuming at line {}",
                    name,
                    opening + 1,
                    resume + 1
                );
                value_lines.truncate(resume - opening);
                index = resume;
            }
        }

        directives.push(Directive {
            name,
            value: value_lines.join("\n").trim().to_string(),
            line: opening + 1,
        });
    }
    directives
}
