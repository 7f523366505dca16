//! Multi-option CSS snippet blocks
//!
//! ```text
//! {
//!   light "Light" <<<EOT body { color: black } EOT;
//!   dark  "Dark*" <<<EOT body { color: white } EOT;
//! }
//! ```
//!
//! The block is cut out by brace counting that steps over quoted labels and
//! heredoc bodies, since both may carry stray braces. Entries are then read
//! with a small cursor.

use crate::constants::{DEFAULT_OPTION_MARKER, HEREDOC_OPEN};

/// One `key "Label" <<<MARKER css MARKER;` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetOption {
    pub key: String,
    /// Display label with the default marker stripped
    pub label: String,
    /// Trimmed CSS between the heredoc markers
    pub css: String,
    pub is_default: bool,
}

/// Errors are descriptive only; callers degrade to an empty descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionBlockError {
    NoBlock,
    Unbalanced,
    NoOptions,
}

impl std::fmt::Display for OptionBlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionBlockError::NoBlock => write!(f, "no option block found"),
            OptionBlockError::Unbalanced => write!(f, "option block has unbalanced braces"),
            OptionBlockError::NoOptions => {
                write!(f, "option block contains no recognizable options")
            }
        }
    }
}

/// Returns the text between the first `{` and its matching `}`. Braces inside
/// quoted labels and heredoc bodies do not count.
pub fn balanced_block(text: &str) -> Result<&str, OptionBlockError> {
    let open = text.find('{').ok_or(OptionBlockError::NoBlock)?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if bytes[i..].starts_with(HEREDOC_OPEN.as_bytes()) {
            let ident_start = i + HEREDOC_OPEN.len();
            let ident_len = bytes[ident_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count();
            if ident_len > 0 {
                let marker = &text[ident_start..ident_start + ident_len];
                let body_start = ident_start + ident_len;
                let close = find_closing_marker(&text[body_start..], marker)
                    .ok_or(OptionBlockError::Unbalanced)?;
                i = body_start + close + marker.len();
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
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[open + 1..i]);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(OptionBlockError::Unbalanced)
}

/// Whether a declaration tail looks like a heredoc option block
pub fn is_option_block(tail: &str) -> bool {
    tail.trim_start().starts_with('{') && tail.contains(HEREDOC_OPEN)
}

/// Parse every option of the block found in `tail`
pub fn parse_option_block(tail: &str) -> Result<Vec<SnippetOption>, OptionBlockError> {
    let block = balanced_block(tail)?;
    let mut cursor = Cursor::new(block);
    let mut options = Vec::new();

    while let Some(option) = cursor.next_option() {
        options.push(option);
    }

    if options.is_empty() {
        return Err(OptionBlockError::NoOptions);
    }
    Ok(options)
}

/// Index of the default option: the first marked one, else the first
pub fn default_index(options: &[SnippetOption]) -> usize {
    options.iter().position(|o| o.is_default).unwrap_or(0)
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn next_option(&mut self) -> Option<SnippetOption> {
        self.skip_whitespace();
        let raw_key = self.read_key()?;
        self.skip_whitespace();
        let raw_label = self.read_quoted()?;
        self.skip_whitespace();
        // comment terminators are written escaped inside the header
        let css = self.read_heredoc()?.replace("*\\/", "*/");

        self.skip_whitespace();
        if self.rest().starts_with(';') {
            self.pos += 1;
        }

        let is_default =
            raw_key.contains(DEFAULT_OPTION_MARKER) || raw_label.contains(DEFAULT_OPTION_MARKER);
        let key = raw_key.replace(DEFAULT_OPTION_MARKER, "");
        let label = raw_label.trim().trim_end_matches(DEFAULT_OPTION_MARKER).trim().to_string();
        Some(SnippetOption {
            label: if label.is_empty() { key.clone() } else { label },
            key,
            css,
            is_default,
        })
    }

    fn read_key(&mut self) -> Option<String> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'')
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(rest[..len].to_string())
    }

    fn read_quoted(&mut self) -> Option<String> {
        let (value, consumed) = read_quoted(self.rest())?;
        self.pos += consumed;
        Some(value)
    }

    fn read_heredoc(&mut self) -> Option<String> {
        let rest = self.rest().strip_prefix(HEREDOC_OPEN)?;
        let marker_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if marker_len == 0 {
            return None;
        }
        let marker = &rest[..marker_len];
        let body = &rest[marker_len..];
        let end = find_closing_marker(body, marker)?;

        self.pos += HEREDOC_OPEN.len() + marker_len + end + marker.len();
        Some(body[..end].trim().to_string())
    }
}

/// The closing marker must stand alone: preceded by whitespace and followed
/// by `;`, whitespace or the end of the block
fn find_closing_marker(body: &str, marker: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(offset) = body[from..].find(marker) {
        let at = from + offset;
        let before_ok = body[..at].chars().next_back().is_none_or(char::is_whitespace);
        let after = &body[at + marker.len()..];
        let after_ok =
            after.is_empty() || after.starts_with(';') || after.starts_with(char::is_whitespace);
        if before_ok && after_ok {
            return Some(at);
        }
        from = at + marker.len();
    }
    None
}

/// Reads a `"..."` or `'...'` string at the start of `text`, processing
/// backslash escapes. Returns the value and the number of bytes consumed.
pub fn read_quoted(text: &str) -> Option<(String, usize)> {
    let mut chars = text.char_indices();
    let (_, quote) = chars.next().filter(|(_, c)| *c == '"' || *c == '\'')?;
    let mut value = String::new();
    let mut escaped = false;
    for (index, ch) in chars {
        if escaped {
            value.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return Some((value, index + ch.len_utf8()));
        } else {
            value.push(ch);
        }
    }
    None
}
