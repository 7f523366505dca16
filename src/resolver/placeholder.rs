//! Placeholder scanning: `/*[[name|type|default]]*/`

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{PLACEHOLDER_CLOSE, PLACEHOLDER_FIELD_SEPARATOR, PLACEHOLDER_OPEN};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "{}(.*?){}",
        regex::escape(PLACEHOLDER_OPEN),
        regex::escape(PLACEHOLDER_CLOSE)
    ))
    .expect("placeholder regex")
});

/// One placeholder occurrence in a CSS text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Byte range of the whole `/*[[...]]*/` comment
    pub start: usize,
    pub end: usize,
    pub name: String,
    pub type_hint: Option<String>,
    /// Inline default, if present and non-empty
    pub default: Option<String>,
}

/// Every well-formed placeholder in `css`, in order. Placeholders without a
/// name are not placeholders.
pub fn find_placeholders(css: &str) -> Vec<Placeholder> {
    PLACEHOLDER
        .captures_iter(css)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let mut fields = captures[1].split(PLACEHOLDER_FIELD_SEPARATOR).map(str::trim);
            let name = fields.next().filter(|name| !name.is_empty())?.to_string();
            let type_hint = fields.next().filter(|t| !t.is_empty()).map(str::to_string);
            let default = fields.next().filter(|d| !d.is_empty()).map(str::to_string);
            Some(Placeholder {
                start: whole.start(),
                end: whole.end(),
                name,
                type_hint,
                default,
            })
        })
        .collect()
}

pub fn has_placeholders(css: &str) -> bool {
    PLACEHOLDER.is_match(css)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_placeholder() {
        let css = "a { color: /*[[accent|color|#ff0000]]*/; }";
        let found = find_placeholders(css);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "accent");
        assert_eq!(found[0].type_hint.as_deref(), Some("color"));
        assert_eq!(found[0].default.as_deref(), Some("#ff0000"));
        assert_eq!(&css[found[0].start..found[0].end], "/*[[accent|color|#ff0000]]*/");
    }

    #[test]
    fn test_name_only_with_spaces() {
        let found = find_placeholders("/*[[ theme ]]*/ x /*[[size|number]]*/");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "theme");
        assert_eq!(found[0].default, None);
        assert_eq!(found[1].type_hint.as_deref(), Some("number"));
        assert_eq!(found[1].default, None);
    }

    #[test]
    fn test_ordinary_comments_ignored() {
        assert!(find_placeholders("/* [note] */ a {} /*[[]]*/").is_empty());
        assert!(!has_placeholders("/* plain */"));
    }
}
