//! Pattern normalization
//!
//! Patterns are normalized once, when extracted, so matching can compare
//! them directly against a candidate URL.

use url::Url;

use crate::constants::WILDCARD_HOST_PLACEHOLDER;
use crate::model::{DomainRule, DomainRuleKind};

/// A normalized pattern plus anything worth warning about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub pattern: String,
    pub issues: Vec<String>,
}

/// Normalize a `domain` entry: lowercase, strip protocol, path and query
pub fn normalize_domain(raw: &str) -> Option<Normalized> {
    let original = raw.trim();
    let mut pattern = original.to_lowercase();
    let mut issues = Vec::new();

    if let Some(index) = pattern.find("://") {
        pattern = pattern[index + 3..].to_string();
        issues.push(format!("Domain '{}' contains a protocol", original));
    }

    let trimmed_len = pattern.trim_end_matches('/').len();
    pattern.truncate(trimmed_len);

    if let Some(index) = pattern.find(['/', '?', '#']) {
        pattern.truncate(index);
        issues.push(format!("Domain '{}' contains a path or query", original));
    }

    if pattern.is_empty() {
        return None;
    }
    Some(Normalized { pattern, issues })
}

/// Normalize a `url` or `url-prefix` pattern: lowercase, trailing slash trimmed
pub fn normalize_url(raw: &str, kind: DomainRuleKind) -> Option<Normalized> {
    let original = raw.trim();
    let pattern = original.to_lowercase().trim_end_matches('/').to_string();
    if pattern.is_empty() {
        return None;
    }

    let mut issues = Vec::new();
    if kind == DomainRuleKind::Url && Url::parse(original).is_err() {
        issues.push(format!("Malformed URL pattern '{}'", original));
    }
    Some(Normalized { pattern, issues })
}

/// Build the rule for a `@match` style wildcard pattern.
///
/// `*://*.example.com/*` becomes a `domain` rule for `example.com`. A pattern
/// whose host is only a wildcard matches every page and yields no rule.
/// Wildcards anywhere else in the host fall back to a `regexp` rule.
pub fn rule_from_match_pattern(raw: &str, include: bool) -> Result<Option<DomainRule>, String> {
    let pattern = raw.trim().to_lowercase();
    if pattern == "<all_urls>" {
        return Ok(None);
    }

    let substituted = pattern.replace('*', WILDCARD_HOST_PLACEHOLDER);
    let parsed = Url::parse(&substituted)
        .map_err(|err| format!("Malformed match pattern '{}' ({})", raw.trim(), err))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| format!("Match pattern '{}' has no host", raw.trim()))?;

    let wildcard_prefix = format!("{}.", WILDCARD_HOST_PLACEHOLDER);
    let host = host.strip_prefix(&wildcard_prefix).unwrap_or(host);
    if host == WILDCARD_HOST_PLACEHOLDER {
        return Ok(None);
    }
    if host.contains(WILDCARD_HOST_PLACEHOLDER) {
        return Ok(Some(DomainRule::new(DomainRuleKind::Regexp, glob_to_regex(&pattern), include)));
    }
    Ok(Some(DomainRule::new(DomainRuleKind::Domain, host, include)))
}

/// Translate a `*` glob into an (unanchored) regular expression
fn glob_to_regex(glob: &str) -> String {
    glob.split('*').map(regex::escape).collect::<Vec<_>>().join(".*")
}

/// Decode backslash escapes of a CSS string argument
pub fn unescape_css_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_plain() {
        let n = normalize_domain(" Example.COM ").unwrap();
        assert_eq!(n.pattern, "example.com");
        assert!(n.issues.is_empty());
    }

    #[test]
    fn test_domain_trailing_slash_is_silent() {
        let n = normalize_domain("example.com/").unwrap();
        assert_eq!(n.pattern, "example.com");
        assert!(n.issues.is_empty());
    }

    #[test]
    fn test_domain_with_protocol_and_path() {
        let n = normalize_domain("https://Example.com/path?q=1").unwrap();
        assert_eq!(n.pattern, "example.com");
        assert_eq!(n.issues.len(), 2);
    }

    #[test]
    fn test_empty_domain() {
        assert!(normalize_domain("  ").is_none());
        assert!(normalize_domain("https://").is_none());
    }

    #[test]
    fn test_url_prefix_normalized() {
        let n = normalize_url("https://Example.com/Docs/", DomainRuleKind::UrlPrefix).unwrap();
        assert_eq!(n.pattern, "https://example.com/docs");
    }

    #[test]
    fn test_malformed_url_warns() {
        let n = normalize_url("not a url", DomainRuleKind::Url).unwrap();
        assert_eq!(n.issues.len(), 1);
    }

    #[test]
    fn test_match_pattern_to_domain() {
        let rule = rule_from_match_pattern("*://*.example.com/*", true).unwrap().unwrap();
        assert_eq!(rule, DomainRule::new(DomainRuleKind::Domain, "example.com", true));

        let rule = rule_from_match_pattern("https://docs.rs/*", false).unwrap().unwrap();
        assert_eq!(rule, DomainRule::new(DomainRuleKind::Domain, "docs.rs", false));
    }

    #[test]
    fn test_match_all_is_global() {
        assert_eq!(rule_from_match_pattern("*://*/*", true).unwrap(), None);
        assert_eq!(rule_from_match_pattern("<all_urls>", true).unwrap(), None);
    }

    #[test]
    fn test_match_with_inner_wildcard_becomes_regexp() {
        let rule = rule_from_match_pattern("*://www.google.*/*", true).unwrap().unwrap();
        assert_eq!(rule.kind, DomainRuleKind::Regexp);
        assert_eq!(rule.pattern, r".*://www\.google\..*/.*");
    }

    #[test]
    fn test_malformed_match_pattern() {
        assert!(rule_from_match_pattern("example.com", true).is_err());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_css_string(r"https?://.*\\.example\\.com/.*"), r"https?://.*\.example\.com/.*");
        assert_eq!(unescape_css_string(r#"a\"b"#), "a\"b");
    }
}
