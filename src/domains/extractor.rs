//! Domain rule extraction
//!
//! Sources, in order: `@domain`, `@match` / `@exclude-match`, the legacy
//! `-moz-document` header directive, and `@-moz-document` rules embedded in
//! the style body. Later sources never duplicate an earlier rule.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{
    DIRECTIVE_DOMAIN, DIRECTIVE_EXCLUDE_MATCH, DIRECTIVE_MATCH, EXCLUDE_PREFIX,
    LEGACY_DOCUMENT_DIRECTIVE,
};
use crate::domains::matcher::compile_regexp;
use crate::domains::normalize::{
    Normalized, normalize_domain, normalize_url, rule_from_match_pattern, unescape_css_string,
};
use crate::metadata::Directive;
use crate::model::{DomainRule, DomainRuleKind};

static SCOPING_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(url-prefix|url|domain|regexp)\(\s*(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)'|([^)]*?))\s*\)"#,
    )
    .expect("scoping call regex")
});
static EMBEDDED_DOCUMENT_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@(?:-moz-)?document\s+([^{]*)\{").expect("document rule regex"));

/// Rules plus the warnings produced while building them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainExtraction {
    pub rules: Vec<DomainRule>,
    pub warnings: Vec<String>,
}

impl DomainExtraction {
    fn push(&mut self, rule: DomainRule) {
        if self.rules.iter().any(|existing| existing.same_target(&rule)) {
            debug!("Skipping duplicate domain rule {:?}", rule);
            return;
        }
        self.rules.push(rule);
    }
}

/// Extract every scoping rule of a style from its header directives and CSS body
pub fn extract_domain_rules(directives: &[Directive], css_body: &str) -> DomainExtraction {
    let mut extraction = DomainExtraction::default();

    for directive in directives.iter().filter(|d| d.name == DIRECTIVE_DOMAIN) {
        for entry in split_entries(&directive.value) {
            let (entry, include) = split_exclusion(entry);
            match normalize_domain(entry) {
                Some(normalized) => {
                    extraction.warnings.extend(normalized.issues);
                    extraction.push(DomainRule::new(
                        DomainRuleKind::Domain,
                        normalized.pattern,
                        include,
                    ));
                }
                None => extraction
                    .warnings
                    .push(format!("Empty @domain entry on line {}", directive.line)),
            }
        }
    }

    for directive in directives
        .iter()
        .filter(|d| d.name == DIRECTIVE_MATCH || d.name == DIRECTIVE_EXCLUDE_MATCH)
    {
        let always_exclude = directive.name == DIRECTIVE_EXCLUDE_MATCH;
        for entry in split_entries(&directive.value) {
            let (entry, include) = split_exclusion(entry);
            match rule_from_match_pattern(entry, include && !always_exclude) {
                Ok(Some(rule)) => extraction.push(rule),
                Ok(None) => debug!("Match pattern '{}' covers every page", entry),
                Err(message) => extraction.warnings.push(message),
            }
        }
    }

    let legacy: Vec<&Directive> = directives
        .iter()
        .filter(|d| d.name == LEGACY_DOCUMENT_DIRECTIVE)
        .collect();
    if !legacy.is_empty() {
        extraction
            .warnings
            .push("Legacy -moz-document scoping syntax in metadata header".to_string());
        for directive in legacy {
            extract_scoping_calls(&directive.value, &mut extraction);
        }
    }

    let mut embedded = EMBEDDED_DOCUMENT_RULE.captures_iter(css_body).peekable();
    if embedded.peek().is_some() {
        extraction
            .warnings
            .push("Legacy @-moz-document scoping rule in style body".to_string());
        for captures in embedded {
            extract_scoping_calls(&captures[1], &mut extraction);
        }
    }

    extraction
}

/// Turn `url(...)`, `url-prefix(...)`, `domain(...)` and `regexp(...)` calls into rules
fn extract_scoping_calls(text: &str, extraction: &mut DomainExtraction) {
    for captures in SCOPING_CALL.captures_iter(text) {
        let Some(kind) = DomainRuleKind::from_function(&captures[1]) else {
            continue;
        };
        let argument = captures
            .get(2)
            .or_else(|| captures.get(3))
            .or_else(|| captures.get(4))
            .map(|m| unescape_css_string(m.as_str()))
            .unwrap_or_default();

        let normalized = match kind {
            DomainRuleKind::Domain => normalize_domain(&argument),
            DomainRuleKind::Url | DomainRuleKind::UrlPrefix => normalize_url(&argument, kind),
            DomainRuleKind::Regexp => regexp_pattern(&argument, extraction),
        };

        match normalized {
            Some(normalized) => {
                extraction.warnings.extend(normalized.issues);
                extraction.push(DomainRule::new(kind, normalized.pattern, true));
            }
            None => extraction
                .warnings
                .push(format!("Empty {}() scoping argument", captures[1].to_lowercase())),
        }
    }
}

/// Regexp patterns keep their case; a pattern that does not compile is kept
/// (it never matches) but reported
fn regexp_pattern(argument: &str, extraction: &mut DomainExtraction) -> Option<Normalized> {
    let pattern = argument.trim();
    if pattern.is_empty() {
        return None;
    }
    if compile_regexp(pattern).is_err() {
        extraction
            .warnings
            .push(format!("Unresolved regexp domain pattern '{}'", pattern));
    }
    Some(Normalized {
        pattern: pattern.to_string(),
        issues: Vec::new(),
    })
}

fn split_entries(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

fn split_exclusion(entry: &str) -> (&str, bool) {
    match entry.strip_prefix(EXCLUDE_PREFIX) {
        Some(rest) => (rest.trim_start(), false),
        None => (entry, true),
    }
}
