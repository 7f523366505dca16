//! Request-time matching of a URL against a style's rules

use log::debug;
use regex::Regex;
use url::Url;

use crate::error::{StyleError, StyleResult};
use crate::model::{DomainRule, DomainRuleKind};

/// The parts of a candidate URL the rule kinds look at
#[derive(Debug, Clone)]
struct Target<'a> {
    raw: &'a str,
    lowered: String,
    host: String,
}

impl<'a> Target<'a> {
    fn new(raw: &'a str) -> Self {
        let raw = raw.trim();
        let host = match Url::parse(raw) {
            Ok(parsed) => parsed.host_str().unwrap_or_default().to_lowercase(),
            Err(_) => host_from_text(raw),
        };
        Self {
            raw,
            lowered: raw.to_lowercase(),
            host,
        }
    }
}

/// Best effort host for strings the URL parser rejects
fn host_from_text(raw: &str) -> String {
    let without_scheme = raw.find("://").map_or(raw, |index| &raw[index + 3..]);
    let end = without_scheme.find(['/', '?', '#', ':']).unwrap_or(without_scheme.len());
    without_scheme[..end].to_lowercase()
}

/// Compile a `regexp` rule pattern so it has to match the whole URL
pub fn compile_regexp(pattern: &str) -> StyleResult<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| StyleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Decide whether a style scoped by `rules` applies to `url`.
///
/// No rules means a global style. Exclusions are checked first and always
/// win; a set with any inclusion is a whitelist, an exclusion-only set is a
/// blacklist.
pub fn matches(url: &str, rules: &[DomainRule]) -> bool {
    if rules.is_empty() {
        return true;
    }
    let target = Target::new(url);

    if let Some(rule) = rules.iter().find(|rule| !rule.include && rule_matches(rule, &target)) {
        debug!("{} excluded by {:?}", url, rule);
        return false;
    }
    if rules.iter().any(|rule| rule.include && rule_matches(rule, &target)) {
        return true;
    }
    !rules.iter().any(|rule| rule.include)
}

/// Whether a single rule matches `url`, ignoring its include flag
pub fn rule_matches_url(rule: &DomainRule, url: &str) -> bool {
    rule_matches(rule, &Target::new(url))
}

fn rule_matches(rule: &DomainRule, target: &Target<'_>) -> bool {
    match rule.kind {
        DomainRuleKind::Domain => domain_matches(&target.host, &rule.pattern),
        DomainRuleKind::UrlPrefix => target.lowered.starts_with(&rule.pattern.to_lowercase()),
        DomainRuleKind::Url => target
            .lowered
            .trim_end_matches('/')
            .eq_ignore_ascii_case(rule.pattern.trim_end_matches('/')),
        DomainRuleKind::Regexp => match compile_regexp(&rule.pattern) {
            Ok(regex) => regex.is_match(target.raw),
            Err(_) => false,
        },
    }
}

/// Exact host, any subdomain, and `www.` equivalence in both directions
fn domain_matches(host: &str, pattern: &str) -> bool {
    let host = strip_www(host);
    let pattern = strip_www(pattern);
    if host.is_empty() || pattern.is_empty() {
        return false;
    }
    host == pattern
        || host
            .strip_suffix(pattern)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
