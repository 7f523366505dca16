//! UserCSS Core
//!
//! Parses UserStyle sources: locates and validates the metadata header,
//! extracts typed variables and page scoping rules, classifies the
//! preprocessor dialect and resolves variable placeholders into CSS.
//!
//! Everything here is pure and synchronous except the cooperative resolver,
//! which yields between batches of placeholders.

pub mod config;
pub mod constants;
pub mod domains;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod preprocessor;
pub mod resolver;
pub mod variables;

#[cfg(test)]
pub mod test_utils;

use std::collections::{BTreeMap, HashMap};

pub use config::{HeaderMode, ParseOptions, VariableNaming};
pub use error::{StyleError, StyleResult};
pub use model::{
    DetectionSource, Dialect, DomainRule, DomainRuleKind, ParseResult, PreprocessorDetection,
    StyleDefinition, VariableDescriptor, VariableType,
};
pub use pipeline::StyleParser;
pub use preprocessor::{
    ExecutionCapabilities, NoCapabilities, PreprocessorEngine, StaticCapabilities,
};

/// Parse with default options and no preprocessor capabilities
pub fn parse(source: &str) -> ParseResult {
    StyleParser::default().parse(source)
}

/// Classify the preprocessor dialect of raw source
pub fn detect_dialect(source: &str) -> PreprocessorDetection {
    preprocessor::detect_dialect(source)
}

/// Substitute variable placeholders in `css`
pub fn resolve(
    css: &str,
    values: &HashMap<String, String>,
    descriptors: &BTreeMap<String, VariableDescriptor>,
) -> String {
    resolver::resolve(css, values, descriptors)
}

/// Whether a style scoped by `domains` applies to `url`
pub fn matches(url: &str, domains: &[DomainRule]) -> bool {
    domains::matches(url, domains)
}
