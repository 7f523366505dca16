//! Metadata Block Extraction
//!
//! Locates the UserStyle header, tokenizes it into directives and validates
//! the well known fields. Problems are reported as strings; nothing here
//! aborts a parse.

pub mod block;
pub mod directive;

#[cfg(test)]
mod metadata_tests;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::constants::*;
pub use block::{BlockKind, BlockLookup, MetadataBlock, find_metadata_block};
pub use directive::{Directive, tokenize_directives};

static VERSION_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^v?\d+(\.\d+){0,3}(-[0-9A-Za-z.-]+)?(\+[0-9A-Za-z.-]+)?$").expect("version regex")
});

/// Well known header fields. Empty strings when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub name: String,
    pub namespace: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub homepage_url: String,
    pub support_url: String,
    pub update_url: String,
    pub license: String,
    pub preprocessor: Option<String>,
}

impl HeaderFields {
    fn slot(&mut self, name: &str) -> Option<&mut String> {
        match name {
            DIRECTIVE_NAME => Some(&mut self.name),
            DIRECTIVE_NAMESPACE => Some(&mut self.namespace),
            DIRECTIVE_VERSION => Some(&mut self.version),
            DIRECTIVE_DESCRIPTION => Some(&mut self.description),
            DIRECTIVE_AUTHOR => Some(&mut self.author),
            DIRECTIVE_HOMEPAGE_URL => Some(&mut self.homepage_url),
            DIRECTIVE_SUPPORT_URL => Some(&mut self.support_url),
            DIRECTIVE_UPDATE_URL => Some(&mut self.update_url),
            DIRECTIVE_LICENSE => Some(&mut self.license),
            _ => None,
        }
    }

    fn get(&self, name: &str) -> &str {
        match name {
            DIRECTIVE_NAME => &self.name,
            DIRECTIVE_NAMESPACE => &self.namespace,
            DIRECTIVE_VERSION => &self.version,
            DIRECTIVE_HOMEPAGE_URL => &self.homepage_url,
            DIRECTIVE_SUPPORT_URL => &self.support_url,
            DIRECTIVE_UPDATE_URL => &self.update_url,
            _ => "",
        }
    }
}

/// Everything read from one header
#[derive(Debug, Clone, Default)]
pub struct HeaderReport {
    pub fields: HeaderFields,
    /// Accepted directives in source order (duplicates of non-repeatable ones dropped)
    pub directives: Vec<Directive>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl HeaderReport {
    /// Accepted directives with the given name
    pub fn directives_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Directive> + 'a {
        self.directives.iter().filter(move |d| d.name == name)
    }
}

/// Tokenize and validate the directives of a located header
pub fn read_header(block: &MetadataBlock) -> HeaderReport {
    let mut report = HeaderReport {
        warnings: block.warnings.clone(),
        ..Default::default()
    };

    for directive in tokenize_directives(&block.text) {
        let repeatable = REPEATABLE_DIRECTIVES.contains(&directive.name.as_str());
        if !repeatable && report.directives.iter().any(|d| d.name == directive.name) {
            report.errors.push(format!(
                "Duplicate {} directive on line {}",
                directive.display_name(),
                directive.line
            ));
            continue;
        }

        if directive.name == DIRECTIVE_PREPROCESSOR {
            report.fields.preprocessor = Some(directive.value.clone());
        } else if let Some(slot) = report.fields.slot(&directive.name) {
            *slot = directive.value.clone();
        }
        report.directives.push(directive);
    }

    for field in REQUIRED_DIRECTIVES {
        if report.fields.get(field).is_empty() {
            report.errors.push(format!("Missing required field @{}", field));
        }
    }

    for field in URL_DIRECTIVES {
        let value = report.fields.get(field);
        if !value.is_empty() {
            if let Err(err) = Url::parse(value) {
                report
                    .warnings
                    .push(format!("Malformed URL in @{}: '{}' ({})", field, value, err));
            }
        }
    }

    let version = &report.fields.version;
    if !version.is_empty() && !VERSION_FORMAT.is_match(version) {
        report
            .warnings
            .push(format!("@version '{}' is not a dotted numeric version", version));
    }

    debug!(
        "Read {} directives from {:?} header ({} errors, {} warnings)",
        report.directives.len(),
        block.kind,
        report.errors.len(),
        report.warnings.len()
    );
    report
}
