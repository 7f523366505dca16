//! Domain Rules
//!
//! Extraction turns header directives and legacy scoping rules into
//! normalized [`DomainRule`](crate::model::DomainRule)s; matching decides at
//! request time whether a style applies to a URL.

pub mod extractor;
pub mod matcher;
pub mod normalize;


pub use extractor::{DomainExtraction, extract_domain_rules};
pub use matcher::{compile_regexp, matches, rule_matches_url};
