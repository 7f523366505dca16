//! Plain data types exchanged with storage, UI and the request-time matcher.
//!
//! Everything here is serializable so a parsed style can cross the message
//! transport as JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{JsonContext, StyleResult};

/// Preprocessing language a style body is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Plain CSS
    #[default]
    None,
    /// Less-like syntax (mixins, guards, `:extend`)
    Less,
    /// Stylus-like syntax (indentation, `&`, line comments, conditionals)
    Stylus,
    /// userstyles.org syntax (`/*[[placeholders]]*/`, `@advanced` option blocks)
    Uso,
}

impl Dialect {
    /// Dialects that need an external compiler before the CSS is usable
    pub fn needs_external_engine(self) -> bool {
        matches!(self, Dialect::Less | Dialect::Stylus)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::None => "none",
            Dialect::Less => "less",
            Dialect::Stylus => "stylus",
            Dialect::Uso => "uso",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a dialect classification came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    /// An explicit `@preprocessor` directive
    Metadata,
    /// Marker scoring over the source text
    Heuristic,
}

/// Result of dialect detection. Computed per parse, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorDetection {
    #[serde(rename = "type")]
    pub dialect: Dialect,
    pub source: DetectionSource,
    /// In `[0, 1]`
    pub confidence: f64,
}

/// Control type of a user adjustable variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Color,
    Number,
    Text,
    Select,
    Checkbox,
    Unknown,
}

impl VariableType {
    /// Maps a declared type keyword to a control type. Unrecognized keywords
    /// become `Unknown` rather than failing.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "range" | "number" => VariableType::Number,
            "color" => VariableType::Color,
            "text" => VariableType::Text,
            "select" | "dropdown" => VariableType::Select,
            "checkbox" => VariableType::Checkbox,
            _ => VariableType::Unknown,
        }
    }
}

/// A typed, user adjustable variable declared in the metadata header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub default: String,
    /// Always set; equals `default` at creation
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Option label -> CSS snippet, only for option blocks with embedded CSS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_css: Option<BTreeMap<String, String>>,
    /// Option label -> substituted value, for `select` declared with an object tail
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub option_values: BTreeMap<String, String>,
}

impl VariableDescriptor {
    pub fn new(
        name: impl Into<String>,
        var_type: VariableType,
        default: impl Into<String>,
    ) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            var_type,
            label: None,
            value: default.clone(),
            default,
            min: None,
            max: None,
            options: Vec::new(),
            option_css: None,
            option_values: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }
}

/// Kind of a page scoping rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainRuleKind {
    Domain,
    Url,
    UrlPrefix,
    Regexp,
}

impl DomainRuleKind {
    /// Maps a legacy scoping function name (`url-prefix`, ...) to a rule kind
    pub fn from_function(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "domain" => Some(DomainRuleKind::Domain),
            "url" => Some(DomainRuleKind::Url),
            "url-prefix" => Some(DomainRuleKind::UrlPrefix),
            "regexp" => Some(DomainRuleKind::Regexp),
            _ => None,
        }
    }
}

/// A (kind, pattern, include) triple scoping a style to pages.
/// Patterns are normalized when extracted, not when matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainRule {
    pub kind: DomainRuleKind,
    pub pattern: String,
    pub include: bool,
}

impl DomainRule {
    pub fn new(kind: DomainRuleKind, pattern: impl Into<String>, include: bool) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            include,
        }
    }

    /// Rules are considered duplicates when kind and normalized pattern agree
    pub fn same_target(&self, other: &DomainRule) -> bool {
        self.kind == other.kind && self.pattern == other.pattern
    }
}

/// Validated style metadata plus the compiled CSS
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub source_url: String,
    pub support_url: String,
    pub update_url: String,
    pub license: String,
    pub preprocessor: Dialect,
    pub domains: Vec<DomainRule>,
    pub variables: BTreeMap<String, VariableDescriptor>,
    pub compiled_css: String,
    pub raw_metadata_block: String,
}

/// Outcome of one parse call. Built fresh each time and never mutated after
/// it is returned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub meta: StyleDefinition,
    pub css: String,
    pub metadata_block: String,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ParseResult {
    /// Serialize for the message transport
    pub fn to_json(&self) -> StyleResult<String> {
        serde_json::to_string(self).with_json_context("Failed to serialize parse result")
    }

    pub fn from_json(json: &str) -> StyleResult<Self> {
        serde_json::from_str(json).with_json_context("Failed to deserialize parse result")
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Deterministic id for a style: 64-bit FNV-1a over `namespace:name`
pub fn style_id(namespace: &str, name: &str) -> String {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let key = format!("{}:{}", namespace, name);
    let hash = key.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    });
    format!("{:016x}", hash)
}
