//! Parser configuration
//!
//! Options are plain serde data so an embedding application can keep them
//! next to its own settings and load them with [`ParseOptions::from_json`].

use serde::{Deserialize, Serialize};

use crate::constants::{CUSTOM_PROPERTY_PREFIX, DEFAULT_RESOLVE_BATCH_SIZE};
use crate::error::{JsonContext, StyleResult};

/// What to do when a document has no metadata header at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// A headerless document is a global style without metadata
    #[default]
    Optional,
    /// A headerless document is a parse failure
    Required,
}

/// How variable names are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableNaming {
    /// Bare identifiers and `--name` are both accepted and treated as the same variable
    #[default]
    Lenient,
    /// Only `--name` identifiers are accepted
    Strict,
}

impl VariableNaming {
    /// Returns true if `name` is acceptable under this policy
    pub fn accepts(self, name: &str) -> bool {
        match self {
            VariableNaming::Lenient => !name.is_empty(),
            VariableNaming::Strict => {
                name.len() > CUSTOM_PROPERTY_PREFIX.len()
                    && name.starts_with(CUSTOM_PROPERTY_PREFIX)
            }
        }
    }
}

/// Options for [`crate::pipeline::StyleParser`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    pub header_mode: HeaderMode,
    pub variable_naming: VariableNaming,
    /// Placeholders substituted between cooperative yields
    pub resolve_batch_size: usize,
    /// Prepend a `:root` block with custom properties to plain CSS styles
    pub emit_custom_properties: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::default(),
            variable_naming: VariableNaming::default(),
            resolve_batch_size: DEFAULT_RESOLVE_BATCH_SIZE,
            emit_custom_properties: true,
        }
    }
}

impl ParseOptions {
    /// Load options from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> StyleResult<Self> {
        let options: ParseOptions =
            serde_json::from_str(json).with_json_context("Failed to parse parser options")?;
        Ok(options.normalized())
    }

    pub fn with_header_mode(mut self, header_mode: HeaderMode) -> Self {
        self.header_mode = header_mode;
        self
    }

    pub fn with_variable_naming(mut self, variable_naming: VariableNaming) -> Self {
        self.variable_naming = variable_naming;
        self
    }

    pub fn with_resolve_batch_size(mut self, batch_size: usize) -> Self {
        self.resolve_batch_size = batch_size;
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.resolve_batch_size = self.resolve_batch_size.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.header_mode, HeaderMode::Optional);
        assert_eq!(options.variable_naming, VariableNaming::Lenient);
        assert_eq!(options.resolve_batch_size, DEFAULT_RESOLVE_BATCH_SIZE);
        assert!(options.emit_custom_properties);
    }

    #[test]
    fn test_from_json_partial() {
        let options = ParseOptions::from_json(r#"{"headerMode": "required", "resolveBatchSize": 0}"#).unwrap();
        assert_eq!(options.header_mode, HeaderMode::Required);
        assert_eq!(options.variable_naming, VariableNaming::Lenient);
        assert_eq!(options.resolve_batch_size, 1);
    }

    #[test]
    fn test_from_json_invalid() {
        let result = ParseOptions::from_json(r#"{"headerMode": "sometimes"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_naming_policies() {
        assert!(VariableNaming::Lenient.accepts("accent"));
        assert!(VariableNaming::Lenient.accepts("--accent"));
        assert!(!VariableNaming::Strict.accepts("accent"));
        assert!(!VariableNaming::Strict.accepts("--"));
        assert!(VariableNaming::Strict.accepts("--accent"));
    }
}
