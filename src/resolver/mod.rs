//! Variable Resolution
//!
//! Substitutes `/*[[name|type|default]]*/` placeholders in a CSS body.
//!
//! For each placeholder the first applicable source wins:
//!
//! - a `select` carrying option snippets whose chosen value names an option:
//!   the option's whole CSS snippet, itself resolved recursively
//! - a `select` carrying an option-to-value mapping whose chosen value names
//!   an option: the mapped value
//! - the supplied current value
//! - the placeholder's inline default
//! - the descriptor's default
//!
//! With none of these the placeholder is left verbatim. Output never
//! contains anything a second pass would change, so resolution is
//! idempotent.

pub mod batches;
pub mod placeholder;


use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::config::VariableNaming;
use crate::constants::{CUSTOM_PROPERTY_PREFIX, MAX_SNIPPET_DEPTH};
use crate::model::VariableDescriptor;
use crate::variables::{canonical_name, find_variable};

pub use batches::{NoYield, PlaceholderBatches, TokioYield, YieldHook};
pub use placeholder::{Placeholder, find_placeholders, has_placeholders};

/// Resolves placeholders against a fixed set of values and descriptors
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    values: &'a HashMap<String, String>,
    descriptors: &'a BTreeMap<String, VariableDescriptor>,
    naming: VariableNaming,
}

impl<'a> Resolver<'a> {
    pub fn new(
        values: &'a HashMap<String, String>,
        descriptors: &'a BTreeMap<String, VariableDescriptor>,
    ) -> Self {
        Self {
            values,
            descriptors,
            naming: VariableNaming::default(),
        }
    }

    pub fn with_naming(mut self, naming: VariableNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Resolve every placeholder in `css`
    pub fn resolve(&self, css: &str) -> String {
        self.resolve_at_depth(css, 0)
    }

    /// Resolve in batches of `batch_size` placeholders, yielding through
    /// `hook` between batches. Produces exactly what [`Resolver::resolve`] does.
    pub async fn resolve_cooperative<H: YieldHook>(
        &self,
        css: &str,
        batch_size: usize,
        hook: &H,
    ) -> String {
        let placeholders = find_placeholders(css);
        let mut out = String::with_capacity(css.len());
        let mut cursor = 0;

        let batches = PlaceholderBatches::new(&placeholders, batch_size);
        let total = batches.len();
        for (index, batch) in batches.enumerate() {
            for placeholder in batch {
                out.push_str(&css[cursor..placeholder.start]);
                self.push_substitution(&mut out, css, placeholder, 0);
                cursor = placeholder.end;
            }
            if index + 1 < total {
                hook.yield_now().await;
            }
        }
        out.push_str(&css[cursor..]);
        debug!("Resolved {} placeholders in {} batches", placeholders.len(), total);
        out
    }

    /// The `:root` custom property block for the current values of all
    /// value-like variables. Empty when there is nothing to declare.
    pub fn custom_properties_block(&self) -> String {
        let declarations: Vec<String> = self
            .descriptors
            .values()
            .filter(|descriptor| descriptor.option_css.is_none())
            .filter_map(|descriptor| {
                let value = self.chosen_value(descriptor)?;
                let value = descriptor.option_values.get(value).map_or(value, String::as_str);
                if value.is_empty() {
                    return None;
                }
                Some(format!(
                    "  {}{}: {};",
                    CUSTOM_PROPERTY_PREFIX,
                    canonical_name(&descriptor.name),
                    value
                ))
            })
            .collect();

        if declarations.is_empty() {
            return String::new();
        }
        format!(":root {{\n{}\n}}\n", declarations.join("\n"))
    }

    fn resolve_at_depth(&self, css: &str, depth: usize) -> String {
        let placeholders = find_placeholders(css);
        if placeholders.is_empty() {
            return css.to_string();
        }

        let mut out = String::with_capacity(css.len());
        let mut cursor = 0;
        for placeholder in &placeholders {
            out.push_str(&css[cursor..placeholder.start]);
            self.push_substitution(&mut out, css, placeholder, depth);
            cursor = placeholder.end;
        }
        out.push_str(&css[cursor..]);
        out
    }

    fn push_substitution(
        &self,
        out: &mut String,
        css: &str,
        placeholder: &Placeholder,
        depth: usize,
    ) {
        match self.substitution(placeholder, depth) {
            Some(value) => out.push_str(&value),
            None => {
                debug!("Leaving placeholder '{}' unresolved", placeholder.name);
                out.push_str(&css[placeholder.start..placeholder.end]);
            }
        }
    }

    fn substitution(&self, placeholder: &Placeholder, depth: usize) -> Option<String> {
        let descriptor = find_variable(self.descriptors, &placeholder.name, self.naming);
        let supplied = self.supplied_value(&placeholder.name);

        if let Some(descriptor) = descriptor {
            let chosen = supplied.or_else(|| self.chosen_value(descriptor));

            if let (Some(option_css), Some(chosen)) = (&descriptor.option_css, chosen) {
                let snippet = option_css
                    .get(chosen)
                    .map(String::as_str)
                    .or_else(|| {
                        option_css
                            .values()
                            .find(|css| css.as_str() == chosen)
                            .map(String::as_str)
                    });
                if let Some(snippet) = snippet {
                    return Some(self.resolve_snippet(snippet, depth));
                }
            }

            if let Some(mapped) = chosen.and_then(|chosen| descriptor.option_values.get(chosen)) {
                return Some(mapped.clone());
            }
        }

        if let Some(value) = supplied {
            return Some(value.to_string());
        }
        if let Some(default) = &placeholder.default {
            return Some(default.clone());
        }
        descriptor
            .map(|descriptor| descriptor.default.as_str())
            .filter(|default| !default.is_empty())
            .map(str::to_string)
    }

    fn resolve_snippet(&self, snippet: &str, depth: usize) -> String {
        if depth + 1 >= MAX_SNIPPET_DEPTH {
            debug!("Snippet nesting limit reached; leaving nested placeholders as is");
            return snippet.to_string();
        }
        self.resolve_at_depth(snippet, depth + 1)
    }

    fn supplied_value(&self, name: &str) -> Option<&'a str> {
        if let Some(value) = self.values.get(name) {
            return Some(value.as_str());
        }
        match self.naming {
            VariableNaming::Strict => None,
            VariableNaming::Lenient => {
                let wanted = canonical_name(name);
                self.values
                    .iter()
                    .find(|(key, _)| canonical_name(key) == wanted)
                    .map(|(_, value)| value.as_str())
            }
        }
    }

    /// Supplied value, else the descriptor's own current value
    fn chosen_value(&self, descriptor: &'a VariableDescriptor) -> Option<&'a str> {
        self.supplied_value(&descriptor.name)
            .or_else(|| Some(descriptor.value.as_str()).filter(|value| !value.is_empty()))
    }
}

/// Resolve placeholders with lenient naming
pub fn resolve(
    css: &str,
    values: &HashMap<String, String>,
    descriptors: &BTreeMap<String, VariableDescriptor>,
) -> String {
    Resolver::new(values, descriptors).resolve(css)
}

/// Cooperative form of [`resolve`]
pub async fn resolve_cooperative<H: YieldHook>(
    css: &str,
    values: &HashMap<String, String>,
    descriptors: &BTreeMap<String, VariableDescriptor>,
    batch_size: usize,
    hook: &H,
) -> String {
    Resolver::new(values, descriptors)
        .resolve_cooperative(css, batch_size, hook)
        .await
}

/// `:root { --name: value; }` for the given variables
pub fn custom_properties_block(
    descriptors: &BTreeMap<String, VariableDescriptor>,
    values: &HashMap<String, String>,
) -> String {
    Resolver::new(values, descriptors).custom_properties_block()
}
