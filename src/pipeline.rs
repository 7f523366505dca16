//! Pipeline orchestration
//!
//! [`StyleParser`] runs header extraction, dialect detection, variable and
//! domain extraction, then compiles the CSS body for the detected dialect.
//! Document problems end up in `ParseResult.errors` / `warnings`; `parse`
//! never fails and never panics outward.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, error, warn};

use crate::config::{HeaderMode, ParseOptions, VariableNaming};
use crate::domains::extract_domain_rules;
use crate::error::{StyleError, StyleResult};
use crate::metadata::{BlockLookup, HeaderReport, find_metadata_block, read_header};
use crate::model::{Dialect, ParseResult, StyleDefinition, style_id};
use crate::preprocessor::{
    ExecutionCapabilities, NoCapabilities, PreprocessorEngine, detect_dialect,
};
use crate::resolver::{Resolver, TokioYield};
use crate::variables::{canonical_name, extract_variables};

/// Parses UserStyle sources. Holds no per-document state; one parser can
/// serve any number of parses.
pub struct StyleParser {
    options: ParseOptions,
    capabilities: Box<dyn ExecutionCapabilities>,
    engine: Option<Box<dyn PreprocessorEngine>>,
}

impl Default for StyleParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl StyleParser {
    /// A parser that can run no external preprocessor
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            capabilities: Box::new(NoCapabilities),
            engine: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Box<dyn ExecutionCapabilities>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_engine(mut self, engine: Box<dyn PreprocessorEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse raw UserStyle source. Always returns a result; unexpected
    /// internal failures become a single generic error with default metadata.
    pub fn parse(&self, source: &str) -> ParseResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.parse_document(source))) {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                error!("Style parse failed: {}", err);
                Self::failed(err.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Style parse panicked: {}", message);
                Self::failed(message)
            }
        }
    }

    /// Recompute `meta.compiled_css` from `css` after variable values change.
    ///
    /// `values` override the current value of matching variables; the
    /// descriptors in `meta` are updated to match. Returns non-fatal
    /// warnings. Fails only if the external preprocessor fails.
    pub fn compile(
        &self,
        meta: &mut StyleDefinition,
        css: &str,
        values: &HashMap<String, String>,
    ) -> StyleResult<Vec<String>> {
        let effective = self.apply_values(meta, values);
        if meta.preprocessor.needs_external_engine() {
            return self.run_engine(meta, css);
        }

        let compiled = {
            let resolver = Resolver::new(&effective, &meta.variables)
                .with_naming(self.options.variable_naming);
            let resolved = resolver.resolve(css);
            self.with_custom_properties(meta.preprocessor, &resolver, resolved)
        };
        meta.compiled_css = compiled;
        Ok(Vec::new())
    }

    /// [`StyleParser::compile`], resolving placeholders in batches of
    /// `resolve_batch_size` and yielding to tokio between batches
    pub async fn compile_cooperative(
        &self,
        meta: &mut StyleDefinition,
        css: &str,
        values: &HashMap<String, String>,
    ) -> StyleResult<Vec<String>> {
        let effective = self.apply_values(meta, values);
        if meta.preprocessor.needs_external_engine() {
            return self.run_engine(meta, css);
        }

        let compiled = {
            let resolver = Resolver::new(&effective, &meta.variables)
                .with_naming(self.options.variable_naming);
            let resolved = resolver
                .resolve_cooperative(css, self.options.resolve_batch_size, &TokioYield)
                .await;
            self.with_custom_properties(meta.preprocessor, &resolver, resolved)
        };
        meta.compiled_css = compiled;
        Ok(Vec::new())
    }

    fn parse_document(&self, source: &str) -> StyleResult<ParseResult> {
        let mut result = ParseResult::default();

        let detection = detect_dialect(source);
        debug!(
            "Detected {} dialect from {:?} (confidence {:.2})",
            detection.dialect, detection.source, detection.confidence
        );

        let (report, body, raw_block) = match find_metadata_block(source) {
            BlockLookup::Found(block) => {
                let report = read_header(&block);
                let body = block.css_body(source);
                (report, body, block.raw)
            }
            BlockLookup::Rejected(reason) => {
                warn!("Metadata block rejected: {}", reason);
                result.errors.push(reason);
                (HeaderReport::default(), source.to_string(), String::new())
            }
            BlockLookup::Missing => {
                if self.options.header_mode == HeaderMode::Required {
                    result.errors.push("No ==UserStyle== metadata block found".to_string());
                }
                debug!("No metadata block; passing CSS through");
                (HeaderReport::default(), source.to_string(), String::new())
            }
        };
        result.errors.extend(report.errors);
        result.warnings.extend(report.warnings);

        let variables = extract_variables(&report.directives, self.options.variable_naming);
        result.warnings.extend(variables.warnings);

        let domains = extract_domain_rules(&report.directives, &body);
        result.warnings.extend(domains.warnings);

        let fields = report.fields;
        let mut meta = StyleDefinition {
            id: style_id(&fields.namespace, &fields.name),
            name: fields.name,
            namespace: fields.namespace,
            version: fields.version,
            description: fields.description,
            author: fields.author,
            source_url: fields.homepage_url,
            support_url: fields.support_url,
            update_url: fields.update_url,
            license: fields.license,
            preprocessor: detection.dialect,
            domains: domains.rules,
            variables: variables.variables,
            compiled_css: String::new(),
            raw_metadata_block: raw_block.clone(),
        };

        match self.compile(&mut meta, &body, &HashMap::new()) {
            Ok(warnings) => result.warnings.extend(warnings),
            Err(err @ StyleError::Preprocessor { .. }) => {
                warn!("{}", err);
                meta.compiled_css = body.clone();
                result.errors.push(err.to_string());
            }
            Err(err) => return Err(err),
        }

        debug!(
            "Parsed style '{}' ({} variables, {} domain rules, {} warnings, {} errors)",
            meta.name,
            meta.variables.len(),
            meta.domains.len(),
            result.warnings.len(),
            result.errors.len()
        );

        result.meta = meta;
        result.css = body;
        result.metadata_block = raw_block;
        Ok(result)
    }

    /// Write supplied values into matching descriptors and return the value
    /// map the resolver works from
    fn apply_values(
        &self,
        meta: &mut StyleDefinition,
        values: &HashMap<String, String>,
    ) -> HashMap<String, String> {
        let naming = self.options.variable_naming;
        for (name, value) in values {
            let matching = meta.variables.values_mut().find(|descriptor| {
                descriptor.name == *name
                    || (naming == VariableNaming::Lenient
                        && canonical_name(&descriptor.name) == canonical_name(name))
            });
            if let Some(descriptor) = matching {
                descriptor.value = value.clone();
            }
        }

        let mut effective = values.clone();
        for descriptor in meta.variables.values().filter(|d| !d.value.is_empty()) {
            effective
                .entry(descriptor.name.clone())
                .or_insert_with(|| descriptor.value.clone());
        }
        effective
    }

    fn with_custom_properties(
        &self,
        dialect: Dialect,
        resolver: &Resolver<'_>,
        resolved: String,
    ) -> String {
        if dialect != Dialect::None || !self.options.emit_custom_properties {
            return resolved;
        }
        let block = resolver.custom_properties_block();
        if block.is_empty() {
            resolved
        } else {
            format!("{}{}", block, resolved)
        }
    }

    /// Hand Less/Stylus to the injected engine, or return the CSS uncompiled
    fn run_engine(&self, meta: &mut StyleDefinition, css: &str) -> StyleResult<Vec<String>> {
        let dialect = meta.preprocessor;
        let engine = self
            .engine
            .as_ref()
            .filter(|_| self.capabilities.can_run_preprocessor(dialect));

        let Some(engine) = engine else {
            let message = format!(
                "{} preprocessing skipped: no {} compiler can run in this context; CSS left uncompiled",
                dialect, dialect
            );
            warn!("{}", message);
            meta.compiled_css = css.to_string();
            return Ok(vec![message]);
        };

        meta.compiled_css = engine.compile(dialect, css, &meta.variables)?;
        debug!("{} engine produced {} bytes", dialect, meta.compiled_css.len());
        Ok(Vec::new())
    }

    fn failed(message: String) -> ParseResult {
        ParseResult {
            errors: vec![format!("Failed to parse style: {}", message)],
            ..Default::default()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected internal failure".to_string())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
