//! Test utilities shared across the codebase

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{StyleError, StyleResult};
use crate::model::{Dialect, VariableDescriptor};
use crate::preprocessor::PreprocessorEngine;

/// Wrap header lines and a body into a canonical UserStyle source
pub fn user_style(header_lines: &[&str], body: &str) -> String {
    format!("/* ==UserStyle==\n{}\n==/UserStyle== */\n{}", header_lines.join("\n"), body)
}

/// The three required fields for a style named `name`
pub fn required_fields(name: &str) -> Vec<String> {
    vec![
        format!("@name {}", name),
        "@namespace github.com/usercss".to_string(),
        "@version 1.0.0".to_string(),
    ]
}

/// A complete header for `name` followed by `extra` directives
pub fn complete_style(name: &str, extra: &[&str], body: &str) -> String {
    let mut lines = required_fields(name);
    lines.extend(extra.iter().map(|line| line.to_string()));
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    user_style(&lines, body)
}

/// How a [`FakeEngine`] answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineBehavior {
    /// Prefix the CSS with a marker comment and the variable count
    Compile,
    /// Report a compiler error
    Fail,
    /// Report an error that is not a compiler error
    Broken,
    Panic,
}

/// A preprocessor engine double that records how often it ran
#[derive(Debug)]
pub struct FakeEngine {
    behavior: EngineBehavior,
    calls: AtomicUsize,
}

impl FakeEngine {
    pub fn new(behavior: EngineBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PreprocessorEngine for FakeEngine {
    fn compile(
        &self,
        dialect: Dialect,
        css: &str,
        variables: &BTreeMap<String, VariableDescriptor>,
    ) -> StyleResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            EngineBehavior::Compile => {
                Ok(format!("/* {} {} */\n{}", dialect, variables.len(), css))
            }
            EngineBehavior::Fail => Err(StyleError::Preprocessor {
                dialect,
                message: "unexpected token".to_string(),
            }),
            EngineBehavior::Broken => Err(StyleError::Internal {
                message: "engine state corrupted".to_string(),
            }),
            EngineBehavior::Panic => panic!("engine crashed"),
        }
    }
}

impl PreprocessorEngine for Arc<FakeEngine> {
    fn compile(
        &self,
        dialect: Dialect,
        css: &str,
        variables: &BTreeMap<String, VariableDescriptor>,
    ) -> StyleResult<String> {
        self.as_ref().compile(dialect, css, variables)
    }
}
