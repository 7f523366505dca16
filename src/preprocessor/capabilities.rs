//! Execution capabilities and the external compiler seam
//!
//! The core never probes its environment. Whoever constructs the parser
//! says what it can run, and optionally hands over an engine that actually
//! compiles Less or Stylus.

use std::collections::{BTreeMap, HashSet};

use crate::error::StyleResult;
use crate::model::{Dialect, VariableDescriptor};

/// What the surrounding runtime is able to execute
pub trait ExecutionCapabilities: Send + Sync {
    /// Whether a compiler for `dialect` may be run here
    fn can_run_preprocessor(&self, dialect: Dialect) -> bool;
}

/// A runtime that can run nothing. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapabilities;

impl ExecutionCapabilities for NoCapabilities {
    fn can_run_preprocessor(&self, _dialect: Dialect) -> bool {
        false
    }
}

/// A fixed set of runnable dialects
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    dialects: HashSet<Dialect>,
}

impl StaticCapabilities {
    pub fn new(dialects: impl IntoIterator<Item = Dialect>) -> Self {
        Self {
            dialects: dialects.into_iter().collect(),
        }
    }
}

impl ExecutionCapabilities for StaticCapabilities {
    fn can_run_preprocessor(&self, dialect: Dialect) -> bool {
        self.dialects.contains(&dialect)
    }
}

/// An external compiler for preprocessed dialects
pub trait PreprocessorEngine: Send + Sync {
    /// Compile `css` written in `dialect`, with variables at their current values
    fn compile(
        &self,
        dialect: Dialect,
        css: &str,
        variables: &BTreeMap<String, VariableDescriptor>,
    ) -> StyleResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_capabilities() {
        assert!(!NoCapabilities.can_run_preprocessor(Dialect::Less));
        assert!(!NoCapabilities.can_run_preprocessor(Dialect::Stylus));
    }

    #[test]
    fn test_static_capabilities() {
        let caps = StaticCapabilities::new([Dialect::Less]);
        assert!(caps.can_run_preprocessor(Dialect::Less));
        assert!(!caps.can_run_preprocessor(Dialect::Stylus));
    }
}
