//! Variable Extraction
//!
//! Turns `@var` and `@advanced` directives into typed descriptors. Both
//! families share one grammar; the first declaration of a name wins and
//! later ones are skipped with a warning, unless the first one degraded.
//! Extraction never fails as a whole.

pub mod declaration;
pub mod option_block;


use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use crate::config::VariableNaming;
use crate::constants::{CUSTOM_PROPERTY_PREFIX, DIRECTIVE_ADVANCED, DIRECTIVE_VAR};
use crate::metadata::Directive;
use crate::model::VariableDescriptor;
use declaration::{build_descriptor, parse_head};

/// Descriptors keyed by declared name, plus non-fatal findings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableExtraction {
    pub variables: BTreeMap<String, VariableDescriptor>,
    pub warnings: Vec<String>,
}

/// Name with any `--` prefix removed; `name` and `--name` share it
pub fn canonical_name(name: &str) -> &str {
    name.strip_prefix(CUSTOM_PROPERTY_PREFIX).unwrap_or(name)
}

/// Look a variable up by name, honoring the naming policy
pub fn find_variable<'a>(
    variables: &'a BTreeMap<String, VariableDescriptor>,
    name: &str,
    naming: VariableNaming,
) -> Option<&'a VariableDescriptor> {
    if let Some(found) = variables.get(name) {
        return Some(found);
    }
    match naming {
        VariableNaming::Strict => None,
        VariableNaming::Lenient => {
            let wanted = canonical_name(name);
            variables.values().find(|d| canonical_name(&d.name) == wanted)
        }
    }
}

/// Extract descriptors from header directives in source order. The first
/// successfully parsed declaration of a name wins; a degraded one is
/// replaced by a later declaration that parses.
pub fn extract_variables(directives: &[Directive], naming: VariableNaming) -> VariableExtraction {
    let mut extraction = VariableExtraction::default();
    // names whose only declaration so far failed to parse
    let mut degraded: HashSet<String> = HashSet::new();

    for directive in directives
        .iter()
        .filter(|d| d.name == DIRECTIVE_VAR || d.name == DIRECTIVE_ADVANCED)
    {
        let Some(head) = parse_head(&directive.value) else {
            extraction.warnings.push(format!(
                "Malformed {} directive on line {}",
                directive.display_name(),
                directive.line
            ));
            continue;
        };

        if !naming.accepts(head.name) {
            extraction.warnings.push(format!(
                "Variable name '{}' on line {} must start with {}",
                head.name, directive.line, CUSTOM_PROPERTY_PREFIX
            ));
            continue;
        }

        let existing =
            find_variable(&extraction.variables, head.name, naming).map(|d| d.name.clone());
        let built = build_descriptor(&head);
        if let Some(existing) = existing {
            if !degraded.contains(&existing) || built.problem.is_some() {
                debug!("Skipping second declaration of variable '{}'", head.name);
                extraction.warnings.push(format!(
                    "Variable '{}' is declared more than once; keeping the first declaration",
                    head.name
                ));
                continue;
            }
            debug!("Declaration on line {} replaces failed '{}'", directive.line, existing);
            extraction.variables.remove(&existing);
            degraded.remove(&existing);
        }

        if let Some(problem) = built.problem {
            warn!("Variable '{}' degraded: {}", head.name, problem);
            extraction.warnings.push(format!(
                "Variable '{}' on line {}: {}",
                head.name, directive.line, problem
            ));
            degraded.insert(built.descriptor.name.clone());
        }
        extraction
            .variables
            .insert(built.descriptor.name.clone(), built.descriptor);
    }

    extraction
}
