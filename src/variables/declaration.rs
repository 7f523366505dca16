//! Variable declaration grammar: `type name "label" defaultTail`

use std::collections::BTreeMap;

use crate::constants::DEFAULT_OPTION_MARKER;
use crate::model::{VariableDescriptor, VariableType};
use crate::variables::option_block::{self, read_quoted};

/// The fixed leading part of a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationHead<'a> {
    pub type_keyword: &'a str,
    pub name: &'a str,
    pub label: Option<String>,
    /// Everything after the label, trimmed
    pub tail: &'a str,
}

/// Split a directive value into type, name, optional label and tail
pub fn parse_head(value: &str) -> Option<DeclarationHead<'_>> {
    let value = value.trim_start();
    let type_len = value.find(char::is_whitespace)?;
    let type_keyword = &value[..type_len];
    if !type_keyword.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let rest = value[type_len..].trim_start();
    let name_len = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '{' | '['))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }
    let name = &rest[..name_len];
    let rest = rest[name_len..].trim_start();

    let (label, tail) = match read_quoted(rest) {
        Some((label, consumed)) => (Some(label), rest[consumed..].trim()),
        None => (None, rest.trim()),
    };

    Some(DeclarationHead {
        type_keyword,
        name,
        label,
        tail,
    })
}

/// Result of building a descriptor; `problem` is set when the tail could
/// not be understood and the descriptor was degraded
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltVariable {
    pub descriptor: VariableDescriptor,
    pub problem: Option<String>,
}

/// Build a descriptor from a parsed head
pub fn build_descriptor(head: &DeclarationHead<'_>) -> BuiltVariable {
    let var_type = VariableType::from_keyword(head.type_keyword);
    let base = VariableDescriptor::new(head.name, var_type, "").with_label(head.label.clone());

    let (mut descriptor, problem) = match var_type {
        VariableType::Number => (number_descriptor(base, head.tail), None),
        VariableType::Checkbox => {
            let default = match unquote(head.tail).as_str() {
                "1" => "1",
                _ => "0",
            };
            (with_default(base, default.to_string()), None)
        }
        VariableType::Select => select_descriptor(base, head.tail),
        VariableType::Color | VariableType::Text | VariableType::Unknown => {
            let default = unquote(head.tail);
            (with_default(base, default), None)
        }
    };
    descriptor.value = descriptor.default.clone();
    BuiltVariable { descriptor, problem }
}

fn with_default(mut descriptor: VariableDescriptor, default: String) -> VariableDescriptor {
    descriptor.default = default;
    descriptor
}

/// `[default, min, max, step, unit]` or a plain default
fn number_descriptor(mut descriptor: VariableDescriptor, tail: &str) -> VariableDescriptor {
    match bracketed_items(tail) {
        Some(items) => {
            descriptor.default = items.first().cloned().unwrap_or_default();
            descriptor.min = items.get(1).and_then(|v| v.parse::<f64>().ok());
            descriptor.max = items.get(2).and_then(|v| v.parse::<f64>().ok());
            // step and unit are accepted but not kept
        }
        None => descriptor.default = unquote(tail),
    }
    descriptor
}

fn select_descriptor(
    mut descriptor: VariableDescriptor,
    tail: &str,
) -> (VariableDescriptor, Option<String>) {
    if option_block::is_option_block(tail) {
        return match option_block::parse_option_block(tail) {
            Ok(options) => {
                let default = option_block::default_index(&options);
                descriptor.default = options[default].css.clone();
                descriptor.options = options.iter().map(|o| o.label.clone()).collect();
                descriptor.option_css =
                    Some(options.into_iter().map(|o| (o.label, o.css)).collect());
                (descriptor, None)
            }
            Err(err) => (descriptor, Some(err.to_string())),
        };
    }

    if tail.starts_with('{') {
        let pairs = object_pairs(tail);
        if pairs.is_empty() {
            return (descriptor, Some("select object has no entries".to_string()));
        }
        let labels: Vec<(String, bool)> = pairs
            .iter()
            .map(|(label, _)| strip_default_marker(label))
            .collect();
        let default = labels.iter().position(|(_, marked)| *marked).unwrap_or(0);
        descriptor.default = pairs[default].1.clone();
        descriptor.options = labels.iter().map(|(label, _)| label.clone()).collect();
        descriptor.option_values = labels
            .into_iter()
            .zip(pairs)
            .map(|((label, _), (_, value))| (label, value))
            .collect::<BTreeMap<_, _>>();
        return (descriptor, None);
    }

    match bracketed_items(tail) {
        Some(items) if !items.is_empty() => {
            let entries: Vec<(String, bool)> =
                items.iter().map(|item| strip_default_marker(item)).collect();
            let default = entries.iter().position(|(_, marked)| *marked).unwrap_or(0);
            descriptor.default = entries[default].0.clone();
            descriptor.options = entries.into_iter().map(|(label, _)| label).collect();
            (descriptor, None)
        }
        _ => (descriptor, Some("select has no options".to_string())),
    }
}

fn strip_default_marker(label: &str) -> (String, bool) {
    let trimmed = label.trim();
    match trimmed.strip_suffix(DEFAULT_OPTION_MARKER) {
        Some(stripped) => (stripped.trim_end().to_string(), true),
        None => (trimmed.to_string(), false),
    }
}

/// Items of a `[a, "b", 'c']` list, unquoted. `None` if `tail` is not a list.
fn bracketed_items(tail: &str) -> Option<Vec<String>> {
    let inner = tail.trim().strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(split_top_level(inner, ',').iter().map(|item| unquote(item)).collect())
}

/// `"label": "value"` pairs of a `{...}` object, in source order
fn object_pairs(tail: &str) -> Vec<(String, String)> {
    let Some(inner) = tail.trim().strip_prefix('{').and_then(|t| t.strip_suffix('}')) else {
        return Vec::new();
    };
    split_top_level(inner, ',')
        .iter()
        .filter_map(|entry| {
            let entry = entry.trim();
            let (key, consumed) = read_quoted(entry)?;
            let value = entry[consumed..].trim_start().strip_prefix(':')?;
            Some((key, unquote(value)))
        })
        .collect()
}

/// Split on `separator` outside of quotes
fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in text.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
                current.push(ch);
            }
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            None if ch == separator => items.push(std::mem::take(&mut current)),
            None => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        items.push(current);
    }
    items
}

/// Trim and drop one level of surrounding quotes
pub fn unquote(text: &str) -> String {
    let trimmed = text.trim();
    match read_quoted(trimmed) {
        Some((value, consumed)) if consumed == trimmed.len() => value,
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head() {
        let head = parse_head("color accent \"Accent color\" #ff0000").unwrap();
        assert_eq!(head.type_keyword, "color");
        assert_eq!(head.name, "accent");
        assert_eq!(head.label.as_deref(), Some("Accent color"));
        assert_eq!(head.tail, "#ff0000");
    }

    #[test]
    fn test_parse_head_without_label() {
        let head = parse_head("text font sans-serif").unwrap();
        assert_eq!(head.label, None);
        assert_eq!(head.tail, "sans-serif");
    }

    #[test]
    fn test_parse_head_rejects_garbage() {
        assert!(parse_head("").is_none());
        assert!(parse_head("color").is_none());
        assert!(parse_head("c0l0r x y").is_none());
    }

    #[test]
    fn test_number_with_range() {
        let head = parse_head("range size \"Size\" [12, 8, 32, 1, 'px']").unwrap();
        let built = build_descriptor(&head);
        let d = built.descriptor;
        assert_eq!(d.var_type, VariableType::Number);
        assert_eq!(d.default, "12");
        assert_eq!(d.value, "12");
        assert_eq!(d.min, Some(8.0));
        assert_eq!(d.max, Some(32.0));
    }

    #[test]
    fn test_number_plain_default() {
        let head = parse_head("number opacity \"Opacity\" 0.5").unwrap();
        let d = build_descriptor(&head).descriptor;
        assert_eq!(d.default, "0.5");
        assert_eq!(d.min, None);
    }

    #[test]
    fn test_checkbox_coercion() {
        for (tail, expected) in [("1", "1"), ("0", "0"), ("true", "0"), ("'1'", "1"), ("", "0")] {
            let value = format!("checkbox flag \"Flag\" {}", tail);
            let head = parse_head(&value).unwrap();
            assert_eq!(build_descriptor(&head).descriptor.default, expected, "tail {:?}", tail);
        }
    }

    #[test]
    fn test_select_list() {
        let head = parse_head("select font \"Font\" [\"Arial\", \"Verdana*\", 'Tahoma']").unwrap();
        let d = build_descriptor(&head).descriptor;
        assert_eq!(d.options, vec!["Arial", "Verdana", "Tahoma"]);
        assert_eq!(d.default, "Verdana");
    }

    #[test]
    fn test_select_object() {
        let head = parse_head("select width \"Width\" {\"Narrow\": \"800px\", \"Wide*\": \"1200px\"}").unwrap();
        let d = build_descriptor(&head).descriptor;
        assert_eq!(d.options, vec!["Narrow", "Wide"]);
        assert_eq!(d.default, "1200px");
        assert_eq!(d.option_values.get("Narrow").map(String::as_str), Some("800px"));
        assert!(d.option_css.is_none());
    }

    #[test]
    fn test_select_without_options_degrades() {
        let head = parse_head("select broken \"Broken\" nothing").unwrap();
        let built = build_descriptor(&head);
        assert!(built.problem.is_some());
        assert_eq!(built.descriptor.default, "");
        assert_eq!(built.descriptor.value, "");
    }

    #[test]
    fn test_unknown_type_keeps_default() {
        let head = parse_head("image bg \"Background\" \"https://example.com/a.png\"").unwrap();
        let d = build_descriptor(&head).descriptor;
        assert_eq!(d.var_type, VariableType::Unknown);
        assert_eq!(d.default, "https://example.com/a.png");
    }
}
