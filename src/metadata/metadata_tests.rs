use crate::metadata::{BlockLookup, MetadataBlock, find_metadata_block, read_header};

fn header(source: &str) -> MetadataBlock {
    match find_metadata_block(source) {
        BlockLookup::Found(block) => block,
        other => panic!("expected a header block, got {:?}", other),
    }
}

#[test]
fn test_complete_header_has_no_errors() {
    let block = header("/* ==UserStyle==\n@name Demo\n@namespace ns\n@version 1.0.0\n==/UserStyle== */");
    let report = read_header(&block);
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.fields.name, "Demo");
    assert_eq!(report.fields.namespace, "ns");
    assert_eq!(report.fields.version, "1.0.0");
}

#[test]
fn test_each_missing_field_is_one_error() {
    let block = header("/* ==UserStyle==\n@name Demo\n@version 1.0.0\n==/UserStyle== */");
    let report = read_header(&block);
    assert_eq!(report.errors, vec!["Missing required field @namespace".to_string()]);

    let block = header("/* ==UserStyle==\n@description nothing useful\n==/UserStyle== */");
    let report = read_header(&block);
    assert_eq!(report.errors.len(), 3);
    assert!(report.errors[0].contains("@name"));
    assert!(report.errors[1].contains("@namespace"));
    assert!(report.errors[2].contains("@version"));
}

#[test]
fn test_empty_value_counts_as_missing() {
    let block = header("/* ==UserStyle==\n@name\n@namespace ns\n@version 1\n==/UserStyle== */");
    let report = read_header(&block);
    assert_eq!(report.errors, vec!["Missing required field @name".to_string()]);
}

#[test]
fn test_duplicate_directive_reports_line() {
    let block = header(
        "/* ==UserStyle==\n@name Demo\n@namespace ns\n@version 1.0.0\n@name Other\n==/UserStyle== */",
    );
    let report = read_header(&block);
    assert_eq!(report.errors, vec!["Duplicate @name directive on line 5".to_string()]);
    // the first value wins
    assert_eq!(report.fields.name, "Demo");
}

#[test]
fn test_variable_directives_may_repeat() {
    let block = header(
        "/* ==UserStyle==\n@name Demo\n@namespace ns\n@version 1\n@var color a \"A\" red\n@var color b \"B\" blue\n==/UserStyle== */",
    );
    let report = read_header(&block);
    assert!(report.errors.is_empty());
    assert_eq!(report.directives_named("var").count(), 2);
}

#[test]
fn test_malformed_url_field_warns() {
    let block = header(
        "/* ==UserStyle==\n@name Demo\n@namespace ns\n@version 1\n@homepageURL not a url\n@supportURL https://example.com/issues\n==/UserStyle== */",
    );
    let report = read_header(&block);
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("@homepageURL"));
    assert_eq!(report.fields.support_url, "https://example.com/issues");
}

#[test]
fn test_odd_version_warns() {
    let block = header("/* ==UserStyle==\n@name Demo\n@namespace ns\n@version first draft\n==/UserStyle== */");
    let report = read_header(&block);
    assert!(report.errors.is_empty());
    assert!(report.warnings.iter().any(|w| w.contains("@version")));
}

#[test]
fn test_preprocessor_field_recorded() {
    let block = header("/* ==UserStyle==\n@name A\n@namespace b\n@version 1\n@preprocessor stylus\n==/UserStyle== */");
    let report = read_header(&block);
    assert_eq!(report.fields.preprocessor.as_deref(), Some("stylus"));
}

#[test]
fn test_fallback_header_fields() {
    let block = header("/**\n * @name Demo\n * @namespace ns\n * @version 2.1\n */\nbody{}");
    let report = read_header(&block);
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.fields.version, "2.1");
}
