//! UserCSS Format Constants
//!
//! Marker strings, directive names and limits used across the parser.
//! Centralizing them keeps the sub-grammars in agreement.

// Header block markers
/// Start marker of the canonical metadata block
pub const HEADER_START: &str = "==UserStyle==";
/// End marker of the canonical metadata block
pub const HEADER_END: &str = "==/UserStyle==";
/// Opening of a CSS block comment
pub const COMMENT_OPEN: &str = "/*";
/// Closing of a CSS block comment
pub const COMMENT_CLOSE: &str = "*/";

// Directives
pub const DIRECTIVE_NAME: &str = "name";
pub const DIRECTIVE_NAMESPACE: &str = "namespace";
pub const DIRECTIVE_VERSION: &str = "version";
pub const DIRECTIVE_DESCRIPTION: &str = "description";
pub const DIRECTIVE_AUTHOR: &str = "author";
pub const DIRECTIVE_LICENSE: &str = "license";
pub const DIRECTIVE_HOMEPAGE_URL: &str = "homepageURL";
pub const DIRECTIVE_SUPPORT_URL: &str = "supportURL";
pub const DIRECTIVE_UPDATE_URL: &str = "updateURL";
pub const DIRECTIVE_PREPROCESSOR: &str = "preprocessor";
pub const DIRECTIVE_VAR: &str = "var";
pub const DIRECTIVE_ADVANCED: &str = "advanced";
pub const DIRECTIVE_DOMAIN: &str = "domain";
pub const DIRECTIVE_MATCH: &str = "match";
pub const DIRECTIVE_EXCLUDE_MATCH: &str = "exclude-match";
/// The one directive recognized without an `@` prefix
pub const LEGACY_DOCUMENT_DIRECTIVE: &str = "-moz-document";

/// Header fields that must be present and non-empty
pub const REQUIRED_DIRECTIVES: [&str; 3] = [DIRECTIVE_NAME, DIRECTIVE_NAMESPACE, DIRECTIVE_VERSION];
/// Directives allowed to appear more than once
pub const REPEATABLE_DIRECTIVES: [&str; 2] = [DIRECTIVE_VAR, DIRECTIVE_ADVANCED];
/// Directives whose value must be an absolute URL
pub const URL_DIRECTIVES: [&str; 3] = [
    DIRECTIVE_HOMEPAGE_URL,
    DIRECTIVE_SUPPORT_URL,
    DIRECTIVE_UPDATE_URL,
];

// Variable grammar
/// Marks the default entry of an option list or option block
pub const DEFAULT_OPTION_MARKER: char = '*';
/// Opens a heredoc carrying an option's CSS (`<<<EOT ... EOT;`)
pub const HEREDOC_OPEN: &str = "<<<";
/// Custom property prefix
pub const CUSTOM_PROPERTY_PREFIX: &str = "--";

// Resolver
/// Opening of a `/*[[name|type|default]]*/` placeholder
pub const PLACEHOLDER_OPEN: &str = "/*[[";
/// Closing of a placeholder
pub const PLACEHOLDER_CLOSE: &str = "]]*/";
/// Separator between placeholder fields
pub const PLACEHOLDER_FIELD_SEPARATOR: char = '|';
/// How deep option snippets may reference other variables
pub const MAX_SNIPPET_DEPTH: usize = 8;
/// Default number of placeholders resolved between cooperative yields
pub const DEFAULT_RESOLVE_BATCH_SIZE: usize = 64;

// Domain rules
/// Stand-in for `*` when turning a match pattern into a parseable URL
pub const WILDCARD_HOST_PLACEHOLDER: &str = "wildcard";
/// Prefix that negates a `@domain` or `@match` entry
pub const EXCLUDE_PREFIX: char = '!';
