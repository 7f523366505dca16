//! Preprocessor dialect detection
//!
//! An explicit `@preprocessor` directive always wins. Otherwise each dialect
//! collects points for the markers present in the source and a fixed
//! tie-break order picks the winner.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::metadata::{BlockLookup, find_metadata_block};
use crate::model::{DetectionSource, Dialect, PreprocessorDetection};

static PREPROCESSOR_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t*]*@preprocessor[ \t]+([A-Za-z0-9_-]+)")
        .expect("preprocessor directive regex")
});
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("block comment regex"));

/// A weighted marker
struct Marker {
    pattern: Lazy<Regex>,
    weight: u32,
}

macro_rules! marker {
    ($re:expr, $weight:expr) => {
        Marker {
            pattern: Lazy::new(|| Regex::new($re).expect("marker regex")),
            weight: $weight,
        }
    };
}

/// userstyles.org markers, scored on the raw text (they live in comments and the header)
static USO_MARKERS: [Marker; 4] = [
    marker!(r"/\*\[\[[^\]]+\]\]\*/", 2),
    marker!(r"<<<[A-Za-z_]\w*", 2),
    marker!(r"(?m)^[ \t*]*@advanced\b", 2),
    marker!(r"(?m)^[ \t*]*@(?:advanced|var)[ \t]+dropdown\b", 1),
];

/// Less markers, scored on the body without comments
static LESS_MARKERS: [Marker; 5] = [
    marker!(r"@import\s*\((?:reference|inline|less|css|once|multiple|optional)", 1),
    marker!(r":extend\(", 1),
    marker!(r"\.[A-Za-z_][\w-]*\s*\([^)]*\)\s*\{", 1),
    marker!(r"\.[A-Za-z_][\w-]*\s*\([^)]*\)\s*;", 1),
    marker!(r"\bwhen\s*\(", 1),
];

/// Stylus markers, scored on the body without block comments
static STYLUS_MARKERS: [Marker; 5] = [
    marker!(r"(?m)^[ \t]*&|&[ \t]*[:.\[#>+~]", 1),
    marker!(r"(?m)^[ \t]*//", 1),
    marker!(r"->|=>", 1),
    marker!(r"\$[A-Za-z_][\w-]*\.[A-Za-z_]", 1),
    marker!(r"(?m)^[ \t]*(?:if|unless|else)\b", 1),
];

const USO_STRONG_SCORE: u32 = 3;
const USO_NORMALIZER: f64 = 6.0;
const USO_CAP: f64 = 0.9;
const LESS_STYLUS_NORMALIZER: f64 = 4.0;
const LESS_STYLUS_CAP: f64 = 0.8;
const UNRECOGNIZED_OVERRIDE_CONFIDENCE: f64 = 0.5;

/// Per-dialect heuristic points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialectScores {
    pub uso: u32,
    pub less: u32,
    pub stylus: u32,
}

/// Map a `@preprocessor` value to a dialect
pub fn dialect_from_name(name: &str) -> Option<Dialect> {
    match name.trim().to_ascii_lowercase().as_str() {
        "less" => Some(Dialect::Less),
        "stylus" => Some(Dialect::Stylus),
        "uso" => Some(Dialect::Uso),
        "default" | "none" | "css" => Some(Dialect::None),
        _ => None,
    }
}

/// Classify raw UserStyle source
pub fn detect_dialect(source: &str) -> PreprocessorDetection {
    if let Some(captures) = PREPROCESSOR_DIRECTIVE.captures(source) {
        let name = &captures[1];
        return match dialect_from_name(name) {
            Some(dialect) => PreprocessorDetection {
                dialect,
                source: DetectionSource::Metadata,
                confidence: 1.0,
            },
            None => PreprocessorDetection {
                dialect: Dialect::None,
                source: DetectionSource::Metadata,
                confidence: UNRECOGNIZED_OVERRIDE_CONFIDENCE,
            },
        };
    }

    classify(score_markers(source))
}

/// Accumulate marker points for each dialect
pub fn score_markers(source: &str) -> DialectScores {
    let body = body_without_header(source);
    let body = BLOCK_COMMENT.replace_all(&body, "");

    DialectScores {
        uso: score(&USO_MARKERS, source),
        less: score(&LESS_MARKERS, &body),
        stylus: score(&STYLUS_MARKERS, &body),
    }
}

fn score(markers: &[Marker], text: &str) -> u32 {
    markers
        .iter()
        .filter(|marker| marker.pattern.is_match(text))
        .map(|marker| marker.weight)
        .sum()
}

fn body_without_header(source: &str) -> String {
    match find_metadata_block(source) {
        BlockLookup::Found(block) => block.css_body(source),
        BlockLookup::Rejected(_) | BlockLookup::Missing => source.to_string(),
    }
}

/// Apply the tie-break order to heuristic scores
pub fn classify(scores: DialectScores) -> PreprocessorDetection {
    let DialectScores { uso, less, stylus } = scores;
    let others = less.max(stylus);

    let (dialect, confidence) = if uso >= USO_STRONG_SCORE && uso >= others {
        (Dialect::Uso, confidence(uso, USO_NORMALIZER, USO_CAP))
    } else if uso > 0 && uso >= others {
        // USO markers almost never show up by accident, so any signal dominates
        (Dialect::Uso, confidence(uso, USO_NORMALIZER, USO_CAP))
    } else if less >= 1 && less + 1 >= stylus {
        (Dialect::Less, confidence(less, LESS_STYLUS_NORMALIZER, LESS_STYLUS_CAP))
    } else if stylus > less && stylus > 0 {
        (Dialect::Stylus, confidence(stylus, LESS_STYLUS_NORMALIZER, LESS_STYLUS_CAP))
    } else {
        (Dialect::None, 0.0)
    };

    PreprocessorDetection {
        dialect,
        source: DetectionSource::Heuristic,
        confidence,
    }
}

fn confidence(score: u32, normalizer: f64, cap: f64) -> f64 {
    (f64::from(score) / normalizer).min(cap)
}
