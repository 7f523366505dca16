//! Preprocessor Dialect Detection
//!
//! Classifies a style as plain CSS, Less, Stylus or userstyles.org syntax,
//! and defines the injected seams used to hand Less/Stylus off to a real
//! compiler. No preprocessor runs inside this crate.

pub mod capabilities;
pub mod detector;

pub use capabilities::{
    ExecutionCapabilities, NoCapabilities, PreprocessorEngine, StaticCapabilities,
};
pub use detector::{DialectScores, classify, detect_dialect, dialect_from_name, score_markers};
