//! py-perf: heuristic performance analysis for Python source
//!
//! Parses Python text into a structural tree, flags common slow idioms,
//! gives rough time and space classifications, and rewrites the simplest
//! "build a list with append" loops into list comprehensions.

pub mod ast;
pub mod complexity;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod fix;
pub mod format;
pub mod reporter;
pub mod rules;

pub use config::Config;
pub use engine::{AnalysisContext, AnalysisReport, Engine, FileReport};
pub use error::{Error, Result};
pub use fix::{refactor, refactor_with};
pub use format::{CommandFormatter, SourceFormatter};
pub use rules::{DetectionKind, Finding, Rule};

/// Analyze one source text with every detector.
///
/// Invalid Python yields [`AnalysisReport::Failed`], never an error.
///
/// ```
/// let report = py_perf::analyze("for w in words:\n    s += w\n");
/// assert_eq!(report.findings().len(), 1);
/// ```
pub fn analyze(source: &str) -> AnalysisReport {
    Engine::new().analyze_source(source)
}
