//! Analysis engine - parses source, runs every detector and both estimators.

mod context;
mod file_analyzer;
pub mod parser;
mod report;

pub use context::AnalysisContext;
pub use file_analyzer::read_source;
pub use report::{Analysis, AnalysisReport, FileReport};

use crate::complexity;
use crate::discovery::discover_python_files;
use crate::error::{Error, Result};
use crate::rules::{registry, Finding, Rule};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

pub struct Engine {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            rules: registry::all_rules(),
        }
    }

    /// Analyze one source text.
    ///
    /// Never fails: invalid Python becomes [`AnalysisReport::Failed`].
    pub fn analyze_source(&self, source: &str) -> AnalysisReport {
        let module = match parser::parse_module(source) {
            Ok(module) => module,
            Err(err) => {
                debug!(error = %err, "source did not parse");
                return AnalysisReport::Failed(err);
            }
        };

        let ctx = AnalysisContext::new(&module);
        let findings: Vec<Finding> = self
            .rules
            .iter()
            .flat_map(|rule| {
                let found = rule.check(&ctx);
                debug!(rule = rule.id(), count = found.len(), "rule finished");
                found
            })
            .collect();

        let time = complexity::estimate_time(&module, &findings);
        let space = complexity::estimate_space(&module, &findings);
        debug!(
            max_loop_nesting = time.details.max_loop_nesting,
            list_comprehensions = space.details.list_comprehensions,
            findings = findings.len(),
            "analysis complete"
        );

        AnalysisReport::Analyzed(Analysis {
            time,
            space,
            findings,
        })
    }

    /// Analyze a file, or every Python file below a directory.
    ///
    /// Files that cannot be read are skipped with a warning; reports come
    /// back in path order.
    pub fn analyze_path(&self, path: &Path) -> Result<Vec<FileReport>> {
        if !path.exists() {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "path does not exist"),
            ));
        }

        let files = if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            discover_python_files(path)
        };
        debug!(count = files.len(), root = %path.display(), "discovered files");

        let reports = files
            .par_iter()
            .filter_map(|file| match read_source(file) {
                Ok(source) => Some(FileReport {
                    path: file.clone(),
                    report: self.analyze_source(&source),
                }),
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "failed to read file");
                    None
                }
            })
            .collect();

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_findings_follow_detector_order() {
        let source = "xs.sort()\nif a in b:\n    s += a\n";
        let report = Engine::new().analyze_source(source);
        let kinds: Vec<_> = report.findings().iter().map(|f| f.kind.as_str()).collect();
        assert_eq!(
            kinds,
            vec!["string_concat_in_loop", "membership_test", "sort_in_loop"]
        );
    }

    #[test]
    fn test_invalid_source_fails_without_findings() {
        let report = Engine::new().analyze_source("for x in:\n");
        assert!(!report.is_ok());
        assert!(report.parse_error().is_some());
        assert!(report.analysis().is_none());
    }

    #[test]
    fn test_analyze_path_skips_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let hidden = temp_dir.path().join(".cache");
        std::fs::create_dir(&hidden).unwrap();
        std::fs::write(hidden.join("gen.py"), "s += x\n").unwrap();
        std::fs::write(temp_dir.path().join("main.py"), "print(1)\n").unwrap();

        let reports = Engine::new().analyze_path(temp_dir.path()).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].path.ends_with("main.py"));
    }

    #[test]
    fn test_analyze_path_nonexistent() {
        let result = Engine::new().analyze_path(Path::new("/nonexistent/project"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_analyze_path_keeps_parse_failures_per_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bad.py"), "def (:\n").unwrap();
        std::fs::write(temp_dir.path().join("good.py"), "x = [1]\n").unwrap();

        let reports = Engine::new().analyze_path(temp_dir.path()).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].report.is_ok());
        assert!(reports[1].report.is_ok());
    }
}
