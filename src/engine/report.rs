use crate::complexity::{SpaceEstimate, TimeEstimate};
use crate::engine::parser::ParseError;
use crate::rules::Finding;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::PathBuf;

/// Estimates and findings for a source text that parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub time: TimeEstimate,
    pub space: SpaceEstimate,
    /// Detector order first, then document order within each detector.
    pub findings: Vec<Finding>,
}

/// Result of analysing one source text.
///
/// A parse failure carries nothing but the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisReport {
    Failed(ParseError),
    Analyzed(Analysis),
}

impl AnalysisReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, AnalysisReport::Analyzed(_))
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            AnalysisReport::Failed(err) => Some(err),
            AnalysisReport::Analyzed(_) => None,
        }
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            AnalysisReport::Failed(_) => None,
            AnalysisReport::Analyzed(analysis) => Some(analysis),
        }
    }

    /// Findings, empty for a parse failure.
    pub fn findings(&self) -> &[Finding] {
        match self {
            AnalysisReport::Failed(_) => &[],
            AnalysisReport::Analyzed(analysis) => &analysis.findings,
        }
    }
}

impl Serialize for AnalysisReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            AnalysisReport::Failed(err) => {
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("parseError", &err.to_string())?;
            }
            AnalysisReport::Analyzed(analysis) => {
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("timeEstimate", &analysis.time.summary)?;
                map.serialize_entry("timeDetails", &analysis.time.details)?;
                map.serialize_entry("spaceEstimate", &analysis.space.summary)?;
                map.serialize_entry("spaceDetails", &analysis.space.details)?;
                map.serialize_entry("detections", &analysis.findings)?;
            }
        }
        map.end()
    }
}

/// Report for one file on disk.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub report: AnalysisReport,
}
