use crate::engine::FileReport;
use anyhow::Result;

pub fn report(reports: &[FileReport]) -> Result<()> {
    println!("{}", format(reports)?);
    Ok(())
}

/// Format file reports as a JSON array without printing.
pub fn format(reports: &[FileReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use std::path::PathBuf;

    #[test]
    fn test_format_empty_reports() {
        assert_eq!(format(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_format_analyzed_report() {
        let reports = vec![FileReport {
            path: PathBuf::from("app.py"),
            report: Engine::new().analyze_source("for i in range(len(arr)):\n    pass\n"),
        }];
        let parsed: serde_json::Value = serde_json::from_str(&format(&reports).unwrap()).unwrap();
        let file = &parsed[0];

        assert_eq!(file["path"], "app.py");
        assert_eq!(file["ok"], true);
        assert_eq!(file["timeEstimate"], "Heuristic: O(n) (one loop).");
        assert_eq!(file["timeDetails"]["maxLoopNesting"], 1);
        assert_eq!(file["detections"][0]["type"], "range_len");
        assert_eq!(file["detections"][0]["sequence"], "arr");
        assert!(file.get("parseError").is_none());
    }

    #[test]
    fn test_format_failed_report() {
        let reports = vec![FileReport {
            path: PathBuf::from("broken.py"),
            report: Engine::new().analyze_source("while True print(1)\n"),
        }];
        let parsed: serde_json::Value = serde_json::from_str(&format(&reports).unwrap()).unwrap();
        let file = &parsed[0];

        assert_eq!(file["path"], "broken.py");
        assert_eq!(file["ok"], false);
        assert!(file["parseError"].is_string());
        assert!(file.get("detections").is_none());
        assert!(file.get("timeEstimate").is_none());
    }
}
