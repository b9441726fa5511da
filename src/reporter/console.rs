use crate::engine::{AnalysisReport, FileReport};
use crate::rules::Finding;
use colored::Colorize;

pub fn report(reports: &[FileReport]) {
    if reports.is_empty() {
        println!("{}", "No Python files found.".yellow());
        return;
    }

    for file in reports {
        print_file(file);
    }

    let (findings, failures) = count_findings(reports);
    if findings == 0 && failures == 0 {
        println!("{}", "No performance issues found.".green());
        return;
    }

    print!("Found ");
    print!("{}", format!("{} finding(s)", findings).yellow());
    if failures > 0 {
        print!(
            ", {}",
            format!("{} file(s) that failed to parse", failures).red()
        );
    }
    println!(" in {} file(s)", reports.len());
}

fn print_file(file: &FileReport) {
    println!("{}", file.path.display().to_string().bold());

    match &file.report {
        AnalysisReport::Failed(err) => {
            println!("  {}{} {}", "error".red().bold(), ":".bold(), err);
        }
        AnalysisReport::Analyzed(analysis) => {
            println!("  {} {}", "time: ".cyan(), analysis.time.summary);
            println!("  {} {}", "space:".cyan(), analysis.space.summary);
            for finding in &analysis.findings {
                print_finding(finding);
            }
        }
    }

    println!();
}

fn print_finding(f: &Finding) {
    let subject = f
        .subject
        .as_deref()
        .map(|s| format!(" `{}`", s))
        .unwrap_or_default();

    println!(
        "  {}{} {}{} {}",
        "warning".yellow().bold(),
        ":".bold(),
        f.kind,
        subject,
        format!("(line {})", f.line).dimmed(),
    );
    println!("    {} {}", "help:".cyan(), f.suggestion);
}

/// Format a finding as plain text (no colors) for testing.
#[cfg(test)]
fn format_finding_plain(f: &Finding) -> String {
    let subject = f
        .subject
        .as_deref()
        .map(|s| format!(" `{}`", s))
        .unwrap_or_default();
    format!(
        "warning: {}{} (line {})\n  help: {}\n",
        f.kind, subject, f.line, f.suggestion
    )
}

/// Count findings across all files, and files that failed to parse.
pub fn count_findings(reports: &[FileReport]) -> (usize, usize) {
    let findings = reports.iter().map(|r| r.report.findings().len()).sum();
    let failures = reports.iter().filter(|r| !r.report.is_ok()).count();
    (findings, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::rules::DetectionKind;
    use std::path::PathBuf;

    fn file_report(name: &str, source: &str) -> FileReport {
        FileReport {
            path: PathBuf::from(name),
            report: Engine::new().analyze_source(source),
        }
    }

    #[test]
    fn test_count_findings() {
        let reports = vec![
            file_report("a.py", "for x in xs:\n    s += x\n    out.append(x)\n"),
            file_report("b.py", "def (:\n"),
            file_report("c.py", "print(1)\n"),
        ];
        assert_eq!(count_findings(&reports), (2, 1));
    }

    #[test]
    fn test_count_empty() {
        assert_eq!(count_findings(&[]), (0, 0));
    }

    #[test]
    fn test_format_finding_with_subject() {
        let finding = Finding::new(DetectionKind::MembershipTestOnSequence, 4, Some("seen".into()));
        let result = format_finding_plain(&finding);
        assert!(result.contains("warning: membership_test `seen` (line 4)"));
        assert!(result.contains("help: Convert list to set"));
    }

    #[test]
    fn test_format_finding_without_subject() {
        let finding = Finding::new(DetectionKind::SortInsideLoop, 9, None);
        let result = format_finding_plain(&finding);
        assert!(result.starts_with("warning: sort_in_loop (line 9)"));
    }
}
