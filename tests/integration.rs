//! Integration tests for py-perf
//!
//! Tests the public library API.

use pretty_assertions::assert_eq;
use py_perf::{analyze, refactor, DetectionKind, Engine, Error};
use std::path::Path;

const CANONICAL: &str = "\
result = []
for x in items:
    result.append(f(x))
s = ''
for x in words:
    s += x
for i in range(len(arr)):
    print(arr[i])
";

fn subjects(source: &str, kind: DetectionKind) -> Vec<String> {
    analyze(source)
        .findings()
        .iter()
        .filter(|f| f.kind == kind)
        .map(|f| f.subject.clone().unwrap_or_default())
        .collect()
}

/// `depth` lexically nested loops and nothing else.
fn nested_loops(depth: usize) -> String {
    let mut source = String::new();
    for level in 0..depth {
        source.push_str(&"    ".repeat(level));
        source.push_str(&format!("for x{level} in data:\n"));
    }
    source.push_str(&"    ".repeat(depth));
    source.push_str("pass\n");
    source
}

#[test]
fn test_canonical_example_findings() {
    assert_eq!(subjects(CANONICAL, DetectionKind::ListAppendInLoop), vec!["result"]);
    assert_eq!(subjects(CANONICAL, DetectionKind::StringConcatInLoop), vec!["s"]);
    assert_eq!(subjects(CANONICAL, DetectionKind::RangeLenIteration), vec!["arr"]);

    let report = analyze(CANONICAL);
    let analysis = report.analysis().expect("canonical example parses");
    assert_eq!(
        analysis.space.details.list_appends,
        vec![(3, "result".to_string())]
    );
    assert_eq!(analysis.time.details.max_loop_nesting, 1);
    assert_eq!(analysis.findings.len(), 3);
}

#[test]
fn test_parse_failure_is_isolated() {
    let report = analyze("def broken(:\n    pass\n");
    assert!(!report.is_ok());
    assert!(!report.parse_error().unwrap().to_string().is_empty());
    assert!(report.findings().is_empty());

    let json = serde_json::to_value(&report).unwrap();
    let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["ok", "parseError"]);

    assert!(matches!(refactor("def broken(:\n"), Err(Error::Parse(_))));
}

#[test]
fn test_bad_indentation_is_a_parse_failure() {
    let sources = [
        "result = []\nfor x in items:\nresult.append(x)\n",
        "result = []\n  for x in items:\n    result.append(x)\n",
        "result = []\nfor x in items:\n    log(x)\n        result.append(x)\n",
        "def f():\n    a = 1\n  b = 2\n",
    ];
    for source in sources {
        let report = analyze(source);
        assert!(!report.is_ok(), "accepted {source:?}");
        assert!(matches!(refactor(source), Err(Error::Parse(_))), "{source:?}");
    }
}

#[test]
fn test_refactor_leaves_walrus_and_yield() {
    let sources = [
        "result = []\nfor x in items:\n    result.append(y := f(x))\n",
        "result = []\nfor x in (ys := load()):\n    result.append(x)\n",
        "result = []\nfor x in items:\n    result.append((yield x))\n",
    ];
    for source in sources {
        assert_eq!(refactor(source).unwrap(), source);
    }
}

#[test]
fn test_deep_nesting_fails_cleanly() {
    let source = format!("x = {}1{}\n", "(".repeat(1000), ")".repeat(1000));
    let report = analyze(&source);
    let message = report.parse_error().unwrap().to_string();
    assert!(message.contains("too many nested parentheses"), "{message}");
    assert!(matches!(refactor(&source), Err(Error::Parse(_))));
}

#[test]
fn test_loop_nesting_summary() {
    for depth in 0..5 {
        let report = analyze(&nested_loops(depth));
        let time = &report.analysis().unwrap().time;
        assert_eq!(time.details.max_loop_nesting, depth);
        match depth {
            0 => assert!(time.summary.contains("O(n) or O(1)")),
            1 => assert!(time.summary.contains("O(n)")),
            k => assert!(time.summary.contains(&format!("O(n^{k})")), "{}", time.summary),
        }
    }
}

#[test]
fn test_sort_calls_reported_with_lines() {
    let source = "ordered = sorted(xs)\nys.sort()\n";
    let report = analyze(source);
    let analysis = report.analysis().unwrap();

    let sorts: Vec<_> = analysis
        .findings
        .iter()
        .filter(|f| f.kind == DetectionKind::SortInsideLoop)
        .map(|f| f.line)
        .collect();
    assert_eq!(sorts, vec![1, 2]);
    assert!(analysis.time.summary.contains("[1, 2]"), "{}", analysis.time.summary);
}

#[test]
fn test_refactor_canonical_idiom() {
    let source = "result = []\nfor x in items:\n    result.append(f(x))\n";
    let output = refactor(source).unwrap();
    assert_eq!(output, "result = [f(x) for x in items]\n");
    assert!(analyze(&output).is_ok());
}

#[test]
fn test_refactor_leaves_nested_idiom() {
    let source = "\
def build(items):
    result = []
    for x in items:
        result.append(f(x))
    return result

if items:
    result = []
    for x in items:
        result.append(x)
";
    assert_eq!(refactor(source).unwrap(), source);
}

#[test]
fn test_refactor_idempotent() {
    let once = refactor(CANONICAL).unwrap();
    assert!(once.starts_with("result = [f(x) for x in items]\n"));
    assert_eq!(refactor(&once).unwrap(), once);
}

#[test]
fn test_analyze_fixture_directory() {
    let reports = Engine::new()
        .analyze_path(Path::new("tests/fixtures"))
        .expect("fixture directory exists");
    assert_eq!(reports.len(), 1);

    let report = &reports[0].report;
    assert!(report.is_ok());
    let kinds: Vec<_> = report.findings().iter().map(|f| f.kind).collect();
    for kind in [
        DetectionKind::StringConcatInLoop,
        DetectionKind::ListAppendInLoop,
        DetectionKind::RangeLenIteration,
        DetectionKind::MembershipTestOnSequence,
        DetectionKind::SortInsideLoop,
    ] {
        assert!(kinds.contains(&kind), "missing {kind} in {kinds:?}");
    }
    assert_eq!(report.analysis().unwrap().time.details.max_loop_nesting, 2);
}

#[test]
fn test_refactor_fixture_only_top_level() {
    let source = std::fs::read_to_string("tests/fixtures/bad_code.py").unwrap();
    let output = refactor(&source).unwrap();

    assert!(output.contains("result = [x * 2 for x in items]\n"));
    // Inside a function: untouched.
    assert!(output.contains("            out.append((a, b))\n"));
    // Loop body has more than one statement: untouched.
    assert!(output.contains("    seen.append(x)\n"));
    assert!(analyze(&output).is_ok());
}
