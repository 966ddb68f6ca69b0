use focstest::backend::{Backend, Transcript};
use focstest::compare::Strategy;
use focstest::engine::{run_case, run_suites, session_directives};
use focstest::error::RunError;
use focstest::report::render_human;
use focstest::types::*;

const BANNER: &str = "        OCaml version 4.14.1";

/// Assembles the stdout of one toplevel session: the startup banner, then
/// one prompt-introduced segment per directive. The final entry stands for
/// the leftover after the quit directive.
fn ocaml_stdout(outputs: &[&str]) -> String {
    let mut s = String::from(BANNER);
    for out in outputs {
        s.push_str("\n# ");
        s.push_str(out);
    }
    s
}

struct MockBackend;

impl Backend for MockBackend {
    fn run_session(&self, directives: &[String]) -> Result<Transcript, RunError> {
        assert_eq!(directives.last().map(String::as_str), Some("#quit;;"));
        assert_eq!(directives[0], "#use \"homework1.ml\";;");
        let cmd = directives[directives.len() - 2].as_str();
        let stdout = match cmd {
            "1;;" => ocaml_stdout(&["", "- : int = 1", ""]),
            "wrapped;;" => ocaml_stdout(&["", "- : int list =\n[1;\n 2; 3]", ""]),
            "2 + 2;;" => ocaml_stdout(&["", "- : int = 5", ""]),
            "stub ();;" => ocaml_stdout(&["", "Exception: Failure \"Not implemented\".", ""]),
            "also stub;;" => ocaml_stdout(&["", "- : int = 0", ""]),
            "1;" => ocaml_stdout(&[
                "",
                "Characters 0-2:\nError: This expression has type int\nIt has no method quit",
                "",
            ]),
            "boom;;" => ocaml_stdout(&["", "Error: Unbound value boom", ""]),
            "garbled;;" => String::from("no prompts in here at all"),
            "slow;;" => {
                return Err(RunError::Timeout {
                    limit: std::time::Duration::from_secs(5),
                })
            }
            other => panic!("mock has no transcript for {other:?}"),
        };
        Ok(Transcript {
            stdout,
            stderr: String::new(),
        })
    }

    fn validate(&self) -> Result<(), RunError> {
        Ok(())
    }
}

fn preload() -> Vec<String> {
    vec!["homework1.ml".to_string()]
}

fn case(cmd: &str, expected: &str) -> TestCase {
    TestCase {
        cmd: cmd.to_string(),
        expected: expected.to_string(),
    }
}

fn suite(index: usize, cases: Vec<TestCase>) -> TestSuite {
    TestSuite { index, cases }
}

#[test]
fn directive_batch_wraps_command_with_preloads_and_quit() {
    let directives = session_directives("1;;", &preload());
    assert_eq!(
        directives,
        vec!["#use \"homework1.ml\";;", "1;;", "#quit;;"]
    );
}

#[test]
fn exact_output_passes() {
    let (actual, cmp) = run_case(&MockBackend, &case("1;;", "- : int = 1"), &preload()).unwrap();
    assert_eq!(actual, "- : int = 1");
    assert!(cmp.matched);
    assert_eq!(cmp.strategy, Strategy::Exact);
}

#[test]
fn line_wrapped_output_passes_via_whitespace_normalization() {
    let expected = "- : int list =\n[1; 2; 3]";
    let (_, cmp) = run_case(&MockBackend, &case("wrapped;;", expected), &preload()).unwrap();
    assert!(cmp.matched);
    assert_eq!(cmp.strategy, Strategy::WhitespaceNormalized);
}

#[test]
fn wrong_output_fails_after_all_strategies() {
    let (actual, cmp) = run_case(&MockBackend, &case("2 + 2;;", "- : int = 4"), &preload()).unwrap();
    assert_eq!(actual, "- : int = 5");
    assert!(!cmp.matched);
    assert_eq!(cmp.strategy, Strategy::WhitespaceNormalized);
}

#[test]
fn unimplemented_stub_skips_rest_of_suite_but_not_the_run() {
    let suites = vec![
        suite(
            1,
            vec![
                case("1;;", "- : int = 1"),
                case("stub ();;", "- : int = 3"),
                case("also stub;;", "- : int = 0"),
            ],
        ),
        suite(2, vec![case("1;;", "- : int = 1")]),
    ];
    let summary = run_suites(&MockBackend, &suites, &preload()).unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.skipped, 2);
    assert!(matches!(
        summary.cases[1].status,
        CaseStatus::SkippedUnimplemented { cascaded: false }
    ));
    // The later case in suite 1 never ran, even though it would pass.
    assert!(matches!(
        summary.cases[2].status,
        CaseStatus::SkippedUnimplemented { cascaded: true }
    ));
    // Suite 2 still ran.
    assert_eq!(summary.cases[3].suite, 2);
    assert!(summary.cases[3].passed());
}

#[test]
fn incomplete_expression_skips_only_that_case() {
    let suites = vec![suite(
        1,
        vec![case("1;", "- : int = 1"), case("1;;", "- : int = 1")],
    )];
    let summary = run_suites(&MockBackend, &suites, &preload()).unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.passed, 1);
    assert!(matches!(
        summary.cases[0].status,
        CaseStatus::SkippedUnparsable { .. }
    ));
}

#[test]
fn unsplittable_transcript_skips_only_that_case() {
    let suites = vec![suite(
        1,
        vec![case("garbled;;", "anything"), case("1;;", "- : int = 1")],
    )];
    let summary = run_suites(&MockBackend, &suites, &preload()).unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.passed, 1);
}

#[test]
fn interpreter_error_aborts_the_whole_run() {
    let suites = vec![
        suite(1, vec![case("boom;;", "- : int = 1")]),
        suite(2, vec![case("1;;", "- : int = 1")]),
    ];
    let err = run_suites(&MockBackend, &suites, &preload()).unwrap_err();
    match &err {
        RunError::Fault { diagnostic } => assert_eq!(diagnostic, "Error: Unbound value boom"),
        other => panic!("expected fault, got {other:?}"),
    }
    assert!(err.is_fatal());
}

#[test]
fn timeout_aborts_the_whole_run() {
    let suites = vec![
        suite(1, vec![case("slow;;", "- : int = 1")]),
        suite(2, vec![case("1;;", "- : int = 1")]),
    ];
    let err = run_suites(&MockBackend, &suites, &preload()).unwrap_err();
    assert!(matches!(err, RunError::Timeout { .. }));
    assert!(err.is_fatal());
}

#[test]
fn report_names_failures_and_totals() {
    let suites = vec![suite(
        1,
        vec![case("1;;", "- : int = 1"), case("2 + 2;;", "- : int = 4")],
    )];
    let summary = run_suites(&MockBackend, &suites, &preload()).unwrap();
    let text = render_human(&summary, false);
    assert!(text.contains("Failed test 2 of 2 in suite 1"));
    assert!(text.contains("1 of 2 tests failed"));
    assert!(text.contains("0 tests skipped"));
    // Passes are only listed in verbose mode.
    assert!(!text.contains("Passed test 1"));
    let verbose = render_human(&summary, true);
    assert!(verbose.contains("Passed test 1 of 2 in suite 1"));
}

#[test]
fn suite_filters_select_before_iteration() {
    let suites = vec![
        suite(1, vec![case("1;;", "- : int = 1")]),
        suite(2, vec![case("1;;", "- : int = 1"), case("1;;", "- : int = 1")]),
        suite(3, vec![case("1;;", "- : int = 1")]),
    ];
    let (kept, skipped) = SuiteFilter::Only([2].into()).apply(suites.clone());
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].index, 2);
    assert_eq!(skipped, 2);

    let (kept, skipped) = SuiteFilter::Except([2].into()).apply(suites.clone());
    assert_eq!(
        kept.iter().map(|s| s.index).collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_eq!(skipped, 2);

    let (kept, skipped) = SuiteFilter::All.apply(suites);
    assert_eq!(kept.len(), 3);
    assert_eq!(skipped, 0);
}
