use tracing::{debug, warn};

use crate::backend::Backend;
use crate::compare::{compare, Comparison};
use crate::error::RunError;
use crate::transcript::{classify, split_segments, Classification};
use crate::types::{CaseResult, CaseStatus, Summary, TestCase, TestSuite};

/// Builds the directive batch for one test case: preload directives, the
/// command itself, and the terminating quit directive.
pub fn session_directives(cmd: &str, preload: &[String]) -> Vec<String> {
    let mut directives: Vec<String> = preload
        .iter()
        .map(|file| format!("#use \"{file}\";;"))
        .collect();
    directives.push(cmd.to_string());
    directives.push("#quit;;".to_string());
    directives
}

/// Evaluates one command in a fresh interpreter session and compares its
/// output segment against the expected text.
///
/// Returns the actual output and the comparison verdict, or the `RunError`
/// describing why no verdict was possible.
pub fn run_case<B: Backend>(
    backend: &B,
    case: &TestCase,
    preload: &[String],
) -> Result<(String, Comparison), RunError> {
    let directives = session_directives(&case.cmd, preload);
    let transcript = backend.run_session(&directives)?;
    if !transcript.stderr.is_empty() {
        debug!(stderr = %transcript.stderr, "interpreter stderr");
    }

    let segments = split_segments(&transcript.stdout);
    // startup banner + one per preload + command + quit
    let expected_count = 1 + preload.len() + 2;
    debug!(got = segments.len(), expected = expected_count, "segment count");
    if segments.len() != expected_count {
        return Err(RunError::MalformedTranscript {
            cmd: case.cmd.clone(),
            expected: expected_count,
            got: segments.len(),
            stdout: transcript.stdout,
        });
    }

    // Every segment gets exactly one classification; the first failure in
    // submission order decides the outcome. Preload directives may print
    // errors of their own, which surface here the same way.
    for segment in &segments {
        match classify(segment) {
            Classification::Normal => {}
            Classification::IncompleteExpression(_) => {
                return Err(RunError::Incomplete {
                    cmd: case.cmd.clone(),
                })
            }
            Classification::Unimplemented(diagnostic) => {
                return Err(RunError::Unimplemented {
                    diagnostic,
                    cmd: case.cmd.clone(),
                })
            }
            Classification::ErrorText(diagnostic) | Classification::ExceptionText(diagnostic) => {
                return Err(RunError::Fault { diagnostic })
            }
        }
    }

    // Second-to-last segment is the command's output; the last is the
    // leftover whitespace after the quit directive.
    let actual = segments[segments.len() - 2].clone();
    let comparison = compare(&actual, &case.expected);
    Ok((actual, comparison))
}

/// Runs the selected suites strictly sequentially, one interpreter process
/// per case.
///
/// Recoverable conditions are folded into the summary as skips; fatal ones
/// (interpreter fault, timeout, spawn/io failure) abort the remaining run
/// and surface as the error.
pub fn run_suites<B: Backend>(
    backend: &B,
    suites: &[TestSuite],
    preload: &[String],
) -> Result<Summary, RunError> {
    let mut summary = Summary::default();
    for suite in suites {
        let mut halted_at: Option<usize> = None;
        for (k, case) in suite.cases.iter().enumerate() {
            let number = k + 1;
            match run_case(backend, case, preload) {
                Ok((actual, cmp)) => {
                    let status = if cmp.matched {
                        debug!(
                            suite = suite.index,
                            case = number,
                            strategy = cmp.strategy.name(),
                            "passed"
                        );
                        CaseStatus::Passed {
                            strategy: cmp.strategy,
                        }
                    } else {
                        CaseStatus::Failed {
                            strategy: cmp.strategy,
                        }
                    };
                    summary.record(CaseResult {
                        suite: suite.index,
                        case: number,
                        cmd: case.cmd.clone(),
                        expected: case.expected.clone(),
                        actual: Some(actual),
                        status,
                    });
                }
                Err(err @ (RunError::Incomplete { .. } | RunError::MalformedTranscript { .. })) => {
                    if let RunError::MalformedTranscript { stdout, .. } = &err {
                        debug!(stdout = %stdout, "unsplittable transcript");
                    }
                    summary.record(CaseResult {
                        suite: suite.index,
                        case: number,
                        cmd: case.cmd.clone(),
                        expected: case.expected.clone(),
                        actual: None,
                        status: CaseStatus::SkippedUnparsable {
                            reason: err.to_string(),
                        },
                    });
                }
                Err(RunError::Unimplemented { diagnostic, .. }) => {
                    warn!(
                        suite = suite.index,
                        case = number,
                        %diagnostic,
                        "unimplemented stub, skipping rest of suite"
                    );
                    summary.record(CaseResult {
                        suite: suite.index,
                        case: number,
                        cmd: case.cmd.clone(),
                        expected: case.expected.clone(),
                        actual: None,
                        status: CaseStatus::SkippedUnimplemented { cascaded: false },
                    });
                    halted_at = Some(k);
                    break;
                }
                Err(fatal) => return Err(fatal),
            }
        }
        // Later cases in the suite are assumed to depend on the same
        // missing code, so they are skipped without running.
        if let Some(k) = halted_at {
            for (j, case) in suite.cases.iter().enumerate().skip(k + 1) {
                summary.record(CaseResult {
                    suite: suite.index,
                    case: j + 1,
                    cmd: case.cmd.clone(),
                    expected: case.expected.clone(),
                    actual: None,
                    status: CaseStatus::SkippedUnimplemented { cascaded: true },
                });
            }
        }
    }
    Ok(summary)
}
