use std::collections::HashMap;

use colored::Colorize;

use crate::compare::Strategy;
use crate::error::RunError;
use crate::types::{CaseStatus, Summary};

fn details(cmd: &str, expected: &str, actual: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {} {:?}\n", "input   :".bold(), cmd));
    out.push_str(&format!("  {} {:?}\n", "expected:".bold(), expected));
    if let Some(actual) = actual {
        out.push_str(&format!("  {} {:?}\n", "output  :".bold(), actual));
    }
    out
}

pub fn render_human(summary: &Summary, verbose: bool) -> String {
    // Suite sizes, for "test K of N in suite J" headers.
    let mut suite_sizes: HashMap<usize, usize> = HashMap::new();
    for c in &summary.cases {
        *suite_sizes.entry(c.suite).or_default() += 1;
    }

    let mut out = String::new();
    for c in &summary.cases {
        let n = suite_sizes[&c.suite];
        let header = format!("test {} of {} in suite {}", c.case, n, c.suite);
        match &c.status {
            CaseStatus::Passed { strategy } => {
                if verbose {
                    let mut line = format!("Passed {header}");
                    if *strategy == Strategy::WhitespaceNormalized {
                        line.push_str(" with strategy ");
                        line.push_str(strategy.name());
                    }
                    out.push_str(&format!("{}\n", line.green()));
                    out.push_str(&details(&c.cmd, &c.expected, c.actual.as_deref()));
                }
            }
            CaseStatus::Failed { .. } => {
                out.push_str(&format!("{}\n", format!("Failed {header}").red().bold()));
                out.push_str(&details(&c.cmd, &c.expected, c.actual.as_deref()));
            }
            CaseStatus::SkippedUnparsable { reason } => {
                out.push_str(&format!(
                    "{}\n",
                    format!("Unable to run {header}: {reason}").yellow()
                ));
            }
            CaseStatus::SkippedUnimplemented { cascaded: false } => {
                out.push_str(&format!(
                    "{}\n",
                    format!("Skipped unimplemented suite {} ({:?})", c.suite, c.cmd).yellow()
                ));
            }
            CaseStatus::SkippedUnimplemented { cascaded: true } => {
                if verbose {
                    out.push_str(&format!("{}\n", format!("Skipped {header}").yellow()));
                }
            }
        }
    }

    let evaluated = summary.passed + summary.failed;
    let fail_line = format!("{} of {} tests failed", summary.failed, evaluated);
    if summary.failed > 0 {
        out.push_str(&format!("{}\n", fail_line.red()));
    } else {
        out.push_str(&format!("{}\n", fail_line.green()));
    }
    let skip_line = format!("{} tests skipped", summary.skipped);
    if summary.skipped > 0 {
        out.push_str(&format!("{}\n", skip_line.yellow()));
    } else {
        out.push_str(&skip_line);
        out.push('\n');
    }
    out
}

pub fn print_human(summary: &Summary, verbose: bool) {
    print!("{}", render_human(summary, verbose));
}

pub fn render_fatal(err: &RunError) -> String {
    match err {
        RunError::Fault { diagnostic } => format!(
            "{}\n{}",
            "OCaml returned the following error:".red().bold(),
            diagnostic.red()
        ),
        other => format!("{}", format!("fatal: {other}").red().bold()),
    }
}

pub fn print_fatal(err: &RunError) {
    eprintln!("{}", render_fatal(err));
}
