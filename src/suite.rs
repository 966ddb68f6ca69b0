use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::error;

use crate::types::{TestCase, TestSuite};

/// CSS selector for the assignment page's code blocks.
pub const CODE_BLOCK_SELECTOR: &str = "pre code";

/// One doctest chunk: the prompted command through its `;;` terminator
/// (possibly spanning lines), then the recorded output.
static TEST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A# (.+;;)[ ]*\n(.*)\z").unwrap());

/// Text contents of every `pre code` element, in document order.
pub fn extract_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(CODE_BLOCK_SELECTOR).unwrap();
    let blocks: Vec<String> = document
        .select(&selector)
        .map(|el| el.text().collect::<String>())
        .collect();
    if blocks.is_empty() {
        error!(
            selector = CODE_BLOCK_SELECTOR,
            "code block selector returned no matches"
        );
    }
    blocks
}

/// Parses one code block into (command, expected-output) pairs.
///
/// The block is consumed chunk by chunk, each chunk running up to the next
/// `\n# ` prompt. A chunk that doesn't look like a doctest ends the scan of
/// this block; tests parsed so far are kept.
pub fn parse_tests(text: &str) -> Vec<TestCase> {
    let mut tests = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let chunk_end = rest.find("\n# ").unwrap_or(rest.len());
        let chunk = &rest[..chunk_end];
        let caps = match TEST_RE.captures(chunk) {
            Some(caps) => caps,
            None => {
                error!(chunk, "couldn't parse test");
                break;
            }
        };
        tests.push(TestCase {
            cmd: caps[1].trim().to_string(),
            expected: caps[2].trim().to_string(),
        });
        if chunk_end >= rest.len() {
            break;
        }
        // Step over the newline so the next chunk starts at its prompt.
        rest = &rest[chunk_end + 1..];
    }
    tests
}

/// Parses every block on the page, discards blocks with no tests, and
/// numbers the remaining suites from 1 in document order.
pub fn load_suites(html: &str) -> Vec<TestSuite> {
    extract_blocks(html)
        .iter()
        .map(|block| parse_tests(block))
        .filter(|cases| !cases.is_empty())
        .enumerate()
        .map(|(i, cases)| TestSuite { index: i + 1, cases })
        .collect()
}
