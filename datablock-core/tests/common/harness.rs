//! Test harness for running tests with stochastic variations

use crate::common::{ExpectedError, Gen, TestCase};
use datablock_core::{Block, Error};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub seed: u64,
    pub errors: Vec<String>,
}

fn error_kind(err: &Error) -> Option<ExpectedError> {
    match err {
        Error::Syntax { .. } => Some(ExpectedError::Syntax),
        Error::TypeMismatch { .. } => Some(ExpectedError::TypeMismatch),
        _ => None,
    }
}

/// Run a single test case (canonical, no variations)
///
/// Successful parses must serialize to the expected text, and that text must
/// parse back to the same tree.
pub fn run_test(case: &TestCase) -> TestResult {
    let mut errors = Vec::new();

    let (expected, actual) = match (Block::parse(&case.input), case.error) {
        (Ok(block), None) => {
            let text = block.to_text();
            if text != case.expected_text() {
                errors.push("Serialized output differs".to_string());
            }
            match Block::parse(&text) {
                Ok(again) if again == block => {}
                Ok(again) => errors.push(format!(
                    "Output parses to a different tree:\n{}",
                    again.to_text()
                )),
                Err(err) => errors.push(format!("Output does not parse: {err}")),
            }
            (case.expected_text().to_string(), text)
        }
        (Err(err), Some(kind)) => {
            if error_kind(&err) != Some(kind) {
                errors.push(format!("Expected {kind:?} error, got {err:?}"));
            }
            if let Some(needle) = &case.error_contains {
                if !err.to_string().contains(needle.as_str()) {
                    errors.push(format!("Error message does not contain {needle:?}"));
                }
            }
            (format!("{kind:?} error"), err.to_string())
        }
        (Ok(block), Some(kind)) => {
            errors.push(format!("Expected {kind:?} error, parse succeeded"));
            (format!("{kind:?} error"), block.to_text())
        }
        (Err(err), None) => {
            errors.push(format!("Unexpected error: {err}"));
            (case.expected_text().to_string(), err.to_string())
        }
    };

    TestResult {
        passed: errors.is_empty(),
        input: case.input.clone(),
        expected,
        actual,
        seed: 0,
        errors,
    }
}

/// Run test with stochastic variations
///
/// Applies independent variations:
/// - 40% chance of a statement above
/// - Nesting inside 1+ wrapper blocks (geometric, α=0.5)
/// - Geometric indent per wrapper level
/// - Random blank lines
/// - 40% chance of a statement below
///
/// The block at the bottom of the wrappers must equal the canonical parse.
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let depth = 1 + gen.geometric(0.5);
    let step = gen.indent_level();
    let mut input = String::new();

    // 40% chance: add a statement above
    if gen.chance(0.4) {
        input.push_str(&gen.fragment(0));
    }

    for level in 0..depth {
        let indent = " ".repeat(level * step);
        input.push_str(&format!("{indent}wrap{level}"));
        if gen.chance(0.5) {
            input.push_str(" {\n");
        } else {
            input.push_str(&format!("\n{indent}{{\n"));
        }
    }

    let indent = " ".repeat(depth * step);
    for line in case.input.lines() {
        input.push_str(&gen.blank_lines());
        if !line.is_empty() {
            input.push_str(&indent);
            input.push_str(line);
        }
        input.push('\n');
    }

    for level in (0..depth).rev() {
        input.push_str(&" ".repeat(level * step));
        input.push_str("}\n");
    }

    // 40% chance: add a statement below
    if gen.chance(0.4) {
        input.push_str(&gen.fragment(0));
    }

    let mut errors = Vec::new();
    let canonical = Block::parse(&case.input).unwrap_or_default();
    let expected = canonical.to_text();

    let actual = match Block::parse(&input) {
        Ok(root) => {
            let mut node = Some(&root);
            for level in 0..depth {
                node = node.and_then(|b| b.get_block(&format!("wrap{level}")));
            }
            match node {
                Some(inner) => {
                    let mut inner = inner.clone();
                    inner.set_name("");
                    if inner != canonical {
                        errors.push("Wrapped content differs from canonical parse".to_string());
                    }
                    inner.to_text()
                }
                None => {
                    errors.push("Wrapper blocks missing from parsed tree".to_string());
                    root.to_text()
                }
            }
        }
        Err(err) => {
            errors.push(format!("Unexpected error: {err}"));
            err.to_string()
        }
    };

    TestResult {
        passed: errors.is_empty(),
        input,
        expected,
        actual,
        seed: gen.seed,
        errors,
    }
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!(
            "Seed: {} (set DATABLOCK_TEST_SEED={} to reproduce)",
            self.seed, self.seed
        );
        eprintln!("\nInput:");
        eprintln!("{}", self.input);
        eprintln!("\nExpected:");
        eprintln!("{}", self.expected);
        eprintln!("\nActual:");
        eprintln!("{}", self.actual);
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
