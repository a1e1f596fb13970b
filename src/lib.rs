pub mod ast;
pub mod constraints;
pub mod errors;
pub mod infer;
pub mod lexer;
pub mod parser;
pub mod proof;
pub mod unify;


use std::fs;

pub use errors::{Error, ParseError, Result, TypeError};
pub use infer::{check_expression, infer_type_only, run_inference, Outcome, TypeInference, NO_TYPE};
pub use parser::parse;

/// Result of running a golden test with detailed line-by-line comparison
#[derive(Debug)]
pub struct GoldenTestResult {
    pub passed: bool,
    pub line_results: Vec<LineResult>,
    pub expected_lines: Vec<String>,
    pub actual_lines: Vec<String>,
}

#[derive(Debug)]
pub struct LineResult {
    pub line_number: usize,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

/// Types every line of `input_content`. Types are printed with normalized
/// variable names so the output does not depend on the fresh-variable
/// counter.
pub fn process_test_lines(input_content: &str) -> Vec<String> {
    let mut results = Vec::new();

    for line in input_content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            results.push(line.to_string());
            continue;
        }

        let result = match parse(line) {
            Ok(term) => match infer_type_only(&term) {
                Ok(ty) => format!("{} : {}", line, ty.normalized()),
                Err(_) => format!("{} : {}", line, NO_TYPE),
            },
            Err(e) => format!("{} : PARSE ERROR: {}", line, e),
        };

        results.push(result);
    }

    results
}

/// Run a detailed golden test comparison
pub fn run_golden_test_detailed(
    input_file: &str,
    expected_file: &str,
) -> std::result::Result<GoldenTestResult, String> {
    let input_content = fs::read_to_string(input_file)
        .map_err(|e| format!("Error reading input file {}: {}", input_file, e))?;

    let expected_content = fs::read_to_string(expected_file)
        .map_err(|e| format!("Error reading expected file {}: {}", expected_file, e))?;

    let actual_lines = process_test_lines(&input_content);
    let expected_lines: Vec<String> = expected_content.lines().map(|s| s.to_string()).collect();

    let mut line_results = Vec::new();
    let mut all_passed = true;
    let max_lines = expected_lines.len().max(actual_lines.len());

    for i in 0..max_lines {
        let expected_line = expected_lines
            .get(i)
            .cloned()
            .unwrap_or_else(|| "<missing>".to_string());
        let actual_line = actual_lines
            .get(i)
            .cloned()
            .unwrap_or_else(|| "<missing>".to_string());

        let passed = expected_line == actual_line;
        if !passed {
            all_passed = false;
        }

        line_results.push(LineResult {
            line_number: i + 1,
            passed,
            expected: expected_line,
            actual: actual_line,
        });
    }

    Ok(GoldenTestResult {
        passed: all_passed,
        line_results,
        expected_lines,
        actual_lines,
    })
}

pub fn run_golden_test(input_file: &str, expected_file: &str) -> std::result::Result<(), String> {
    let result = run_golden_test_detailed(input_file, expected_file)?;
    if result.passed {
        Ok(())
    } else {
        let failures: Vec<String> = result
            .line_results
            .iter()
            .filter(|line| !line.passed)
            .map(|line| {
                format!(
                    "line {}:\n  expected: {}\n  actual:   {}",
                    line.line_number, line.expected, line.actual
                )
            })
            .collect();
        Err(format!("Golden test failed!\n{}", failures.join("\n")))
    }
}
