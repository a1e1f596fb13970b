use std::fs;

use ariadne::Source;
use clap::{Parser, Subcommand};
use lambda_infer::{
    check_expression, parse, process_test_lines, run_golden_test_detailed, Outcome, ParseError,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[derive(Parser)]
#[command(name = "lambda-infer")]
#[command(about = "Simple type reconstruction for lambda terms")]
#[command(
    long_about = "Infers a simple type for an untyped lambda term by constraint generation and unification, and prints the typing derivation"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Expression to type (if no subcommand provided)
    expression: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive REPL (default behavior)
    Repl,
    /// Run test file and optionally save results
    Test {
        /// Input file containing expressions to test
        input_file: String,
        /// Optional output file to save results
        output_file: Option<String>,
    },
    /// Run golden test comparing actual vs expected output
    Golden {
        /// Input file containing expressions
        input_file: String,
        /// Expected output file
        expected_file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Repl) => run_repl(),
        Some(Commands::Test {
            input_file,
            output_file,
        }) => run_tests(input_file, output_file.as_deref()),
        Some(Commands::Golden {
            input_file,
            expected_file,
        }) => run_golden_test(input_file, expected_file),
        None => {
            if let Some(expr) = &cli.expression {
                run_single_expression(expr);
            } else {
                run_repl();
            }
        }
    }
}

fn report_parse_error(input: &str, error: &ParseError) {
    let filename = "<input>";
    if error
        .to_ariadne_report(filename)
        .eprint((filename, Source::from(input)))
        .is_err()
    {
        eprintln!("Parse error: {}", error);
    }
}

fn run_single_expression(input: &str) {
    let term = match parse(input) {
        Ok(term) => term,
        Err(e) => {
            report_parse_error(input, &e);
            std::process::exit(1);
        }
    };

    println!("Parsed expression: {}", term);
    println!();

    match check_expression(input) {
        Ok(Outcome::Typed(derivation)) => {
            println!("Final type: {}", derivation.ty);
            println!();
            println!("Derivation:");
            print!("{}", derivation);
        }
        Ok(outcome @ Outcome::NoType(_)) => {
            print!("{}", outcome);
            std::process::exit(1);
        }
        Err(e) => {
            report_parse_error(input, &e);
            std::process::exit(1);
        }
    }
}

fn run_tests(input_file: &str, output_file: Option<&str>) {
    let content = match fs::read_to_string(input_file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file {}: {}", input_file, e);
            std::process::exit(1);
        }
    };

    let results = process_test_lines(&content);

    for (line_num, result) in results.iter().enumerate() {
        println!("Line {}: {}", line_num + 1, result);
    }

    if let Some(output_file) = output_file {
        match fs::write(output_file, results.join("\n") + "\n") {
            Ok(()) => println!("Results written to {}", output_file),
            Err(e) => eprintln!("Error writing to {}: {}", output_file, e),
        }
    }
}

fn run_golden_test(input_file: &str, expected_file: &str) {
    let result = match run_golden_test_detailed(input_file, expected_file) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    println!("Running golden test: {} vs {}", input_file, expected_file);
    println!("═══════════════════════════════════════");

    for line_result in &result.line_results {
        if line_result.passed {
            println!("✓ Line {}: PASS", line_result.line_number);
        } else {
            println!("✗ Line {}: FAIL", line_result.line_number);
            println!("  Expected: {}", line_result.expected);
            println!("  Actual:   {}", line_result.actual);
        }
    }

    println!("═══════════════════════════════════════");
    if result.passed {
        println!("All tests PASSED!");
        std::process::exit(0);
    } else {
        println!("Some tests FAILED!");
        std::process::exit(1);
    }
}

fn run_repl() {
    println!("Simple type reconstruction");
    println!("Type lambda terms to see their typing derivation.");
    println!("Examples: \\x.x, \\x.\\y.x, \\f.\\x. f (f x)");
    println!("Press Ctrl+C or Ctrl+D to exit.\n");

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            return;
        }
    };

    loop {
        let readline = rl.readline("λ> ");
        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match check_expression(line) {
                    Ok(outcome) => print!("{}", outcome),
                    Err(e) => report_parse_error(line, &e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
}
