mod logging;

use clap::{Parser, Subcommand};
use colored::Colorize;
use srl::{Pattern, compile, transpile, transpile_debug};

use crate::logging::LogArgs;

#[derive(Parser)]
#[command(name = "srl")]
#[command(about = "SRL - build regular expressions from readable queries")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    logging: LogArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a query to a regular expression
    Convert {
        /// The query to convert
        query: String,
        /// Show tokens and operations
        #[arg(short, long)]
        debug: bool,
    },
    /// Test a query against input
    Test {
        /// The query
        query: String,
        /// The input string to test
        input: String,
        /// Show capture groups
        #[arg(short, long)]
        verbose: bool,
    },
    /// Check if the query matches at the start of the input
    Match {
        /// The query
        query: String,
        /// The input string
        input: String,
    },
    /// Find all matches in input
    Find {
        /// The query
        query: String,
        /// The input string
        input: String,
    },
    /// Split input around matches
    Split {
        /// The query
        query: String,
        /// The input string
        input: String,
    },
    /// Replace all matches
    Replace {
        /// The query
        query: String,
        /// Replacement template (\1, \g<name>, \g<0>)
        replacement: String,
        /// The input string
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.logging.setup_logging(1) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    match cli.command {
        Commands::Convert { query, debug } => cmd_convert(&query, debug),
        Commands::Test {
            query,
            input,
            verbose,
        } => cmd_test(&query, &input, verbose),
        Commands::Match { query, input } => cmd_match(&query, &input),
        Commands::Find { query, input } => cmd_find(&query, &input),
        Commands::Split { query, input } => cmd_split(&query, &input),
        Commands::Replace {
            query,
            replacement,
            input,
        } => cmd_replace(&query, &replacement, &input),
    }
}

/// Unwrap a result or report the error and exit
fn or_exit<T>(result: srl::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn compile_or_exit(query: &str) -> Pattern {
    let pattern = or_exit(compile(query));
    log::info!("compiled {:?} to {:?}", query, pattern.as_str());
    pattern
}

fn cmd_convert(query: &str, debug: bool) {
    println!("{}", "Converting query...".bold());
    println!("  Input:  {}", query.cyan());
    println!();

    if debug {
        or_exit(transpile_debug(query)).report();
    } else {
        let result = or_exit(transpile(query));
        println!("{}", "Output:".bold());
        println!("  {}", result.green());
    }
}

fn cmd_test(query: &str, input: &str, verbose: bool) {
    println!("{}", "Testing query...".bold());
    println!("  Query: {}", query.cyan());
    println!("  Input: {}", input.yellow());
    println!();

    let pattern = compile_or_exit(query);
    println!("  Regex: {}", pattern.as_str().cyan());
    if !pattern.flags().is_empty() {
        println!("  Flags: {}", pattern.flags());
    }
    println!();

    match or_exit(pattern.find(input)) {
        Some(m) => {
            println!("{}", "✓ Match found!".green().bold());
            println!("  Position: {}..{}", m.start, m.end);
            println!("  Match:    {}", m.as_str(input).green());

            if verbose && m.groups.len() > 1 {
                println!();
                println!("{}", "Capture groups:".bold());
                for idx in 1..m.groups.len() {
                    match m.group(idx) {
                        Some((start, end)) => println!(
                            "  Group {}: {}..{} = {}",
                            idx,
                            start,
                            end,
                            input[start..end].green()
                        ),
                        None => println!("  Group {}: {}", idx, "unmatched".dimmed()),
                    }
                }
                for name in pattern.capture_names() {
                    if let Some(text) = m.named_group_str(input, &name) {
                        println!("  Group {}: {}", name.cyan(), text.green());
                    }
                }
            }
        }
        None => println!("{}", "✗ No match".red()),
    }
}

fn cmd_match(query: &str, input: &str) {
    let pattern = compile_or_exit(query);

    if or_exit(pattern.matches(input)) {
        println!("{}", "true".green());
        std::process::exit(0);
    } else {
        println!("{}", "false".red());
        std::process::exit(1);
    }
}

fn cmd_find(query: &str, input: &str) {
    let pattern = compile_or_exit(query);
    let matches = or_exit(pattern.find_all(input));

    if matches.is_empty() {
        println!("{}", "No matches found".red());
    } else {
        println!(
            "{} {}",
            "Found".bold(),
            format!("{} match(es)", matches.len()).green()
        );
        println!();

        for (i, m) in matches.iter().enumerate() {
            println!(
                "  [{}] {}..{} = {}",
                i + 1,
                m.start,
                m.end,
                m.as_str(input).green()
            );
        }
    }
}

fn cmd_split(query: &str, input: &str) {
    let pattern = compile_or_exit(query);

    for (i, piece) in or_exit(pattern.split(input)).iter().enumerate() {
        println!("  [{}] {:?}", i + 1, piece);
    }
}

fn cmd_replace(query: &str, replacement: &str, input: &str) {
    let pattern = compile_or_exit(query);
    let (result, count) = or_exit(pattern.substitute_counting(replacement, input));

    println!("{}", result.green());
    println!(
        "{} {}",
        "Replaced".bold(),
        format!("{} match(es)", count).cyan()
    );
}
