mod logging;

use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::Parser;
use flatregex::{Captures, Regex, RegexBuilder, SyntaxError};

/// Compile a pattern and scan texts with it.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// The pattern to compile.
    pattern: String,

    /// Texts to scan. Lines of stdin are scanned when none are given.
    texts: Vec<String>,

    /// Print the compiled program.
    #[arg(long)]
    program: bool,

    /// Report every match, not just the first.
    #[arg(long)]
    all: bool,

    /// Require the whole text to match.
    #[arg(long, conflicts_with = "all")]
    full: bool,

    /// Byte offset to start scanning at.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Give up on a text after this many backtracks.
    #[arg(long)]
    backtrack_limit: Option<usize>,

    /// Log every executed instruction (shown with -vvvvv).
    #[arg(long)]
    trace: bool,

    #[command(flatten)]
    log: logging::LogArgs,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();
    args.log.setup_logging(2)?;

    let mut builder = RegexBuilder::new(&args.pattern);
    builder.lenient(true).trace(args.trace);
    if let Some(limit) = args.backtrack_limit {
        builder.backtrack_limit(limit);
    }
    let regex = builder.build()?;

    if args.program {
        print!("{}", regex.program());
    }
    for error in regex.program().errors() {
        report_syntax_error(&args.pattern, &error);
    }

    let texts = if args.texts.is_empty() {
        io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        args.texts.clone()
    };

    let mut matched = false;
    for text in &texts {
        match run(&args, &regex, text) {
            Ok(found) => matched |= found,
            Err(err) => log::warn!("{:?}: {}", text, err),
        }
    }

    Ok(if matched {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run(args: &Args, regex: &Regex, text: &str) -> flatregex::Result<bool> {
    if args.full {
        let matched = regex.matches(text)?;
        println!(
            "{:?}: {}",
            text,
            if matched { "full match" } else { "no match" }
        );
        return Ok(matched);
    }

    let mut found = false;
    for caps in regex.captures_iter_at(text, args.start) {
        print_captures(text, &caps?);
        found = true;
        if !args.all {
            break;
        }
    }
    if !found {
        println!("{:?}: no match", text);
    }
    Ok(found)
}

fn print_captures(text: &str, caps: &Captures) {
    let whole = caps.whole();
    println!("{:?}: match {}..{} {:?}", text, whole.start(), whole.end(), whole.as_str(text));
    for (group, span) in caps.iter().enumerate().skip(1) {
        match span {
            Some(m) => println!("  group {}: {}..{} {:?}", group, m.start(), m.end(), m.as_str(text)),
            None => println!("  group {}: -", group),
        }
    }
}

/// Prints the error with the pattern underlined at its span.
fn report_syntax_error(pattern: &str, error: &SyntaxError) {
    let range = error.span.range();
    let column = pattern[..range.start].chars().count();
    let width = pattern[range].chars().count().max(1);
    eprintln!("error: {}", error.kind);
    eprintln!("  {}", pattern);
    eprintln!("  {}{}", " ".repeat(column), "^".repeat(width));
}
