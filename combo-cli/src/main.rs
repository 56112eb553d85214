use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use combo::Mode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Parse input against an EBNF grammar and print the parse tree.
#[derive(Parser, Debug)]
#[command(name = "combo", version)]
struct Args {
    /// EBNF grammar file.
    #[arg(short, long)]
    grammar: PathBuf,

    /// Rule to parse with. Defaults to the first production.
    #[arg(short, long)]
    rule: Option<String>,

    /// Accept a match of a prefix of the input.
    #[arg(short, long)]
    partial: bool,

    /// Increase log verbosity (-v, -vv, -vvv). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Input to parse. Read from stdin when omitted.
    input: Option<String>,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn read_input(arg: Option<String>) -> Result<String> {
    match arg {
        Some(input) => Ok(input),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("read input from stdin")?;
            if buf.ends_with('\n') {
                buf.pop();
                if buf.ends_with('\r') {
                    buf.pop();
                }
            }
            Ok(buf)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let source = fs::read_to_string(&args.grammar)
        .with_context(|| format!("read grammar {}", args.grammar.display()))?;
    let grammar = combo::compile_str(&source)
        .with_context(|| format!("compile grammar {}", args.grammar.display()))?;
    info!(parsers = grammar.len(), "loaded grammar");

    let rule = match &args.rule {
        Some(name) => grammar
            .rule(name)
            .ok_or_else(|| anyhow!("no rule named '{}'", name))?,
        None => grammar
            .start()
            .ok_or_else(|| anyhow!("grammar has no productions"))?,
    };

    let input = read_input(args.input)?;
    let mode = if args.partial {
        Mode::Partial
    } else {
        Mode::Total
    };
    debug!(rule = ?grammar.name_of(rule), ?mode, "parsing");

    let res = grammar.parse_with(rule, &input, mode);
    println!("{}", res);
    if res.is_failure() {
        return Ok(false);
    }
    if mode == Mode::Partial {
        println!("consumed {} of {} bytes", res.length(), input.len());
    }
    Ok(true)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}
