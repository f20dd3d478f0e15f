use clap::Parser;
use grebe::grammar::{Grammar, Options, ParseSourceError, TreeError};
use grebe::meta::{self, MetaError};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

/// Compile an EBNF-style grammar and, optionally, parse an input with it.
///
/// Reads the grammar from FILE (or standard input), reports compilation
/// diagnostics on standard error, and, when `-i` is given, parses that
/// input with the compiled grammar and writes the syntax tree to `-o` (or
/// standard output). Without `-i` a summary of the compiled grammar is
/// written instead.
#[derive(Debug, Parser)]
#[command(name = "grebe", version)]
struct Args {
    /// Grammar file to compile (standard input when omitted)
    grammar: Option<PathBuf>,
    /// Input to parse with the compiled grammar
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,
    /// Where to write the parse tree (standard output when omitted)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
    /// Start symbol (the first rule when omitted)
    #[arg(short = 's', long = "start")]
    start: Option<String>,
}

#[derive(Debug, Error)]
enum Error {
    #[error("Error reading {0}: {1}")]
    Read(String, io::Error),
    #[error("Error writing {0}: {1}")]
    WriteOutput(String, io::Error),
    #[error("Error parsing grammar: {0}")]
    Meta(#[from] MetaError),
    #[error("Error compiling grammar: {0}")]
    Compile(#[from] TreeError),
    #[error("Error parsing input: {0}")]
    Input(#[from] ParseSourceError),
}

fn main() -> ExitCode {
    match run(&Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("grebe: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let grammar_source = read_source(args.grammar.as_deref())?;
    let tree = meta::parse_source(&grammar_source)?;

    let options = Options {
        start: args.start.clone(),
        ..Options::default()
    };
    let compilation = Grammar::compile_with(&tree, &options)?;
    for diagnostic in &compilation.diagnostics {
        eprintln!("grebe: {diagnostic}");
    }
    let grammar = compilation.grammar;

    let report = match &args.input {
        Some(path) => {
            let input = read_source(Some(path))?;
            let parsed = grammar.parse_source(&input)?;
            grammar.render(&parsed)
        }
        None => summarize(&grammar),
    };
    write_output(args.output.as_deref(), &report)
}

fn read_source(path: Option<&Path>) -> Result<String, Error> {
    match path {
        Some(path) => {
            fs::read_to_string(path).map_err(|e| Error::Read(path.display().to_string(), e))
        }
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| Error::Read("<stdin>".to_string(), e))?;
            Ok(source)
        }
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), Error> {
    match path {
        Some(path) => fs::write(path, text)
            .map_err(|e| Error::WriteOutput(path.display().to_string(), e)),
        None => io::stdout()
            .write_all(text.as_bytes())
            .map_err(|e| Error::WriteOutput("<stdout>".to_string(), e)),
    }
}

fn summarize(grammar: &Grammar) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} rules, {} labels, start symbol '{}'\n",
        grammar.dfas().len(),
        grammar.labels().len(),
        grammar
            .symbol_name(grammar.start())
            .unwrap_or("<none>")
    ));
    for dfa in grammar.dfas() {
        let arcs: usize = dfa.states().iter().map(|s| s.arcs().len()).sum();
        out.push_str(&format!(
            "  {} ({}): {} states, {} arcs\n",
            dfa.name(),
            dfa.kind(),
            dfa.states().len(),
            arcs
        ));
    }
    out
}
