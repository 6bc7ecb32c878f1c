//! Command-line front-end: evaluate an expression against JSON documents
//! and print each matched value on its own line.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;
use serde_json_query::JsonPath;

#[derive(Debug, Parser)]
#[command(name = "jsonquery", version, about = "Query JSON documents with extended JSONPath expressions")]
struct Cli {
    /// The expression to evaluate
    expr: String,
    /// JSON documents to query; standard input is read when none are given
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jsonquery: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let path = JsonPath::parse(&cli.expr)?;
    if cli.files.is_empty() {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        let doc: Value = serde_json::from_str(&source)?;
        print_matches(&path, &doc)?;
    } else {
        for file in &cli.files {
            let reader = BufReader::new(File::open(file)?);
            let doc: Value = serde_json::from_reader(reader)?;
            print_matches(&path, &doc)?;
        }
    }
    Ok(())
}

fn print_matches(path: &JsonPath, doc: &Value) -> Result<(), Box<dyn std::error::Error>> {
    for datum in path.find(doc)?.iter() {
        match datum.value() {
            Value::String(s) => println!("{s}"),
            other => println!("{other}"),
        }
    }
    Ok(())
}
