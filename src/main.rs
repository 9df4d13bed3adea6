use records::read_json;
use std::{env, error::Error, process};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod error;
mod records;
mod series;

use series::{normalize, write_csv, NumericPolicy};

const PROGRAM_NAME: &str = "series-csv";
const DEFAULT_INPUT: &str = "./XIUSA000ML.json";
const DEFAULT_OUTPUT: &str = "./XIUSA000ML.csv";

#[derive(Debug, PartialEq)]
struct Args {
    input: String,
    output: String,
    policy: NumericPolicy,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr, stdout carries the record listing.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!("{}", usage());
            process::exit(1);
        }
    };

    info!(input = %args.input, output = %args.output, policy = ?args.policy, "converting");

    let raw_records = read_json(&args.input)?.into_records()?;
    let records = normalize(raw_records, args.policy)?;

    println!("{:#?}", records);

    write_csv(&args.output, &records)?;

    info!(rows = records.len(), "wrote {}", args.output);
    println!("...Done");

    Ok(())
}

fn usage() -> String {
    format!("Usage: {} [--strict] [input.json [output.csv]]", PROGRAM_NAME)
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    const JSON_EXTENSION: &str = ".json";
    const CSV_EXTENSION: &str = ".csv";

    let mut policy = NumericPolicy::default();
    let mut paths = Vec::new();

    for arg in args {
        match arg.as_str() {
            "--strict" => policy = NumericPolicy::Strict,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
            path => paths.push(path.to_owned()),
        }
    }

    if paths.len() > 2 {
        return Err("too many arguments".to_string());
    }

    let mut paths = paths.into_iter();
    let input = paths.next().unwrap_or_else(|| DEFAULT_INPUT.to_string());
    let output = paths.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    if !input.ends_with(JSON_EXTENSION) {
        return Err("The input file must have a .json extension".to_string());
    }
    if !output.ends_with(CSV_EXTENSION) {
        return Err("The output file must have a .csv extension".to_string());
    }

    Ok(Args {
        input,
        output,
        policy,
    })
}
