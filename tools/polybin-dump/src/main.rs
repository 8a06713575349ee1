// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! polybin-dump - Print the structure of a polybin stream
//!
//! Decodes every top-level value using only the wire tags, so it works on
//! streams whose schema is unknown.

use clap::Parser;
use colored::*;
use polybin::config::DEFAULT_MAX_DEPTH;
use polybin::{CodecConfig, Inspector, WireValue};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

/// Print the tag structure of a polybin stream
#[derive(Parser, Debug)]
#[command(name = "polybin-dump")]
#[command(version)]
#[command(about = "Print the tag structure of a polybin stream without a schema")]
struct Args {
    /// Input file ("-" reads standard input)
    file: PathBuf,

    /// Maximum nesting of lists, maps and objects
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Output format: pretty, json
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Stop after the first top-level value
    #[arg(long)]
    first: bool,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "p" => Ok(OutputFormat::Pretty),
            "json" | "j" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let input: Box<dyn Read> = if args.file.as_os_str() == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(&args.file)?)
    };
    let values = read_values(BufReader::new(input), args.max_depth, args.first)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Pretty => print_pretty(&mut out, &values)?,
        OutputFormat::Json => print_json(&mut out, &values)?,
    }
    Ok(())
}

/// Inspect top-level values until the input ends, or after one value when
/// `first_only` is set.
fn read_values<R: Read>(input: R, max_depth: usize, first_only: bool) -> Result<Vec<WireValue>, String> {
    let config = CodecConfig::default().with_max_depth(max_depth);
    let mut values = Vec::new();
    for (index, value) in Inspector::with_config(input, config).enumerate() {
        let value = value.map_err(|e| format!("value #{}: {}", index + 1, e))?;
        log::debug!("[polybin-dump] value #{} tagged {}", index + 1, value.tag());
        values.push(value);
        if first_only {
            break;
        }
    }
    Ok(values)
}

fn print_pretty<W: Write>(out: &mut W, values: &[WireValue]) -> io::Result<()> {
    if values.is_empty() {
        eprintln!("{}", "(empty stream)".dimmed());
        return Ok(());
    }
    for (i, value) in values.iter().enumerate() {
        writeln!(
            out,
            "{} {}",
            format!("#{}", i + 1).yellow().bold(),
            value.tag().to_string().cyan()
        )?;
        writeln!(out, "{}", value)?;
        writeln!(out)?;
    }
    Ok(())
}

fn print_json<W: Write>(out: &mut W, values: &[WireValue]) -> Result<(), Box<dyn std::error::Error>> {
    let json: Vec<serde_json::Value> = values.iter().map(WireValue::to_json).collect();
    writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
    Ok(())
}
