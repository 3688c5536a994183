use clap::{Parser, ValueEnum};
use coda_parser::{Document, ParseError, decode_text, parse, parse_all};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(
    name = "coda_converter",
    version,
    about = "Разбирает выписку CODA и печатает её в JSON или CSV.",
    long_about = None,
)]
struct Args {
    /// Входной файл CODA
    #[arg(long)]
    input: PathBuf,

    /// Формат вывода
    #[arg(long, value_enum, default_value_t = Format::Json)]
    output_format: Format,

    /// Разобрать все выписки файла, а не только первую
    #[arg(long)]
    all: bool,
}

/// Поддерживаемые форматы вывода
#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Json,
    Csv,
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), ParseError> {
    let args = Args::parse();

    if !args.input.exists() {
        eprintln!("input file does not exist: {}", args.input.display());
        process::exit(1)
    }

    // CODA часто приходит в Latin-1
    let text = decode_text(fs::read(&args.input)?);

    let documents: Vec<Document> = if args.all {
        parse_all(&text)?
    } else {
        vec![parse(&text)?]
    };

    info!(
        "decoded {} statement(s) from {}",
        documents.len(),
        args.input.display()
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for document in &documents {
        match args.output_format {
            Format::Json => {
                document.write_json(&mut handle)?;
                writeln!(handle)?;
            }
            Format::Csv => document.write_csv(&mut handle)?,
        }
    }

    Ok(())
}
